/// Dispatcher management and utility methods
use super::core::CallbackDispatcher;
use crate::ListenerId;
use tracing::info;

impl CallbackDispatcher {
    /// Removes every registration owned by `owner` across all callback names.
    ///
    /// This is the plugin-unload path: one call per owner, regardless of how
    /// many callbacks it listened to. Returns the number of removed listeners;
    /// an owner with no registrations is not an error and removes zero.
    pub async fn unregister(&self, owner: ListenerId) -> usize {
        let mut listeners = self.listeners.write().await;
        let mut removed = 0;

        listeners.retain(|_, entries| {
            entries.retain(|entry| {
                if entry.owner == owner {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
            !entries.is_empty()
        });
        drop(listeners);

        if removed > 0 {
            let mut stats = self.stats.write().await;
            stats.total_listeners = stats.total_listeners.saturating_sub(removed);
            info!("🗑️ Removed {} listeners owned by {}", removed, owner);
        }

        removed
    }

    /// Checks whether any listener is registered for a callback name.
    pub async fn has_listeners(&self, callback_name: &str) -> bool {
        let listeners = self.listeners.read().await;
        listeners.contains_key(callback_name)
    }

    /// Returns the number of listeners registered for a callback name.
    pub async fn listener_count(&self, callback_name: &str) -> usize {
        let listeners = self.listeners.read().await;
        listeners
            .get(callback_name)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Returns all callback names that currently have listeners.
    pub async fn registered_callbacks(&self) -> Vec<String> {
        let listeners = self.listeners.read().await;
        listeners.keys().cloned().collect()
    }
}
