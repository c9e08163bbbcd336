/// Core CallbackDispatcher implementation
use super::handlers::CallbackHandler;
use super::stats::DispatcherStats;
use crate::ListenerId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The dispatch core that routes pushed script callbacks to listeners.
///
/// This is the single entry point between the server connection layer and
/// everything that wants to react to script callbacks. It keeps one ordered
/// listener list per callback name, decodes each listened-for payload exactly
/// once, and broadcasts the typed event to the listeners in registration order.
///
/// # Thread Safety
///
/// The dispatcher is fully thread-safe and is shared as `Arc<CallbackDispatcher>`.
/// The host pushes one logical event stream, so dispatch calls are expected to
/// arrive one at a time; the internal locks exist so registration from plugin
/// tasks cannot race a broadcast, not to support concurrent dispatch fan-in.
pub struct CallbackDispatcher {
    /// Map of callback names to their registered listeners, in registration order
    pub(super) listeners: RwLock<HashMap<String, Vec<ListenerEntry>>>,
    /// Dispatch statistics for monitoring
    pub(super) stats: RwLock<DispatcherStats>,
}

/// A single registration: the owning plugin's id plus the handler to invoke.
pub(super) struct ListenerEntry {
    pub(super) owner: ListenerId,
    pub(super) handler: Arc<dyn CallbackHandler>,
}

impl std::fmt::Debug for CallbackDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackDispatcher")
            .field("listeners", &"[listeners]")
            .field("stats", &"[stats]")
            .finish()
    }
}

impl CallbackDispatcher {
    /// Creates a new dispatcher with no registered listeners.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            stats: RwLock::new(DispatcherStats::default()),
        }
    }

    /// Returns a snapshot of the current dispatcher statistics.
    pub async fn stats(&self) -> DispatcherStats {
        self.stats.read().await.clone()
    }
}

impl Default for CallbackDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
