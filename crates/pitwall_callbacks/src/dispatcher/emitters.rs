/// Dispatch entry points
use super::core::CallbackDispatcher;
use crate::decode::decode_callback;
use crate::events::ScriptEvent;
use crate::CallbackError;
use serde_json::Value;
use tracing::{debug, error, warn};

impl CallbackDispatcher {
    /// Dispatches a raw script callback pushed by the server.
    ///
    /// If nobody listens for `callback_name` this returns immediately without
    /// touching the payload - the host pushes many callback categories per
    /// second and most deployments listen to a handful, so the drop path must
    /// stay free of decoding work. Otherwise the payload is decoded once and
    /// the typed event is broadcast to every listener in registration order.
    ///
    /// A listened-for name without a decoder is a configuration error: it is
    /// logged and absorbed, never fatal. A malformed payload for a known name
    /// is likewise reported and dropped.
    pub async fn dispatch(
        &self,
        callback_name: &str,
        payload: &[Value],
    ) -> Result<(), CallbackError> {
        if !self.has_listeners(callback_name).await {
            return Ok(());
        }

        let event = match decode_callback(callback_name, payload) {
            Ok(Some(event)) => event,
            Ok(None) => {
                error!(
                    "❌ Listeners registered for {} but no decoder supports it",
                    callback_name
                );
                return Ok(());
            }
            Err(decode_error) => {
                warn!("⚠️ Dropping malformed {} payload: {}", callback_name, decode_error);
                return Ok(());
            }
        };

        {
            let mut stats = self.stats.write().await;
            stats.payloads_decoded += 1;
        }

        self.broadcast(&event).await
    }

    /// Broadcasts an already-typed event to its listeners.
    ///
    /// Used by components that synthesize events locally instead of receiving
    /// them from the server connection. No decoding takes place.
    pub async fn dispatch_typed(&self, event: &ScriptEvent) -> Result<(), CallbackError> {
        self.broadcast(event).await
    }

    /// Internal broadcast implementation.
    ///
    /// Listener failures are logged with the handler's name and do not prevent
    /// the remaining listeners from running.
    async fn broadcast(&self, event: &ScriptEvent) -> Result<(), CallbackError> {
        let callback_name = event.callback_name();
        let listeners = self.listeners.read().await;
        let Some(entries) = listeners.get(callback_name) else {
            return Ok(());
        };

        debug!(
            "📤 Broadcasting {} to {} listeners",
            callback_name,
            entries.len()
        );

        let mut failures = 0u64;
        for entry in entries {
            if let Err(handler_error) = entry.handler.handle(event).await {
                error!(
                    "❌ Handler {} failed: {}",
                    entry.handler.handler_name(),
                    handler_error
                );
                failures += 1;
            }
        }
        drop(listeners);

        let mut stats = self.stats.write().await;
        stats.broadcasts += 1;
        stats.handler_failures += failures;

        Ok(())
    }
}
