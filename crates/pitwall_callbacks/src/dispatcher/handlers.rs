/// Listener registration methods
use super::core::{CallbackDispatcher, ListenerEntry};
use crate::events::{ScriptCallback, ScriptEvent};
use crate::{CallbackError, ListenerId};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Handler trait for processing script events.
///
/// Abstracts over the payload-specific handling logic so the dispatcher can
/// store heterogeneous listeners in one table. Most callers will not implement
/// this directly but go through [`CallbackDispatcher::on_script`], which wraps
/// a closure in a [`TypedCallbackHandler`].
#[async_trait]
pub trait CallbackHandler: Send + Sync {
    /// Handles a decoded script event.
    ///
    /// Returns `Ok(())` if the event was handled, or `Err(CallbackError)` if
    /// handling failed. Failures are logged by the dispatcher and never stop
    /// the broadcast.
    async fn handle(&self, event: &ScriptEvent) -> Result<(), CallbackError>;

    /// Returns a human-readable name for this handler for failure logs.
    fn handler_name(&self) -> &str;
}

/// Type-safe wrapper bridging a payload-typed closure to [`CallbackHandler`].
///
/// Extraction of the concrete payload from the [`ScriptEvent`] union happens
/// here, so listener closures only ever see the type they registered for.
pub struct TypedCallbackHandler<T, F>
where
    T: ScriptCallback,
    F: Fn(T) -> Result<(), CallbackError> + Send + Sync,
{
    handler: F,
    name: String,
    _phantom: std::marker::PhantomData<T>,
}

impl<T, F> TypedCallbackHandler<T, F>
where
    T: ScriptCallback,
    F: Fn(T) -> Result<(), CallbackError> + Send + Sync,
{
    /// Creates a new typed callback handler.
    pub fn new(name: String, handler: F) -> Self {
        Self {
            handler,
            name,
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<T, F> CallbackHandler for TypedCallbackHandler<T, F>
where
    T: ScriptCallback,
    F: Fn(T) -> Result<(), CallbackError> + Send + Sync,
{
    async fn handle(&self, event: &ScriptEvent) -> Result<(), CallbackError> {
        let Some(payload) = T::from_event(event) else {
            return Err(CallbackError::HandlerExecution(format!(
                "{} cannot extract its payload from {}",
                self.name,
                event.callback_name()
            )));
        };
        (self.handler)(payload)
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

impl CallbackDispatcher {
    /// Registers a typed listener for a script callback.
    ///
    /// The closure receives the concrete payload type it names; `T` may be a
    /// payload struct or [`ScriptEvent`] itself for listeners that want the
    /// whole union. Listeners run in registration order. Registration is not
    /// idempotent: registering the same closure twice means it runs twice per
    /// dispatch.
    ///
    /// # Arguments
    ///
    /// * `owner` - Listener id the registration is swept under on unregister
    /// * `callback_name` - Name of the script callback (see [`crate::names`])
    /// * `handler` - Closure invoked with the decoded payload
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use pitwall_callbacks::*;
    /// # async fn example(dispatcher: &CallbackDispatcher, owner: ListenerId) -> Result<(), CallbackError> {
    /// dispatcher
    ///     .on_script(owner, names::ON_HIT, |event: WeaponContactEvent| {
    ///         println!("{} hit {}", event.shooter, event.victim);
    ///         Ok(())
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn on_script<T, F>(
        &self,
        owner: ListenerId,
        callback_name: &str,
        handler: F,
    ) -> Result<(), CallbackError>
    where
        T: ScriptCallback,
        F: Fn(T) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        let handler_name = format!("{}::{}", callback_name, std::any::type_name::<T>());
        let typed_handler = TypedCallbackHandler::new(handler_name, handler);
        self.register(owner, callback_name, Arc::new(typed_handler))
            .await
    }

    /// Registers a pre-built handler for a script callback.
    ///
    /// Lower-level companion to [`on_script`](Self::on_script) for callers
    /// that implement [`CallbackHandler`] themselves.
    pub async fn register(
        &self,
        owner: ListenerId,
        callback_name: &str,
        handler: Arc<dyn CallbackHandler>,
    ) -> Result<(), CallbackError> {
        let mut listeners = self.listeners.write().await;
        listeners
            .entry(callback_name.to_string())
            .or_insert_with(Vec::new)
            .push(ListenerEntry { owner, handler });
        drop(listeners);

        let mut stats = self.stats.write().await;
        stats.total_listeners += 1;

        info!("📝 Registered listener for {}", callback_name);
        Ok(())
    }
}
