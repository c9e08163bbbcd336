//! # Pitwall Callback System
//!
//! Script callback dispatch core for the pitwall server controller. The dedicated
//! server pushes script callbacks as `(name, payload)` pairs where the payload is an
//! ordered array of loosely typed values; this crate turns that stream into typed
//! events and routes them to registered listeners.
//!
//! ## Core Features
//!
//! - **Typed events**: every supported callback decodes into a variant of
//!   [`ScriptEvent`] exactly once, at the dispatch boundary
//! - **Cheap drop path**: callbacks nobody listens for are dropped before any
//!   payload decoding happens
//! - **Ordered broadcast**: listeners run in registration order, synchronously
//! - **Failure isolation**: a failing listener is logged and never prevents the
//!   remaining listeners from running
//! - **Owner-scoped cleanup**: one [`unregister`](CallbackDispatcher::unregister)
//!   call removes a plugin's listeners across every callback name
//!
//! ## Quick Start Example
//!
//! ```rust,no_run
//! use pitwall_callbacks::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = create_callback_dispatcher();
//!     let owner = ListenerId::new();
//!
//!     dispatcher
//!         .on_script(owner, names::TIME_ATTACK_ON_FINISH, |event: RecordEvent| {
//!             println!("{} finished in {}ms", event.login, event.time_ms);
//!             Ok(())
//!         })
//!         .await?;
//!
//!     // Raw payloads arrive from the server connection layer.
//!     let payload = vec![serde_json::json!("kremsy"), serde_json::json!(48_230)];
//!     dispatcher.dispatch(names::TIME_ATTACK_ON_FINISH, &payload).await?;
//!
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod decode;
mod dispatcher;
pub mod events;
pub mod names;
mod utils;


pub use decode::{decode_callback, DecodeError};
pub use dispatcher::{
    CallbackDispatcher, CallbackHandler, DispatcherStats, TypedCallbackHandler,
};
pub use events::{
    AfkStatusEvent, BillUpdatedEvent, CaptureEvent, PlayerChatEvent, RecordEvent,
    ScriptCallback, ScriptEvent, ShootEvent, WarmUpStatusEvent, Weapon, WeaponContactEvent,
};
pub use utils::current_timestamp;

use std::sync::Arc;

// ============================================================================
// Identifier Types
// ============================================================================

/// Identity of a listener owner, typically one per plugin.
///
/// Every registration is tagged with the owner's `ListenerId` so that a single
/// [`CallbackDispatcher::unregister`] call can sweep all of an owner's listeners
/// when it unloads.
///
/// # Examples
///
/// ```rust
/// use pitwall_callbacks::ListenerId;
///
/// let owner = ListenerId::new();
/// println!("Listener: {}", owner.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub Uuid);

impl ListenerId {
    /// Creates a new random listener ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-issued identifier of an asynchronous payment transaction ("bill").
///
/// Allocated by the dedicated server when an outbound payment request is created
/// and carried back in every [`BillUpdatedEvent`] for that transaction. Unique
/// while the bill is outstanding; the host may reuse an identifier after the
/// bill reaches a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillId(pub u32);

impl std::fmt::Display for BillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during callback dispatch operations.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// Raw payload could not be decoded into the typed event for its name
    #[error("payload decode error: {0}")]
    Decode(#[from] DecodeError),
    /// Listener callback reported a failure while handling an event
    #[error("handler execution error: {0}")]
    HandlerExecution(String),
}

// ============================================================================
// Factory
// ============================================================================

/// Creates a new callback dispatcher instance.
///
/// Returns an `Arc<CallbackDispatcher>` that can be shared between the server
/// connection layer (which feeds [`dispatch`](CallbackDispatcher::dispatch))
/// and every plugin that registers listeners.
pub fn create_callback_dispatcher() -> Arc<CallbackDispatcher> {
    Arc::new(CallbackDispatcher::new())
}
