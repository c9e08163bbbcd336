/// Callback dispatch module - broken down into manageable components
mod core;
mod emitters;
mod handlers;
mod management;
mod stats;

// Re-export all public items from submodules
pub use self::core::CallbackDispatcher;
pub use self::handlers::{CallbackHandler, TypedCallbackHandler};
pub use self::stats::DispatcherStats;
