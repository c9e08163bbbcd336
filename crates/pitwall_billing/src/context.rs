//! Collaborator interfaces consumed by the billing layer.
//!
//! The tracker and the plugins built on it never reach through a shared
//! controller hub; they receive these narrow traits at construction. Chat,
//! statistics and settings calls are fire-and-forget: the billing layer does
//! not await, retry or observe their outcome, so the signatures are synchronous
//! and infallible - a collaborator that fails handles its own failure. The one
//! fallible interface is [`PlanetsClient`], because issuing a payment request
//! must hand back the host-allocated bill id.

use parking_lot::Mutex;
use pitwall_callbacks::BillId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A connected (or recently seen) player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Stable account login
    pub login: String,
    /// Display nickname, as shown in chat
    pub nickname: String,
}

impl Player {
    pub fn new(login: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            nickname: nickname.into(),
        }
    }
}

/// Lookup of players by login.
pub trait PlayerDirectory: Send + Sync {
    /// Returns the player for `login`, or `None` if the login is unknown.
    fn player_by_login(&self, login: &str) -> Option<Player>;
}

/// Outbound chat notifications.
pub trait ChatSink: Send + Sync {
    /// Sends a success-styled message to one player.
    fn send_success(&self, message: &str, login: &str);
    /// Sends an error-styled message to one player.
    fn send_error(&self, message: &str, login: &str);
    /// Sends a plain informational message to one player.
    fn send_information(&self, message: &str, login: &str);
    /// Sends a success-styled message to every connected player.
    fn broadcast_success(&self, message: &str);
}

/// Player statistics recording.
pub trait StatisticsSink: Send + Sync {
    /// Declares a statistic name so later records aggregate under it.
    fn define_stat(&self, name: &str);
    /// Records one statistic value for a player, scoped by server id.
    fn record(&self, name: &str, player: &Player, server_id: u32, amount: i64);
}

/// Read access to the controller's settings store.
pub trait SettingsStore: Send + Sync {
    /// Returns the boolean setting for `key`, or `default` when unset.
    fn bool_setting(&self, key: &str, default: bool) -> bool;
    /// Returns the string setting for `key`, if set.
    fn string_setting(&self, key: &str) -> Option<String>;
}

/// Outbound payment requests against the dedicated server.
///
/// Every successful issuance returns the host-allocated [`BillId`] that later
/// `BillUpdated` callbacks will reference.
pub trait PlanetsClient: Send + Sync {
    /// Asks `from_login` to pay `amount` planets, optionally to another player.
    ///
    /// An empty `to_login` directs the donation to the server account. The
    /// player confirms or refuses the request in-game; `message` is shown in
    /// that confirmation dialog.
    fn send_bill(
        &self,
        from_login: &str,
        amount: u64,
        message: &str,
        to_login: &str,
    ) -> Result<BillId, ClientError>;

    /// Pays `amount` planets from the server account to `to_login`.
    fn pay(&self, to_login: &str, amount: u64, message: &str) -> Result<BillId, ClientError>;

    /// Returns the server account's current planets balance.
    fn server_planets(&self) -> Result<u64, ClientError>;

    /// Returns the server's display name.
    fn server_name(&self) -> String;

    /// Returns the server's numeric id, used to scope statistics.
    fn server_id(&self) -> u32;
}

/// Errors surfaced by [`PlanetsClient`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The dedicated server rejected the request
    #[error("request rejected by server: {0}")]
    Rejected(String),
    /// The request never reached the dedicated server
    #[error("transport error: {0}")]
    Transport(String),
}

/// In-memory [`SettingsStore`] backing tests and standalone deployments.
#[derive(Debug, Default)]
pub struct MemorySettings {
    bools: Mutex<HashMap<String, bool>>,
    strings: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a boolean setting.
    pub fn set_bool(&self, key: impl Into<String>, value: bool) {
        self.bools.lock().insert(key.into(), value);
    }

    /// Sets a string setting.
    pub fn set_string(&self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.lock().insert(key.into(), value.into());
    }
}

impl SettingsStore for MemorySettings {
    fn bool_setting(&self, key: &str, default: bool) -> bool {
        self.bools.lock().get(key).copied().unwrap_or(default)
    }

    fn string_setting(&self, key: &str) -> Option<String> {
        self.strings.lock().get(key).cloned()
    }
}
