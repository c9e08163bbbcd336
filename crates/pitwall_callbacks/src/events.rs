//! Typed script events.
//!
//! Each supported callback name decodes into one variant of [`ScriptEvent`].
//! Payload structs are immutable once constructed and are not retained after a
//! broadcast completes. Several callback names share a payload shape (hit,
//! near-miss and armor-empty all carry a [`WeaponContactEvent`]; checkpoint and
//! finish both carry a [`RecordEvent`]), so the extraction trait
//! [`ScriptCallback`] matches on shape rather than on a single variant.

use crate::{names, BillId};
use serde::{Deserialize, Serialize};

// ============================================================================
// Payload Structs
// ============================================================================

/// Weapon carried in shot-related callbacks.
///
/// Ids outside the known table are preserved as [`Weapon::Other`] so that new
/// game-mode weapons pass through the dispatch layer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weapon {
    Laser,
    Rocket,
    Nucleus,
    Arrow,
    Other(i64),
}

impl Weapon {
    /// Maps a host weapon id to its variant.
    pub fn from_id(id: i64) -> Self {
        match id {
            1 => Weapon::Laser,
            2 => Weapon::Rocket,
            3 => Weapon::Nucleus,
            5 => Weapon::Arrow,
            other => Weapon::Other(other),
        }
    }

    /// Returns the host wire id for this weapon.
    pub fn id(self) -> i64 {
        match self {
            Weapon::Laser => 1,
            Weapon::Rocket => 2,
            Weapon::Nucleus => 3,
            Weapon::Arrow => 5,
            Weapon::Other(id) => id,
        }
    }
}

/// A player fired a shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShootEvent {
    /// Login of the shooting player
    pub shooter: String,
    /// Weapon the shot was fired with
    pub weapon: Weapon,
}

/// A shot interacted with a victim.
///
/// Carried by `OnHit`, `OnNearMiss` and `OnArmorEmpty` alike; the callback name
/// a listener registered for tells the three cases apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponContactEvent {
    /// Login of the shooting player
    pub shooter: String,
    /// Login of the player the shot was aimed at
    pub victim: String,
    /// Weapon the shot was fired with
    pub weapon: Weapon,
}

/// One or more players captured a landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureEvent {
    /// Map tag of the captured landmark
    pub landmark: String,
    /// Logins of the capturing players
    pub players: Vec<String>,
}

/// A timed record was set at a checkpoint or at the finish line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEvent {
    /// Login of the player that set the time
    pub login: String,
    /// Race time in milliseconds
    pub time_ms: i64,
}

/// Warm-up phase started or ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmUpStatusEvent {
    /// Whether warm-up is currently active
    pub active: bool,
}

/// A player was flagged away-from-keyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfkStatusEvent {
    /// Login of the idle player
    pub login: String,
}

/// A player sent a chat line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerChatEvent {
    /// Server-side uid of the sender
    pub player_uid: i64,
    /// Login of the sender
    pub login: String,
    /// The chat text as typed, including any leading command slash
    pub text: String,
    /// Whether the server recognized the line as a registered command
    pub is_command: bool,
}

/// An asynchronous payment transaction changed state.
///
/// `state_code` follows the host's bill state table: 1 creating, 2 issued,
/// 3 validating, 4 paid, 5 refused, 6 error. For state 6 the host puts its
/// error description into `state_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillUpdatedEvent {
    /// Identifier of the transaction this update belongs to
    pub bill_id: BillId,
    /// Current state code of the transaction
    pub state_code: i32,
    /// Human-readable state name, or the error detail for state 6
    pub state_name: String,
    /// Host-side ledger transaction id, 0 until the bill is paid
    pub transaction_id: u32,
}

// ============================================================================
// Event Union
// ============================================================================

/// A decoded script event, one variant per supported callback name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptEvent {
    Shoot(ShootEvent),
    Hit(WeaponContactEvent),
    NearMiss(WeaponContactEvent),
    ArmorEmpty(WeaponContactEvent),
    Capture(CaptureEvent),
    Checkpoint(RecordEvent),
    Finish(RecordEvent),
    WarmUpStatus(WarmUpStatusEvent),
    AfkStatus(AfkStatusEvent),
    PlayerChat(PlayerChatEvent),
    BillUpdated(BillUpdatedEvent),
}

impl ScriptEvent {
    /// Returns the callback name this event was decoded from.
    pub fn callback_name(&self) -> &'static str {
        match self {
            ScriptEvent::Shoot(_) => names::ON_SHOOT,
            ScriptEvent::Hit(_) => names::ON_HIT,
            ScriptEvent::NearMiss(_) => names::ON_NEAR_MISS,
            ScriptEvent::ArmorEmpty(_) => names::ON_ARMOR_EMPTY,
            ScriptEvent::Capture(_) => names::ON_CAPTURE,
            ScriptEvent::Checkpoint(_) => names::TIME_ATTACK_ON_CHECKPOINT,
            ScriptEvent::Finish(_) => names::TIME_ATTACK_ON_FINISH,
            ScriptEvent::WarmUpStatus(_) => names::WARM_UP_STATUS,
            ScriptEvent::AfkStatus(_) => names::AFK_STATUS,
            ScriptEvent::PlayerChat(_) => names::PLAYER_CHAT,
            ScriptEvent::BillUpdated(_) => names::BILL_UPDATED,
        }
    }
}

// ============================================================================
// Typed Extraction
// ============================================================================

/// Extraction trait for typed listener callbacks.
///
/// Implemented by every payload struct (and by [`ScriptEvent`] itself, for
/// listeners that want the whole union). [`CallbackDispatcher::on_script`]
/// uses it to hand each listener the concrete payload type it asked for.
///
/// [`CallbackDispatcher::on_script`]: crate::CallbackDispatcher::on_script
pub trait ScriptCallback: Clone + Send + Sync + std::fmt::Debug + 'static {
    /// Extracts this payload type from a decoded event, if the variant matches.
    fn from_event(event: &ScriptEvent) -> Option<Self>
    where
        Self: Sized;
}

impl ScriptCallback for ScriptEvent {
    fn from_event(event: &ScriptEvent) -> Option<Self> {
        Some(event.clone())
    }
}

impl ScriptCallback for ShootEvent {
    fn from_event(event: &ScriptEvent) -> Option<Self> {
        match event {
            ScriptEvent::Shoot(payload) => Some(payload.clone()),
            _ => None,
        }
    }
}

impl ScriptCallback for WeaponContactEvent {
    fn from_event(event: &ScriptEvent) -> Option<Self> {
        match event {
            ScriptEvent::Hit(payload)
            | ScriptEvent::NearMiss(payload)
            | ScriptEvent::ArmorEmpty(payload) => Some(payload.clone()),
            _ => None,
        }
    }
}

impl ScriptCallback for CaptureEvent {
    fn from_event(event: &ScriptEvent) -> Option<Self> {
        match event {
            ScriptEvent::Capture(payload) => Some(payload.clone()),
            _ => None,
        }
    }
}

impl ScriptCallback for RecordEvent {
    fn from_event(event: &ScriptEvent) -> Option<Self> {
        match event {
            ScriptEvent::Checkpoint(payload) | ScriptEvent::Finish(payload) => {
                Some(payload.clone())
            }
            _ => None,
        }
    }
}

impl ScriptCallback for WarmUpStatusEvent {
    fn from_event(event: &ScriptEvent) -> Option<Self> {
        match event {
            ScriptEvent::WarmUpStatus(payload) => Some(*payload),
            _ => None,
        }
    }
}

impl ScriptCallback for AfkStatusEvent {
    fn from_event(event: &ScriptEvent) -> Option<Self> {
        match event {
            ScriptEvent::AfkStatus(payload) => Some(payload.clone()),
            _ => None,
        }
    }
}

impl ScriptCallback for PlayerChatEvent {
    fn from_event(event: &ScriptEvent) -> Option<Self> {
        match event {
            ScriptEvent::PlayerChat(payload) => Some(payload.clone()),
            _ => None,
        }
    }
}

impl ScriptCallback for BillUpdatedEvent {
    fn from_event(event: &ScriptEvent) -> Option<Self> {
        match event {
            ScriptEvent::BillUpdated(payload) => Some(payload.clone()),
            _ => None,
        }
    }
}
