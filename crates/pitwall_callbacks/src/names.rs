//! Script callback name constants.
//!
//! Names are the host's wire identifiers for pushed script callbacks and are
//! stable for the lifetime of the server process. They key the dispatcher's
//! listener table and select the payload decoder in [`crate::decode`].

/// Shot fired by a player.
pub const ON_SHOOT: &str = "OnShoot";
/// Shot connected with a victim.
pub const ON_HIT: &str = "OnHit";
/// Shot barely missed a victim.
pub const ON_NEAR_MISS: &str = "OnNearMiss";
/// Victim lost their last armor point.
pub const ON_ARMOR_EMPTY: &str = "OnArmorEmpty";
/// Landmark captured by one or more players.
pub const ON_CAPTURE: &str = "OnCapture";

/// Time-attack checkpoint crossed.
pub const TIME_ATTACK_ON_CHECKPOINT: &str = "TimeAttack_OnCheckpoint";
/// Time-attack run finished.
pub const TIME_ATTACK_ON_FINISH: &str = "TimeAttack_OnFinish";

/// Warm-up phase started or ended.
pub const WARM_UP_STATUS: &str = "WarmUp_Status";
/// Player flagged away-from-keyboard by the AFK library.
pub const AFK_STATUS: &str = "LibAFK_IsAFK";

/// Chat line sent by a player (commands included).
pub const PLAYER_CHAT: &str = "PlayerChat";
/// Asynchronous payment transaction changed state.
pub const BILL_UPDATED: &str = "BillUpdated";
