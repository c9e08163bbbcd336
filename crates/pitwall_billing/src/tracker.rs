//! Pending-bill tracking and resolution.

use crate::context::{ChatSink, PlayerDirectory, SettingsStore, StatisticsSink};
use parking_lot::Mutex;
use pitwall_callbacks::{current_timestamp, BillId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Statistic name donations to the server aggregate under.
pub const STAT_PLAYER_DONATIONS: &str = "Donated Planets";
/// Settings key of the public server-donation announcement toggle.
pub const SETTING_ANNOUNCE_SERVER_DONATION: &str = "Enable Server-Donation Announcements";

/// Host bill state codes, as carried in `BillUpdated` callbacks.
///
/// Codes 1-3 are intermediate and leave the bill open; 4-6 are terminal.
/// The host spells the paid state name "Payed" on the wire.
pub mod state_code {
    pub const CREATING_TRANSACTION: i32 = 1;
    pub const ISSUED: i32 = 2;
    pub const VALIDATING_PAYMENT: i32 = 3;
    pub const PAID: i32 = 4;
    pub const REFUSED: i32 = 5;
    pub const ERRORED: i32 = 6;
}

/// Direction of a tracked bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillDirection {
    /// A player pays planets, to another player or to the server account
    Donation,
    /// The server account pays planets out to a player
    Payout,
}

/// Result of a [`BillTracker::resolve`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillOutcome {
    /// The bill reached a terminal state and was removed from the tracker
    Settled,
    /// The update carried an intermediate state; the bill stays tracked
    StillOpen,
    /// No bill with that id is tracked; the update was ignored
    Unknown,
}

/// Errors surfaced by the bill tracker.
#[derive(Debug, thiserror::Error)]
pub enum BillError {
    /// An `open` call reused an identifier that is still tracked
    #[error("bill {0} is already being tracked")]
    DuplicateBill(BillId),
}

/// A bill the controller issued and the host has not yet settled.
#[derive(Debug, Clone)]
struct PendingBill {
    direction: BillDirection,
    initiator: String,
    /// Receiving login; empty means the server account
    counterparty: String,
    amount: u64,
    opened_at: u64,
}

/// Correlates host-issued bill identifiers with their originating requests.
///
/// Components that issue payment requests call [`open`](Self::open) with the
/// fresh [`BillId`] the host returned; the `BillUpdated` listener feeds status
/// updates into [`resolve`](Self::resolve). Exactly one terminal update settles
/// a bill, after which its identifier is forgotten and later updates for it are
/// ignored.
///
/// The tracker owns its bill table exclusively and guards it with a mutex, so
/// `open` and `resolve` appear atomic with respect to each other even when the
/// issuing component and the callback listener live on different tasks.
pub struct BillTracker {
    open_bills: Mutex<HashMap<BillId, PendingBill>>,
    players: Arc<dyn PlayerDirectory>,
    chat: Arc<dyn ChatSink>,
    statistics: Arc<dyn StatisticsSink>,
    settings: Arc<dyn SettingsStore>,
    server_id: u32,
}

impl std::fmt::Debug for BillTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillTracker")
            .field("open_bills", &self.open_bills.lock().len())
            .field("server_id", &self.server_id)
            .finish()
    }
}

impl BillTracker {
    /// Creates a tracker wired to its collaborators.
    ///
    /// `server_id` scopes the donation statistic records.
    pub fn new(
        players: Arc<dyn PlayerDirectory>,
        chat: Arc<dyn ChatSink>,
        statistics: Arc<dyn StatisticsSink>,
        settings: Arc<dyn SettingsStore>,
        server_id: u32,
    ) -> Self {
        Self {
            open_bills: Mutex::new(HashMap::new()),
            players,
            chat,
            statistics,
            settings,
            server_id,
        }
    }

    /// Starts tracking a freshly issued bill.
    ///
    /// The host guarantees identifier freshness while a bill is outstanding, so
    /// a duplicate id means the controller and the host have desynchronized.
    /// That case is logged loudly and rejected; the existing entry is left
    /// untouched so the in-flight transaction can still settle.
    pub fn open(
        &self,
        bill_id: BillId,
        direction: BillDirection,
        initiator: &str,
        counterparty: &str,
        amount: u64,
    ) -> Result<(), BillError> {
        let mut bills = self.open_bills.lock();
        if bills.contains_key(&bill_id) {
            error!(
                "❌ Bill {} opened twice - controller and host are out of sync",
                bill_id
            );
            return Err(BillError::DuplicateBill(bill_id));
        }

        debug!(
            "Tracking {:?} bill {} over {} planets from '{}'",
            direction, bill_id, amount, initiator
        );
        bills.insert(
            bill_id,
            PendingBill {
                direction,
                initiator: initiator.to_string(),
                counterparty: counterparty.to_string(),
                amount,
                opened_at: current_timestamp(),
            },
        );
        Ok(())
    }

    /// Applies a status update to a tracked bill.
    ///
    /// Unknown identifiers are ignored - the update may belong to a bill some
    /// other tool issued, or duplicate a terminal update already applied.
    /// Intermediate state codes (and any code this controller does not know)
    /// leave the bill open; the host emits states not relevant to final
    /// accounting. For [`state_code::ERRORED`] the host's `detail` text is
    /// forwarded to the initiator verbatim.
    pub fn resolve(&self, bill_id: BillId, state: i32, detail: &str) -> BillOutcome {
        let mut bills = self.open_bills.lock();
        if !bills.contains_key(&bill_id) {
            debug!("Ignoring update for unknown bill {}", bill_id);
            return BillOutcome::Unknown;
        }

        match state {
            state_code::PAID => {
                if let Some(bill) = bills.remove(&bill_id) {
                    self.settle_paid(&bill);
                }
                BillOutcome::Settled
            }
            state_code::REFUSED => {
                if let Some(bill) = bills.remove(&bill_id) {
                    self.chat.send_error("Transaction cancelled.", &bill.initiator);
                }
                BillOutcome::Settled
            }
            state_code::ERRORED => {
                if let Some(bill) = bills.remove(&bill_id) {
                    self.chat.send_error(detail, &bill.initiator);
                }
                BillOutcome::Settled
            }
            other => {
                debug!("Bill {} still open (state {})", bill_id, other);
                BillOutcome::StillOpen
            }
        }
    }

    fn settle_paid(&self, bill: &PendingBill) {
        match bill.direction {
            BillDirection::Donation => {
                if !bill.counterparty.is_empty() {
                    let message = format!(
                        "Successfully donated {} to '{}'!",
                        bill.amount, bill.counterparty
                    );
                    self.chat.send_success(&message, &bill.initiator);
                    return;
                }

                // Donation to the server account.
                self.chat
                    .send_success("Donation successful! Thanks.", &bill.initiator);

                let player = self.players.player_by_login(&bill.initiator);
                if self
                    .settings
                    .bool_setting(SETTING_ANNOUNCE_SERVER_DONATION, true)
                {
                    let display = player
                        .as_ref()
                        .map(|player| player.nickname.as_str())
                        .unwrap_or(bill.initiator.as_str());
                    self.chat.broadcast_success(&format!(
                        "{} donated {} Planets! Thanks.",
                        display, bill.amount
                    ));
                }

                match player {
                    Some(player) => self.statistics.record(
                        STAT_PLAYER_DONATIONS,
                        &player,
                        self.server_id,
                        bill.amount as i64,
                    ),
                    None => warn!(
                        "Donation from '{}' settled but the login is gone; statistic skipped",
                        bill.initiator
                    ),
                }
            }
            BillDirection::Payout => {
                let message = format!(
                    "Successfully payed out {} to '{}'!",
                    bill.amount, bill.counterparty
                );
                self.chat.send_success(&message, &bill.initiator);
            }
        }
    }

    /// Removes bills that have been open for at least `max_age_secs`.
    ///
    /// The host never expires bills on its own, so a bill it silently drops
    /// would otherwise stay tracked forever. Deployments that care call this
    /// periodically; swept initiators are told their transaction timed out.
    /// Returns the swept identifiers.
    pub fn sweep(&self, max_age_secs: u64) -> Vec<BillId> {
        let now = current_timestamp();
        let mut bills = self.open_bills.lock();
        let mut swept = Vec::new();

        bills.retain(|bill_id, bill| {
            let age = now.saturating_sub(bill.opened_at);
            if age >= max_age_secs {
                warn!(
                    "⚠️ Sweeping bill {} after {}s without a terminal update",
                    bill_id, age
                );
                self.chat.send_error("Transaction timed out.", &bill.initiator);
                swept.push(*bill_id);
                false
            } else {
                true
            }
        });

        swept
    }

    /// Returns the number of currently tracked bills.
    pub fn open_count(&self) -> usize {
        self.open_bills.lock().len()
    }

    /// Checks whether a bill id is currently tracked.
    pub fn contains(&self, bill_id: BillId) -> bool {
        self.open_bills.lock().contains_key(&bill_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MemorySettings, Player};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct RecordingChat {
        messages: Mutex<Vec<(&'static str, String, String)>>,
        broadcasts: Mutex<Vec<String>>,
    }

    impl RecordingChat {
        fn sent(&self) -> Vec<(&'static str, String, String)> {
            self.messages.lock().clone()
        }

        fn broadcast(&self) -> Vec<String> {
            self.broadcasts.lock().clone()
        }
    }

    impl ChatSink for RecordingChat {
        fn send_success(&self, message: &str, login: &str) {
            self.messages
                .lock()
                .push(("success", message.to_string(), login.to_string()));
        }

        fn send_error(&self, message: &str, login: &str) {
            self.messages
                .lock()
                .push(("error", message.to_string(), login.to_string()));
        }

        fn send_information(&self, message: &str, login: &str) {
            self.messages
                .lock()
                .push(("information", message.to_string(), login.to_string()));
        }

        fn broadcast_success(&self, message: &str) {
            self.broadcasts.lock().push(message.to_string());
        }
    }

    #[derive(Debug, Default)]
    struct RecordingStats {
        records: Mutex<Vec<(String, String, u32, i64)>>,
    }

    impl RecordingStats {
        fn recorded(&self) -> Vec<(String, String, u32, i64)> {
            self.records.lock().clone()
        }
    }

    impl StatisticsSink for RecordingStats {
        fn define_stat(&self, _name: &str) {}

        fn record(&self, name: &str, player: &Player, server_id: u32, amount: i64) {
            self.records.lock().push((
                name.to_string(),
                player.login.clone(),
                server_id,
                amount,
            ));
        }
    }

    #[derive(Debug, Default)]
    struct MapDirectory {
        players: HashMap<String, Player>,
    }

    impl MapDirectory {
        fn with(players: &[(&str, &str)]) -> Self {
            Self {
                players: players
                    .iter()
                    .map(|(login, nickname)| {
                        ((*login).to_string(), Player::new(*login, *nickname))
                    })
                    .collect(),
            }
        }
    }

    impl PlayerDirectory for MapDirectory {
        fn player_by_login(&self, login: &str) -> Option<Player> {
            self.players.get(login).cloned()
        }
    }

    struct Fixture {
        tracker: BillTracker,
        chat: Arc<RecordingChat>,
        statistics: Arc<RecordingStats>,
        settings: Arc<MemorySettings>,
    }

    fn fixture(players: &[(&str, &str)]) -> Fixture {
        let chat = Arc::new(RecordingChat::default());
        let statistics = Arc::new(RecordingStats::default());
        let settings = Arc::new(MemorySettings::new());
        let tracker = BillTracker::new(
            Arc::new(MapDirectory::with(players)),
            chat.clone(),
            statistics.clone(),
            settings.clone(),
            7,
        );
        Fixture {
            tracker,
            chat,
            statistics,
            settings,
        }
    }

    #[test]
    fn paid_donation_to_player_notifies_without_statistics() {
        let fx = fixture(&[("alice", "Alice")]);
        fx.tracker
            .open(BillId(1), BillDirection::Donation, "alice", "bob", 100)
            .expect("open failed");

        let outcome = fx.tracker.resolve(BillId(1), state_code::PAID, "Payed");
        assert_eq!(outcome, BillOutcome::Settled);

        let sent = fx.chat.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "success");
        assert!(sent[0].1.contains("donated 100 to 'bob'"));
        assert_eq!(sent[0].2, "alice");
        assert!(fx.statistics.recorded().is_empty());
        assert!(!fx.tracker.contains(BillId(1)));
    }

    #[test]
    fn paid_server_donation_records_one_statistic_and_settles_once() {
        let fx = fixture(&[("alice", "Alice")]);
        fx.tracker
            .open(BillId(2), BillDirection::Donation, "alice", "", 100)
            .expect("open failed");

        assert_eq!(
            fx.tracker.resolve(BillId(2), state_code::PAID, "Payed"),
            BillOutcome::Settled
        );
        assert_eq!(
            fx.statistics.recorded(),
            vec![(STAT_PLAYER_DONATIONS.to_string(), "alice".to_string(), 7, 100)]
        );
        assert!(!fx.tracker.contains(BillId(2)));

        // Announcement toggle defaults to on and uses the nickname.
        assert_eq!(fx.chat.broadcast().len(), 1);
        assert!(fx.chat.broadcast()[0].contains("Alice donated 100 Planets"));

        // A second terminal update for the same id is a no-op.
        assert_eq!(
            fx.tracker.resolve(BillId(2), state_code::PAID, "Payed"),
            BillOutcome::Unknown
        );
        assert_eq!(fx.statistics.recorded().len(), 1);
    }

    #[test]
    fn server_donation_announcement_respects_toggle() {
        let fx = fixture(&[("alice", "Alice")]);
        fx.settings.set_bool(SETTING_ANNOUNCE_SERVER_DONATION, false);
        fx.tracker
            .open(BillId(3), BillDirection::Donation, "alice", "", 50)
            .expect("open failed");

        fx.tracker.resolve(BillId(3), state_code::PAID, "Payed");

        assert!(fx.chat.broadcast().is_empty());
        // The initiator is still thanked privately.
        assert_eq!(fx.chat.sent().len(), 1);
        assert_eq!(fx.statistics.recorded().len(), 1);
    }

    #[test]
    fn departed_initiator_skips_statistic_but_still_settles() {
        let fx = fixture(&[]);
        fx.tracker
            .open(BillId(4), BillDirection::Donation, "ghost", "", 25)
            .expect("open failed");

        assert_eq!(
            fx.tracker.resolve(BillId(4), state_code::PAID, "Payed"),
            BillOutcome::Settled
        );
        assert!(fx.statistics.recorded().is_empty());
        // Login is used for the announcement when the nickname is gone.
        assert!(fx.chat.broadcast()[0].contains("ghost donated 25 Planets"));
    }

    #[test]
    fn unknown_bill_is_ignored() {
        let fx = fixture(&[]);
        assert_eq!(
            fx.tracker.resolve(BillId(99), state_code::PAID, "Payed"),
            BillOutcome::Unknown
        );
        assert!(fx.chat.sent().is_empty());
    }

    #[test]
    fn refused_payout_cancels_and_removes() {
        let fx = fixture(&[("admin", "Admin")]);
        fx.tracker
            .open(BillId(5), BillDirection::Payout, "admin", "bob", 500)
            .expect("open failed");

        assert_eq!(
            fx.tracker.resolve(BillId(5), state_code::REFUSED, "Refused"),
            BillOutcome::Settled
        );

        let sent = fx.chat.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "error");
        assert_eq!(sent[0].1, "Transaction cancelled.");
        assert_eq!(sent[0].2, "admin");
        assert!(!fx.tracker.contains(BillId(5)));
    }

    #[test]
    fn errored_payout_forwards_host_detail() {
        let fx = fixture(&[("alice", "Alice")]);
        fx.tracker
            .open(BillId(6), BillDirection::Payout, "alice", "bob", 50)
            .expect("open failed");

        assert_eq!(
            fx.tracker
                .resolve(BillId(6), state_code::ERRORED, "insufficient funds"),
            BillOutcome::Settled
        );

        let sent = fx.chat.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "error");
        assert!(sent[0].1.contains("insufficient funds"));
        assert_eq!(sent[0].2, "alice");
        assert!(!fx.tracker.contains(BillId(6)));
    }

    #[test]
    fn paid_payout_notifies_initiator() {
        let fx = fixture(&[("admin", "Admin")]);
        fx.tracker
            .open(BillId(7), BillDirection::Payout, "admin", "bob", 500)
            .expect("open failed");

        fx.tracker.resolve(BillId(7), state_code::PAID, "Payed");

        let sent = fx.chat.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "success");
        assert!(sent[0].1.contains("payed out 500 to 'bob'"));
        assert!(fx.statistics.recorded().is_empty());
    }

    #[test]
    fn intermediate_states_leave_the_bill_open() {
        let fx = fixture(&[("alice", "Alice")]);
        fx.tracker
            .open(BillId(8), BillDirection::Donation, "alice", "", 100)
            .expect("open failed");

        for state in [
            state_code::CREATING_TRANSACTION,
            state_code::ISSUED,
            state_code::VALIDATING_PAYMENT,
            42,
        ] {
            assert_eq!(
                fx.tracker.resolve(BillId(8), state, ""),
                BillOutcome::StillOpen
            );
        }
        assert!(fx.tracker.contains(BillId(8)));
        assert!(fx.chat.sent().is_empty());

        // Still settles normally afterwards.
        assert_eq!(
            fx.tracker.resolve(BillId(8), state_code::PAID, "Payed"),
            BillOutcome::Settled
        );
    }

    #[test]
    fn duplicate_open_is_rejected_loudly() {
        let fx = fixture(&[]);
        fx.tracker
            .open(BillId(9), BillDirection::Donation, "alice", "", 10)
            .expect("open failed");

        let err = fx
            .tracker
            .open(BillId(9), BillDirection::Payout, "bob", "", 20)
            .expect_err("duplicate open must fail");
        assert!(matches!(err, BillError::DuplicateBill(BillId(9))));

        // The first entry survives and settles with its own data.
        fx.tracker.resolve(BillId(9), state_code::PAID, "Payed");
        let sent = fx.chat.sent();
        assert_eq!(sent[0].2, "alice");
    }

    #[test]
    fn sweep_expires_stale_bills_only() {
        let fx = fixture(&[]);
        fx.tracker
            .open(BillId(10), BillDirection::Donation, "alice", "", 10)
            .expect("open failed");
        fx.tracker
            .open(BillId(11), BillDirection::Payout, "bob", "carol", 10)
            .expect("open failed");

        // Nothing is an hour old yet.
        assert!(fx.tracker.sweep(3600).is_empty());
        assert_eq!(fx.tracker.open_count(), 2);

        // Age zero sweeps everything still tracked.
        let mut swept = fx.tracker.sweep(0);
        swept.sort_by_key(|bill_id| bill_id.0);
        assert_eq!(swept, vec![BillId(10), BillId(11)]);
        assert_eq!(fx.tracker.open_count(), 0);

        let timeouts: Vec<_> = fx
            .chat
            .sent()
            .into_iter()
            .filter(|(kind, message, _)| *kind == "error" && message.contains("timed out"))
            .collect();
        assert_eq!(timeouts.len(), 2);
    }
}
