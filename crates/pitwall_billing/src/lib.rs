//! # Pitwall Billing
//!
//! Pending-bill tracking for the pitwall server controller. Donations and
//! payouts run through the host's asynchronous "bill" machinery: the controller
//! issues a payment request, the host answers with a fresh [`BillId`], and an
//! unbounded time later a `BillUpdated` callback reports the outcome. This
//! crate owns the correlation between the two ends.
//!
//! The [`BillTracker`] is deliberately narrow: it receives exactly the
//! collaborator interfaces it needs at construction ([`PlayerDirectory`],
//! [`ChatSink`], [`StatisticsSink`], [`SettingsStore`]) and owns its open-bill
//! table exclusively - no other component reads or mutates pending bills.
//!
//! [`BillId`]: pitwall_callbacks::BillId

mod context;
mod tracker;

pub use context::{
    ChatSink, ClientError, MemorySettings, PlanetsClient, Player, PlayerDirectory, SettingsStore,
    StatisticsSink,
};
pub use tracker::{
    state_code, BillDirection, BillError, BillOutcome, BillTracker,
    SETTING_ANNOUNCE_SERVER_DONATION, STAT_PLAYER_DONATIONS,
};
