//! # Donation Plugin
//!
//! Chat commands around the host's planets currency: `/donate` lets players
//! give planets to the server or to each other, `/pay` pays planets out of the
//! server account, `/getplanets` reports the server balance. Issued payments
//! are handed to the [`BillTracker`]; the plugin's `BillUpdated` listener feeds
//! every status update back into it, which closes the correlation loop.
//!
//! The plugin follows the controller's listener lifecycle: [`load`] registers
//! everything under the plugin's [`ListenerId`], [`unload`] sweeps it away
//! again in one call.
//!
//! [`load`]: DonationPlugin::load
//! [`unload`]: DonationPlugin::unload

use pitwall_billing::{
    BillDirection, BillTracker, ChatSink, PlanetsClient, PlayerDirectory, SettingsStore,
    StatisticsSink, STAT_PLAYER_DONATIONS,
};
use pitwall_callbacks::{
    names, BillUpdatedEvent, CallbackDispatcher, CallbackError, ListenerId, PlayerChatEvent,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Settings key of the configurable donation shortcut values.
pub const SETTING_DONATION_VALUES: &str = "Donation Values";
/// Default donation shortcut values, in planets.
pub const DEFAULT_DONATION_VALUES: &str = "20,50,100,500,1000,2000";

/// Command parsing failures, reported to the caller as usage examples.
#[derive(Debug, thiserror::Error)]
enum CommandError {
    #[error("missing amount argument")]
    MissingAmount,
    #[error("amount is not a positive integer")]
    InvalidAmount,
}

/// Plugin offering the /donate, /pay and /getplanets commands.
pub struct DonationPlugin {
    listener_id: ListenerId,
    tracker: Arc<BillTracker>,
    client: Arc<dyn PlanetsClient>,
    chat: Arc<dyn ChatSink>,
    players: Arc<dyn PlayerDirectory>,
    statistics: Arc<dyn StatisticsSink>,
    settings: Arc<dyn SettingsStore>,
}

impl DonationPlugin {
    /// Creates the plugin wired to its collaborators.
    pub fn new(
        tracker: Arc<BillTracker>,
        client: Arc<dyn PlanetsClient>,
        chat: Arc<dyn ChatSink>,
        players: Arc<dyn PlayerDirectory>,
        statistics: Arc<dyn StatisticsSink>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            listener_id: ListenerId::new(),
            tracker,
            client,
            chat,
            players,
            statistics,
            settings,
        }
    }

    /// Returns the listener id the plugin's registrations run under.
    pub fn listener_id(&self) -> ListenerId {
        self.listener_id
    }

    /// Registers the plugin's listeners and defines its statistic.
    pub async fn load(self: &Arc<Self>, dispatcher: &CallbackDispatcher) -> Result<(), CallbackError> {
        self.statistics.define_stat(STAT_PLAYER_DONATIONS);

        let plugin = Arc::clone(self);
        dispatcher
            .on_script(
                self.listener_id,
                names::PLAYER_CHAT,
                move |event: PlayerChatEvent| plugin.handle_chat(event),
            )
            .await?;

        let plugin = Arc::clone(self);
        dispatcher
            .on_script(
                self.listener_id,
                names::BILL_UPDATED,
                move |event: BillUpdatedEvent| plugin.handle_bill_updated(event),
            )
            .await?;

        info!("Donation plugin loaded");
        Ok(())
    }

    /// Removes every listener the plugin registered.
    pub async fn unload(&self, dispatcher: &CallbackDispatcher) {
        let removed = dispatcher.unregister(self.listener_id).await;
        info!("Donation plugin unloaded ({} listeners removed)", removed);
    }

    /// Returns the configured donation shortcut values.
    ///
    /// Reads the comma-separated list from the settings store, falling back to
    /// [`DEFAULT_DONATION_VALUES`]. Entries that do not parse as positive
    /// integers are skipped.
    pub fn donation_values(&self) -> Vec<u64> {
        let raw = self
            .settings
            .string_setting(SETTING_DONATION_VALUES)
            .unwrap_or_else(|| DEFAULT_DONATION_VALUES.to_string());
        raw.split(',')
            .filter_map(|entry| entry.trim().parse::<u64>().ok())
            .filter(|value| *value > 0)
            .collect()
    }

    /// Donates one of the configured shortcut values to the server.
    ///
    /// Entry point for UI shortcut actions. Values outside the configured
    /// list are ignored.
    pub fn donate_shortcut(&self, login: &str, value: u64) {
        if !self.donation_values().contains(&value) {
            debug!("Ignoring unconfigured donation shortcut {} from '{}'", value, login);
            return;
        }
        self.issue_donation(login, value, "");
    }

    fn handle_chat(&self, event: PlayerChatEvent) -> Result<(), CallbackError> {
        if !event.is_command {
            return Ok(());
        }
        let mut words = event.text.split_whitespace();
        match words.next() {
            Some("/donate") => self.command_donate(&event.login, words.next(), words.next()),
            Some("/pay") => self.command_pay(&event.login, words.next(), words.next()),
            Some("/getplanets") => self.command_get_planets(&event.login),
            _ => {}
        }
        Ok(())
    }

    fn handle_bill_updated(&self, event: BillUpdatedEvent) -> Result<(), CallbackError> {
        self.tracker
            .resolve(event.bill_id, event.state_code, &event.state_name);
        Ok(())
    }

    /// Handles `/donate <amount> [login]`, the receiver defaulting to the server.
    fn command_donate(&self, login: &str, amount: Option<&str>, receiver: Option<&str>) {
        let amount = match parse_amount(amount) {
            Ok(amount) => amount,
            Err(_) => {
                self.chat
                    .send_information("Usage Example: '/donate 100'", login);
                return;
            }
        };
        self.issue_donation(login, amount, receiver.unwrap_or(""));
    }

    fn issue_donation(&self, login: &str, amount: u64, receiver: &str) {
        let receiver_name = if receiver.is_empty() {
            self.client.server_name()
        } else {
            self.players
                .player_by_login(receiver)
                .map(|player| player.nickname)
                .unwrap_or_else(|| receiver.to_string())
        };

        let message = format!("Donate {} Planets to {}?", amount, receiver_name);
        match self.client.send_bill(login, amount, &message, receiver) {
            Ok(bill_id) => {
                if let Err(open_error) =
                    self.tracker
                        .open(bill_id, BillDirection::Donation, login, receiver, amount)
                {
                    error!("Donation bill could not be tracked: {}", open_error);
                }
            }
            Err(client_error) => {
                error!(
                    "Couldn't create donation of {} planets from '{}' for '{}': {}",
                    amount, login, receiver, client_error
                );
                self.chat.send_error("Creating donation failed.", login);
            }
        }
    }

    /// Handles `/pay <amount> [login]`, the receiver defaulting to the caller.
    fn command_pay(&self, login: &str, amount: Option<&str>, receiver: Option<&str>) {
        let amount = match parse_amount(amount) {
            Ok(amount) => amount,
            Err(_) => {
                self.chat
                    .send_information("Usage Example: '/pay 100 login'", login);
                return;
            }
        };
        let receiver = receiver.unwrap_or(login);

        let message = format!("Payout from {}.", self.client.server_name());
        match self.client.pay(receiver, amount, &message) {
            Ok(bill_id) => {
                if let Err(open_error) =
                    self.tracker
                        .open(bill_id, BillDirection::Payout, login, receiver, amount)
                {
                    error!("Payout bill could not be tracked: {}", open_error);
                }
            }
            Err(client_error) => {
                error!(
                    "Couldn't create payout of {} planets by '{}' for '{}': {}",
                    amount, login, receiver, client_error
                );
                self.chat.send_error("Creating payout failed.", login);
            }
        }
    }

    /// Handles `/getplanets`.
    fn command_get_planets(&self, login: &str) {
        match self.client.server_planets() {
            Ok(planets) => {
                let message = format!("This Server has {} Planets!", planets);
                self.chat.send_information(&message, login);
            }
            Err(client_error) => {
                error!("Couldn't retrieve server planets: {}", client_error);
            }
        }
    }
}

fn parse_amount(argument: Option<&str>) -> Result<u64, CommandError> {
    let raw = argument.ok_or(CommandError::MissingAmount)?;
    let amount: u64 = raw.parse().map_err(|_| CommandError::InvalidAmount)?;
    if amount == 0 {
        return Err(CommandError::InvalidAmount);
    }
    Ok(amount)
}
