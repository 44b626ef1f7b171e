//! Telegram update listener.
//!
//! Long-polls `getUpdates` and reacts to two things: the first message the
//! bot ever sees (adopting that chat as the delivery destination) and the
//! explicit update command (re-pointing the destination at the sender's
//! chat). Both trigger an acknowledgment reply and an immediate delivery.
//! Everything else is confirmed and dropped.

use crate::delivery::Courier;
use crate::destination::DestinationSlot;
use crate::telegram::{TelegramClient, Update};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Command that re-points the bot at the sender's chat. Case-sensitive,
/// matched against the whole message text.
pub const UPDATE_COMMAND: &str = "/updateId";

/// Reply sent after the destination has been updated.
pub const UPDATE_ACK: &str = "Main chat ID updated successfully!";

/// Long-poll loop over `getUpdates`.
pub struct UpdateListener {
    telegram: Arc<TelegramClient>,
    courier: Courier,
    destination: DestinationSlot,
    offset: i64,
}

impl UpdateListener {
    /// Create a listener starting from an unconfirmed offset.
    pub fn new(
        telegram: Arc<TelegramClient>,
        courier: Courier,
        destination: DestinationSlot,
    ) -> Self {
        Self {
            telegram,
            courier,
            destination,
            offset: 0,
        }
    }

    /// Poll for updates until the process exits.
    ///
    /// A failed poll backs off exponentially (2s doubling, capped at 60s)
    /// and never terminates the loop; a successful poll resets the backoff.
    pub async fn run(mut self) {
        info!("update listener started");
        let mut backoff_secs = 2u64;

        loop {
            match self.telegram.get_updates(self.offset).await {
                Ok(updates) => {
                    backoff_secs = 2;
                    for update in updates {
                        self.process(update).await;
                    }
                }
                Err(e) => {
                    warn!("update poll failed, retrying in {backoff_secs}s: {e}");
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs.saturating_mul(2)).min(60);
                }
            }
        }
    }

    /// Handle one update and advance the confirmation offset.
    ///
    /// Updates without a message payload (edits, callbacks, member events)
    /// are confirmed and skipped. Reply or delivery failures are logged and
    /// do not stop the listener.
    async fn process(&mut self, update: Update) {
        self.offset = update.update_id + 1;

        let Some(message) = update.message else {
            debug!("skipping update {} with no message payload", update.update_id);
            return;
        };

        let chat_id = message.chat.id;
        let is_command = message.text.as_deref() == Some(UPDATE_COMMAND);
        if self.destination.is_set() && !is_command {
            return;
        }

        info!("adopting chat {chat_id} as delivery destination");
        self.destination.set(chat_id);

        if let Err(e) = self.telegram.send_message(chat_id, UPDATE_ACK).await {
            warn!("acknowledgment to chat {chat_id} failed: {e}");
        }
        if let Err(e) = self.courier.deliver(chat_id).await {
            warn!("immediate delivery to chat {chat_id} failed: {e}");
        }
    }
}
