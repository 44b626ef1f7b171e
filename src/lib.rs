//! Drivecast: a Telegram bot that re-delivers one Google Drive file.
//!
//! The bot fetches a single Drive file once at startup, stores it locally,
//! and from then on sends the stored copy to one Telegram chat:
//! Drive fetch → local copy → scheduled + on-command delivery
//!
//! # Architecture
//!
//! Startup wires together a handful of small pieces:
//! - **Drive fetch**: Downloads (or exports) the configured file via the
//!   Drive v3 API, once, before anything else starts
//! - **Update listener**: Long-polls `getUpdates`, adopts the active chat,
//!   and reacts to the `/updateId` command
//! - **Scheduler**: Re-sends the stored file on a fixed interval or at a
//!   daily wall-clock time
//! - **Courier**: Reads the stored file and uploads it via `sendDocument`

pub mod config;
pub mod credentials;
pub mod delivery;
pub mod destination;
pub mod drive;
pub mod error;
pub mod listener;
pub mod scheduler;
pub mod startup;
pub mod telegram;

pub use config::BotConfig;
pub use error::{DeliveryError, Result};
pub use scheduler::Schedule;
pub use telegram::ChatId;
