//! Startup sequence: fetch the document once, then start the delivery loops.
//!
//! Call [`run`] with a loaded [`BotConfig`]. It verifies the Telegram token,
//! performs the one-time Google Drive fetch, starts the background scheduler,
//! and then drives the update listener until the process exits.

use crate::config::BotConfig;
use crate::credentials::Credentials;
use crate::delivery::Courier;
use crate::destination::DestinationSlot;
use crate::drive::{DownloadTarget, DriveClient};
use crate::error::{DeliveryError, Result};
use crate::listener::UpdateListener;
use crate::scheduler::DeliveryScheduler;
use crate::telegram::TelegramClient;
use std::sync::Arc;
use tracing::info;

/// Bring the bot up and run it until the process is stopped.
///
/// Startup is strict: an invalid config, missing credentials, a rejected bot
/// token, or a failed document fetch all abort before the first update is
/// consumed. Once running, individual delivery failures are logged and the
/// loops keep going.
///
/// # Errors
///
/// Returns an error if the config is invalid, a credential env var is
/// missing, Telegram rejects the token, or the document cannot be fetched
/// from Google Drive.
pub async fn run(config: BotConfig) -> Result<()> {
    config.validate()?;
    let credentials = Credentials::from_env()?;

    let telegram = Arc::new(TelegramClient::new(
        credentials.bot_token,
        config.telegram.poll_timeout_secs,
    ));

    // Fail fast on a bad token before touching Drive.
    let me = telegram.get_me().await?;
    info!(
        "authorized on account {}",
        me.username.as_deref().unwrap_or("<unnamed bot>")
    );

    // One-time fetch. The stored copy is what every later delivery reads.
    let drive = DriveClient::new(credentials.drive_api_key);
    let target = DownloadTarget {
        file_id: config.drive.file_id.clone(),
        download_dir: config.drive.download_dir.clone(),
        file_name: config.drive.file_name.clone(),
    };
    let file_path = tokio::task::spawn_blocking(move || drive.fetch(&target))
        .await
        .map_err(|e| DeliveryError::Drive(format!("startup fetch task failed: {e}")))??;

    let courier = Courier::new(
        Arc::clone(&telegram),
        file_path,
        config.drive.file_name.clone(),
    );
    let destination = DestinationSlot::new();

    // Detached on purpose: the scheduler loop lives as long as the runtime.
    let _scheduler = DeliveryScheduler::new(
        config.delivery.schedule.clone(),
        courier.clone(),
        destination.clone(),
    )
    .run();

    info!("startup complete, listening for updates");
    UpdateListener::new(telegram, courier, destination).run().await;
    Ok(())
}
