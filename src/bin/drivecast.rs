//! Delivery bot binary.
//!
//! Loads configuration (defaults, optional TOML file, env overrides), then
//! runs the bot: one Google Drive fetch at startup, followed by scheduled
//! and on-command deliveries to the active Telegram chat.

use drivecast::BotConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("drivecast starting");

    let config = BotConfig::load()?;
    drivecast::startup::run(config).await.map_err(|e| {
        tracing::error!(error = %e, "drivecast exited with error");
        anyhow::anyhow!("drivecast failed: {e}")
    })?;

    Ok(())
}
