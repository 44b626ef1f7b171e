//! Credential loading from the environment.
//!
//! The bot reads its two secrets from environment variables at startup:
//! the Telegram bot token and the Google Drive API key. Both are required
//! and startup aborts if either is missing or blank. Secrets never come
//! from the config file.

use crate::error::{DeliveryError, Result};
use std::fmt;

/// Environment variable holding the Telegram bot token.
pub const BOT_TOKEN_VAR: &str = "BOT_API_KEY";

/// Environment variable holding the Google Drive API key.
pub const DRIVE_KEY_VAR: &str = "GOOGLE_DRIVE_API_KEY";

/// Resolved secret values ready for runtime use.
///
/// This struct intentionally implements a custom [`Debug`] that redacts
/// both values to prevent accidental secret leakage in logs.
pub struct Credentials {
    /// Telegram bot token (the `bot<token>` path segment, without prefix).
    pub bot_token: String,
    /// Google Drive API key, sent as the `X-goog-api-key` header.
    pub drive_api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &redact(&self.bot_token))
            .field("drive_api_key", &redact(&self.drive_api_key))
            .finish()
    }
}

fn redact(s: &str) -> &str {
    if s.is_empty() { "" } else { "[REDACTED]" }
}

impl Credentials {
    /// Load both secrets from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Config`] if either variable is unset or
    /// contains only whitespace.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bot_token: require_var(BOT_TOKEN_VAR)?,
            drive_api_key: require_var(DRIVE_KEY_VAR)?,
        })
    }
}

fn require_var(var: &str) -> Result<String> {
    let value = std::env::var(var)
        .map_err(|_| DeliveryError::Config(format!("required env var is missing: {var}")))?;
    if value.trim().is_empty() {
        return Err(DeliveryError::Config(format!(
            "required env var is empty: {var}"
        )));
    }
    Ok(value)
}
