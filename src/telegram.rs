//! Telegram Bot API client.
//!
//! Thin client over the HTTP Bot API: session probe (`getMe`), long-poll
//! update fetch (`getUpdates`), text replies (`sendMessage`), and document
//! uploads (`sendDocument`, multipart). Only the fields this bot reads are
//! modeled on the wire types.

use crate::error::{DeliveryError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Telegram chat identifier.
pub type ChatId = i64;

/// Default Bot API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Extra seconds on the HTTP timeout so the request outlives the long poll.
const POLL_TIMEOUT_MARGIN_SECS: u64 = 10;

// ── Wire types ────────────────────────────────────────────────

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// One entry from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update identifier; confirmed by polling with `update_id + 1`.
    pub update_id: i64,
    /// Message payload. Absent for non-message updates (edits, callbacks,
    /// member events), which this bot ignores.
    #[serde(default)]
    pub message: Option<ChatMessage>,
}

/// An inbound chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    /// Message identifier within the chat.
    pub message_id: i64,
    /// Chat the message arrived from.
    pub chat: Chat,
    /// Text content; absent for stickers, photos and other non-text messages.
    #[serde(default)]
    pub text: Option<String>,
}

/// The chat a message belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Unique chat identifier (negative for groups).
    pub id: ChatId,
}

/// Bot identity returned by `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    /// Bot user ID.
    pub id: i64,
    /// Bot username, without the `@`.
    #[serde(default)]
    pub username: Option<String>,
}

// ── Client ────────────────────────────────────────────────────

/// Bot API client bound to one bot token.
#[derive(Clone)]
pub struct TelegramClient {
    token: String,
    base_url: String,
    poll_timeout_secs: u64,
    client: reqwest::Client,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl TelegramClient {
    /// Create a new client with the given bot token and long-poll timeout.
    pub fn new(token: impl Into<String>, poll_timeout_secs: u64) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            poll_timeout_secs,
            client: reqwest::Client::new(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.base_url.trim_end_matches('/'),
            self.token
        )
    }

    /// Probe the session by fetching the bot's own identity.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Telegram`] if the token is rejected or the
    /// API is unreachable.
    pub async fn get_me(&self) -> Result<BotUser> {
        let response = self
            .client
            .get(self.method_url("getMe"))
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| DeliveryError::Telegram(format!("getMe request failed: {e}")))?;

        parse_response(response, "getMe").await
    }

    /// Fetch updates at or after `offset`, long-polling up to the configured
    /// timeout. An empty vec means the poll expired with nothing new.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Telegram`] on transport or API failure.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
        });

        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(
                self.poll_timeout_secs.saturating_add(POLL_TIMEOUT_MARGIN_SECS),
            ))
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Telegram(format!("getUpdates request failed: {e}")))?;

        let updates: Vec<Update> = parse_response(response, "getUpdates").await?;
        if !updates.is_empty() {
            debug!("getUpdates returned {} update(s)", updates.len());
        }
        Ok(updates)
    }

    /// Send a plain text message to a chat.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Telegram`] on transport or API failure.
    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .timeout(Duration::from_secs(30))
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Telegram(format!("sendMessage request failed: {e}")))?;

        parse_response::<serde_json::Value>(response, "sendMessage").await?;
        Ok(())
    }

    /// Upload a document to a chat under the given file name.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Telegram`] on transport or API failure.
    pub async fn send_document(
        &self,
        chat_id: ChatId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_owned());
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .timeout(Duration::from_secs(120))
            .multipart(form)
            .send()
            .await
            .map_err(|e| DeliveryError::Telegram(format!("sendDocument request failed: {e}")))?;

        parse_response::<serde_json::Value>(response, "sendDocument").await?;
        Ok(())
    }
}

/// Check status and unwrap the `{ok, result, description}` envelope.
async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    method: &str,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DeliveryError::Telegram(format!(
            "{method} failed ({status}): {}",
            extract_description(&body)
        )));
    }

    let envelope: ApiResponse<T> = response
        .json()
        .await
        .map_err(|e| DeliveryError::Telegram(format!("{method} returned invalid JSON: {e}")))?;

    if !envelope.ok {
        return Err(DeliveryError::Telegram(format!(
            "{method} rejected: {}",
            envelope
                .description
                .unwrap_or_else(|| "no description".to_owned())
        )));
    }

    envelope
        .result
        .ok_or_else(|| DeliveryError::Telegram(format!("{method} returned no result")))
}

/// Extract the `description` field from a Bot API error body.
fn extract_description(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("description")
                .and_then(|d| d.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_owned())
}
