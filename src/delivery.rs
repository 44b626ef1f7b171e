//! File delivery to the active chat.

use crate::error::Result;
use crate::telegram::{ChatId, TelegramClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Sends the locally stored file to a chat as a document upload.
///
/// The file is read fresh on every delivery, so a swapped-out file on disk
/// is picked up without a restart.
#[derive(Debug, Clone)]
pub struct Courier {
    telegram: Arc<TelegramClient>,
    file_path: PathBuf,
    file_name: String,
}

impl Courier {
    /// Create a courier for the file at `file_path`, uploaded as `file_name`.
    pub fn new(telegram: Arc<TelegramClient>, file_path: PathBuf, file_name: String) -> Self {
        Self {
            telegram,
            file_path,
            file_name,
        }
    }

    /// Deliver the file to `chat_id`.
    ///
    /// A read failure aborts the attempt before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DeliveryError::Io`] if the file cannot be
    /// read and [`crate::error::DeliveryError::Telegram`] if the upload is
    /// rejected.
    pub async fn deliver(&self, chat_id: ChatId) -> Result<()> {
        let bytes = tokio::fs::read(&self.file_path).await?;
        self.telegram
            .send_document(chat_id, &self.file_name, bytes)
            .await?;
        info!("delivered '{}' to chat {chat_id}", self.file_name);
        Ok(())
    }
}
