//! Error types for the delivery bot.

/// Top-level error type for the fetch-and-deliver pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Configuration error (missing or invalid option).
    #[error("config error: {0}")]
    Config(String),

    /// Google Drive metadata or download error.
    #[error("drive error: {0}")]
    Drive(String),

    /// Telegram Bot API error.
    #[error("telegram error: {0}")]
    Telegram(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, DeliveryError>;
