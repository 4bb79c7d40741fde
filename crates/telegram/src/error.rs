use thiserror::Error;

/// Error type for bot operations
#[derive(Debug, Error)]
pub enum BotError {
    /// Telegram API error
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
    /// File download from Telegram failed
    #[error("Download error: {0}")]
    Download(#[from] teloxide::DownloadError),
    /// Local file error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    /// The user cancelled the transfer
    #[error("Transfer cancelled")]
    Cancelled,
    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Helper trait to convert results into user-friendly messages
pub trait UserMessage {
    fn user_message(&self) -> String;
}

impl UserMessage for BotError {
    fn user_message(&self) -> String {
        match self {
            BotError::Telegram(e) => format!("❌ Communication error: {}", e),
            BotError::Download(e) => format!("❌ Download failed: {}", e),
            BotError::Io(e) => format!("❌ File error: {}", e),
            BotError::Config(msg) => format!("❌ Bot is misconfigured: {}", msg),
            BotError::InvalidArguments(msg) => format!("❌ {}", msg),
            BotError::Cancelled => "❌ Transfer cancelled.".to_string(),
            BotError::Message(msg) => format!("❌ {}", msg),
        }
    }
}
