use thiserror::Error;

use crate::download::error::DownloadError;

/// Centralized error types for the application
///
/// Infrastructure failures (Telegram API, IO, yt-dlp) are converted to this
/// enum. Errors that end an interaction with the user are modelled separately
/// by [`FlowError`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Transport errors that did not come from teloxide
    #[error("Transport error: {0}")]
    Transport(String),

    /// Download/yt-dlp errors
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Why an interaction ended without the user receiving a file.
///
/// Every variant is caught at the handler boundary and turned into a chat
/// message; none of them stop the dispatcher.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Message text is not a supported media URL; the resolver was not called
    #[error("unsupported url: {0}")]
    InvalidUrl(String),

    /// Listing formats failed; no session was created
    #[error("format lookup failed: {0}")]
    Resolution(DownloadError),

    /// Selection arrived for a chat without a live session
    #[error("no pending session for this chat")]
    SessionExpired,

    /// Selected format id is not in the session's catalog
    #[error("format '{0}' is not in the current catalog")]
    FormatInvalid(String),

    /// Downloaded file is above the upload ceiling; the file was removed
    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    /// yt-dlp failed while downloading the chosen format
    #[error("download failed: {0}")]
    Fetch(DownloadError),

    /// Sending the file back failed after a successful download
    #[error("delivery failed: {0}")]
    Delivery(AppError),
}

impl FlowError {
    /// Returns category for metrics and logs
    pub fn category(&self) -> &'static str {
        match self {
            FlowError::InvalidUrl(_) => "invalid_url",
            FlowError::Resolution(_) => "resolution",
            FlowError::SessionExpired => "session_expired",
            FlowError::FormatInvalid(_) => "format_invalid",
            FlowError::TooLarge { .. } => "too_large",
            FlowError::Fetch(_) => "fetch",
            FlowError::Delivery(_) => "delivery",
        }
    }
}
