use once_cell::sync::Lazy;
use secrecy::SecretString;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::AppError;

/// Configuration constants for the bot
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Download folder path
/// Read from DOWNLOAD_FOLDER environment variable, defaults to "downloads"
/// relative to the working directory. Supports tilde (~) expansion.
pub static DOWNLOAD_FOLDER: Lazy<String> =
    Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| "downloads".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Custom Bot API server URL (local telegram-bot-api), if any
pub static BOT_API_URL: Lazy<Option<String>> =
    Lazy::new(|| env::var("BOT_API_URL").ok().filter(|url| !url.trim().is_empty()));

/// Environment variables holding the bot token, in lookup order
pub const BOT_TOKEN_VARS: &[&str] = &["BOT_TOKEN", "TELOXIDE_TOKEN", "TOKEN"];

/// Reads the bot token from BOT_TOKEN, TELOXIDE_TOKEN or TOKEN.
///
/// Not cached: the caller holds the secret for the lifetime of the bot and
/// startup must fail when it is missing.
pub fn bot_token() -> Result<SecretString, AppError> {
    bot_token_from(|name| env::var(name).ok())
}

/// Picks the first token variable that is set; an empty value is an error.
fn bot_token_from(lookup: impl Fn(&str) -> Option<String>) -> Result<SecretString, AppError> {
    let (name, token) = BOT_TOKEN_VARS
        .iter()
        .find_map(|name| lookup(name).map(|value| (*name, value)))
        .ok_or_else(|| AppError::Config(format!("none of {} is set", BOT_TOKEN_VARS.join(", "))))?;

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Config(format!("{} environment variable is empty", name)));
    }

    Ok(SecretString::from(token.to_string()))
}

/// Resolved download directory with `~` expanded.
pub fn download_dir() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DOWNLOAD_FOLDER.as_str()).to_string())
}

/// Session lifecycle configuration
pub mod session {
    use super::{env, Duration, Lazy};

    /// How long an unanswered format menu stays valid (in seconds)
    /// Read from SESSION_TTL_SECS, default 1 hour
    pub static TTL_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600)
    });

    /// Interval between sweeps of expired sessions (in seconds)
    pub const CLEANUP_INTERVAL_SECS: u64 = 300;

    pub fn ttl() -> Duration {
        Duration::from_secs(*TTL_SECS)
    }

    pub fn cleanup_interval() -> Duration {
        Duration::from_secs(CLEANUP_INTERVAL_SECS)
    }
}

/// Download configuration
pub mod download {
    use super::Duration;

    /// Telegram upload ceiling: anything above this is rejected before sending
    pub const MAX_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024 * 1024;

    /// Title part of a download file name is cut to this many UTF-8 bytes.
    /// File names are limited to 255 bytes; the rest is left for
    /// `-<request id>.<ext>.part` and yt-dlp's fragment suffixes.
    pub const FILE_STEM_TITLE_MAX_BYTES: usize = 180;

    /// Timeout for listing formats (in seconds)
    pub const YTDLP_LIST_TIMEOUT_SECS: u64 = 240; // 4 minutes, slow metadata fetches happen

    /// Timeout for the actual download (in seconds)
    pub const YTDLP_FETCH_TIMEOUT_SECS: u64 = 30 * 60;

    /// Containers sent as audio attachments; everything else goes out as video
    pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "webm", "opus", "ogg", "oga", "aac", "flac", "wav"];

    pub fn list_timeout() -> Duration {
        Duration::from_secs(YTDLP_LIST_TIMEOUT_SECS)
    }

    pub fn fetch_timeout() -> Duration {
        Duration::from_secs(YTDLP_FETCH_TIMEOUT_SECS)
    }
}

/// Presentation limits for outgoing messages
pub mod delivery {
    /// Maximum audio title length (in characters)
    pub const AUDIO_TITLE_MAX_CHARS: usize = 64;

    /// Performer shown on audio attachments
    pub const AUDIO_PERFORMER: &str = "YouTube";

    /// Number of format buttons per keyboard row
    pub const CONTROLS_PER_ROW: usize = 2;

    /// Telegram rejects callback data longer than this (in bytes)
    pub const MAX_CALLBACK_DATA_BYTES: usize = 64;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Large uploads can take a while, especially video
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Metrics configuration
pub mod metrics {
    use super::{env, Lazy};

    /// Whether to start the metrics HTTP server
    /// Read from METRICS_ENABLED environment variable
    pub static ENABLED: Lazy<bool> = Lazy::new(|| {
        env::var("METRICS_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false)
    });

    /// Metrics server port
    /// Read from METRICS_PORT environment variable, default 9090
    pub static PORT: Lazy<u16> = Lazy::new(|| {
        env::var("METRICS_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(9090)
    });
}
