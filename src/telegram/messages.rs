//! Texts sent to users
//!
//! Everything that goes out in HTML mode is escaped here.

use teloxide::utils::html::escape;

use crate::core::error::FlowError;
use crate::download::error::DownloadError;

pub const GREETING: &str = "🎬 Send me a YouTube link, and I’ll show available download formats.";

pub const HELP: &str = "🎬 Send me a YouTube link.\n\
    I’ll list the available formats as buttons. Tap one and I’ll send the file back.\n\
    Files over 2GB can’t be sent through Telegram.";

pub const FETCHING_FORMATS: &str = "🔍 Fetching formats...";

/// Transient notice shown when a format button is tapped
pub const DOWNLOADING_NOTICE: &str = "⏳ Downloading...";

/// Header of the format menu (HTML)
pub fn formats_header(title: &str) -> String {
    format!("📥 <b>Formats for:</b> {}", escape(title))
}

fn resolution_text(err: &DownloadError) -> String {
    let mut text = "❌ Failed to fetch formats. Try again later.".to_string();
    if let Some(hint) = err.user_hint() {
        text.push('\n');
        text.push_str(&escape(&hint));
    }
    text
}

/// User-facing text (HTML) for an interaction that ended with an error.
pub fn flow_error_text(err: &FlowError) -> String {
    match err {
        FlowError::InvalidUrl(_) => "❌ Please send a valid YouTube URL.".to_string(),
        FlowError::Resolution(e) => resolution_text(e),
        FlowError::SessionExpired => "❌ Session expired. Please send the link again.".to_string(),
        FlowError::FormatInvalid(_) => "❌ Format is no longer valid. Please send the link again.".to_string(),
        FlowError::TooLarge { .. } => "⚠️ File too large for Telegram (limit: 2GB).".to_string(),
        FlowError::Fetch(e) => {
            let mut text = format!("❌ Download failed.\n<code>{}</code>", escape(&e.to_string()));
            if let Some(hint) = e.user_hint() {
                text.push('\n');
                text.push_str(&escape(&hint));
            }
            text
        }
        FlowError::Delivery(e) => format!("❌ Download failed.\n<code>{}</code>", escape(&e.to_string())),
    }
}
