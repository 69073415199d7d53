//! URL and title validation utilities
//!
//! Provides the checks applied to user input before anything is resolved:
//! - Source URL recognition (whitelist of YouTube hosts)
//! - Title sanitization for file names and captions

use thiserror::Error;
use url::Url;

/// Validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid URL format or unsupported domain
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),
}

/// Hosts accepted as media sources (subdomains included).
const SOURCE_HOSTS: &[&str] = &["youtube.com", "youtu.be", "youtube-nocookie.com"];

/// Title used when the resolver reports none or sanitization leaves nothing.
pub const FALLBACK_TITLE: &str = "video";

/// Parses message text as a supported source URL.
///
/// The text is trimmed; input without a scheme (`youtu.be/abc`) is treated as
/// https. Only http/https URLs whose host is a YouTube host (or a subdomain of
/// one) are accepted.
///
/// # Examples
/// ```
/// use tubegrab::core::validation::parse_source_url;
///
/// assert!(parse_source_url("https://youtu.be/dQw4w9WgXcQ").is_ok());
/// assert!(parse_source_url("www.youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
/// assert!(parse_source_url("https://evil.com/watch?v=dQw4w9WgXcQ").is_err());
/// ```
pub fn parse_source_url(text: &str) -> Result<Url, ValidationError> {
    let text = text.trim();
    if text.is_empty() || text.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidUrl(text.to_string()));
    }

    let candidate = if text.contains("://") {
        text.to_string()
    } else {
        format!("https://{}", text)
    };

    let parsed = Url::parse(&candidate).map_err(|_| ValidationError::InvalidUrl(text.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::InvalidUrl(format!(
            "{} (invalid scheme: {})",
            text,
            parsed.scheme()
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| ValidationError::InvalidUrl(format!("{} (no host)", text)))?
        .to_lowercase();

    let supported = SOURCE_HOSTS
        .iter()
        .any(|known| host == *known || host.ends_with(&format!(".{}", known)));

    if !supported {
        return Err(ValidationError::InvalidUrl(format!(
            "{} (not a YouTube domain: {})",
            text, host
        )));
    }

    Ok(parsed)
}

/// Sanitizes a media title for use in file names and captions.
///
/// Path separators and characters reserved on common filesystems are replaced
/// with `_`, control characters are dropped, and leading/trailing dots and
/// whitespace are trimmed.
///
/// # Examples
/// ```
/// use tubegrab::core::validation::sanitize_title;
///
/// assert_eq!(sanitize_title("AC/DC: Live?"), "AC_DC_ Live_");
/// assert_eq!(sanitize_title("  ...  "), "video");
/// ```
pub fn sanitize_title(title: &str) -> String {
    let replaced: String = title
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');
    if trimmed.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Truncates a string to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Truncates a string to at most `max_bytes` bytes of UTF-8, on a char boundary.
pub fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
