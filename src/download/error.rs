use std::fmt;

use crate::download::ytdlp_errors::{get_error_message, YtDlpErrorType};

/// Structured error type for resolver operations.
///
/// Categorized variants so the protocol layer can log, count and phrase each
/// failure without inspecting strings.
#[derive(Debug)]
pub enum DownloadError {
    /// yt-dlp reported a failure; stderr was classified
    YtDlp { kind: YtDlpErrorType, stderr: String },
    /// yt-dlp did not finish in time
    Timeout(String),
    /// Expected file not found after the download finished
    FileNotFound(String),
    /// Process execution failure (spawn, wait)
    Process(String),
    /// yt-dlp output could not be understood
    Parse(String),
    /// Catch-all for uncategorized errors
    Other(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::YtDlp { stderr, .. } => write!(f, "{}", last_error_line(stderr)),
            DownloadError::Timeout(msg) => write!(f, "{}", msg),
            DownloadError::FileNotFound(msg) => write!(f, "{}", msg),
            DownloadError::Process(msg) => write!(f, "{}", msg),
            DownloadError::Parse(msg) => write!(f, "{}", msg),
            DownloadError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Builds a yt-dlp error from its stderr, classifying the failure.
    pub fn from_stderr(stderr: &str) -> Self {
        DownloadError::YtDlp {
            kind: crate::download::ytdlp_errors::analyze_ytdlp_error(stderr),
            stderr: stderr.trim().to_string(),
        }
    }

    /// Returns subcategory for metrics
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::YtDlp { .. } => "ytdlp",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::Process(_) => "process",
            DownloadError::Parse(_) => "parse",
            DownloadError::Other(_) => "other",
        }
    }

    /// Short explanation for the user, when the failure is recognizable
    pub fn user_hint(&self) -> Option<String> {
        match self {
            DownloadError::YtDlp { kind, .. } if *kind != YtDlpErrorType::Unknown => Some(get_error_message(kind)),
            DownloadError::Timeout(_) => Some(get_error_message(&YtDlpErrorType::NetworkError)),
            _ => None,
        }
    }
}

/// yt-dlp prints warnings before the actual error; keep the line that matters.
fn last_error_line(stderr: &str) -> &str {
    let lines = || stderr.lines().map(str::trim).filter(|l| !l.is_empty());
    lines()
        .filter(|l| l.starts_with("ERROR:"))
        .last()
        .or_else(|| lines().last())
        .unwrap_or("yt-dlp failed")
}

impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        DownloadError::Other(s)
    }
}

impl From<&str> for DownloadError {
    fn from(s: &str) -> Self {
        DownloadError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_display() {
        let err = DownloadError::Timeout("yt-dlp timed out".into());
        assert_eq!(err.to_string(), "yt-dlp timed out");
    }

    #[test]
    fn test_ytdlp_display_prefers_error_line() {
        let stderr = "WARNING: [youtube] something odd\nERROR: [youtube] abc: Video unavailable\n";
        let err = DownloadError::from_stderr(stderr);
        assert_eq!(err.to_string(), "ERROR: [youtube] abc: Video unavailable");
        assert!(matches!(
            err,
            DownloadError::YtDlp {
                kind: YtDlpErrorType::VideoUnavailable,
                ..
            }
        ));
    }

    #[test]
    fn test_ytdlp_display_without_error_line() {
        let err = DownloadError::from_stderr("first\nsecond\n\n");
        assert_eq!(err.to_string(), "second");
        let err = DownloadError::from_stderr("");
        assert_eq!(err.to_string(), "yt-dlp failed");
    }

    #[test]
    fn test_download_error_subcategory() {
        assert_eq!(DownloadError::from_stderr("boom").subcategory(), "ytdlp");
        assert_eq!(DownloadError::Timeout("".into()).subcategory(), "timeout");
        assert_eq!(DownloadError::Parse("".into()).subcategory(), "parse");
        assert_eq!(DownloadError::Other("".into()).subcategory(), "other");
    }

    #[test]
    fn test_user_hint() {
        assert!(DownloadError::from_stderr("ERROR: Private video").user_hint().is_some());
        assert!(DownloadError::from_stderr("ERROR: something new").user_hint().is_none());
        assert!(DownloadError::Other("x".into()).user_hint().is_none());
    }

    #[test]
    fn test_from_string() {
        let err: DownloadError = "test error".to_string().into();
        assert!(matches!(err, DownloadError::Other(_)));
    }
}
