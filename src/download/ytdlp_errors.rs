//! Classification of yt-dlp failures
//!
//! Maps yt-dlp stderr to a small set of failure kinds and the message shown
//! to the user for each.

/// Kinds of yt-dlp failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YtDlpErrorType {
    /// YouTube wants a signed-in session
    SignInRequired,
    /// YouTube detected automated access
    BotDetection,
    /// Video is private, removed or region-locked
    VideoUnavailable,
    /// The chosen format cannot be downloaded any more
    FormatUnavailable,
    /// Timeouts, DNS, refused connections
    NetworkError,
    /// Anything else
    Unknown,
}

/// Analyzes yt-dlp stderr and determines the kind of failure
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorType {
    let stderr_lower = stderr.to_lowercase();

    if stderr_lower.contains("sign in to confirm you're not a bot")
        || stderr_lower.contains("sign in to confirm your age")
        || stderr_lower.contains("please sign in")
        || stderr_lower.contains("cookies are no longer valid")
        || stderr_lower.contains("use --cookies-from-browser")
    {
        return YtDlpErrorType::SignInRequired;
    }

    if stderr_lower.contains("bot detection")
        || stderr_lower.contains("http error 403")
        || stderr_lower.contains("http error 429")
        || stderr_lower.contains("signature extraction failed")
    {
        return YtDlpErrorType::BotDetection;
    }

    if stderr_lower.contains("private video")
        || stderr_lower.contains("video unavailable")
        || stderr_lower.contains("this video is not available")
        || stderr_lower.contains("video is private")
        || stderr_lower.contains("video has been removed")
        || stderr_lower.contains("this video does not exist")
        || stderr_lower.contains("not available in your country")
    {
        return YtDlpErrorType::VideoUnavailable;
    }

    if stderr_lower.contains("requested format is not available") {
        return YtDlpErrorType::FormatUnavailable;
    }

    if stderr_lower.contains("timed out")
        || stderr_lower.contains("timeout")
        || stderr_lower.contains("connection")
        || stderr_lower.contains("network is unreachable")
        || stderr_lower.contains("name or service not known")
        || stderr_lower.contains("failed to connect")
    {
        return YtDlpErrorType::NetworkError;
    }

    YtDlpErrorType::Unknown
}

/// Returns the message shown to the user for a failure kind
pub fn get_error_message(error_type: &YtDlpErrorType) -> String {
    match error_type {
        YtDlpErrorType::SignInRequired => "YouTube asks to sign in for this video. Try another one.".to_string(),
        YtDlpErrorType::BotDetection => "YouTube blocked the request. Try again later.".to_string(),
        YtDlpErrorType::VideoUnavailable => {
            "The video is unavailable. It may be private, removed or blocked in this region.".to_string()
        }
        YtDlpErrorType::FormatUnavailable => {
            "This format is no longer offered. Send the link again to get a fresh list.".to_string()
        }
        YtDlpErrorType::NetworkError => "Network problem. Try again in a minute.".to_string(),
        YtDlpErrorType::Unknown => "Could not process the video. Check that the link is correct.".to_string(),
    }
}
