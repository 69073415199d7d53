//! tubegrab - Telegram bot that lists the formats of a YouTube video and
//! sends back the one the user picks
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, metrics and input validation
//! - `storage`: in-memory per-chat sessions
//! - `download`: media resolver (yt-dlp) and delivery of fetched files
//! - `telegram`: transport, handler tree and the format selection flow

pub mod cli;
pub mod core;
pub mod download;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, FlowError};
pub use download::{MediaResolver, YtDlpResolver};
pub use storage::SessionStore;
pub use telegram::{ChatTransport, FormatSelectionFlow};
