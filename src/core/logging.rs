//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup summary of the effective configuration

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the configuration the bot is about to run with.
///
/// The token is never printed; only whether a custom Bot API server is used.
pub fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("yt-dlp binary:      {}", config::YTDL_BIN.as_str());
    log::info!("Download folder:    {}", config::download_dir().display());
    log::info!("Session TTL:        {}s", *config::session::TTL_SECS);
    log::info!(
        "Size ceiling:       {} bytes",
        config::download::MAX_FILE_SIZE_BYTES
    );
    match config::BOT_API_URL.as_deref() {
        Some(url) => log::info!("Bot API:            {}", url),
        None => log::info!("Bot API:            api.telegram.org"),
    }
    if *config::metrics::ENABLED {
        log::info!("Metrics:            enabled on port {}", *config::metrics::PORT);
    } else {
        log::info!("Metrics:            disabled (METRICS_ENABLED=false)");
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
