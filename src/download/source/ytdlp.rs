//! yt-dlp backed media resolver
//!
//! Listing uses `--dump-single-json` so nothing is downloaded; fetching asks
//! yt-dlp to print the final file path once post-processing has moved it into
//! place.

use crate::core::config;
use crate::download::delivery::remove_file_quietly;
use crate::download::error::DownloadError;
use crate::download::source::{DownloadResult, DownloadTarget, FormatDescriptor, FormatListing, MediaResolver};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use url::Url;

/// Storyboard "formats" are image sprites, not media
const SKIPPED_EXTENSIONS: &[&str] = &["mhtml"];

#[derive(Debug, Deserialize)]
struct InfoJson {
    title: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
    // Single-format extractors put the only format at the top level
    format_id: Option<String>,
    ext: Option<String>,
    format_note: Option<String>,
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: Option<String>,
    ext: Option<String>,
    format_note: Option<String>,
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
}

fn size_from(filesize: Option<f64>, filesize_approx: Option<f64>) -> Option<u64> {
    filesize
        .or(filesize_approx)
        .filter(|size| size.is_finite() && *size > 0.0)
        .map(|size| size as u64)
}

fn descriptor(
    format_id: Option<String>,
    ext: Option<String>,
    note: Option<String>,
    size_bytes: Option<u64>,
) -> Option<FormatDescriptor> {
    let format_id = format_id.filter(|id| !id.is_empty())?;
    let ext = ext.unwrap_or_else(|| "unknown".to_string()).to_lowercase();
    if SKIPPED_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }

    Some(FormatDescriptor {
        format_id,
        ext,
        note: note.filter(|n| !n.is_empty()).unwrap_or_else(|| "unknown".to_string()),
        size_bytes,
    })
}

/// Parses the output of `yt-dlp --dump-single-json` into a listing.
pub fn parse_listing(json: &str) -> Result<FormatListing, DownloadError> {
    let info: InfoJson =
        serde_json::from_str(json).map_err(|e| DownloadError::Parse(format!("Invalid yt-dlp JSON: {}", e)))?;

    let mut formats: Vec<FormatDescriptor> = info
        .formats
        .into_iter()
        .filter_map(|f| {
            descriptor(
                f.format_id,
                f.ext,
                f.format_note,
                size_from(f.filesize, f.filesize_approx),
            )
        })
        .collect();

    if formats.is_empty() {
        if let Some(single) = descriptor(
            info.format_id,
            info.ext,
            info.format_note,
            size_from(info.filesize, info.filesize_approx),
        ) {
            formats.push(single);
        }
    }

    Ok(FormatListing {
        title: info.title.unwrap_or_default(),
        formats,
    })
}

/// Picks the path printed by `--print after_move:filepath`.
fn parse_printed_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from)
}

/// Deletes whatever an aborted fetch left behind: `<stem>.*.part`,
/// `.ytdl` state and fragment files all share the stem prefix.
async fn remove_leftovers(target: &DownloadTarget) {
    let mut entries = match tokio::fs::read_dir(&target.dir).await {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot scan {} for leftovers: {}", target.dir.display(), e);
            return;
        }
    };

    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                if entry.file_name().to_string_lossy().starts_with(target.stem.as_str()) {
                    remove_file_quietly(&entry.path()).await;
                }
            }
            Ok(None) => break,
            Err(e) => {
                log::warn!("Cannot scan {} for leftovers: {}", target.dir.display(), e);
                break;
            }
        }
    }
}

/// Media resolver powered by yt-dlp.
pub struct YtDlpResolver {
    bin: String,
    list_timeout: Duration,
    fetch_timeout: Duration,
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpResolver {
    /// Resolver using the configured binary and timeouts.
    pub fn new() -> Self {
        Self::with_binary(config::YTDL_BIN.as_str())
    }

    pub fn with_binary(bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            list_timeout: config::download::list_timeout(),
            fetch_timeout: config::download::fetch_timeout(),
        }
    }

    pub fn with_timeouts(mut self, list_timeout: Duration, fetch_timeout: Duration) -> Self {
        self.list_timeout = list_timeout;
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Runs yt-dlp and returns stdout, killing the child on timeout.
    async fn run(&self, args: &[String], limit: Duration, operation: &str) -> Result<String, DownloadError> {
        log::debug!("yt-dlp command for {}: {} {}", operation, self.bin, args.join(" "));

        let mut command = TokioCommand::new(&self.bin);
        command.args(args).kill_on_drop(true);

        let output = match timeout(limit, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                log::error!("Failed to execute {}: {}", self.bin, e);
                return Err(DownloadError::Process(format!("Failed to execute {}: {}", self.bin, e)));
            }
            Err(_) => {
                log::error!("yt-dlp {} timed out after {}s", operation, limit.as_secs());
                return Err(DownloadError::Timeout(format!(
                    "yt-dlp timed out after {}s ({})",
                    limit.as_secs(),
                    operation
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let err = DownloadError::from_stderr(&stderr);
            log::error!("yt-dlp {} failed ({}): {}", operation, output.status, err);
            return Err(err);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn list_formats(&self, url: &Url) -> Result<FormatListing, DownloadError> {
        let args = vec![
            "--dump-single-json".to_string(),
            "--no-playlist".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            url.to_string(),
        ];

        let stdout = self.run(&args, self.list_timeout, "format listing").await?;
        let listing = parse_listing(&stdout)?;
        log::info!("yt-dlp listed {} formats for {}", listing.formats.len(), url);
        Ok(listing)
    }

    async fn fetch(&self, url: &Url, format_id: &str, target: &DownloadTarget) -> Result<DownloadResult, DownloadError> {
        let args = vec![
            "-f".to_string(),
            format_id.to_string(),
            "-o".to_string(),
            target.output_template(),
            "--no-playlist".to_string(),
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
            url.to_string(),
        ];

        let stdout = match self.run(&args, self.fetch_timeout, "download").await {
            Ok(stdout) => stdout,
            Err(e) => {
                remove_leftovers(target).await;
                return Err(e);
            }
        };
        let path = parse_printed_path(&stdout)
            .ok_or_else(|| DownloadError::FileNotFound("yt-dlp did not report an output file".to_string()))?;

        let result = DownloadResult::from_path(&path).await?;
        log::info!(
            "yt-dlp fetched format {} of {} to {} ({} bytes)",
            format_id,
            url,
            result.path.display(),
            result.size_bytes
        );
        Ok(result)
    }
}
