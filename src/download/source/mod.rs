//! Media resolver abstraction.
//!
//! Provides the `MediaResolver` trait the format selection flow talks to. The
//! built-in backend is `YtDlpResolver`; tests plug in scripted resolvers.

pub mod ytdlp;

use crate::download::error::DownloadError;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;

pub use ytdlp::YtDlpResolver;

/// One downloadable variant of a remote media resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatDescriptor {
    /// Opaque id understood by the resolver (e.g. "18", "140")
    pub format_id: String,
    /// Container / file extension (e.g. "mp4", "m4a")
    pub ext: String,
    /// Human-readable quality note (e.g. "360p", "medium")
    pub note: String,
    /// Estimated size in bytes, if the source reports one
    pub size_bytes: Option<u64>,
}

/// Result of a non-downloading lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatListing {
    /// Title as reported by the source (not sanitized)
    pub title: String,
    /// Formats in the order the source listed them
    pub formats: Vec<FormatDescriptor>,
}

/// Where a fetched file should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub dir: PathBuf,
    /// File name without extension; the resolver appends the real container
    pub stem: String,
}

impl DownloadTarget {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    /// Output template in yt-dlp syntax: `<dir>/<stem>.%(ext)s`
    pub fn output_template(&self) -> String {
        // `%` starts a yt-dlp field, escape literal ones coming from the title
        let stem = self.stem.replace('%', "%%");
        self.dir.join(format!("{}.%(ext)s", stem)).to_string_lossy().into_owned()
    }
}

/// A file fetched to local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub path: PathBuf,
    /// Container / extension of the file actually written
    pub ext: String,
    pub size_bytes: u64,
}

impl DownloadResult {
    /// Builds a result for an existing file, reading its size from disk.
    pub async fn from_path(path: &Path) -> Result<Self, DownloadError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| DownloadError::FileNotFound(format!("{}: {}", path.display(), e)))?;
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            ext,
            size_bytes: metadata.len(),
        })
    }
}

/// External component that inspects a URL and lists or fetches its formats.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Human-readable name of this resolver (e.g., "yt-dlp")
    fn name(&self) -> &str;

    /// Lists available formats without downloading anything.
    async fn list_formats(&self, url: &Url) -> Result<FormatListing, DownloadError>;

    /// Downloads one format into `target` and reports the resulting file.
    async fn fetch(&self, url: &Url, format_id: &str, target: &DownloadTarget) -> Result<DownloadResult, DownloadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_template() {
        let target = DownloadTarget::new("downloads", "Song-1a2b3c4d");
        assert_eq!(target.output_template(), "downloads/Song-1a2b3c4d.%(ext)s");
    }

    #[test]
    fn test_output_template_escapes_percent() {
        let target = DownloadTarget::new("downloads", "100% Pure");
        assert_eq!(target.output_template(), "downloads/100%% Pure.%(ext)s");
    }

    #[tokio::test]
    async fn test_download_result_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.MP4");
        tokio::fs::write(&path, b"12345").await.unwrap();

        let result = DownloadResult::from_path(&path).await.unwrap();
        assert_eq!(result.ext, "mp4");
        assert_eq!(result.size_bytes, 5);
        assert_eq!(result.path, path);
    }

    #[tokio::test]
    async fn test_download_result_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DownloadResult::from_path(&dir.path().join("nope.mp4")).await.unwrap_err();
        assert!(matches!(err, DownloadError::FileNotFound(_)));
    }
}
