//! Scripted media resolver
//!
//! Returns a fixed listing and writes a sparse file of a chosen size on
//! fetch, recording every call so tests can assert on what was (not) asked.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tubegrab::download::{DownloadError, DownloadResult, DownloadTarget, FormatDescriptor, FormatListing, MediaResolver};
use url::Url;

/// What `list_formats` answers
#[derive(Debug, Clone)]
pub enum ListScript {
    Listing(FormatListing),
    /// yt-dlp stderr to fail with
    Fail(String),
}

/// What `fetch` does
#[derive(Debug, Clone)]
pub enum FetchScript {
    /// Create `<stem>.<ext>` of `size` bytes in the target directory
    File { ext: String, size: u64 },
    /// yt-dlp stderr to fail with
    Fail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub url: String,
    pub format_id: String,
    pub stem: String,
}

pub struct ScriptedResolver {
    list: Mutex<ListScript>,
    fetch: Mutex<FetchScript>,
    fetch_delay: Duration,
    pub list_calls: Mutex<Vec<String>>,
    pub fetch_calls: Mutex<Vec<FetchCall>>,
}

pub fn format(id: &str, ext: &str, note: &str, size: Option<u64>) -> FormatDescriptor {
    FormatDescriptor {
        format_id: id.to_string(),
        ext: ext.to_string(),
        note: note.to_string(),
        size_bytes: size,
    }
}

/// Listing used by most tests: one video and one audio format
pub fn sample_listing() -> FormatListing {
    FormatListing {
        title: "Rick/Roll: Live".to_string(),
        formats: vec![
            format("18", "mp4", "360p", Some(52_428_800)),
            format("140", "m4a", "medium", Some(3_456_789)),
        ],
    }
}

impl ScriptedResolver {
    pub fn new(list: ListScript, fetch: FetchScript) -> Self {
        Self {
            list: Mutex::new(list),
            fetch: Mutex::new(fetch),
            fetch_delay: Duration::ZERO,
            list_calls: Mutex::new(Vec::new()),
            fetch_calls: Mutex::new(Vec::new()),
        }
    }

    /// Sample listing, fetch produces a small mp4
    pub fn video() -> Self {
        Self::new(
            ListScript::Listing(sample_listing()),
            FetchScript::File {
                ext: "mp4".into(),
                size: 1024,
            },
        )
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn set_listing(&self, listing: FormatListing) {
        *self.list.lock().unwrap() = ListScript::Listing(listing);
    }

    pub fn set_fetch(&self, fetch: FetchScript) {
        *self.fetch.lock().unwrap() = fetch;
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }

    pub fn fetches(&self) -> Vec<FetchCall> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaResolver for ScriptedResolver {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn list_formats(&self, url: &Url) -> Result<FormatListing, DownloadError> {
        self.list_calls.lock().unwrap().push(url.to_string());
        let script = self.list.lock().unwrap().clone();
        match script {
            ListScript::Listing(listing) => Ok(listing),
            ListScript::Fail(stderr) => Err(DownloadError::from_stderr(&stderr)),
        }
    }

    async fn fetch(&self, url: &Url, format_id: &str, target: &DownloadTarget) -> Result<DownloadResult, DownloadError> {
        self.fetch_calls.lock().unwrap().push(FetchCall {
            url: url.to_string(),
            format_id: format_id.to_string(),
            stem: target.stem.clone(),
        });
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        let script = self.fetch.lock().unwrap().clone();
        match script {
            FetchScript::File { ext, size } => {
                let path = target.dir.join(format!("{}.{}", target.stem, ext));
                let file = tokio::fs::File::create(&path)
                    .await
                    .map_err(|e| DownloadError::Other(e.to_string()))?;
                file.set_len(size).await.map_err(|e| DownloadError::Other(e.to_string()))?;
                DownloadResult::from_path(&path).await
            }
            FetchScript::Fail(stderr) => Err(DownloadError::from_stderr(&stderr)),
        }
    }
}
