//! Test environment: a flow wired to fakes and a temporary download folder

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use teloxide::types::ChatId;
use tubegrab::core::metrics::BotMetrics;
use tubegrab::download::{DeliveryPipeline, DeliveryPolicy};
use tubegrab::storage::SessionStore;
use tubegrab::telegram::FormatSelectionFlow;

use super::recorder::RecordingTransport;
use crate::mocks::ScriptedResolver;

pub const CHAT: ChatId = ChatId(123_456_789);

pub struct TestEnvironment {
    pub flow: Arc<FormatSelectionFlow>,
    pub sessions: Arc<SessionStore>,
    pub resolver: Arc<ScriptedResolver>,
    pub transport: Arc<RecordingTransport>,
    pub metrics: Arc<BotMetrics>,
    /// Keeps the download folder alive for the test
    pub download_dir: TempDir,
}

impl TestEnvironment {
    pub fn new(resolver: ScriptedResolver) -> Self {
        Self::with_policy(resolver, DeliveryPolicy::default())
    }

    pub fn with_policy(resolver: ScriptedResolver, policy: DeliveryPolicy) -> Self {
        let download_dir = tempfile::tempdir().expect("tempdir");
        let sessions = Arc::new(SessionStore::new());
        let resolver = Arc::new(resolver);
        let transport = Arc::new(RecordingTransport::new());
        let metrics = Arc::new(BotMetrics::new().expect("metrics"));

        let flow = FormatSelectionFlow::new(
            Arc::clone(&sessions),
            resolver.clone(),
            transport.clone(),
            download_dir.path(),
        )
        .with_delivery(DeliveryPipeline::new(policy))
        .with_metrics(Arc::clone(&metrics));

        Self {
            flow: Arc::new(flow),
            sessions,
            resolver,
            transport,
            metrics,
            download_dir,
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.download_dir.path().to_path_buf()
    }

    /// Number of files left in the download folder
    pub fn files_left(&self) -> usize {
        std::fs::read_dir(self.download_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
