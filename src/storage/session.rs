//! In-memory per-chat session store
//!
//! A session binds a resolved URL and its format catalog to the menu shown in
//! a chat, until the user picks a format. Nothing here survives a restart.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::ChatId;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

use crate::core::metrics::BotMetrics;
use crate::download::source::FormatDescriptor;

/// Pending format choice for one chat.
#[derive(Debug, Clone)]
pub struct Session {
    pub url: Url,
    /// Sanitized title, used for captions and file names
    pub title: String,
    /// Catalog keyed by format id
    pub formats: HashMap<String, FormatDescriptor>,
    pub created_at: Instant,
}

impl Session {
    /// Builds a session; on duplicate format ids the last descriptor wins.
    pub fn new(url: Url, title: impl Into<String>, formats: impl IntoIterator<Item = FormatDescriptor>) -> Self {
        Self {
            url,
            title: title.into(),
            formats: formats.into_iter().map(|f| (f.format_id.clone(), f)).collect(),
            created_at: Instant::now(),
        }
    }

    /// Exact-match lookup of a format id.
    pub fn format(&self, format_id: &str) -> Option<&FormatDescriptor> {
        self.formats.get(format_id)
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Process-wide map from chat id to its pending session.
///
/// Alongside the map the store keeps one async lock per chat. The format
/// selection flow holds that lock for a whole unit of work, so overlapping
/// updates for the same chat run one after another.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<ChatId, Session>,
    locks: DashMap<ChatId, Arc<Mutex<()>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a session, returning the one it replaced.
    pub fn put(&self, chat_id: ChatId, session: Session) -> Option<Session> {
        self.sessions.insert(chat_id, session)
    }

    pub fn get(&self, chat_id: ChatId) -> Option<Session> {
        self.sessions.get(&chat_id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, chat_id: ChatId) -> Option<Session> {
        self.sessions.remove(&chat_id).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Waits for exclusive access to one chat.
    pub async fn lock_chat(&self, chat_id: ChatId) -> OwnedMutexGuard<()> {
        // Clone the Arc out first: the map guard must not live across the await
        let lock = Arc::clone(self.locks.entry(chat_id).or_default().value());
        lock.lock_owned().await
    }

    /// Drops sessions older than `ttl` and per-chat locks nobody holds.
    ///
    /// Returns the number of sessions removed.
    pub fn purge_expired(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(ttl));
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before.saturating_sub(self.sessions.len())
    }

    /// Periodically purges abandoned sessions, keeping the live session
    /// gauge in step when metrics are given.
    pub fn spawn_cleanup_task(
        self: Arc<Self>,
        every: Duration,
        ttl: Duration,
        metrics: Option<Arc<BotMetrics>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = self.purge_expired(ttl);
                if removed > 0 {
                    log::info!("Session cleanup: removed {} abandoned session(s)", removed);
                }
                if let Some(metrics) = &metrics {
                    metrics.live_sessions.set(self.len() as i64);
                }
            }
        })
    }
}
