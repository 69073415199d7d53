//! Two-step format selection protocol
//!
//! A chat is idle until it sends a supported URL. The flow then lists the
//! formats, stores a session and shows one button per format. A tap on a
//! button fetches that format, hands the file to the delivery pipeline and
//! drops the session whatever happened.
//!
//! Each unit of work runs under the chat's lock from [`SessionStore`], so two
//! overlapping updates for one chat are handled one after the other.

use std::path::PathBuf;
use std::sync::Arc;
use teloxide::types::{ChatId, MessageId};
use url::Url;
use uuid::Uuid;

use crate::core::config;
use crate::core::error::FlowError;
use crate::core::metrics::BotMetrics;
use crate::core::validation::{parse_source_url, sanitize_title, truncate_bytes};
use crate::download::delivery::{DeliveryKind, DeliveryPipeline};
use crate::download::source::{DownloadTarget, MediaResolver};
use crate::storage::session::{Session, SessionStore};
use crate::telegram::keyboard::format_controls;
use crate::telegram::messages;
use crate::telegram::transport::{ChatTransport, TextMarkup};

pub struct FormatSelectionFlow {
    sessions: Arc<SessionStore>,
    resolver: Arc<dyn MediaResolver>,
    transport: Arc<dyn ChatTransport>,
    download_dir: PathBuf,
    delivery: DeliveryPipeline,
    metrics: Option<Arc<BotMetrics>>,
}

impl FormatSelectionFlow {
    pub fn new(
        sessions: Arc<SessionStore>,
        resolver: Arc<dyn MediaResolver>,
        transport: Arc<dyn ChatTransport>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sessions,
            resolver,
            transport,
            download_dir: download_dir.into(),
            delivery: DeliveryPipeline::default(),
            metrics: None,
        }
    }

    pub fn with_delivery(mut self, delivery: DeliveryPipeline) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<BotMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Replies to `/start`.
    pub async fn on_start(&self, chat_id: ChatId) {
        self.send_plain(chat_id, messages::GREETING).await;
    }

    /// Replies to `/help`.
    pub async fn on_help(&self, chat_id: ChatId) {
        self.send_plain(chat_id, messages::HELP).await;
    }

    /// Handles a text message that may be a media URL.
    ///
    /// On success the chat has a pending session and a menu; returns the
    /// number of formats in the catalog. Errors have already been reported
    /// to the chat when this returns.
    pub async fn on_url(&self, chat_id: ChatId, text: &str) -> Result<usize, FlowError> {
        let _guard = self.sessions.lock_chat(chat_id).await;

        let url = match parse_source_url(text) {
            Ok(url) => url,
            Err(e) => {
                log::info!("Chat {}: ignoring non-source text: {}", chat_id, e);
                let err = FlowError::InvalidUrl(e.to_string());
                self.report(chat_id, None, &err).await;
                return Err(err);
            }
        };

        let status = match self
            .transport
            .send_text(chat_id, messages::FETCHING_FORMATS, TextMarkup::Plain)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                log::error!("Chat {}: failed to send status message: {}", chat_id, e);
                let err = FlowError::Delivery(e);
                self.record_error(&err);
                return Err(err);
            }
        };

        match self.open_session(chat_id, url, status).await {
            Ok(count) => Ok(count),
            Err(err) => {
                self.report(chat_id, Some(status), &err).await;
                Err(err)
            }
        }
    }

    async fn open_session(&self, chat_id: ChatId, url: Url, status: MessageId) -> Result<usize, FlowError> {
        log::info!("Chat {}: listing formats for {} via {}", chat_id, url, self.resolver.name());

        let listing = match self.resolver.list_formats(&url).await {
            Ok(listing) if listing.formats.is_empty() => {
                self.record_lookup("error");
                return Err(FlowError::Resolution("no downloadable formats".into()));
            }
            Ok(listing) => listing,
            Err(e) => {
                self.record_lookup("error");
                return Err(FlowError::Resolution(e));
            }
        };
        self.record_lookup("ok");

        let title = sanitize_title(&listing.title);
        let controls = format_controls(&listing.formats);
        let session = Session::new(url, title.clone(), listing.formats);
        let count = session.formats.len();

        if let Some(previous) = self.sessions.put(chat_id, session) {
            log::info!(
                "Chat {}: new link replaces pending menu for {} ({} formats)",
                chat_id,
                previous.url,
                previous.formats.len()
            );
        }
        self.update_session_gauge();

        if let Err(e) = self
            .transport
            .edit_text(
                chat_id,
                status,
                &messages::formats_header(&title),
                TextMarkup::Html,
                Some(&controls),
            )
            .await
        {
            log::error!("Chat {}: failed to show format menu: {}", chat_id, e);
            self.sessions.remove(chat_id);
            self.update_session_gauge();
            return Err(FlowError::Delivery(e));
        }

        log::info!("Chat {}: awaiting selection among {} formats of '{}'", chat_id, count, title);
        Ok(count)
    }

    /// Handles a tap on a format button, answering the tap first.
    ///
    /// The notice goes out before waiting for the chat lock, so the client
    /// stops its spinner even while an earlier download is still running.
    pub async fn on_button_press(
        &self,
        chat_id: ChatId,
        callback_id: &str,
        format_id: &str,
    ) -> Result<DeliveryKind, FlowError> {
        if let Err(e) = self
            .transport
            .acknowledge_selection(callback_id, messages::DOWNLOADING_NOTICE)
            .await
        {
            log::warn!("Chat {}: failed to answer button tap: {}", chat_id, e);
        }
        self.on_selection(chat_id, format_id).await
    }

    /// Handles a format selection.
    ///
    /// Once a fetch has been attempted the session is gone, so a second tap
    /// on the same menu ends with [`FlowError::SessionExpired`].
    pub async fn on_selection(&self, chat_id: ChatId, format_id: &str) -> Result<DeliveryKind, FlowError> {
        let _guard = self.sessions.lock_chat(chat_id).await;

        let result = self.fetch_and_deliver(chat_id, format_id).await;
        match &result {
            Ok(kind) => {
                log::info!("Chat {}: delivered format {} as {}", chat_id, format_id, kind.as_str());
                if let Some(metrics) = &self.metrics {
                    metrics.deliveries.with_label_values(&[kind.as_str()]).inc();
                }
            }
            Err(err) => self.report(chat_id, None, err).await,
        }
        result
    }

    async fn fetch_and_deliver(&self, chat_id: ChatId, format_id: &str) -> Result<DeliveryKind, FlowError> {
        let session = self.sessions.get(chat_id).ok_or(FlowError::SessionExpired)?;

        if session.format(format_id).is_none() {
            return Err(FlowError::FormatInvalid(format_id.to_string()));
        }

        // Any fetch attempt consumes the session
        self.sessions.remove(chat_id);
        self.update_session_gauge();

        let target = DownloadTarget::new(&self.download_dir, file_stem(&session.title));
        log::info!(
            "Chat {}: fetching format {} of {} into {}",
            chat_id,
            format_id,
            session.url,
            target.output_template()
        );

        let fetched = self
            .resolver
            .fetch(&session.url, format_id, &target)
            .await
            .map_err(FlowError::Fetch)?;

        self.delivery
            .deliver(self.transport.as_ref(), chat_id, &fetched, &session.title)
            .await
    }

    /// Tells the chat what went wrong, editing `status` when there is one.
    async fn report(&self, chat_id: ChatId, status: Option<MessageId>, err: &FlowError) {
        log::warn!("Chat {}: {} ({})", chat_id, err, err.category());
        self.record_error(err);

        let text = messages::flow_error_text(err);
        let sent = match status {
            Some(message_id) => self
                .transport
                .edit_text(chat_id, message_id, &text, TextMarkup::Html, None)
                .await,
            None => self.transport.send_text(chat_id, &text, TextMarkup::Html).await.map(|_| ()),
        };
        if let Err(e) = sent {
            log::error!("Chat {}: failed to report error to user: {}", chat_id, e);
        }
    }

    async fn send_plain(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.transport.send_text(chat_id, text, TextMarkup::Plain).await {
            log::error!("Chat {}: failed to send message: {}", chat_id, e);
        }
    }

    fn record_lookup(&self, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.format_lookups.with_label_values(&[outcome]).inc();
        }
    }

    fn record_error(&self, err: &FlowError) {
        if let Some(metrics) = &self.metrics {
            metrics.flow_errors.with_label_values(&[err.category()]).inc();
        }
    }

    fn update_session_gauge(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.live_sessions.set(self.sessions.len() as i64);
        }
    }
}

/// File stem for one download: title plus a short random request id.
fn file_stem(title: &str) -> String {
    let request_id = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}",
        truncate_bytes(title, config::download::FILE_STEM_TITLE_MAX_BYTES),
        &request_id[..8]
    )
}
