//! Chat transport that records outgoing calls instead of talking to Telegram

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Mutex;
use teloxide::types::{ChatId, MessageId};
use tubegrab::core::{AppError, AppResult};
use tubegrab::telegram::{ChatTransport, ControlGrid, TextMarkup};

/// One outgoing call
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat: ChatId,
        id: MessageId,
        text: String,
        markup: TextMarkup,
    },
    Edit {
        chat: ChatId,
        id: MessageId,
        text: String,
        controls: Option<ControlGrid>,
    },
    Audio {
        chat: ChatId,
        file: PathBuf,
        title: String,
        performer: String,
        /// Whether the file existed when the upload was requested
        existed: bool,
    },
    Video {
        chat: ChatId,
        file: PathBuf,
        caption: String,
        existed: bool,
    },
    Ack {
        callback_id: String,
        text: String,
    },
}

#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Sent>>,
    next_id: AtomicI32,
    fail_uploads: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every audio/video upload fail from now on
    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Sent> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn uploads(&self) -> Vec<Sent> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Sent::Audio { .. } | Sent::Video { .. }))
            .collect()
    }

    /// Texts of plain sends and edits, in order
    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Sent::Text { text, .. } | Sent::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.texts().pop()
    }

    /// Controls attached by the most recent edit that had any
    pub fn last_controls(&self) -> Option<ControlGrid> {
        self.calls().into_iter().rev().find_map(|c| match c {
            Sent::Edit {
                controls: Some(controls),
                ..
            } => Some(controls),
            _ => None,
        })
    }

    fn upload_result(&self) -> AppResult<()> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::Transport("Request Entity Too Large".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(&self, chat_id: ChatId, text: &str, markup: TextMarkup) -> AppResult<MessageId> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.calls.lock().unwrap().push(Sent::Text {
            chat: chat_id,
            id,
            text: text.to_string(),
            markup,
        });
        Ok(id)
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        _markup: TextMarkup,
        controls: Option<&ControlGrid>,
    ) -> AppResult<()> {
        self.calls.lock().unwrap().push(Sent::Edit {
            chat: chat_id,
            id: message_id,
            text: text.to_string(),
            controls: controls.cloned(),
        });
        Ok(())
    }

    async fn send_audio(&self, chat_id: ChatId, file: &Path, title: &str, performer: &str) -> AppResult<()> {
        self.calls.lock().unwrap().push(Sent::Audio {
            chat: chat_id,
            file: file.to_path_buf(),
            title: title.to_string(),
            performer: performer.to_string(),
            existed: file.exists(),
        });
        self.upload_result()
    }

    async fn send_video(&self, chat_id: ChatId, file: &Path, caption: &str) -> AppResult<()> {
        self.calls.lock().unwrap().push(Sent::Video {
            chat: chat_id,
            file: file.to_path_buf(),
            caption: caption.to_string(),
            existed: file.exists(),
        });
        self.upload_result()
    }

    async fn acknowledge_selection(&self, callback_id: &str, text: &str) -> AppResult<()> {
        self.calls.lock().unwrap().push(Sent::Ack {
            callback_id: callback_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}
