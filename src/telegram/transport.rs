//! Outbound chat calls used by the format selection flow
//!
//! `ChatTransport` is the seam between the protocol and Telegram: the flow
//! and the delivery pipeline only talk to this trait, `TelegramTransport`
//! implements it over a teloxide `Bot`.

use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId, ParseMode};

use crate::core::error::AppResult;

/// How the text of a message should be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMarkup {
    Plain,
    Html,
}

/// One selectable control: the label shown and the payload sent back on tap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlButton {
    pub label: String,
    pub payload: String,
}

/// Rows of controls, rendered as an inline keyboard
pub type ControlGrid = Vec<Vec<ControlButton>>;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a text message and returns its id for later edits.
    async fn send_text(&self, chat_id: ChatId, text: &str, markup: TextMarkup) -> AppResult<MessageId>;

    /// Replaces the text of an earlier message, optionally attaching controls.
    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        markup: TextMarkup,
        controls: Option<&ControlGrid>,
    ) -> AppResult<()>;

    async fn send_audio(&self, chat_id: ChatId, file: &Path, title: &str, performer: &str) -> AppResult<()>;

    async fn send_video(&self, chat_id: ChatId, file: &Path, caption: &str) -> AppResult<()>;

    /// Answers a button tap with a short notice shown by the client.
    async fn acknowledge_selection(&self, callback_id: &str, text: &str) -> AppResult<()>;
}

/// Converts a control grid into a Telegram inline keyboard.
pub fn inline_keyboard(controls: &ControlGrid) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(controls.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.payload.clone()))
            .collect::<Vec<_>>()
    }))
}

/// Telegram implementation of [`ChatTransport`].
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, chat_id: ChatId, text: &str, markup: TextMarkup) -> AppResult<MessageId> {
        let mut request = self.bot.send_message(chat_id, text);
        if markup == TextMarkup::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        let message = request.await?;
        Ok(message.id)
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        markup: TextMarkup,
        controls: Option<&ControlGrid>,
    ) -> AppResult<()> {
        let mut request = self.bot.edit_message_text(chat_id, message_id, text);
        if markup == TextMarkup::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(controls) = controls {
            request = request.reply_markup(inline_keyboard(controls));
        }
        request.await?;
        Ok(())
    }

    async fn send_audio(&self, chat_id: ChatId, file: &Path, title: &str, performer: &str) -> AppResult<()> {
        self.bot
            .send_audio(chat_id, InputFile::file(file.to_path_buf()))
            .title(title)
            .performer(performer)
            .await?;
        Ok(())
    }

    async fn send_video(&self, chat_id: ChatId, file: &Path, caption: &str) -> AppResult<()> {
        self.bot
            .send_video(chat_id, InputFile::file(file.to_path_buf()))
            .caption(caption)
            .await?;
        Ok(())
    }

    async fn acknowledge_selection(&self, callback_id: &str, text: &str) -> AppResult<()> {
        self.bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()))
            .text(text)
            .await?;
        Ok(())
    }
}
