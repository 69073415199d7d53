//! Delivery of fetched files back to the chat
//!
//! Applies the upload ceiling, picks audio or video presentation from the
//! container and always removes the local file afterwards.

use std::path::Path;
use teloxide::types::ChatId;

use crate::core::config;
use crate::core::error::FlowError;
use crate::core::validation::truncate_chars;
use crate::download::source::DownloadResult;
use crate::telegram::transport::ChatTransport;

/// How a file is presented in the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    Audio,
    Video,
}

impl DeliveryKind {
    /// Audio containers go out as audio, everything else as video.
    pub fn classify(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_lowercase();
        if config::download::AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            DeliveryKind::Audio
        } else {
            DeliveryKind::Video
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryKind::Audio => "audio",
            DeliveryKind::Video => "video",
        }
    }
}

/// Limits applied when sending a file
#[derive(Debug, Clone)]
pub struct DeliveryPolicy {
    pub max_size_bytes: u64,
    pub audio_title_max_chars: usize,
    pub performer: String,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: config::download::MAX_FILE_SIZE_BYTES,
            audio_title_max_chars: config::delivery::AUDIO_TITLE_MAX_CHARS,
            performer: config::delivery::AUDIO_PERFORMER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryPipeline {
    policy: DeliveryPolicy,
}

impl DeliveryPipeline {
    pub fn new(policy: DeliveryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &DeliveryPolicy {
        &self.policy
    }

    /// Sends a fetched file to `chat_id` and removes it from disk.
    ///
    /// Files above the ceiling are removed without being sent. Equal to the
    /// ceiling is still allowed.
    pub async fn deliver(
        &self,
        transport: &dyn ChatTransport,
        chat_id: ChatId,
        result: &DownloadResult,
        title: &str,
    ) -> Result<DeliveryKind, FlowError> {
        let size = match tokio::fs::metadata(&result.path).await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                log::warn!(
                    "Could not stat {} before sending, using reported size: {}",
                    result.path.display(),
                    e
                );
                result.size_bytes
            }
        };

        if size > self.policy.max_size_bytes {
            log::warn!(
                "File {} is {} bytes, above the {} byte limit; not sending",
                result.path.display(),
                size,
                self.policy.max_size_bytes
            );
            remove_file_quietly(&result.path).await;
            return Err(FlowError::TooLarge {
                size,
                limit: self.policy.max_size_bytes,
            });
        }

        let kind = DeliveryKind::classify(&result.ext);
        log::info!(
            "Sending {} ({} bytes) to chat {} as {}",
            result.path.display(),
            size,
            chat_id,
            kind.as_str()
        );

        let sent = match kind {
            DeliveryKind::Audio => {
                let audio_title = truncate_chars(title, self.policy.audio_title_max_chars);
                transport
                    .send_audio(chat_id, &result.path, audio_title, &self.policy.performer)
                    .await
            }
            DeliveryKind::Video => {
                transport
                    .send_video(chat_id, &result.path, &format!("🎬 {}", title))
                    .await
            }
        };

        remove_file_quietly(&result.path).await;

        match sent {
            Ok(()) => Ok(kind),
            Err(e) => {
                log::error!("Failed to send {} to chat {}: {}", kind.as_str(), chat_id, e);
                Err(FlowError::Delivery(e))
            }
        }
    }
}

/// Removes a file, logging failures other than "already gone".
pub async fn remove_file_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
    }
}
