//! Telegram Bot API sink for tracecast.
//!
//! [`TelegramClient`] edits the live message with `editMessageText` and maps
//! Telegram's error replies onto [`SinkErrorKind`] so the render buffer can
//! tell expected rejections (not modified, flood control) from real failures.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracecast_core::config::{Config, TelegramConfig};
use tracecast_core::sink::{
    EditOptions, MessageSink, MessageTarget, SinkError, SinkErrorKind, SinkResult,
};
use tracing::debug;

mod types;

pub use types::Message;
use types::{
    EditMessageTextRequest, LinkPreviewOptions, SendMessageRequest, TelegramResponse,
};

pub struct TelegramSettings {
    pub bot_token: String,
    pub base_url: String,
}

impl TelegramSettings {
    /// # Errors
    /// Returns an error if no bot token is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let Some(bot_token) = config.telegram.effective_bot_token() else {
            bail!(
                "telegram.bot_token or {} is required",
                TelegramConfig::TOKEN_ENV
            );
        };
        Ok(Self {
            bot_token,
            base_url: config.telegram.effective_base_url().to_string(),
        })
    }
}

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn with_base_url(token: String, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_settings(settings: TelegramSettings) -> Self {
        Self::with_base_url(settings.bot_token, settings.base_url)
    }

    /// Sends a new message and returns its id.
    ///
    /// # Errors
    /// Returns an error if Telegram rejects the message or is unreachable.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<i64> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: None,
            reply_to_message_id,
        };
        let message: Message = self
            .post("sendMessage", &request)
            .await
            .with_context(|| format!("Failed to send message to chat {chat_id}"))?;
        Ok(message.message_id)
    }

    /// Replaces the text of an existing message.
    ///
    /// # Errors
    /// Returns a classified [`SinkError`] on any rejection.
    pub async fn edit_message_text(
        &self,
        target: MessageTarget,
        text: &str,
        options: EditOptions,
    ) -> SinkResult<()> {
        let request = EditMessageTextRequest {
            chat_id: target.chat_id,
            message_id: target.message_id,
            text,
            parse_mode: options.parse_mode.as_str(),
            link_preview_options: LinkPreviewOptions {
                is_disabled: options.disable_link_preview,
            },
        };
        // Bot messages return the edited Message, inline messages return `true`.
        let _: Value = self.post("editMessageText", &request).await?;
        Ok(())
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &str,
        body: &B,
    ) -> SinkResult<T> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                SinkError::transport(format!("Telegram request failed: {}", err.without_url()))
            })?;

        let status = response.status();
        let payload: TelegramResponse<T> = response.json().await.map_err(|err| {
            SinkError::transport(format!(
                "Failed to decode Telegram response (HTTP {status}): {}",
                err.without_url()
            ))
        })?;

        if !payload.ok {
            let description = payload
                .description
                .unwrap_or_else(|| "Telegram API error".to_string());
            let retry_after = payload.parameters.and_then(|params| params.retry_after);
            debug!(method, status = %status, %description, "Telegram rejected request");
            return Err(classify_error(payload.error_code, &description, retry_after));
        }

        payload
            .result
            .ok_or_else(|| SinkError::transport("Telegram response is missing `result`"))
    }
}

impl MessageSink for TelegramClient {
    async fn edit_message(
        &self,
        target: MessageTarget,
        text: &str,
        options: EditOptions,
    ) -> SinkResult<()> {
        self.edit_message_text(target, text, options).await
    }
}

/// Maps a Telegram error reply onto a sink error kind.
fn classify_error(error_code: Option<i64>, description: &str, retry_after: Option<u64>) -> SinkError {
    let lowered = description.to_lowercase();
    let kind = if error_code == Some(429) || lowered.contains("too many requests") {
        SinkErrorKind::RateLimited {
            retry_after: retry_after.map(Duration::from_secs),
        }
    } else if lowered.contains("message is not modified") {
        SinkErrorKind::NotModified
    } else if lowered.contains("can't parse entities") {
        SinkErrorKind::InvalidMarkup
    } else if lowered.contains("not found") {
        SinkErrorKind::NotFound
    } else {
        SinkErrorKind::Api
    };
    SinkError::new(kind, description)
}
