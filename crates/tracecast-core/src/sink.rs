//! Destination for rendered text: anything that can edit a chat message by id.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// The message being kept up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageTarget {
    pub chat_id: i64,
    pub message_id: i64,
}

impl MessageTarget {
    pub fn new(chat_id: i64, message_id: i64) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }
}

impl fmt::Display for MessageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chat_id, self.message_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    Html,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
        }
    }
}

/// Formatting flags sent with every edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOptions {
    pub parse_mode: ParseMode,
    pub disable_link_preview: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            parse_mode: ParseMode::Html,
            disable_link_preview: true,
        }
    }
}

/// Why an edit was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkErrorKind {
    /// The new text equals what the message already shows.
    NotModified,
    /// The platform is throttling us; `retry_after` is its hint, when given.
    RateLimited { retry_after: Option<Duration> },
    /// The platform could not parse the markup.
    InvalidMarkup,
    /// Unknown chat or message id.
    NotFound,
    /// Any other rejection reported by the platform.
    Api,
    /// The request never got a usable response.
    Transport,
    /// The edit did not finish within the configured timeout.
    Timeout,
}

impl fmt::Display for SinkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkErrorKind::NotModified => write!(f, "not_modified"),
            SinkErrorKind::RateLimited { .. } => write!(f, "rate_limited"),
            SinkErrorKind::InvalidMarkup => write!(f, "invalid_markup"),
            SinkErrorKind::NotFound => write!(f, "not_found"),
            SinkErrorKind::Api => write!(f, "api_error"),
            SinkErrorKind::Transport => write!(f, "transport"),
            SinkErrorKind::Timeout => write!(f, "timeout"),
        }
    }
}

/// Structured failure from a [`MessageSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    pub kind: SinkErrorKind,
    /// One-line summary, usually the platform's own description.
    pub message: String,
}

impl SinkError {
    pub fn new(kind: SinkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_modified(message: impl Into<String>) -> Self {
        Self::new(SinkErrorKind::NotModified, message)
    }

    pub fn rate_limited(retry_after: Option<Duration>, message: impl Into<String>) -> Self {
        Self::new(SinkErrorKind::RateLimited { retry_after }, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(SinkErrorKind::Transport, message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            SinkErrorKind::Timeout,
            format!("edit timed out after {}s", after.as_secs_f64()),
        )
    }

    /// Expected rejections that only mean "the display did not change this time".
    pub fn is_transient(&self) -> bool {
        match self.kind {
            SinkErrorKind::NotModified | SinkErrorKind::RateLimited { .. } => true,
            SinkErrorKind::InvalidMarkup
            | SinkErrorKind::NotFound
            | SinkErrorKind::Api
            | SinkErrorKind::Transport
            | SinkErrorKind::Timeout => false,
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SinkError {}

pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Edits an existing message in place.
pub trait MessageSink: Send + Sync {
    fn edit_message(
        &self,
        target: MessageTarget,
        text: &str,
        options: EditOptions,
    ) -> impl Future<Output = SinkResult<()>> + Send;
}

impl<T: MessageSink> MessageSink for Arc<T> {
    fn edit_message(
        &self,
        target: MessageTarget,
        text: &str,
        options: EditOptions,
    ) -> impl Future<Output = SinkResult<()>> + Send {
        (**self).edit_message(target, text, options)
    }
}

impl<T: MessageSink> MessageSink for &T {
    fn edit_message(
        &self,
        target: MessageTarget,
        text: &str,
        options: EditOptions,
    ) -> impl Future<Output = SinkResult<()>> + Send {
        (**self).edit_message(target, text, options)
    }
}
