//! Live, rate-limited rendering of an agent's trace into one chat message.
//!
//! Feed [`DisplayEvent`]s into a [`RenderBuffer`]; it keeps the run log,
//! assembles a bounded HTML document and edits the destination message
//! through a [`MessageSink`] no more often than the configured interval.

pub mod buffer;
pub mod config;
pub mod event;
pub mod render;
pub mod sink;
pub mod state;

pub use buffer::{RenderBuffer, RenderOutcome};
pub use config::{Config, DisplayConfig, TelegramConfig};
pub use event::DisplayEvent;
pub use sink::{
    EditOptions, MessageSink, MessageTarget, ParseMode, SinkError, SinkErrorKind, SinkResult,
};
pub use state::{LogEntry, RenderState};
