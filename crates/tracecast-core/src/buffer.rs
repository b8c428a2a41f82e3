//! Live render buffer: one per agent run and destination message.
//!
//! Events are folded into a [`RenderState`] as they arrive. Every change
//! attempts a render, but the edit only goes out when the render interval has
//! elapsed since the last one (leading-edge skip). Bursts between intervals
//! collapse into a single edit of the latest state; nothing is queued and no
//! timer is left running, so a host can drop the buffer at any point.
//!
//! A `final` event always forces a render. Hosts whose runs can end without
//! one should call [`RenderBuffer::finish`].

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::DisplayConfig;
use crate::event::DisplayEvent;
use crate::render::build_text;
use crate::sink::{EditOptions, MessageSink, MessageTarget, SinkError, SinkErrorKind};
use crate::state::RenderState;

/// What a render attempt ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The sink accepted the new text.
    Edited,
    /// Too soon after the previous edit.
    Throttled,
    /// Another edit was in flight; the state will show up in the next render.
    Busy,
    /// The text is identical to what the sink last accepted.
    Unchanged,
    /// The sink rejected the edit. Already logged; the run goes on.
    Failed,
}

/// Throttle bookkeeping. Only touched while holding the render lock.
#[derive(Debug, Default)]
struct RenderClock {
    last_render: Option<Instant>,
    /// Set from a rate-limit hint; no throttled render before this instant.
    not_before: Option<Instant>,
    last_text: Option<String>,
}

impl RenderClock {
    fn is_due(&self, now: Instant, interval: Duration) -> bool {
        self.last_render
            .is_none_or(|last| now.saturating_duration_since(last) >= interval)
            && self.not_before.is_none_or(|not_before| now >= not_before)
    }

    fn record_shown(&mut self, text: String) {
        self.last_render = Some(Instant::now());
        self.not_before = None;
        self.last_text = Some(text);
    }
}

pub struct RenderBuffer<S> {
    sink: S,
    target: MessageTarget,
    config: DisplayConfig,
    options: EditOptions,
    /// Never held across an await.
    state: Mutex<RenderState>,
    /// Serializes edits: at most one in flight per message.
    render: tokio::sync::Mutex<RenderClock>,
}

impl<S: MessageSink> RenderBuffer<S> {
    pub fn new(sink: S, target: MessageTarget, config: DisplayConfig) -> Self {
        Self {
            sink,
            target,
            config,
            options: EditOptions::default(),
            state: Mutex::new(RenderState::new()),
            render: tokio::sync::Mutex::new(RenderClock::default()),
        }
    }

    /// Folds `event` into the state and renders if the throttle allows.
    ///
    /// Never fails: display problems are logged and the run continues.
    pub async fn update(&self, event: DisplayEvent) {
        let force = event.is_final();
        let dirty = self.lock_state().apply(event);
        if dirty {
            self.render(force).await;
        }
    }

    /// Forces one last render of the latest state.
    pub async fn finish(&self) -> RenderOutcome {
        self.render(true).await
    }

    /// Attempts a render.
    ///
    /// A forced render ignores the interval and waits for an in-flight edit;
    /// an unforced one is dropped when an edit is already running.
    pub async fn render(&self, force: bool) -> RenderOutcome {
        let mut clock = if force {
            self.render.lock().await
        } else if let Ok(clock) = self.render.try_lock() {
            clock
        } else {
            debug!(target_message = %self.target, "edit in flight, coalescing");
            return RenderOutcome::Busy;
        };

        if !force && !clock.is_due(Instant::now(), self.config.render_interval()) {
            return RenderOutcome::Throttled;
        }

        let text = self.text();
        if clock.last_text.as_deref() == Some(text.as_str()) {
            return RenderOutcome::Unchanged;
        }

        match self.edit(&text).await {
            Ok(()) => {
                clock.record_shown(text);
                RenderOutcome::Edited
            }
            Err(err) => {
                self.record_failure(&mut clock, text, &err);
                RenderOutcome::Failed
            }
        }
    }

    /// Current message body, exactly as the next render would send it.
    pub fn text(&self) -> String {
        build_text(&self.lock_state(), &self.config)
    }

    async fn edit(&self, text: &str) -> Result<(), SinkError> {
        let edit = self.sink.edit_message(self.target, text, self.options);
        match self.config.edit_timeout() {
            Some(limit) => tokio::time::timeout(limit, edit)
                .await
                .unwrap_or_else(|_| Err(SinkError::timeout(limit))),
            None => edit.await,
        }
    }

    fn record_failure(&self, clock: &mut RenderClock, text: String, err: &SinkError) {
        // A failed attempt still counts against the interval.
        clock.last_render = Some(Instant::now());
        match err.kind {
            SinkErrorKind::NotModified => {
                debug!(target_message = %self.target, "message already up to date");
                clock.record_shown(text);
            }
            SinkErrorKind::RateLimited { retry_after } => {
                debug!(target_message = %self.target, ?retry_after, "edit rate limited");
                clock.not_before = retry_after.map(|delay| Instant::now() + delay);
            }
            SinkErrorKind::InvalidMarkup
            | SinkErrorKind::NotFound
            | SinkErrorKind::Api
            | SinkErrorKind::Transport
            | SinkErrorKind::Timeout => {
                warn!(target_message = %self.target, error = %err, "live display edit failed");
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RenderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
