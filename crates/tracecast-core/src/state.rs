//! Accumulated display state for one agent run.

use crate::event::{DisplayEvent, value_text};

/// A committed line of the run log. Never modified once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Thought(String),
    ToolCall { name: String, args: String },
    ToolResult(String),
}

/// Everything the renderer needs to draw the message.
///
/// `pending_thought` holds reasoning fragments that have not been committed
/// to `logs` yet. It is only non-empty while the latest state-changing event
/// was a `thinking` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    logs: Vec<LogEntry>,
    pending_thought: Vec<String>,
    final_answer: Vec<String>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the state.
    ///
    /// Returns `true` when the visible state changed and a render is due.
    pub fn apply(&mut self, event: DisplayEvent) -> bool {
        match event {
            DisplayEvent::Thinking { content } => match content {
                Some(content) if !content.is_empty() => {
                    self.pending_thought.push(content);
                    true
                }
                _ => false,
            },
            DisplayEvent::ToolUse { tool, args } => {
                self.flush_thought();
                self.logs.push(LogEntry::ToolCall {
                    name: tool,
                    args: value_text(&args),
                });
                true
            }
            // Observations do not flush: reasoning may continue across a tool boundary.
            DisplayEvent::Observation { result } => {
                self.logs.push(LogEntry::ToolResult(value_text(&result)));
                true
            }
            DisplayEvent::FinalStream { content } => {
                let flushed = self.flush_thought();
                match content {
                    Some(content) if !content.is_empty() => {
                        self.final_answer.push(content);
                        true
                    }
                    _ => flushed,
                }
            }
            DisplayEvent::Final { content } => {
                self.flush_thought();
                self.final_answer = content
                    .filter(|content| !content.is_empty())
                    .into_iter()
                    .collect();
                true
            }
            DisplayEvent::Unknown => false,
        }
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Reasoning text received since the last flush.
    pub fn pending_thought(&self) -> String {
        self.pending_thought.concat()
    }

    pub fn final_answer(&self) -> String {
        self.final_answer.concat()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty() && self.pending_thought.is_empty() && self.final_answer.is_empty()
    }

    fn flush_thought(&mut self) -> bool {
        if self.pending_thought.is_empty() {
            return false;
        }
        let thought = std::mem::take(&mut self.pending_thought).concat();
        self.logs.push(LogEntry::Thought(thought));
        true
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn state_from(events: impl IntoIterator<Item = DisplayEvent>) -> RenderState {
        let mut state = RenderState::new();
        for event in events {
            state.apply(event);
        }
        state
    }

    #[test]
    fn test_thinking_accumulates_without_logging() {
        let state = state_from([
            DisplayEvent::thinking("Let me "),
            DisplayEvent::thinking("check "),
            DisplayEvent::thinking("the docs."),
        ]);

        assert!(state.logs().is_empty());
        assert_eq!(state.pending_thought(), "Let me check the docs.");
    }

    #[test]
    fn test_tool_use_flushes_pending_thought() {
        let state = state_from([
            DisplayEvent::thinking("need "),
            DisplayEvent::thinking("search"),
            DisplayEvent::tool_use("search", json!({"q": "tokio"})),
        ]);

        assert_eq!(
            state.logs(),
            &[
                LogEntry::Thought("need search".to_string()),
                LogEntry::ToolCall {
                    name: "search".to_string(),
                    args: r#"{"q":"tokio"}"#.to_string(),
                },
            ]
        );
        assert!(state.pending_thought().is_empty());
    }

    #[test]
    fn test_final_stream_and_final_flush_pending_thought() {
        for closing in [
            DisplayEvent::final_stream("answer"),
            DisplayEvent::final_answer("answer"),
        ] {
            let state = state_from([DisplayEvent::thinking("almost"), closing]);
            assert_eq!(state.logs(), &[LogEntry::Thought("almost".to_string())]);
            assert!(state.pending_thought().is_empty());
            assert_eq!(state.final_answer(), "answer");
        }
    }

    #[test]
    fn test_observation_keeps_pending_thought() {
        let state = state_from([
            DisplayEvent::thinking("still thinking"),
            DisplayEvent::observation("result"),
        ]);

        assert_eq!(state.logs(), &[LogEntry::ToolResult("result".to_string())]);
        assert_eq!(state.pending_thought(), "still thinking");
    }

    #[test]
    fn test_final_replaces_streamed_answer() {
        let state = state_from([
            DisplayEvent::final_stream("a"),
            DisplayEvent::final_stream("b"),
            DisplayEvent::final_answer("c"),
        ]);
        assert_eq!(state.final_answer(), "c");
    }

    #[test]
    fn test_final_without_content_clears_answer() {
        let state = state_from([
            DisplayEvent::final_stream("partial"),
            DisplayEvent::Final { content: None },
        ]);
        assert_eq!(state.final_answer(), "");
    }

    #[test]
    fn test_noop_events_do_not_mark_dirty() {
        let mut state = RenderState::new();
        assert!(!state.apply(DisplayEvent::Unknown));
        assert!(!state.apply(DisplayEvent::Thinking { content: None }));
        assert!(!state.apply(DisplayEvent::thinking("")));
        assert!(!state.apply(DisplayEvent::FinalStream { content: None }));
        assert!(state.is_empty());
    }

    #[test]
    fn test_empty_final_stream_still_flushes() {
        let mut state = RenderState::new();
        state.apply(DisplayEvent::thinking("t"));
        assert!(state.apply(DisplayEvent::final_stream("")));
        assert_eq!(state.logs(), &[LogEntry::Thought("t".to_string())]);
    }

    #[test]
    fn test_logs_keep_arrival_order() {
        let state = state_from([
            DisplayEvent::tool_use("read", json!("a.txt")),
            DisplayEvent::observation("contents"),
            DisplayEvent::thinking("next"),
            DisplayEvent::tool_use("write", json!("b.txt")),
        ]);

        let kinds: Vec<&str> = state
            .logs()
            .iter()
            .map(|entry| match entry {
                LogEntry::Thought(_) => "thought",
                LogEntry::ToolCall { .. } => "call",
                LogEntry::ToolResult(_) => "result",
            })
            .collect();
        assert_eq!(kinds, ["call", "result", "thought", "call"]);
    }
}
