//! Agent lifecycle events consumed by the live display.
//!
//! Producers emit JSON objects discriminated by a `status` field. Statuses this
//! crate does not know deserialize to [`DisplayEvent::Unknown`] and are ignored,
//! so a newer producer never breaks an older renderer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step of an agent run, as seen by the display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DisplayEvent {
    /// Incremental reasoning text.
    Thinking {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },

    /// The agent is invoking a tool.
    ToolUse {
        #[serde(default)]
        tool: String,
        #[serde(default)]
        args: Value,
    },

    /// Output returned by the last tool call.
    Observation {
        #[serde(default)]
        result: Value,
    },

    /// Incremental chunk of the final answer.
    FinalStream {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },

    /// Complete final answer. Replaces anything streamed before it.
    Final {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },

    /// Any status this version does not understand.
    #[serde(other)]
    Unknown,
}

impl DisplayEvent {
    pub fn thinking(content: impl Into<String>) -> Self {
        Self::Thinking {
            content: Some(content.into()),
        }
    }

    pub fn tool_use(tool: impl Into<String>, args: Value) -> Self {
        Self::ToolUse {
            tool: tool.into(),
            args,
        }
    }

    pub fn observation(result: impl Into<Value>) -> Self {
        Self::Observation {
            result: result.into(),
        }
    }

    pub fn final_stream(content: impl Into<String>) -> Self {
        Self::FinalStream {
            content: Some(content.into()),
        }
    }

    pub fn final_answer(content: impl Into<String>) -> Self {
        Self::Final {
            content: Some(content.into()),
        }
    }

    /// Parses one JSON-lines record.
    ///
    /// # Errors
    /// Returns an error if the line is not a JSON object with a `status` field.
    pub fn from_json_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    /// True for the event that closes a run and must always reach the sink.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Final { .. })
    }
}

/// Flattens a tool argument or result into display text.
///
/// Strings are shown verbatim, `null` as nothing, everything else as compact JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
