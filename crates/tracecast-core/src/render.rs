//! Pure assembly of the live message body.
//!
//! The output is Telegram-flavoured HTML: a `<blockquote>` holding the run log
//! followed by the final answer as escaped plain text. All lengths are counted
//! in characters, never bytes.

use crate::config::DisplayConfig;
use crate::state::{LogEntry, RenderState};

/// Sent instead of an empty body, which the sink would reject.
pub const PLACEHOLDER: &str = "...";

/// Prefix shown when old log lines were dropped to respect the log cap.
pub const EARLIER_LOGS_MARKER: &str = "...(earlier logs)...\n";

const TRUNCATION_MARKER: &str = "...";
const LOG_OPEN: &str = "<blockquote>";
const LOG_CLOSE: &str = "</blockquote>\n\n";

/// Escapes the three characters that carry meaning in Telegram HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Builds the full message body for `state`.
///
/// Deterministic: identical state and limits always produce identical text.
pub fn build_text(state: &RenderState, limits: &DisplayConfig) -> String {
    let mut blocks: Vec<Block> = state
        .logs()
        .iter()
        .map(|entry| Block::for_entry(entry, limits.result_preview_chars))
        .collect();

    let pending = state.pending_thought();
    if !pending.is_empty() {
        blocks.push(Block::new("🧠 <i>Thinking...</i> ", pending, "\n"));
    }

    let overhead = char_len(LOG_OPEN) + char_len(LOG_CLOSE) + char_len(EARLIER_LOGS_MARKER);
    let log_cap = limits
        .max_log_chars
        .min(limits.max_message_chars.saturating_sub(overhead));
    let log_section = fit_log_section(&blocks, log_cap);

    let mut text = String::new();
    if !log_section.is_empty() {
        text.push_str(LOG_OPEN);
        text.push_str(&log_section);
        text.push_str(LOG_CLOSE);
    }

    let answer_budget = limits.max_message_chars.saturating_sub(char_len(&text));
    text.push_str(&fit_head(&state.final_answer(), answer_budget));

    if text.is_empty() {
        return PLACEHOLDER.to_string();
    }
    text
}

/// One rendered log line: fixed markup around escaped free text.
struct Block {
    open: &'static str,
    body: String,
    close: &'static str,
}

impl Block {
    fn new(open: &'static str, body: String, close: &'static str) -> Self {
        Self { open, body, close }
    }

    fn for_entry(entry: &LogEntry, preview_chars: usize) -> Self {
        match entry {
            LogEntry::Thought(text) => Self::new("🧠 <i>Thought:</i> ", text.clone(), "\n\n"),
            LogEntry::ToolCall { name, args } => Self::new(
                "🛠 <b>Exec:</b> <code>",
                format!("{name}({args})"),
                "</code>\n",
            ),
            LogEntry::ToolResult(result) => Self::new(
                "✅ <b>Result:</b> ",
                preview(result, preview_chars),
                "\n\n",
            ),
        }
    }

    fn render(&self) -> String {
        format!("{}{}{}", self.open, escape_html(&self.body), self.close)
    }

    /// Renders the block within `budget` characters by dropping the oldest
    /// body characters. Cutting happens before escaping so no entity is split.
    /// `None` when not even the markup fits.
    fn render_tail(&self, budget: usize) -> Option<String> {
        let frame = char_len(self.open) + char_len(self.close);
        let body_budget = budget.checked_sub(frame)?;

        let mut used = 0;
        let mut start = self.body.len();
        for (idx, ch) in self.body.char_indices().rev() {
            used += escaped_len(ch);
            if used > body_budget {
                break;
            }
            start = idx;
        }
        Some(format!(
            "{}{}{}",
            self.open,
            escape_html(&self.body[start..]),
            self.close
        ))
    }
}

/// Keeps the newest log lines that fit in `cap` characters.
///
/// Whole lines are dropped from the front so markup stays balanced. If even
/// the newest line is too long on its own, its text is cut from the front.
fn fit_log_section(blocks: &[Block], cap: usize) -> String {
    let rendered: Vec<String> = blocks.iter().map(Block::render).collect();
    let total: usize = rendered.iter().map(|block| char_len(block)).sum();
    if total <= cap {
        return rendered.concat();
    }

    let mut used = 0;
    let mut kept = 0;
    for block in rendered.iter().rev() {
        let len = char_len(block);
        if used + len > cap {
            break;
        }
        used += len;
        kept += 1;
    }

    let recent = match (kept, blocks.last()) {
        (0, Some(newest)) => match newest.render_tail(cap) {
            Some(tail) => tail,
            None => return String::new(),
        },
        _ => rendered[rendered.len() - kept..].concat(),
    };
    format!("{EARLIER_LOGS_MARKER}{recent}")
}

/// Escapes `text`, keeping its beginning within `budget` characters.
fn fit_head(text: &str, budget: usize) -> String {
    let escaped = escape_html(text);
    if char_len(&escaped) <= budget {
        return escaped;
    }
    let Some(body_budget) = budget.checked_sub(char_len(TRUNCATION_MARKER)) else {
        return String::new();
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, ch) in text.char_indices() {
        used += escaped_len(ch);
        if used > body_budget {
            break;
        }
        end = idx + ch.len_utf8();
    }
    format!("{}{TRUNCATION_MARKER}", escape_html(&text[..end]))
}

/// Cuts a tool result to `limit` characters, appending `...` when cut.
fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Width of `ch` once escaped by [`escape_html`].
fn escaped_len(ch: char) -> usize {
    match ch {
        '&' => "&amp;".len(),
        '<' | '>' => "&lt;".len(),
        _ => 1,
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
