//! JSON-lines event input shared by `replay` and `preview`.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracecast_core::DisplayEvent;
use tracing::warn;

type BoxedInput = Box<dyn AsyncRead + Unpin + Send>;

/// Reads one event per line, as the producer writes them.
///
/// Blank lines are skipped. Lines that are not valid events are logged and
/// skipped so one bad record never ends a replay.
pub struct EventReader {
    lines: Lines<BufReader<BoxedInput>>,
    line_no: usize,
}

impl EventReader {
    /// Opens `input`, or stdin when no path is given.
    pub async fn open(input: Option<&Path>) -> Result<Self> {
        let reader: BoxedInput = match input {
            Some(path) => Box::new(
                tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("open event file {}", path.display()))?,
            ),
            None => Box::new(tokio::io::stdin()),
        };
        Ok(Self {
            lines: BufReader::new(reader).lines(),
            line_no: 0,
        })
    }

    pub async fn next_event(&mut self) -> Result<Option<DisplayEvent>> {
        while let Some(line) = self.lines.next_line().await.context("read event stream")? {
            self.line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match DisplayEvent::from_json_line(line) {
                Ok(event) => return Ok(Some(event)),
                Err(err) => warn!(line = self.line_no, error = %err, "skipping malformed event"),
            }
        }
        Ok(None)
    }
}
