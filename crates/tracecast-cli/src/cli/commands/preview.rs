//! Offline rendering: fold every event and print the final message body.

use std::path::Path;

use anyhow::Result;
use tracecast_core::config::Config;
use tracecast_core::render::build_text;
use tracecast_core::state::RenderState;

use super::events::EventReader;

pub async fn run(config: &Config, input: Option<&Path>) -> Result<()> {
    let mut reader = EventReader::open(input).await?;
    let mut state = RenderState::new();
    while let Some(event) = reader.next_event().await? {
        state.apply(event);
    }
    println!("{}", build_text(&state, &config.display));
    Ok(())
}
