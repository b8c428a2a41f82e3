//! Live replay of an event stream into a Telegram message.

use std::path::Path;

use anyhow::Result;
use tracecast_core::config::Config;
use tracecast_core::render::PLACEHOLDER;
use tracecast_core::{MessageTarget, RenderBuffer};
use tracecast_telegram::{TelegramClient, TelegramSettings};
use tracing::info;

use super::events::EventReader;

pub struct ReplayOptions<'a> {
    pub config: &'a Config,
    pub chat_id: i64,
    pub message_id: Option<i64>,
    pub input: Option<&'a Path>,
}

pub async fn run(options: ReplayOptions<'_>) -> Result<()> {
    let ReplayOptions {
        config,
        chat_id,
        message_id,
        input,
    } = options;

    let settings = TelegramSettings::from_config(config)?;
    let client = TelegramClient::from_settings(settings);
    // Open the input before touching Telegram so a bad path sends nothing.
    let mut reader = EventReader::open(input).await?;

    let message_id = match message_id {
        Some(id) => id,
        None => client.send_message(chat_id, PLACEHOLDER, None).await?,
    };
    let target = MessageTarget::new(chat_id, message_id);
    info!(%target, "replaying events");

    let buffer = RenderBuffer::new(client, target, config.display.clone());
    let mut events = 0_usize;
    while let Some(event) = reader.next_event().await? {
        buffer.update(event).await;
        events += 1;
    }

    let outcome = buffer.finish().await;
    info!(%target, events, ?outcome, "replay finished");
    eprintln!("Replayed {events} event(s) into message {message_id} in chat {chat_id}");
    Ok(())
}
