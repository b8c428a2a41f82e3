//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracecast_core::config::{self, Config};

use crate::logging;

mod commands;

#[derive(Parser)]
#[command(name = "tracecast")]
#[command(version)]
#[command(about = "Render agent traces into a live, rate-limited Telegram message")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use (default: $TRACECAST_HOME/config.toml)
    #[arg(long, global = true, env = "TRACECAST_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Replay a JSON-lines event stream into a Telegram message
    Replay {
        /// Destination chat
        #[arg(long, allow_negative_numbers = true)]
        chat_id: i64,

        /// Message to keep editing (a placeholder is sent when omitted)
        #[arg(long)]
        message_id: Option<i64>,

        /// Event file (default: stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Override the seconds between edits from config
        #[arg(long, value_name = "SECS")]
        interval: Option<f64>,
    },

    /// Render an event stream offline and print the resulting HTML
    Preview {
        /// Event file (default: stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(cli.log_dir.as_deref());

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        config: config_override,
        log_dir: _,
    } = cli;

    let config_path = config_override.unwrap_or_else(config::paths::config_path);

    match command {
        Commands::Replay {
            chat_id,
            message_id,
            input,
            interval,
        } => {
            let mut config = Config::load_from(&config_path).context("load config")?;
            if let Some(interval) = interval {
                config.display.render_interval_secs = interval;
            }
            commands::replay::run(commands::replay::ReplayOptions {
                config: &config,
                chat_id,
                message_id,
                input: input.as_deref(),
            })
            .await
        }

        Commands::Preview { input } => {
            let config = Config::load_from(&config_path).context("load config")?;
            commands::preview::run(&config, input.as_deref()).await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path(&config_path);
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(&config_path),
        },
    }
}
