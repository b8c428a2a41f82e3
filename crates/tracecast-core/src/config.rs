//! Configuration management for tracecast.
//!
//! Loads configuration from ${TRACECAST_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for the tracecast configuration directory.
    //!
    //! TRACECAST_HOME resolution order:
    //! 1. TRACECAST_HOME environment variable (if set)
    //! 2. ~/.config/tracecast (default)

    use std::path::PathBuf;

    /// Returns the tracecast home directory.
    pub fn tracecast_home() -> PathBuf {
        if let Ok(home) = std::env::var("TRACECAST_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("tracecast")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        tracecast_home().join("config.toml")
    }
}

/// Telegram Bot API configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token for the Telegram API.
    pub bot_token: Option<String>,
    /// Override for the API host (tests, local Bot API servers).
    pub base_url: Option<String>,
}

impl TelegramConfig {
    pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
    pub const TOKEN_ENV: &str = "TRACECAST_TELEGRAM_BOT_TOKEN";

    /// Token from config, falling back to `TRACECAST_TELEGRAM_BOT_TOKEN`.
    pub fn effective_bot_token(&self) -> Option<String> {
        self.bot_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var(Self::TOKEN_ENV)
                    .ok()
                    .map(|token| token.trim().to_string())
                    .filter(|token| !token.is_empty())
            })
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(Self::DEFAULT_BASE_URL)
    }
}

/// Rendering and throttling limits for the live message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Minimum seconds between two edits of the same message.
    pub render_interval_secs: f64,
    /// Cap on the log section; older lines are dropped first.
    pub max_log_chars: usize,
    /// Hard limit of the destination platform.
    pub max_message_chars: usize,
    /// Tool results longer than this are cut and suffixed with `...`.
    pub result_preview_chars: usize,
    /// Timeout for a single edit call in seconds (0 disables).
    pub edit_timeout_secs: u64,
}

impl DisplayConfig {
    const DEFAULT_RENDER_INTERVAL_SECS: f64 = 2.0;
    const DEFAULT_MAX_LOG_CHARS: usize = 2000;
    const DEFAULT_MAX_MESSAGE_CHARS: usize = 4096;
    const DEFAULT_RESULT_PREVIEW_CHARS: usize = 200;
    const DEFAULT_EDIT_TIMEOUT_SECS: u64 = 10;

    /// Negative or non-finite intervals disable throttling.
    pub fn render_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.render_interval_secs).unwrap_or(Duration::ZERO)
    }

    pub fn edit_timeout(&self) -> Option<Duration> {
        (self.edit_timeout_secs > 0).then(|| Duration::from_secs(self.edit_timeout_secs))
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            render_interval_secs: Self::DEFAULT_RENDER_INTERVAL_SECS,
            max_log_chars: Self::DEFAULT_MAX_LOG_CHARS,
            max_message_chars: Self::DEFAULT_MAX_MESSAGE_CHARS,
            result_preview_chars: Self::DEFAULT_RESULT_PREVIEW_CHARS,
            edit_timeout_secs: Self::DEFAULT_EDIT_TIMEOUT_SECS,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram sink configuration
    pub telegram: TelegramConfig,

    /// Live display limits
    pub display: DisplayConfig,
}

impl Config {
    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes a commented default config file, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, Self::generate())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Default config file contents.
    pub fn generate() -> String {
        let display = DisplayConfig::default();
        format!(
            "\
[telegram]
# bot_token = \"123456:ABC\"   # or set {token_env}
# base_url = \"{base_url}\"

[display]
render_interval_secs = {interval:?}
max_log_chars = {max_log}
max_message_chars = {max_message}
result_preview_chars = {preview}
edit_timeout_secs = {timeout}
",
            token_env = TelegramConfig::TOKEN_ENV,
            base_url = TelegramConfig::DEFAULT_BASE_URL,
            interval = display.render_interval_secs,
            max_log = display.max_log_chars,
            max_message = display.max_message_chars,
            preview = display.result_preview_chars,
            timeout = display.edit_timeout_secs,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nonexistent.toml")).unwrap();

        assert_eq!(config.display, DisplayConfig::default());
        assert_eq!(config.display.render_interval(), Duration::from_secs(2));
        assert!(config.telegram.bot_token.is_none());
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[display]\nrender_interval_secs = 0.5\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.display.render_interval(), Duration::from_millis(500));
        assert_eq!(config.display.max_log_chars, 2000);
        assert_eq!(config.display.max_message_chars, 4096);
    }

    #[test]
    fn test_load_invalid_toml_fails_with_path() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[display\n").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_init_creates_loadable_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# bot_token"));
        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_edit_timeout_zero_disables() {
        let display = DisplayConfig {
            edit_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(display.edit_timeout(), None);
    }

    #[test]
    fn test_negative_interval_disables_throttle() {
        let display = DisplayConfig {
            render_interval_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(display.render_interval(), Duration::ZERO);
    }

    #[test]
    fn test_bot_token_from_config_is_trimmed() {
        let telegram = TelegramConfig {
            bot_token: Some("  123:abc \n".to_string()),
            base_url: None,
        };
        assert_eq!(telegram.effective_bot_token().as_deref(), Some("123:abc"));
        assert_eq!(telegram.effective_base_url(), "https://api.telegram.org");
    }
}
