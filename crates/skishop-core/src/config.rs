//! Configuration management for skishop.
//!
//! Loads configuration from ${SKISHOP_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Telegram bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token for the Telegram API.
    pub bot_token: Option<String>,
    /// Numeric chat ID of the single authorized operator.
    pub operator_id: Option<i64>,
}

/// Media host (image upload service) configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaHostConfig {
    /// Base URL of the upload API.
    pub base_url: Option<String>,
    /// API key for the upload API.
    pub api_key: Option<String>,
    /// Remote folder uploads are filed under.
    pub folder: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram bot configuration.
    pub telegram: TelegramConfig,

    /// Media host configuration.
    pub media_host: MediaHostConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
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
}

/// Resolved bot settings: credentials plus the operator identity.
pub struct BotSettings {
    pub bot_token: String,
    pub operator_id: i64,
}

impl BotSettings {
    /// Builds settings from config with environment-variable fallbacks.
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config
            .telegram
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var("SKISHOP_TELEGRAM_BOT_TOKEN")
                    .ok()
                    .map(|token| token.trim().to_string())
                    .filter(|token| !token.is_empty())
            })
            .unwrap_or_default();
        if token.is_empty() {
            bail!("telegram.bot_token or SKISHOP_TELEGRAM_BOT_TOKEN is required");
        }

        let operator_id = config.telegram.operator_id.or_else(|| {
            std::env::var("SKISHOP_OPERATOR_ID")
                .ok()
                .and_then(|value| value.trim().parse().ok())
        });
        let Some(operator_id) = operator_id else {
            bail!("telegram.operator_id or SKISHOP_OPERATOR_ID is required");
        };

        Ok(Self {
            bot_token: token,
            operator_id,
        })
    }
}

/// Resolved media host settings.
pub struct MediaHostSettings {
    pub base_url: String,
    pub api_key: String,
    pub folder: String,
}

impl MediaHostSettings {
    pub const DEFAULT_FOLDER: &str = "skishop/manual-upload";

    /// Builds settings from config with environment-variable fallbacks.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config
            .media_host
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var("SKISHOP_MEDIA_BASE_URL")
                    .ok()
                    .map(|url| url.trim().to_string())
                    .filter(|url| !url.is_empty())
            });
        let Some(base_url) = base_url else {
            bail!("media_host.base_url or SKISHOP_MEDIA_BASE_URL is required");
        };

        let api_key = config
            .media_host
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var("SKISHOP_MEDIA_API_KEY")
                    .ok()
                    .map(|key| key.trim().to_string())
                    .filter(|key| !key.is_empty())
            });
        let Some(api_key) = api_key else {
            bail!("media_host.api_key or SKISHOP_MEDIA_API_KEY is required");
        };

        let folder = config
            .media_host
            .folder
            .as_deref()
            .map(str::trim)
            .filter(|folder| !folder.is_empty())
            .map_or_else(|| Self::DEFAULT_FOLDER.to_string(), str::to_string);

        Ok(Self {
            base_url,
            api_key,
            folder,
        })
    }
}

pub mod paths {
    //! Path resolution for skishop configuration and data directories.
    //!
    //! SKISHOP_HOME resolution order:
    //! 1. SKISHOP_HOME environment variable (if set)
    //! 2. ~/.config/skishop (default)

    use std::path::PathBuf;

    /// Returns the skishop home directory.
    ///
    /// Checks SKISHOP_HOME env var first, falls back to ~/.config/skishop
    pub fn skishop_home() -> PathBuf {
        if let Ok(home) = std::env::var("SKISHOP_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("skishop"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        skishop_home().join("config.toml")
    }

    /// Returns the path to the catalog file.
    pub fn catalog_path() -> PathBuf {
        skishop_home().join("catalog").join("products.jsonl")
    }
}
