//! keeper.toml configuration parser.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::AppRegistry;
use crate::error::{ConfigError, ConfigResult};
use crate::region::{RegionConfig, RegionTable};

const PLACEHOLDER_CHAT_ID: &str = "your-chat-id";
const PLACEHOLDER_BOT_TOKEN: &str = "your-telegram-bot-token";

/// File-shaped configuration, as written in `keeper.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeeperConfig {
    #[serde(default)]
    pub credentials: Credentials,
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub apps: Vec<AppEntry>,
    pub regions: Option<Vec<RegionConfig>>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppEntry {
    pub url: String,
}

/// Operator credentials exchanged for a bearer token.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    /// Bot token and chat id, if both are set to real values.
    pub fn destination(&self) -> Option<(&str, &str)> {
        let token = self.bot_token.as_deref().filter(|t| {
            !t.is_empty() && *t != PLACEHOLDER_BOT_TOKEN
        })?;
        let chat = self
            .chat_id
            .as_deref()
            .filter(|c| !c.is_empty() && *c != PLACEHOLDER_CHAT_ID)?;
        Some((token, chat))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    8787
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Offset from UTC used for operator-facing timestamps.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset(),
        }
    }
}

fn default_utc_offset() -> i32 {
    8
}

impl KeeperConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `EMAIL`, `PASSWORD`, `CHAT_ID` and `BOT_TOKEN` from the
    /// process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay values from `lookup`; unset or empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(email) = get("EMAIL") {
            self.credentials.email = email;
        }
        if let Some(password) = get("PASSWORD") {
            self.credentials.password = password;
        }

        let chat_id = get("CHAT_ID");
        let bot_token = get("BOT_TOKEN");
        if chat_id.is_some() || bot_token.is_some() {
            let telegram = self.telegram.get_or_insert_with(TelegramConfig::default);
            if let Some(chat_id) = chat_id {
                telegram.chat_id = Some(chat_id);
            }
            if let Some(bot_token) = bot_token {
                telegram.bot_token = Some(bot_token);
            }
        }
    }
}

/// Validated runtime settings, threaded explicitly into every component.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub telegram: Option<TelegramConfig>,
    pub apps: AppRegistry,
    pub regions: RegionTable,
    pub port: u16,
    pub utc_offset_hours: i32,
}

impl Settings {
    pub fn from_config(config: KeeperConfig) -> ConfigResult<Self> {
        if !(-12..=14).contains(&config.display.utc_offset_hours) {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_hours {} out of range",
                config.display.utc_offset_hours
            )));
        }

        let regions = RegionTable::new(config.regions.unwrap_or_else(RegionConfig::builtin))?;
        let apps = AppRegistry::from_urls(config.apps.iter().map(|a| a.url.as_str()));

        Ok(Self {
            credentials: config.credentials,
            telegram: config.telegram,
            apps,
            regions,
            port: config.server.port,
            utc_offset_hours: config.display.utc_offset_hours,
        })
    }

    /// Read `path`, apply the environment overlay and validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let mut config = KeeperConfig::from_file(path)?;
        config.apply_env();
        Self::from_config(config)
    }
}
