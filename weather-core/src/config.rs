use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{env, fs, path::PathBuf};

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://weatherapi-com.p.rapidapi.com";
pub const DEFAULT_GREETING: &str = "Hi! I am a weather bot. Which city should I look up?";

pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const WEATHER_KEY_VAR: &str = "WEATHER_API_KEY";
pub const WEATHER_URL_VAR: &str = "WEATHER_API_URL";
pub const GREETING_VAR: &str = "WEATHER_BOT_GREETING";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Top-level configuration: the optional file on disk with environment overrides applied.
///
/// Example TOML:
/// ```toml
/// greeting = "Hello!"
///
/// [telegram]
/// bot_token = "..."
///
/// [weather]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    pub greeting: Option<String>,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub weather: WeatherConfig,
}

/// Secrets resolved once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub bot_token: String,
    /// Empty when not configured; each lookup then fails instead of the process.
    pub weather_api_key: String,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|name| env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-bot", "weather-bot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override file values with non-empty variables returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(token) = var(BOT_TOKEN_VAR) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(key) = var(WEATHER_KEY_VAR) {
            self.weather.api_key = Some(key);
        }
        if let Some(url) = var(WEATHER_URL_VAR) {
            self.weather.base_url = Some(url);
        }
        if let Some(greeting) = var(GREETING_VAR) {
            self.greeting = Some(greeting);
        }
    }

    /// Resolve the secrets. Only the bot token is mandatory.
    pub fn credentials(&self) -> Result<Credentials> {
        let bot_token = self
            .telegram
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "{BOT_TOKEN_VAR} is not set.\n\
                     Hint: export it, put it in .env, or set [telegram] bot_token in the config file."
                )
            })?;

        Ok(Credentials {
            bot_token: bot_token.to_owned(),
            weather_api_key: self.weather.api_key.clone().unwrap_or_default(),
        })
    }

    pub fn weather_base_url(&self) -> &str {
        self.weather.base_url.as_deref().unwrap_or(DEFAULT_WEATHER_BASE_URL)
    }

    pub fn greeting(&self) -> &str {
        self.greeting.as_deref().unwrap_or(DEFAULT_GREETING)
    }
}
