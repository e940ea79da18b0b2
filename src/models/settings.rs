use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::utils::errors::SettingsError;
use crate::utils::logger::LogLevel;

pub const DEFAULT_CATALOG_URL: &str = "https://api.clashroyale.com/v1/cards";
pub const DEFAULT_BACKGROUND_URL: &str =
    "https://supercell.com/images/180104_clashroyale_bg_pattern.png";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub catalog_url: String,
    /// Name of the environment variable holding the catalog API key.
    pub api_key_env: String,
    /// Used only when the variable named by `api_key_env` is unset or blank.
    #[serde(default)]
    pub api_key: Option<String>,
    pub background_url: String,
    pub log_level: String,
}

impl Settings {
    /// Defaults, then `Settings.toml` if present, then `GALLERY_*` environment variables.
    pub fn load() -> Result<Self, SettingsError> {
        let config = Settings::defaults()?
            .add_source(File::with_name("Settings").required(false))
            .add_source(Environment::with_prefix("GALLERY").try_parsing(true))
            .build()?;

        Settings::from_config(config)
    }

    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, SettingsError> {
        Ok(Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8000)?
            .set_default("catalog_url", DEFAULT_CATALOG_URL)?
            .set_default("api_key_env", "SUPERCELL_API_KEY")?
            .set_default("background_url", DEFAULT_BACKGROUND_URL)?
            .set_default("log_level", "INFO")?)
    }

    pub fn from_config(config: Config) -> Result<Self, SettingsError> {
        let settings = config.try_deserialize::<Settings>()?;
        settings.log_level()?;
        Ok(settings)
    }

    pub fn log_level(&self) -> Result<LogLevel, SettingsError> {
        LogLevel::parse(&self.log_level)
            .ok_or_else(|| SettingsError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn credential(&self) -> Credential {
        Credential::Env {
            var: self.api_key_env.clone(),
            fallback: self.api_key.clone(),
        }
    }
}

/// Where the catalog API key comes from. Resolved on every request, never cached.
#[derive(Debug, Clone)]
pub enum Credential {
    Env { var: String, fallback: Option<String> },
    Fixed(Option<String>),
}

impl Credential {
    pub fn resolve(&self) -> Option<String> {
        match self {
            Credential::Env { var, fallback } => non_blank(std::env::var(var).ok())
                .or_else(|| non_blank(fallback.clone())),
            Credential::Fixed(key) => non_blank(key.clone()),
        }
    }
}

fn non_blank(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}
