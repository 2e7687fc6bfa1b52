#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub use toml_config::{
    BotSettings, DeliverySettings, FileSettings, RobotaUaSettings, ScraperApiSettings,
    SearchSettings, WorkUaSettings,
};

pub const ROBOTA_UA_USERNAME: &str = "ROBOTA_UA_USERNAME";
pub const ROBOTA_UA_PASSWORD: &str = "ROBOTA_UA_PASSWORD";
pub const SCRAPER_API_KEY: &str = "SCRAPER_API_KEY";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const SCOUT_CONFIG: &str = "SCOUT_CONFIG";

/// Secrets read from the environment once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub robota_username: String,
    pub robota_password: String,
    pub scraper_api_key: String,
    pub telegram_bot_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("robota_username", &self.robota_username)
            .field("robota_password", &"***")
            .field("scraper_api_key", &"***")
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String> {
            let value = lookup(name);
            let value = crate::utils::validation::validate_required_field(name, &value)?.clone();
            Ok(value)
        };

        Ok(Self {
            robota_username: required(ROBOTA_UA_USERNAME)?,
            robota_password: required(ROBOTA_UA_PASSWORD)?,
            scraper_api_key: required(SCRAPER_API_KEY)?,
            telegram_bot_token: lookup(TELEGRAM_BOT_TOKEN).filter(|t| !t.trim().is_empty()),
        })
    }
}

/// Process-wide, read-only configuration. Built once and handed to the
/// adapters and the bot explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Arc<Credentials>,
    pub work_ua: WorkUaSettings,
    pub robota_ua: RobotaUaSettings,
    pub scraper_api: ScraperApiSettings,
    pub search: SearchSettings,
    pub delivery: DeliverySettings,
    pub bot: BotSettings,
}

impl Settings {
    pub fn from_parts(credentials: Credentials, file: FileSettings) -> Self {
        Self {
            credentials: Arc::new(credentials),
            work_ua: file.work_ua,
            robota_ua: file.robota_ua,
            scraper_api: file.scraper_api,
            search: file.search,
            delivery: file.delivery,
            bot: file.bot,
        }
    }

    /// Credentials from the environment, everything else from `path` (or
    /// `SCOUT_CONFIG`) when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let credentials = Credentials::from_env()?;

        let env_path = std::env::var(SCOUT_CONFIG).ok();
        let file = match path.map(Path::to_path_buf).or(env_path.map(Into::into)) {
            Some(path) => {
                tracing::info!("📁 Loading settings from: {}", path.display());
                FileSettings::from_file(&path)?
            }
            None => {
                tracing::debug!("No settings file given, using defaults");
                FileSettings::default()
            }
        };

        Ok(Self::from_parts(credentials, file))
    }

    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.search.adapter_timeout_seconds)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string(ROBOTA_UA_USERNAME, &self.credentials.robota_username)?;
        validate_non_empty_string(ROBOTA_UA_PASSWORD, &self.credentials.robota_password)?;
        validate_non_empty_string(SCRAPER_API_KEY, &self.credentials.scraper_api_key)?;

        validate_url("work_ua.base_url", &self.work_ua.base_url)?;
        validate_url("robota_ua.base_url", &self.robota_ua.base_url)?;
        validate_url("robota_ua.login_url", &self.robota_ua.login_url)?;
        validate_url("robota_ua.search_url", &self.robota_ua.search_url)?;
        validate_url("scraper_api.endpoint", &self.scraper_api.endpoint)?;

        validate_positive_number("work_ua.max_page_size", self.work_ua.max_page_size, 1)?;
        validate_positive_number("robota_ua.max_page_size", self.robota_ua.max_page_size, 1)?;
        validate_positive_number("search.per_site_limit", self.search.per_site_limit, 1)?;
        validate_range("search.similarity_threshold", self.search.similarity_threshold, 0, 100)?;
        validate_positive_number(
            "delivery.max_message_chars",
            self.delivery.max_message_chars,
            200,
        )?;

        Ok(())
    }
}
