use crate::core::PollConfig;
use crate::models::{GenderInterest, Preferences, PreferencesError, MIN_DISCOVERY_AGE};
use crate::services::recs_api::{ApiOptions, DEFAULT_BASE_URL, DEFAULT_LOCALE, DEFAULT_USER_AGENT};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub location: LocationSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub auth_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_user_agent() -> String { DEFAULT_USER_AGENT.to_string() }
fn default_locale() -> String { DEFAULT_LOCALE.to_string() }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct LocationSettings {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    #[serde(default = "default_min_age")]
    pub min_age: u8,
    #[serde(default = "default_max_age")]
    pub max_age: u8,
    #[serde(default = "default_distance_km")]
    pub distance_km: f64,
    #[serde(default = "default_gender_interest")]
    pub gender_interest: GenderInterest,
    #[serde(default = "default_true")]
    pub auto_expand_age: bool,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            min_age: default_min_age(),
            max_age: default_max_age(),
            distance_km: default_distance_km(),
            gender_interest: default_gender_interest(),
            auto_expand_age: default_true(),
        }
    }
}

fn default_min_age() -> u8 { MIN_DISCOVERY_AGE }
fn default_max_age() -> u8 { 25 }
fn default_distance_km() -> f64 { 10.0 }
fn default_gender_interest() -> GenderInterest { GenderInterest::Women }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct PollingSettings {
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,
    #[serde(default)]
    pub max_requests: Option<u32>,
    #[serde(default)]
    pub stop_when_exhausted: bool,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
            max_requests: None,
            stop_when_exhausted: false,
        }
    }
}

fn default_delay_secs() -> f64 { 2.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_output_dir() -> PathBuf { PathBuf::from(".") }
fn default_file_prefix() -> String { "recs_users".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with RECS__)
    /// 5. A bare AUTH_TOKEN variable
    pub fn load() -> Result<Self, ConfigError> {
        let files = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        Self::layered(files, std::env::var("AUTH_TOKEN").ok())
    }

    /// Environment variables and the token override on top of `files`
    fn layered(
        files: ConfigBuilder<DefaultState>,
        token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let settings = files
            // e.g., RECS__POLLING__MAX_REQUESTS -> polling.max_requests
            .add_source(
                Environment::with_prefix("RECS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_token_override(settings, token)?.try_deserialize()
    }

    /// Validated discovery preferences for the run
    pub fn preferences(&self) -> Result<Preferences, PreferencesError> {
        Preferences::new(
            self.location.latitude,
            self.location.longitude,
            self.discovery.min_age,
            self.discovery.max_age,
            self.discovery.distance_km,
            self.discovery.gender_interest,
        )
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            delay: Duration::from_secs_f64(self.polling.delay_secs.max(0.0)),
            request_limit: self.polling.max_requests,
            stop_when_exhausted: self.polling.stop_when_exhausted,
        }
    }

    pub fn api_options(&self) -> ApiOptions {
        ApiOptions {
            base_url: self.api.base_url.clone(),
            auth_token: self.api.auth_token.clone(),
            user_agent: self.api.user_agent.clone(),
            locale: self.api.locale.clone(),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

/// A bare `AUTH_TOKEN` variable wins over any configured token
fn apply_token_override(settings: Config, token: Option<String>) -> Result<Config, ConfigError> {
    match token {
        Some(token) => Config::builder()
            .add_source(settings)
            .set_override("api.auth_token", token)?
            .build(),
        None => Ok(settings),
    }
}
