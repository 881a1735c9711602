//! Client configuration loaded from the environment.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults.
//! - Set-but-invalid variables are errors, never silently replaced.

use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_API_URL: &str = "PATHSALA_API_URL";
pub const ENV_API_TOKEN: &str = "PATHSALA_API_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "PATHSALA_TIMEOUT_SECS";
pub const ENV_NOTES_LIMIT: &str = "PATHSALA_NOTES_LIMIT";
pub const ENV_LOG_LEVEL: &str = "PATHSALA_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PATHSALA_LOG_DIR";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                message,
            } => write!(f, "invalid {key} value `{value}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings shared by the catalog client, loader and logging bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without the `/api/v1` prefix.
    pub api_url: String,
    pub api_token: Option<String>,
    /// Per-request timeout; zero is rejected.
    pub timeout_secs: u64,
    /// Note list page size; `None` lets the backend decide.
    pub notes_limit: Option<u32>,
    pub log_level: String,
    /// Absolute log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            notes_limit: None,
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Reads `PATHSALA_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut config = Self::default();
        if let Some(api_url) = value(ENV_API_URL) {
            config.api_url = api_url;
        }
        config.api_token = value(ENV_API_TOKEN);
        if let Some(raw) = value(ENV_TIMEOUT_SECS) {
            config.timeout_secs = parse_positive(ENV_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = value(ENV_NOTES_LIMIT) {
            config.notes_limit = Some(parse_positive(ENV_NOTES_LIMIT, &raw)?);
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = value(ENV_LOG_DIR).map(PathBuf::from);

        debug!(
            "event=config_load module=config status=ok api_url={} timeout_secs={} token_set={}",
            config.api_url,
            config.timeout_secs,
            config.api_token.is_some()
        );
        Ok(config)
    }
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: Display,
{
    let parsed = raw.parse::<T>().map_err(|err| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        message: err.to_string(),
    })?;
    if parsed <= T::default() {
        return Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(parsed)
}
