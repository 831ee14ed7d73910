//! Studio configuration with validation.
//!
//! Defaults work against a local codec service; every field can be
//! overridden from the environment (`RSS_*`) and then from the command line.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::StudioError;
use super::simulation::{ChannelType, ErrorType};

/// GF(256) codewords hold at most 255 symbols, one of which must be data.
pub const GF256_MAX_PARITY: u32 = 254;

/// Remote API revision. Paths and body field names differ between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiRevision {
    /// `/encode`, `/simulate` with `ecc_symbols` and `encoded_data`.
    #[default]
    Current,
    /// `/api/encode`, `/api/simulate` with `nsym` and raw `data`.
    Legacy,
}

impl ApiRevision {
    /// Path prefix for every endpoint.
    pub fn prefix(&self) -> &'static str {
        match self {
            ApiRevision::Current => "",
            ApiRevision::Legacy => "/api",
        }
    }

    /// Parse a revision name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" | "v2" => Some(ApiRevision::Current),
            "legacy" | "v1" => Some(ApiRevision::Legacy),
            _ => None,
        }
    }
}

/// Main studio configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Base URL of the codec service, without trailing slash.
    pub base_url: String,
    /// API revision spoken by the service.
    pub api_revision: ApiRevision,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Upper bound on parity symbols accepted from the user.
    pub max_ecc_symbols: u32,
    /// Initial simulation parameters.
    pub defaults: SimulationDefaults,
    /// Directory holding persisted preferences.
    pub state_dir: PathBuf,
    /// Directory exports are written to.
    pub export_dir: PathBuf,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            api_revision: ApiRevision::default(),
            timeouts: TimeoutConfig::default(),
            max_ecc_symbols: 50,
            defaults: SimulationDefaults::default(),
            state_dir: PathBuf::from(".rss-studio"),
            export_dir: PathBuf::from("."),
        }
    }
}

/// Remote call timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request deadline; expiry is treated as unavailability.
    #[serde(with = "humantime_serde")]
    pub request: Duration,
    /// TCP connect deadline.
    #[serde(with = "humantime_serde")]
    pub connect: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(10),
            connect: Duration::from_secs(2),
        }
    }
}

/// Initial values for the studio controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationDefaults {
    /// Parity symbols.
    pub ecc_symbols: u32,
    /// Error rate in [0, 1].
    pub error_rate: f64,
    /// Noise model.
    pub error_type: ErrorType,
    /// Transmission medium.
    pub channel_type: ChannelType,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            ecc_symbols: 10,
            error_rate: 0.15,
            error_type: ErrorType::Random,
            channel_type: ChannelType::Wireless,
        }
    }
}

impl StudioConfig {
    /// Defaults overridden from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `RSS_API_BASE_URL`: codec service base URL
    /// - `RSS_API_REVISION`: `current` or `legacy`
    /// - `RSS_TIMEOUT_MS`: request timeout in milliseconds
    /// - `RSS_MAX_ECC`: maximum parity symbols
    /// - `RSS_STATE_DIR`: preference directory (default: `$HOME/.rss-studio`)
    /// - `RSS_EXPORT_DIR`: export directory
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(home) = lookup("HOME") {
            config.state_dir = PathBuf::from(home).join(".rss-studio");
        }
        if let Some(url) = lookup("RSS_API_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(revision) = lookup("RSS_API_REVISION").and_then(|v| ApiRevision::parse(&v)) {
            config.api_revision = revision;
        }
        if let Some(ms) = lookup("RSS_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            config.timeouts.request = Duration::from_millis(ms);
        }
        if let Some(max) = lookup("RSS_MAX_ECC").and_then(|v| v.parse().ok()) {
            config.max_ecc_symbols = max;
        }
        if let Some(dir) = lookup("RSS_STATE_DIR") {
            config.state_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("RSS_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.base_url.clone()));
        }
        if let Err(e) = reqwest::Url::parse(&self.base_url) {
            return Err(ConfigError::InvalidUrl(format!("{}: {e}", self.base_url)));
        }

        if self.timeouts.request.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "request timeout cannot be 0".into(),
            ));
        }

        if self.max_ecc_symbols > GF256_MAX_PARITY {
            return Err(ConfigError::InvalidLimit(format!(
                "max_ecc_symbols {} exceeds {}",
                self.max_ecc_symbols, GF256_MAX_PARITY
            )));
        }

        if self.defaults.ecc_symbols > self.max_ecc_symbols {
            return Err(ConfigError::InvalidLimit(format!(
                "default ecc_symbols {} exceeds max {}",
                self.defaults.ecc_symbols, self.max_ecc_symbols
            )));
        }

        let rate = self.defaults.error_rate;
        if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidLimit(format!(
                "default error_rate {} outside [0, 1]",
                rate
            )));
        }

        Ok(())
    }

    /// Full URL for an endpoint name such as `encode`.
    pub fn endpoint(&self, name: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_revision.prefix(),
            name
        )
    }

    /// Path of the persisted preference file.
    pub fn preferences_path(&self) -> PathBuf {
        self.state_dir.join("preferences.json")
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Base URL is not http(s)
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Invalid bound or default
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}

impl From<ConfigError> for StudioError {
    fn from(err: ConfigError) -> Self {
        StudioError::Config(err.to_string())
    }
}
