//! API client configuration.
//!
//! Values come from the environment with sensible defaults:
//!
//! | Variable | Default |
//! |---|---|
//! | `PLATTER_API_URL` | the production API base URL |
//! | `PLATTER_API_TIMEOUT_SECS` | `10` |
//! | `PLATTER_TOKEN_FILE` | unset (token kept in memory) |

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Production base URL of the REST API
pub const DEFAULT_BASE_URL: &str =
    "https://foodapp-env.eba-db8ewiut.eu-north-1.elasticbeanstalk.com/api/v1";

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const ENV_BASE_URL: &str = "PLATTER_API_URL";
const ENV_TIMEOUT_SECS: &str = "PLATTER_API_TIMEOUT_SECS";
const ENV_TOKEN_FILE: &str = "PLATTER_TOKEN_FILE";

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Configuration of the HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL every request path is appended to, without trailing slash
    pub base_url: String,
    /// Timeout applied to each request
    pub timeout: Duration,
    /// File backing the persisted bearer token, if any
    pub token_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            token_file: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is malformed or validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is malformed or validation fails.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(url);
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        if let Some(path) = lookup(ENV_TOKEN_FILE).filter(|p| !p.trim().is_empty()) {
            config = config.with_token_file(path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the base URL (a trailing slash is dropped)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Persist the bearer token in `path`
    #[must_use]
    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a non-HTTP base URL or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Validation("timeout must be > 0".to_string()));
        }
        Ok(())
    }
}
