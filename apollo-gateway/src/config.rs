//! Gateway configuration.
//!
//! Values come from an optional TOML file named by `APOLLO_CONFIG`, then
//! individual environment variables override single keys:
//!
//! | Variable | Key |
//! |---|---|
//! | `APOLLO_LISTEN_ADDR` | `listen_addr` |
//! | `APOLLO_BACKEND_URL` | `backend_url` |
//! | `APOLLO_BACKEND_TIMEOUT_SECS` | `backend_timeout_secs` |
//! | `APOLLO_BACKEND_MAX_RESPONSE_BYTES` | `backend_max_response_bytes` |
//! | `APOLLO_DEBUG` | `debug` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use apollo_backend::http::DEFAULT_MAX_RESPONSE_BYTES;
use apollo_core::ApiInfo;
use serde::Deserialize;

pub const ENV_CONFIG: &str = "APOLLO_CONFIG";
pub const ENV_LISTEN_ADDR: &str = "APOLLO_LISTEN_ADDR";
pub const ENV_BACKEND_URL: &str = "APOLLO_BACKEND_URL";
pub const ENV_BACKEND_TIMEOUT_SECS: &str = "APOLLO_BACKEND_TIMEOUT_SECS";
pub const ENV_BACKEND_MAX_RESPONSE_BYTES: &str = "APOLLO_BACKEND_MAX_RESPONSE_BYTES";
pub const ENV_DEBUG: &str = "APOLLO_DEBUG";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Runtime settings for the gateway binary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Base URL of the data-processing backend.
    pub backend_url: String,
    /// Per-call backend timeout in seconds.
    pub backend_timeout_secs: u64,
    /// Largest backend reply body accepted, in bytes.
    pub backend_max_response_bytes: usize,
    /// Verbose logging.
    pub debug: bool,
    /// Metadata served by `/about`, `/version`, and the 404 body.
    pub about: ApiInfo,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_owned(),
            backend_url: "http://127.0.0.1:8090".to_owned(),
            backend_timeout_secs: 30,
            backend_max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            debug: false,
            about: ApiInfo::default(),
        }
    }
}

impl GatewayConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    /// See [`GatewayConfig::resolve`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] for a bad config
    /// file, and [`ConfigError::InvalidValue`] for an unparsable override, a
    /// zero timeout, or a zero reply size cap.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(ENV_CONFIG) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            config.listen_addr = addr;
        }
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            config.backend_url = url;
        }
        if let Some(raw) = lookup(ENV_BACKEND_TIMEOUT_SECS) {
            config.backend_timeout_secs =
                raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_BACKEND_TIMEOUT_SECS,
                    value: raw.clone(),
                    reason: "expected a whole number of seconds",
                })?;
        }
        if let Some(raw) = lookup(ENV_BACKEND_MAX_RESPONSE_BYTES) {
            config.backend_max_response_bytes =
                raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_BACKEND_MAX_RESPONSE_BYTES,
                    value: raw.clone(),
                    reason: "expected a whole number of bytes",
                })?;
        }
        if let Some(raw) = lookup(ENV_DEBUG) {
            config.debug = parse_flag(ENV_DEBUG, &raw)?;
        }
        if config.backend_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "backend_timeout_secs",
                value: "0".to_owned(),
                reason: "timeout must be at least one second",
            });
        }
        if config.backend_max_response_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "backend_max_response_bytes",
                value: "0".to_owned(),
                reason: "reply size cap must be at least one byte",
            });
        }
        Ok(config)
    }

    /// Parse a TOML config file. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid TOML for this struct.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_owned(), source })?;
        Ok(toml::from_str(&text)?)
    }

    #[must_use]
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    /// Default log filter when `RUST_LOG` is unset.
    #[must_use]
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_owned(),
            reason: "expected true/false",
        }),
    }
}
