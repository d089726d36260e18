//! Dashboard configuration.
//!
//! Configuration is layered; later sources override earlier ones:
//! 1. **Built-in defaults** - `http://localhost:8000`, `/inventory`, 5000 ms
//! 2. **User config** - `<config dir>/rca-dashboard/config.toml`
//! 3. **Explicit config** - the file passed with `--config`
//! 4. **Environment** - `RCA_INVENTORY_URL`, `RCA_POLL_INTERVAL_MS`
//! 5. **CLI arguments** - highest priority
//!
//! ```toml
//! endpoint = "http://inventory.internal:8000"
//! poll_interval_ms = 5000
//! request_timeout_ms = 3000
//! theme = "light"
//! ```

pub mod loading;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub use loading::{load_config_file, load_hierarchy, overrides_from_env, user_config_path};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_INVENTORY_PATH: &str = "/inventory";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_THEME: &str = "dark";

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardConfig {
    /// Base URL of the inventory service.
    pub endpoint: String,
    pub inventory_path: String,
    pub poll_interval_ms: u64,
    /// `None` leaves the transport default in place.
    pub request_timeout_ms: Option<u64>,
    pub theme: String,
    pub log_file: Option<PathBuf>,
}

/// One configuration layer. Every field is optional so a layer only
/// overrides what it names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub inventory_path: Option<String>,
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            inventory_path: DEFAULT_INVENTORY_PATH.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: None,
            theme: DEFAULT_THEME.to_string(),
            log_file: None,
        }
    }
}

impl DashboardConfig {
    /// Apply a layer on top of this configuration.
    pub fn merged(self, layer: ConfigOverrides) -> Self {
        DashboardConfig {
            endpoint: layer.endpoint.unwrap_or(self.endpoint),
            inventory_path: layer.inventory_path.unwrap_or(self.inventory_path),
            poll_interval_ms: layer.poll_interval_ms.unwrap_or(self.poll_interval_ms),
            request_timeout_ms: layer.request_timeout_ms.or(self.request_timeout_ms),
            theme: layer.theme.unwrap_or(self.theme),
            log_file: layer.log_file.or(self.log_file),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidConfiguration {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidConfiguration {
                message: "request_timeout_ms must be greater than zero when set".to_string(),
            });
        }
        let url = url::Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::InvalidConfiguration {
                message: format!("endpoint '{}' is not a valid URL: {}", self.endpoint, e),
            }
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidConfiguration {
                message: format!(
                    "endpoint '{}' must use http or https, got '{}'",
                    self.endpoint,
                    url.scheme()
                ),
            });
        }
        if !self.inventory_path.starts_with('/') {
            return Err(ConfigError::InvalidConfiguration {
                message: format!(
                    "inventory_path '{}' must start with '/'",
                    self.inventory_path
                ),
            });
        }
        Ok(())
    }

    /// The URL each poll issues its `GET` against.
    pub fn inventory_url(&self) -> String {
        format!(
            "{}{}",
            self.endpoint.trim_end_matches('/'),
            self.inventory_path
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Where the interactive dashboard writes its logs.
    pub fn resolved_log_file(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(|| {
            dirs::cache_dir().map(|dir| dir.join("rca-dashboard").join("rca.log"))
        })
    }
}
