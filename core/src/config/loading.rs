//! Configuration loading: files, environment, merging.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ConfigOverrides, DashboardConfig};
use crate::errors::ConfigError;

pub const ENV_INVENTORY_URL: &str = "RCA_INVENTORY_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "RCA_POLL_INTERVAL_MS";

/// `<config dir>/rca-dashboard/config.toml`, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rca-dashboard").join("config.toml"))
}

/// Load configuration from defaults, the user file, an optional explicit
/// file and the process environment. CLI flags are applied by the caller.
///
/// A missing user file is not an error; a missing explicit file is.
pub fn load_hierarchy(explicit: Option<&Path>) -> Result<DashboardConfig, ConfigError> {
    let mut config = DashboardConfig::default();

    if let Some(path) = user_config_path() {
        match load_config_file(&path) {
            Ok(layer) => config = config.merged(layer),
            Err(ConfigError::ConfigNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    if let Some(path) = explicit {
        config = config.merged(load_config_file(path)?);
    }

    config = config.merged(overrides_from_env(|key| std::env::var(key).ok())?);

    tracing::debug!(
        event = "core.config.load_completed",
        endpoint = %config.endpoint,
        poll_interval_ms = config.poll_interval_ms,
        theme = %config.theme,
    );

    Ok(config)
}

/// Load one TOML layer from disk.
pub fn load_config_file(path: &Path) -> Result<ConfigOverrides, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Build the environment layer from a variable lookup.
pub fn overrides_from_env<F>(lookup: F) -> Result<ConfigOverrides, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let poll_interval_ms = match lookup(ENV_POLL_INTERVAL_MS) {
        Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
            ConfigError::InvalidConfiguration {
                message: format!(
                    "{} must be a whole number of milliseconds, got '{}'",
                    ENV_POLL_INTERVAL_MS, raw
                ),
            }
        })?),
        None => None,
    };

    Ok(ConfigOverrides {
        endpoint: lookup(ENV_INVENTORY_URL).filter(|v| !v.trim().is_empty()),
        poll_interval_ms,
        ..Default::default()
    })
}
