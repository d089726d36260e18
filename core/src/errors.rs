use std::error::Error;

/// Base trait for dashboard errors.
pub trait RcaError: Error + Send + Sync + 'static {
    /// Stable code used as a structured log field.
    fn error_code(&self) -> &'static str;

    /// Whether the error stems from user input (config, flags) rather than
    /// the environment.
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Why a single inventory fetch failed.
///
/// The polling loop treats every variant the same way: log it, keep the
/// current snapshot, try again on the next tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to reach inventory endpoint '{url}': {message}")]
    Network { url: String, message: String },

    #[error("Inventory endpoint '{url}' answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse inventory response: {message}")]
    Parse { message: String },

    /// The HTTP client could not be set up. Raised when a source is built,
    /// never by a fetch.
    #[error("Failed to create HTTP client: {message}")]
    Client { message: String },
}

impl RcaError for FetchError {
    fn error_code(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "INVENTORY_NETWORK_ERROR",
            FetchError::Status { .. } => "INVENTORY_STATUS_ERROR",
            FetchError::Parse { .. } => "INVENTORY_PARSE_ERROR",
            FetchError::Client { .. } => "HTTP_CLIENT_ERROR",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found at '{path}'")]
    ConfigNotFound { path: String },

    #[error("Failed to parse config file '{path}': {message}")]
    ConfigParseError { path: String, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("IO error reading config: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl RcaError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConfigError::ConfigNotFound { .. }
                | ConfigError::ConfigParseError { .. }
                | ConfigError::InvalidConfiguration { .. }
        )
    }
}
