//! Error types for configuration and credential lookup.

use thiserror::Error;

/// Errors that can occur while loading configuration or looking up credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The platform configuration directory could not be determined.
    #[error("Failed to determine config directory")]
    ConfigDir,

    /// No value is stored for the requested host and key.
    #[error("No value for '{key}' on host '{host}'")]
    NotFound {
        /// Normalized hostname that was queried.
        host: String,
        /// Credential kind that was queried.
        key: String,
    },
}

impl ConfigError {
    /// Builds a [`ConfigError::NotFound`] for the given host and key.
    pub fn not_found(host: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            host: host.into(),
            key: key.into(),
        }
    }

    /// Check if this error only means "nothing stored".
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias using `ConfigError`.
pub type Result<T> = std::result::Result<T, ConfigError>;
