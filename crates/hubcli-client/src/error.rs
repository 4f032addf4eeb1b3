//! Error types for the client library.

use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

/// Errors that can occur while building an HTTP client.
///
/// Once a client exists, per-request failures are surfaced exactly as the
/// transport produced them, as [`reqwest_middleware::Error`]; no layer of the
/// decoration chain wraps or swallows them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The underlying reqwest client could not be built.
    ///
    /// Indicates issues like an unusable TLS backend or invalid builder settings.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// A default header could not be encoded as a header value.
    ///
    /// Typically an application version containing control characters.
    #[error("Invalid value for header {name}: {source}")]
    InvalidHeader {
        /// Name of the offending header.
        name: String,
        /// Underlying encoding error.
        #[source]
        source: InvalidHeaderValue,
    },
}

impl ClientError {
    /// Check if this error came from an invalid header value.
    pub const fn is_invalid_header(&self) -> bool {
        matches!(self, Self::InvalidHeader { .. })
    }
}
