//! Error types for the websift application.
//!
//! Uses `thiserror` for structured error definitions. Adapter errors
//! propagate uncaught up to the application layer, which reports them
//! per-backend during fan-out.

use thiserror::Error;

/// Main error type for backend (site adapter) operations.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Credentials were rejected by the site
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A fetched URL matched no route in the backend's routing table
    #[error("No page handler routes '{url}'")]
    UnroutableResponse { url: String },

    /// A required DOM/JSON node is missing from an otherwise-matched page
    #[error("Expected element not found: {0}")]
    Extraction(String),

    /// An id or pattern yielded nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// No direct download available, only a magnet reference
    #[error("No direct URL available, use this magnet: {magnet}")]
    MagnetOnly { magnet: String },

    /// The backend does not support the requested operation
    #[error("Capability unsupported: {0}")]
    Unsupported(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// URL construction or validation failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl AdapterError {
    /// True for errors that mean "nothing matched" rather than "something broke".
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdapterError::NotFound(_))
    }
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Missing required configuration value
    #[error("Missing required config value: {0}")]
    MissingValue(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Result type alias using anyhow for application-level error handling.
pub type Result<T> = anyhow::Result<T>;
