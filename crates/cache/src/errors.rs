//! Error types for the response cache

use exambox_core::Error;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Error type for cache operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The cache cannot be built from this configuration
    #[error("invalid cache configuration: {message}")]
    Configuration { message: String },

    /// The key cannot be stored
    #[error("invalid cache key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// The value is larger than a single entry may hold
    #[error("value for '{key}' is {requested_bytes} bytes, limit is {limit_bytes}")]
    CapacityExceeded {
        key: String,
        requested_bytes: usize,
        limit_bytes: usize,
    },
}

impl CacheError {
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<CacheError> for Error {
    fn from(error: CacheError) -> Self {
        Error::cache(error.to_string())
    }
}
