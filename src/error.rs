//! Error types for Taxi
//!
//! Failures raised by the token service or the storage service are carried
//! as-is inside the variants below, so callers can downcast to the original
//! SDK error and decide their own recovery policy.

use thiserror::Error;

/// Boxed error as produced by the wrapped SDK clients.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for Taxi operations
#[derive(Error, Debug)]
pub enum TaxiError {
    /// The token service rejected the role assumption
    #[error("Role assumption failed: {0}")]
    AssumeRole(#[source] BoxError),

    /// The token service answered without a credentials block
    #[error("Token service returned no credentials")]
    MissingCredentials,

    /// A storage service call failed
    #[error("S3 {operation} failed: {source}")]
    Storage {
        /// SDK operation name, e.g. `ListObjectsV2`
        operation: &'static str,
        /// Original service error
        #[source]
        source: BoxError,
    },

    /// An SDK request builder rejected the request shape
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The configured HTTP proxy could not be used
    #[error("Invalid HTTP proxy '{url}': {message}")]
    InvalidProxy {
        /// Proxy URL as configured
        url: String,
        /// Why it was rejected
        message: String,
    },

    /// Writing to the output sink failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering settings for output failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TaxiError {
    /// Wrap a token service failure without translating it
    pub fn assume_role(source: impl Into<BoxError>) -> Self {
        Self::AssumeRole(source.into())
    }

    /// Wrap a storage service failure for the named operation
    pub fn storage(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Storage {
            operation,
            source: source.into(),
        }
    }

    /// Create a proxy configuration error
    pub fn proxy(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidProxy {
            url: url.into(),
            message: message.into(),
        }
    }

    /// The original service error, if this failure came from a wrapped client
    pub fn service_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::AssumeRole(source) | Self::Storage { source, .. } => Some(&**source),
            _ => None,
        }
    }

    /// Downcast the wrapped service error to a concrete type
    pub fn downcast_service_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.service_error().and_then(|e| e.downcast_ref::<E>())
    }
}

/// Result type alias for Taxi operations
pub type Result<T> = std::result::Result<T, TaxiError>;
