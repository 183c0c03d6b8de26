use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during resource lookups.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No resource matched the lookup criteria.
    #[error("{0}")]
    NotFound(String),

    /// More than one resource matched the lookup criteria.
    #[error("{0}")]
    Ambiguous(String),

    /// The requested lookup provider was not found in the registry.
    #[error("lookup provider not found: {0}")]
    UnknownProvider(String),

    /// The provider failed to execute the lookup.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The provider did not respond within the allowed duration.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The provider was given invalid configuration or parameters.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The provider rejected the request due to rate limiting.
    #[error("rate limited")]
    RateLimited,

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ProviderError {
    /// Returns `true` if the error is transient and the lookup may succeed
    /// on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(_) | Self::RateLimited
        )
    }
}
