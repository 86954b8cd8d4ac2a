//! Error types for gatekit.

use thiserror::Error;

/// Primary error type for all gatekit operations.
#[derive(Error, Debug)]
pub enum GatekitError {
    /// An adapter was used before a channel was attached. Programmer error,
    /// fatal to the call that raised it.
    #[error("Channel is not defined for {0}")]
    ChannelNotDefined(&'static str),

    /// The provider object or endpoint behind a channel is absent.
    #[error("Provider channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// The provider declined the connection (user rejection, provider-side
    /// refusal).
    #[error("Connection rejected by provider: {0}")]
    ConnectionRejected(String),

    /// The connected chain is not a member of the adapter's allowed set.
    #[error("Connected chain {0} is not allowed for this adapter")]
    ConnectedChainNotAllowed(u64),

    #[error("Request timed out after {0}ms")]
    RequestTimeout(u64),

    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    /// A provider descriptor declared a web-version value with no resolver.
    /// Registry misconfiguration, fatal at startup.
    #[error("Unknown web version: {0}")]
    UnknownWebVersion(String),

    /// A family-specific method was invoked without a family override.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Channel,
    Policy,
    Registry,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    Storage,
    Unknown,
}

impl GatekitError {
    /// Create an API error from a status code and response body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ChannelNotDefined(_)
            | Self::ChannelUnavailable(_)
            | Self::ConnectionRejected(_)
            | Self::RequestFailed(_) => ErrorCategory::Channel,
            Self::ConnectedChainNotAllowed(_) => ErrorCategory::Policy,
            Self::UnknownWebVersion(_) | Self::NotImplemented(_) => ErrorCategory::Registry,
            Self::Network(_) => ErrorCategory::Network,
            Self::RequestTimeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Storage(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Api { status, .. } => match status {
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::InvalidState(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Server
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GatekitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_policy_violation_is_not_retryable() {
        let err = GatekitError::ConnectedChainNotAllowed(42);
        assert_eq!(err.category(), ErrorCategory::Policy);
        assert!(!err.is_retryable());
    }

    #[test]
    fn timeout_is_retryable() {
        let err = GatekitError::RequestTimeout(5000);
        assert_eq!(err.category(), ErrorCategory::Timeout);
        assert!(err.is_retryable());
    }

    #[test]
    fn server_status_maps_to_server_category() {
        assert_eq!(GatekitError::api(503, "down").category(), ErrorCategory::Server);
        assert_eq!(GatekitError::api(401, "nope").category(), ErrorCategory::Api);
    }
}
