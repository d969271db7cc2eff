//! # Provider Errors
//!
//! Error types for provider adapter operations.
//!
//! Every failure an adapter can hit (network, upstream status, automation
//! resource, queue wait) is expressed as a [`ProviderError`]. The aggregator
//! converts these into per-provider error entries; they never escape a
//! comparison.
//!
//! # Examples
//!
//! ```
//! use motor_quote_aggregator::infrastructure::providers::error::ProviderError;
//!
//! let error = ProviderError::timeout("request timed out after 30000ms");
//! assert!(error.is_retryable());
//!
//! let error = ProviderError::session_expired("token rejected");
//! assert!(!error.is_retryable());
//! ```

use crate::domain::errors::DomainError;
use crate::domain::value_objects::arithmetic::ArithmeticError;
use thiserror::Error;

/// Error type for provider adapter operations.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Request timed out.
    #[error("provider timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
        /// Timeout duration in milliseconds.
        timeout_ms: Option<u64>,
    },

    /// Network or connection error.
    #[error("provider connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Authentication or authorization failure.
    #[error("provider authentication error: {message}")]
    Authentication {
        /// Error message.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("provider rate limit exceeded: {message}")]
    RateLimited {
        /// Error message.
        message: String,
    },

    /// Upstream rejected the request parameters.
    #[error("provider invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// Upstream resource does not exist.
    #[error("provider resource not found: {message}")]
    NotFound {
        /// Error message.
        message: String,
    },

    /// Upstream server failure (5xx).
    #[error("provider server error ({status}): {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Upstream answered successfully but reported a business failure.
    #[error("provider rejected request: {message}")]
    Rejected {
        /// Error message.
        message: String,
    },

    /// Response body could not be interpreted.
    #[error("provider protocol error: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// A continuation session is no longer valid upstream.
    #[error("provider session expired: {message}")]
    SessionExpired {
        /// Error message.
        message: String,
    },

    /// The automation resource could not be created or crashed.
    #[error("automation resource error: {message}")]
    Resource {
        /// Error message.
        message: String,
    },

    /// The caller stopped waiting for a queued automation job.
    #[error("automation job not completed within {timeout_ms}ms")]
    QueueTimeout {
        /// Wait budget in milliseconds.
        timeout_ms: u64,
    },

    /// Internal adapter error.
    #[error("provider internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: None,
        }
    }

    /// Creates a timeout error with duration.
    #[must_use]
    pub fn timeout_with_duration(message: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: Some(timeout_ms),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates an upstream server error.
    #[must_use]
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Creates a rejected error.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a session expired error.
    #[must_use]
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::SessionExpired {
            message: message.into(),
        }
    }

    /// Creates an automation resource error.
    #[must_use]
    pub fn resource(message: impl Into<String>) -> Self {
        Self::Resource {
            message: message.into(),
        }
    }

    /// Creates a queue timeout error.
    #[must_use]
    pub fn queue_timeout(timeout_ms: u64) -> Self {
        Self::QueueTimeout { timeout_ms }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error is transient and the call may succeed on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Connection { .. }
                | Self::RateLimited { .. }
                | Self::Upstream { .. }
        )
    }

    /// Returns true if this error concerns the automation resource or its queue.
    #[must_use]
    pub fn is_automation_error(&self) -> bool {
        matches!(self, Self::Resource { .. } | Self::QueueTimeout { .. })
    }

    /// Reinterprets a rejection of a bearer-scoped call as session expiry.
    ///
    /// Authentication and not-found failures on a continuation call mean the
    /// upstream no longer recognizes the session.
    #[must_use]
    pub fn into_session_error(self) -> Self {
        match self {
            Self::Authentication { message } | Self::NotFound { message } => {
                Self::SessionExpired { message }
            }
            other => other,
        }
    }
}

impl From<DomainError> for ProviderError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Arithmetic(e) => Self::from(e),
            other => Self::invalid_request(other.to_string()),
        }
    }
}

impl From<ArithmeticError> for ProviderError {
    fn from(error: ArithmeticError) -> Self {
        Self::internal(format!("pricing arithmetic failed: {}", error))
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
