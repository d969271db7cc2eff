//! # Application Errors
//!
//! Error types for the application layer.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError                - returned by use cases
//! ├── Validation(String)          - structurally invalid input
//! ├── Unsupported(ProviderCode)   - provider lacks the operation
//! ├── NotFound                    - unknown or expired comparison session
//! ├── Provider(ProviderError)     - upstream failure during an update
//! └── Store(StoreError)           - session store failure
//!
//! PipelineError                   - one provider's map, fetch, normalize run
//! ├── Mapping                     - missing canonical field
//! ├── Transport                   - network, timeout or status failure
//! ├── Parse                       - unrecognized response shape
//! ├── Resource                    - automation resource failure
//! ├── QueueTimeout                - automation wait budget exceeded
//! ├── Panicked                    - pipeline task panicked
//! └── Timeout                     - pipeline wait budget exceeded
//! ```
//!
//! Pipeline errors never escape a comparison; they are rendered into the
//! failing provider's outcome.
//!
//! # Examples
//!
//! ```
//! use motor_quote_aggregator::application::error::ApplicationError;
//!
//! let err = ApplicationError::validation("valeur_neuf must be positive");
//! assert!(err.is_validation());
//! ```

use crate::application::mapping::MissingFieldError;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::enums::ProviderCode;
use crate::infrastructure::persistence::StoreError;
use crate::infrastructure::providers::error::ProviderError;
use thiserror::Error;

/// Failure of a single provider pipeline.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// A field the provider requires is absent from the request.
    #[error("{0}")]
    Mapping(#[from] MissingFieldError),

    /// The upstream call failed.
    #[error("{0}")]
    Transport(ProviderError),

    /// The upstream answered with a shape the normalizer does not know.
    #[error("unrecognized response: {0}")]
    Parse(String),

    /// The automation resource could not be created or crashed.
    #[error("{0}")]
    Resource(ProviderError),

    /// The automation job did not complete within its wait budget.
    #[error("{0}")]
    QueueTimeout(ProviderError),

    /// The pipeline task panicked.
    #[error("provider task panicked: {0}")]
    Panicked(String),

    /// The pipeline did not finish within its wait budget.
    #[error("provider did not respond within {timeout_ms}ms")]
    Timeout {
        /// Wait budget in milliseconds.
        timeout_ms: u64,
    },
}

impl PipelineError {
    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a panic error.
    #[must_use]
    pub fn panicked(message: impl Into<String>) -> Self {
        Self::Panicked(message.into())
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// Returns a short stable name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mapping(_) => "mapping",
            Self::Transport(_) => "transport",
            Self::Parse(_) => "parse",
            Self::Resource(_) => "resource",
            Self::QueueTimeout(_) => "queue_timeout",
            Self::Panicked(_) => "panicked",
            Self::Timeout { .. } => "timeout",
        }
    }
}

impl From<ProviderError> for PipelineError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Resource { .. } => Self::Resource(error),
            ProviderError::QueueTimeout { .. } => Self::QueueTimeout(error),
            other => Self::Transport(other),
        }
    }
}

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The provider does not support the requested operation.
    #[error("provider {0} does not support quote updates")]
    Unsupported(ProviderCode),

    /// Resource not found.
    #[error("not found: {resource_type} with id {id}")]
    NotFound {
        /// Type of resource.
        resource_type: String,
        /// Resource identifier.
        id: String,
    },

    /// Upstream failure.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Session store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Returns true for validation errors.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true for not found errors.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::Store(StoreError::Unavailable(_)) => true,
            _ => false,
        }
    }
}

impl From<DomainError> for ApplicationError {
    fn from(error: DomainError) -> Self {
        Self::Validation(error.to_string())
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_split_by_kind() {
        let resource: PipelineError = ProviderError::resource("browser gone").into();
        assert_eq!(resource.kind(), "resource");

        let waited: PipelineError = ProviderError::queue_timeout(500).into();
        assert_eq!(waited.kind(), "queue_timeout");

        let transport: PipelineError = ProviderError::upstream(502, "bad gateway").into();
        assert_eq!(transport.kind(), "transport");
        assert!(transport.to_string().contains("502"));
    }

    #[test]
    fn mapping_error_names_field() {
        let err: PipelineError = MissingFieldError::new("date_mec").into();
        assert_eq!(err.kind(), "mapping");
        assert!(err.to_string().contains("date_mec"));
    }

    #[test]
    fn domain_errors_are_validation() {
        let err: ApplicationError = DomainError::UnknownPlan {
            provider: ProviderCode::Axa,
            plan: "9".into(),
        }
        .into();
        assert!(err.is_validation());
    }

    #[test]
    fn retryable_follows_provider() {
        let err = ApplicationError::from(ProviderError::timeout("slow"));
        assert!(err.is_retryable());
        assert!(!ApplicationError::Unsupported(ProviderCode::Rma).is_retryable());
        assert!(ApplicationError::not_found("comparison", "x").is_not_found());
    }
}
