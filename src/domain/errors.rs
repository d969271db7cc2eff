//! # Domain Errors
//!
//! Business rule violations raised by domain entities.

use crate::domain::value_objects::arithmetic::ArithmeticError;
use crate::domain::value_objects::enums::ProviderCode;
use thiserror::Error;

/// Errors raised when a domain invariant is violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A request field holds a structurally invalid value.
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        /// Canonical wire name of the field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// A session handle was presented to the wrong provider.
    #[error("session handle belongs to {actual}, expected {expected}")]
    SessionProviderMismatch {
        /// Provider the caller targeted.
        expected: ProviderCode,
        /// Provider that issued the handle.
        actual: ProviderCode,
    },

    /// The session handle carries the wrong kind of continuation data.
    #[error("session handle for {0} carries unexpected continuation data")]
    SessionShapeMismatch(ProviderCode),

    /// A plan or pack code is not in the provider's catalog.
    #[error("unknown plan '{plan}' for {provider}")]
    UnknownPlan {
        /// Provider queried.
        provider: ProviderCode,
        /// Offending plan code.
        plan: String,
    },

    /// An option value is not accepted by the selected plan.
    #[error("option '{code}' does not accept value {value} on plan '{plan}'")]
    InvalidOption {
        /// Plan code.
        plan: String,
        /// Guarantee or option code.
        code: String,
        /// Rejected value.
        value: i64,
    },

    /// Pricing arithmetic failed.
    #[error("pricing arithmetic failed: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

impl DomainError {
    /// Creates an invalid field error.
    #[must_use]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_display() {
        let err = DomainError::invalid_field("valeur_neuf", "must be positive");
        assert_eq!(err.to_string(), "invalid field 'valeur_neuf': must be positive");
    }

    #[test]
    fn mismatch_display() {
        let err = DomainError::SessionProviderMismatch {
            expected: ProviderCode::Axa,
            actual: ProviderCode::Mcma,
        };
        assert_eq!(
            err.to_string(),
            "session handle belongs to mcma, expected axa"
        );
    }

    #[test]
    fn arithmetic_converts() {
        let err: DomainError = ArithmeticError::Overflow.into();
        assert!(matches!(err, DomainError::Arithmetic(_)));
    }
}
