//! Domain error types.

use common::Money;
use store::StoreError;
use thiserror::Error;

use crate::auth::TokenError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The addressed record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness or referential constraint was violated.
    #[error("{0}")]
    Conflict(String),

    /// The request carried invalid input.
    #[error("{0}")]
    BadRequest(String),

    /// The operation is not allowed in the record's current status.
    #[error("{0}")]
    InvalidState(String),

    /// A payment amount differs from the order price.
    #[error("Amount mismatch: order price is {expected}, got {actual}")]
    AmountMismatch { expected: Money, actual: Money },

    /// The dish cannot be ordered right now.
    #[error("{0}")]
    Unavailable(String),

    /// Credentials did not match any identity.
    #[error("Invalid credentials")]
    Unauthenticated,

    /// A token was valid but its identity no longer exists.
    #[error("Principal not found")]
    PrincipalNotFound,

    /// The bearer token failed verification.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The principal's role may not perform the operation.
    #[error("{0}")]
    Forbidden(String),

    /// An unexpected failure, typically in storage.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => DomainError::NotFound(e.to_string()),
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            StoreError::Invalid(msg) => DomainError::BadRequest(msg),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(e: validator::ValidationErrors) -> Self {
        DomainError::BadRequest(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_by_kind() {
        let err: DomainError = StoreError::not_found("order", "ORD0001").into();
        assert!(matches!(err, DomainError::NotFound(ref m) if m == "order not found: ORD0001"));

        let err: DomainError = StoreError::Conflict("taken".to_string()).into();
        assert!(matches!(err, DomainError::Conflict(_)));

        let err: DomainError = StoreError::Invalid("value too long".to_string()).into();
        assert!(matches!(err, DomainError::BadRequest(_)));

        let err: DomainError = StoreError::Decode("status: bogus".to_string()).into();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn amount_mismatch_message() {
        let err = DomainError::AmountMismatch {
            expected: Money::from_cents(1000),
            actual: Money::from_cents(999),
        };
        assert_eq!(
            err.to_string(),
            "Amount mismatch: order price is 10.00, got 9.99"
        );
    }
}
