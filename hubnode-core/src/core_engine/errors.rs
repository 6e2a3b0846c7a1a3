/*
    errors.rs - Engine error taxonomy

    Every public engine operation fails with one of four kinds:
    - Request: malformed arguments, unknown message or event type
    - Auth: signer or fname not authorized for the account
    - Validation: schema, hash or signature check failed
    - Store: propagated unchanged from the store layer
*/

use crate::core_message::ValidationError;
use crate::core_store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("Bad request: {0}")]
    Request(String),

    #[error("Unauthorized: {0}")]
    Auth(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type HubResult<T> = Result<T, HubError>;

impl HubError {
    pub fn request(reason: impl Into<String>) -> Self {
        HubError::Request(reason.into())
    }

    pub fn auth(reason: impl Into<String>) -> Self {
        HubError::Auth(reason.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HubError::Store(err) if err.is_not_found())
    }

    /// Short kind label for logs and audit records
    pub fn kind(&self) -> &'static str {
        match self {
            HubError::Request(_) => "request",
            HubError::Auth(_) => "auth",
            HubError::Validation(_) => "validation",
            HubError::Store(_) => "store",
        }
    }
}

impl From<ValidationError> for HubError {
    fn from(err: ValidationError) -> Self {
        HubError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_passes_through() {
        let err: HubError = StoreError::NotFound("cast".to_string()).into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: cast");
        assert_eq!(err.kind(), "store");
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: HubError = ValidationError::InvalidHash.into();
        assert!(matches!(err, HubError::Validation(_)));
        assert!(!err.is_not_found());
    }
}
