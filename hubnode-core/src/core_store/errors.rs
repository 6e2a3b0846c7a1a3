/*
    errors.rs - Error types for the store subsystem

    Defines all error types that can occur in:
    - Message set merges and revocations
    - Registry event persistence
    - Key-value engine transactions
*/

use thiserror::Error;

/// Errors that can occur in the store subsystem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Message type does not belong to this store
    #[error("Invalid message type: {0}")]
    InvalidMessageType(String),

    /// Message shape cannot be keyed by this store
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Storage I/O error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Corrupted data detected
    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound("cast".to_string());
        assert_eq!(err.to_string(), "Not found: cast");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Storage(_)));
        assert!(!store_err.is_not_found());
    }
}
