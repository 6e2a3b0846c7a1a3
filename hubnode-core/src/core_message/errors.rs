/*
    errors.rs - Error types for message parsing and validation

    Produced by the identifier parsers and by the schema/signature validator.
    These never depend on store state.
*/

use thiserror::Error;

/// Reasons a message, identifier, or registry event is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Account id was zero
    #[error("fid is missing or zero")]
    InvalidFid,

    /// Fixed-width byte field had the wrong length
    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidLength { field: &'static str, expected: usize, actual: usize },

    /// Message targets a different network than this node
    #[error("invalid network: expected {expected}, got {actual}")]
    NetworkMismatch { expected: String, actual: String },

    /// Timestamp too far ahead of the local clock
    #[error("timestamp more than {0} seconds in the future")]
    FutureTimestamp(u32),

    /// Body variant does not fit the declared message type
    #[error("body does not match message type {0}")]
    BodyMismatch(String),

    /// A body field failed its shape rule
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Hash does not match the message data
    #[error("hash does not match message data")]
    InvalidHash,

    /// Signature does not verify against the signer
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Signer kind is not allowed for this message type
    #[error("invalid signer: {0}")]
    InvalidSigner(String),

    /// Canonical encoding failed
    #[error("encoding error: {0}")]
    Encoding(String),
}

/// Result type for message validation
pub type ValidationResult<T> = Result<T, ValidationError>;

impl From<bincode::Error> for ValidationError {
    fn from(err: bincode::Error) -> Self {
        ValidationError::Encoding(err.to_string())
    }
}
