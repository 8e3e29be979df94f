//! Error types shared by every AccelGrid crate.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while normalizing inputs at the core boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("malformed {kind} quantity: {input:?}")]
    MalformedQuantity { kind: &'static str, input: String },

    #[error("unknown scheduling algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    pub(crate) fn malformed(kind: &'static str, input: &str) -> Self {
        CoreError::MalformedQuantity {
            kind,
            input: input.to_string(),
        }
    }
}
