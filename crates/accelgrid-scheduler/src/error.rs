//! Scheduler error types.

use accel_core::CoreError;
use thiserror::Error;

/// Errors that can occur during scheduling operations.
///
/// A failed call never produces a partial decision.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no nodes supplied for workload {0}")]
    NoFeasibleNodes(String),

    #[error("no node has room for workload {0}")]
    InsufficientResources(String),

    #[error("unknown scheduling algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("malformed {kind} quantity: {input:?}")]
    MalformedQuantity { kind: &'static str, input: String },

    #[error("reservation not found: {namespace}/{workload_id}")]
    ReservationNotFound { workload_id: String, namespace: String },

    #[error("reservation already exists: {namespace}/{workload_id}")]
    ReservationAlreadyExists { workload_id: String, namespace: String },

    #[error("scheduling canceled")]
    Canceled,
}

impl From<CoreError> for SchedulerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedQuantity { kind, input } => SchedulerError::MalformedQuantity { kind, input },
            CoreError::UnknownAlgorithm(name) => SchedulerError::UnknownAlgorithm(name),
            CoreError::InvalidInput(msg) => SchedulerError::InvalidInput(msg),
        }
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
