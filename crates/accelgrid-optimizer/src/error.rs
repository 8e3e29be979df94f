//! Optimizer error types.

use accel_core::CoreError;
use accelgrid_scheduler::SchedulerError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("optimization canceled")]
    Canceled,

    #[error("malformed {kind} quantity: {input:?}")]
    MalformedQuantity { kind: &'static str, input: String },

    #[error(transparent)]
    Scheduling(SchedulerError),
}

impl From<CoreError> for OptimizerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedQuantity { kind, input } => OptimizerError::MalformedQuantity { kind, input },
            CoreError::InvalidInput(msg) => OptimizerError::InvalidInput(msg),
            other => OptimizerError::Scheduling(other.into()),
        }
    }
}

impl From<SchedulerError> for OptimizerError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::Canceled => OptimizerError::Canceled,
            SchedulerError::InvalidInput(msg) => OptimizerError::InvalidInput(msg),
            SchedulerError::MalformedQuantity { kind, input } => OptimizerError::MalformedQuantity { kind, input },
            other => OptimizerError::Scheduling(other),
        }
    }
}

pub type OptimizerResult<T> = Result<T, OptimizerError>;
