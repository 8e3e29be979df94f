//! Pass-through cancellation.
//!
//! Callers hand in the receiving half of a `watch` channel; `true` means
//! stop. The scheduler only polls it, so no runtime is required.

use tokio::sync::watch;

use crate::error::{SchedulerError, SchedulerResult};

pub type CancelSignal = watch::Receiver<bool>;

/// `Err(Canceled)` once the signal has fired.
pub fn check_canceled(cancel: Option<&CancelSignal>) -> SchedulerResult<()> {
    match cancel {
        Some(rx) if *rx.borrow() => Err(SchedulerError::Canceled),
        _ => Ok(()),
    }
}
