//! accelgrid-scheduler: node selection, reservations, and decision history.
//!
//! Wraps the placement pipeline from `accelgrid-placement` with the state
//! that has to outlive a single call:
//!
//! - Selects a node per workload under any registered algorithm
//! - Holds provisional reservations so concurrent placements do not
//!   overcommit a node
//! - Logs every decision and aggregates per-algorithm statistics
//!
//! # Architecture
//!
//! ```text
//! AdvancedScheduler
//!   ├── NodeScorer (filter + strategy registry, stateless)
//!   ├── RoundRobinCursor (lock-free rotation)
//!   ├── ReservationStore (RwLock<HashMap>)
//!   └── SchedulingHistory (RwLock<VecDeque>)
//! ```

pub mod cancel;
pub mod cursor;
pub mod error;
pub mod history;
pub mod reservation;
pub mod scheduler;

pub use cancel::{CancelSignal, check_canceled};
pub use cursor::RoundRobinCursor;
pub use error::{SchedulerError, SchedulerResult};
pub use history::{AlgorithmStats, SchedulingHistory};
pub use reservation::ReservationStore;
pub use scheduler::{AdvancedScheduler, NodeRanking};
