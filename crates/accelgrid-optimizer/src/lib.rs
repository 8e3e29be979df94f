//! accelgrid-optimizer: workload fitness and replica recommendations.
//!
//! Turns a workload plus a cluster snapshot into an
//! [`OptimizationResult`](accel_core::OptimizationResult): a score in
//! `[0, 1]`, hourly cost and power estimates, the best feasible node, and
//! a replica count for the autoscaler.

pub mod engine;
pub mod error;
pub mod replicas;

pub use engine::{OptimizationEngine, Violation};
pub use error::{OptimizerError, OptimizerResult};
pub use replicas::{Utilization, recommend_replicas};
