//! accelgrid-placement: feasibility filtering and node scoring.
//!
//! Placement is a two-stage pipeline. The filter drops nodes that cannot
//! host a workload at all; the scorer ranks what remains under one of the
//! registered algorithms. Neither stage holds state, so the same inputs
//! always produce the same ranking.
//!
//! # Components
//!
//! - **`affinity`**: label selectors, tolerations, preferred terms
//! - **`filter`**: readiness, capacity, selectors, taints, anti-affinity
//! - **`strategy`**: the built-in algorithms and their registry
//! - **`scorer`**: shared scoring primitives and the affinity bonus

pub mod affinity;
pub mod filter;
pub mod scorer;
pub mod strategy;

pub use filter::{ClusterView, Rejection, check, committed_on, feasible_nodes, is_feasible};
pub use scorer::NodeScorer;
pub use strategy::{
    Balanced, CostOptimized, LeastLoaded, PowerOptimized, PriorityBased, RoundRobin, ScoringContext,
    ScoringStrategy, Selection, StrategyRegistry,
};
