//! Scoring strategies and the registry that dispatches them by name.
//!
//! Each built-in algorithm is a small stateless object implementing
//! [`ScoringStrategy`]. New algorithms are added by registering another
//! implementation; nothing else in the scheduler needs to change.

use std::collections::HashMap;
use std::sync::Arc;

use accel_core::{Algorithm, CoreError, CoreResult, NodeSnapshot, ResourceQuantity, WorkloadRequest};

use crate::scorer::NodeScorer;

/// How the scheduler picks among feasible nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Highest score wins; ties go to the first node in input order.
    HighestScore,
    /// A persistent cursor walks the feasible set; scores are uniform.
    Rotating,
}

/// Inputs to a single node score.
pub struct ScoringContext<'a> {
    pub workload: &'a WorkloadRequest,
    pub node: &'a NodeSnapshot,
    /// Resources already held on the node by pods and other reservations.
    pub committed: ResourceQuantity,
    pub scorer: &'a NodeScorer,
}

pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn selection(&self) -> Selection {
        Selection::HighestScore
    }

    /// Raw score; callers clamp the result into `[0, 1]`.
    fn score(&self, ctx: &ScoringContext<'_>) -> f64;
}

pub struct RoundRobin;

impl ScoringStrategy for RoundRobin {
    fn name(&self) -> &str {
        Algorithm::RoundRobin.as_str()
    }

    fn selection(&self) -> Selection {
        Selection::Rotating
    }

    fn score(&self, _ctx: &ScoringContext<'_>) -> f64 {
        1.0
    }
}

pub struct LeastLoaded;

impl ScoringStrategy for LeastLoaded {
    fn name(&self) -> &str {
        Algorithm::LeastLoaded.as_str()
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> f64 {
        NodeScorer::free_fraction(&ctx.workload.resources, &ctx.node.allocatable, &ctx.committed)
    }
}

pub struct CostOptimized;

impl ScoringStrategy for CostOptimized {
    fn name(&self) -> &str {
        Algorithm::CostOptimized.as_str()
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> f64 {
        ctx.scorer.cost_score(ctx.node)
    }
}

pub struct PowerOptimized;

impl ScoringStrategy for PowerOptimized {
    fn name(&self) -> &str {
        Algorithm::PowerOptimized.as_str()
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> f64 {
        ctx.scorer.power_score(ctx.node)
    }
}

pub struct Balanced;

impl ScoringStrategy for Balanced {
    fn name(&self) -> &str {
        Algorithm::Balanced.as_str()
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> f64 {
        let (w_load, w_cost, w_power) = ctx.scorer.weights().normalized();
        w_load * LeastLoaded.score(ctx) + w_cost * CostOptimized.score(ctx) + w_power * PowerOptimized.score(ctx)
    }
}

/// Least-loaded score scaled by `0.5 + 0.5 * priority / max_priority`.
pub struct PriorityBased;

impl ScoringStrategy for PriorityBased {
    fn name(&self) -> &str {
        Algorithm::PriorityBased.as_str()
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> f64 {
        LeastLoaded.score(ctx) * ctx.scorer.priority_factor(ctx.workload.priority)
    }
}

/// Name → strategy lookup table.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn ScoringStrategy>>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// A registry holding the six built-in algorithms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(RoundRobin));
        registry.register(Arc::new(LeastLoaded));
        registry.register(Arc::new(CostOptimized));
        registry.register(Arc::new(PowerOptimized));
        registry.register(Arc::new(Balanced));
        registry.register(Arc::new(PriorityBased));
        registry
    }

    /// Add or replace a strategy under its own name.
    pub fn register(&mut self, strategy: Arc<dyn ScoringStrategy>) {
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    pub fn get(&self, name: &str) -> CoreResult<Arc<dyn ScoringStrategy>> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::UnknownAlgorithm(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.strategies.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}
