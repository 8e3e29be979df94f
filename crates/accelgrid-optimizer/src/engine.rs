//! OptimizationEngine: one fitness pass over a workload and its cluster.
//!
//! The pass estimates hourly cost and power for the workload, ranks the
//! supplied nodes with the scheduler's default algorithm, discounts the
//! best score for every violated cost, power, or budget ceiling, and
//! recommends a replica count. It never selects through the round-robin
//! cursor or writes scheduling history.

use std::sync::Arc;

use tracing::{debug, info, warn};

use accel_core::config::OptimizerConfig;
use accel_core::{GridConfig, OptimizationResult, WorkloadRequest, WorkloadState};
use accelgrid_pricing::{CostCalculator, HOURS_PER_MONTH, PowerCalculator};
use accelgrid_scheduler::{AdvancedScheduler, CancelSignal, check_canceled};

use crate::error::{OptimizerError, OptimizerResult};
use crate::replicas::recommend_replicas;

/// Highest score a workload that breaks any ceiling can receive.
const VIOLATION_CAP: f64 = 0.99;

/// A ceiling the estimate went over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation {
    pub constraint: &'static str,
    pub limit: f64,
    pub actual: f64,
}

impl Violation {
    /// `(actual - limit) / limit`.
    pub fn overage_ratio(&self) -> f64 {
        (self.actual - self.limit) / self.limit
    }
}

#[derive(Debug)]
pub struct OptimizationEngine {
    scheduler: Arc<AdvancedScheduler>,
    cost: CostCalculator,
    power: PowerCalculator,
    config: OptimizerConfig,
}

impl Default for OptimizationEngine {
    fn default() -> Self {
        Self::new(&GridConfig::default())
    }
}

impl OptimizationEngine {
    pub fn new(config: &GridConfig) -> Self {
        Self::with_scheduler(config, Arc::new(AdvancedScheduler::new(config)))
    }

    /// Share a scheduler, so live reservations are seen by the pass.
    pub fn with_scheduler(config: &GridConfig, scheduler: Arc<AdvancedScheduler>) -> Self {
        Self {
            scheduler,
            cost: CostCalculator::from_config(&config.pricing),
            power: PowerCalculator::from_config(&config.pricing),
            config: config.optimizer.clone(),
        }
    }

    pub fn scheduler(&self) -> &Arc<AdvancedScheduler> {
        &self.scheduler
    }

    pub fn optimize(&self, state: &WorkloadState) -> OptimizerResult<OptimizationResult> {
        self.optimize_cancellable(state, None)
    }

    pub fn optimize_cancellable(
        &self,
        state: &WorkloadState,
        cancel: Option<&CancelSignal>,
    ) -> OptimizerResult<OptimizationResult> {
        let workload = state
            .workload
            .as_ref()
            .ok_or_else(|| OptimizerError::InvalidInput("workload state has no workload".to_string()))?;
        workload.validate(self.scheduler.max_priority())?;
        check_canceled(cancel)?;

        let estimated_cost = self.cost.estimate_for_workload(workload.workload_type, &workload.resources);
        let estimated_power = self.power.calculate_power(&workload.resources);
        let algorithm = self.scheduler.default_algorithm().to_string();

        let (base, assigned_node) = if state.nodes.is_empty() {
            (self.config.default_score.clamp(0.0, 1.0), None)
        } else {
            let ranking = self
                .scheduler
                .rank_nodes(workload, &state.nodes, &state.pods, &algorithm, cancel)?;
            match ranking.into_iter().next() {
                Some(best) => (best.score, Some(best.node)),
                None => {
                    warn!(workload = %workload.id, nodes = state.nodes.len(), "no feasible node");
                    (0.0, None)
                }
            }
        };

        let violations = self.violations(workload, estimated_cost, estimated_power);
        let score = self.apply_penalty(base, &violations);
        for v in &violations {
            warn!(
                workload = %workload.id,
                constraint = v.constraint,
                limit = v.limit,
                actual = v.actual,
                "constraint violated"
            );
        }

        let recommended_replicas = recommend_replicas(workload, &state.pods);
        let result = OptimizationResult {
            score,
            estimated_cost,
            estimated_power,
            recommended_replicas,
            assigned_node,
            algorithm,
        };
        info!(
            workload = %workload.id,
            namespace = %workload.namespace,
            score = result.score,
            cost = result.estimated_cost,
            power = result.estimated_power,
            replicas = result.recommended_replicas,
            node = ?result.assigned_node,
            "optimization complete"
        );
        Ok(result)
    }

    /// Every ceiling the estimates exceed. Zero or negative ceilings are unset.
    pub fn violations(&self, workload: &WorkloadRequest, cost: f64, power: f64) -> Vec<Violation> {
        let checks = [
            ("max_cost_per_hour", workload.cost_constraints.max_cost_per_hour, cost),
            ("budget_limit", workload.cost_constraints.budget_limit, cost * HOURS_PER_MONTH),
            ("max_power_usage", workload.power_constraints.max_power_usage, power),
        ];
        checks
            .into_iter()
            .filter(|(_, limit, actual)| *limit > 0.0 && actual > limit)
            .map(|(constraint, limit, actual)| Violation {
                constraint,
                limit,
                actual,
            })
            .collect()
    }

    /// `score / (1 + k * overage)` per violation, capped below 1 when any
    /// ceiling is broken and floored at 0.
    pub fn apply_penalty(&self, base: f64, violations: &[Violation]) -> f64 {
        let k = self.config.penalty_sharpness.max(0.0);
        let mut score = base.clamp(0.0, 1.0);
        for v in violations {
            score /= 1.0 + k * v.overage_ratio();
        }
        if !violations.is_empty() {
            score = score.min(VIOLATION_CAP);
            debug!(base, score, violations = violations.len(), "penalty applied");
        }
        if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
    }
}
