//! Node scoring for placement decisions.
//!
//! Scores a feasible node in `[0, 1]` under a named algorithm. The
//! building blocks shared by the strategies live here:
//! - **Free fraction**: the tightest dimension of
//!   `(allocatable - committed - requested) / allocatable`
//! - **Cost / power level**: from the node's tier label, or from its
//!   priced allocatable when unlabeled
//! - **Priority factor**: `0.5 + 0.5 * priority / max_priority`
//!
//! Preferred affinity adds a bounded bonus on top of content-based scores.

use std::sync::Arc;

use tracing::debug;

use accel_core::config::{GridConfig, ScoringWeights, TierConfig};
use accel_core::{CoreResult, MIN_PRIORITY, NodeSnapshot, ResourceQuantity, WorkloadRequest};
use accelgrid_pricing::{CostCalculator, PowerCalculator};

use crate::affinity::preferred_affinity_fraction;
use crate::strategy::{ScoringContext, ScoringStrategy, Selection, StrategyRegistry};

/// Largest share of the remaining headroom preferred affinity may add.
const AFFINITY_BONUS: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct NodeScorer {
    cost: CostCalculator,
    power: PowerCalculator,
    tiers: TierConfig,
    weights: ScoringWeights,
    max_priority: u32,
    registry: StrategyRegistry,
}

impl Default for NodeScorer {
    fn default() -> Self {
        Self::new(&GridConfig::default())
    }
}

impl NodeScorer {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            cost: CostCalculator::from_config(&config.pricing),
            power: PowerCalculator::from_config(&config.pricing),
            tiers: config.tiers.clone(),
            weights: config.scoring.clone(),
            max_priority: config.scheduler.max_priority.max(MIN_PRIORITY),
            registry: StrategyRegistry::with_builtins(),
        }
    }

    pub fn register(&mut self, strategy: Arc<dyn ScoringStrategy>) {
        self.registry.register(strategy);
    }

    pub fn strategy(&self, name: &str) -> CoreResult<Arc<dyn ScoringStrategy>> {
        self.registry.get(name)
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn cost_calculator(&self) -> &CostCalculator {
        &self.cost
    }

    pub fn power_calculator(&self) -> &PowerCalculator {
        &self.power
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn max_priority(&self) -> u32 {
        self.max_priority
    }

    /// Score `node` under the algorithm registered as `algorithm`.
    pub fn score(
        &self,
        workload: &WorkloadRequest,
        node: &NodeSnapshot,
        committed: &ResourceQuantity,
        algorithm: &str,
    ) -> CoreResult<f64> {
        let strategy = self.strategy(algorithm)?;
        Ok(self.score_with(strategy.as_ref(), workload, node, committed))
    }

    /// Score with an already-resolved strategy. Always within `[0, 1]`.
    pub fn score_with(
        &self,
        strategy: &dyn ScoringStrategy,
        workload: &WorkloadRequest,
        node: &NodeSnapshot,
        committed: &ResourceQuantity,
    ) -> f64 {
        let ctx = ScoringContext {
            workload,
            node,
            committed: *committed,
            scorer: self,
        };
        let base = clamp_unit(strategy.score(&ctx));
        if strategy.selection() == Selection::Rotating {
            return base;
        }

        let score = match preferred_affinity_fraction(&workload.placement_policy.preferred_affinity, &node.labels) {
            Some(fraction) => clamp_unit(base + (1.0 - base) * AFFINITY_BONUS * fraction),
            None => base,
        };
        debug!(
            workload = %workload.id,
            node = %node.name,
            algorithm = strategy.name(),
            base,
            score,
            "scored node"
        );
        score
    }

    /// Tightest remaining fraction across the dimensions the node offers.
    ///
    /// Dimensions with zero allocatable are skipped; a node offering
    /// nothing scores 0.
    pub fn free_fraction(
        requested: &ResourceQuantity,
        allocatable: &ResourceQuantity,
        committed: &ResourceQuantity,
    ) -> f64 {
        let dims = [
            (allocatable.cpu_cores, committed.cpu_cores, requested.cpu_cores),
            (allocatable.memory_gib, committed.memory_gib, requested.memory_gib),
            (
                f64::from(allocatable.gpu_count),
                f64::from(committed.gpu_count),
                f64::from(requested.gpu_count),
            ),
            (
                f64::from(allocatable.npu_count),
                f64::from(committed.npu_count),
                f64::from(requested.npu_count),
            ),
        ];
        dims.iter()
            .filter(|(alloc, _, _)| *alloc > 0.0)
            .map(|(alloc, used, req)| clamp_unit((alloc - used - req) / alloc))
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// `1 - cost level`: cheaper nodes score higher.
    pub fn cost_score(&self, node: &NodeSnapshot) -> f64 {
        let level = self.tier_level(node, &self.tiers.cost_label).unwrap_or_else(|| {
            relative_level(self.cost.calculate_cost(&node.allocatable), self.tiers.reference_hourly_cost)
        });
        1.0 - level
    }

    /// `1 - power level`: lower-draw nodes score higher.
    pub fn power_score(&self, node: &NodeSnapshot) -> f64 {
        let level = self.tier_level(node, &self.tiers.power_label).unwrap_or_else(|| {
            relative_level(self.power.calculate_power(&node.allocatable), self.tiers.reference_watts)
        });
        1.0 - level
    }

    /// Monotonically increasing in `priority`, within `[0.5, 1]`.
    pub fn priority_factor(&self, priority: u32) -> f64 {
        let p = priority.clamp(MIN_PRIORITY, self.max_priority);
        0.5 + 0.5 * f64::from(p) / f64::from(self.max_priority)
    }

    fn tier_level(&self, node: &NodeSnapshot, label: &str) -> Option<f64> {
        let tier = node.labels.get(label)?;
        self.tiers.levels.get(tier).map(|l| clamp_unit(*l))
    }
}

/// Map a non-negative figure into `[0, 1)`, reaching 0.5 at `reference`.
fn relative_level(value: f64, reference: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    if reference <= 0.0 {
        return 1.0;
    }
    value / (value + reference)
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accel_core::{PlacementPolicy, PreferredSchedulingTerm, SelectorTerm, WorkloadType};
    use accel_core::{LabelRequirement, SelectorOperator};

    fn make_workload(priority: u32, resources: ResourceQuantity) -> WorkloadRequest {
        WorkloadRequest {
            id: "job".to_string(),
            namespace: "ml".to_string(),
            workload_type: WorkloadType::Inference,
            priority,
            resources,
            cost_constraints: Default::default(),
            power_constraints: Default::default(),
            placement_policy: PlacementPolicy::default(),
            autoscaling: None,
        }
    }

    fn small() -> ResourceQuantity {
        ResourceQuantity::new(1.0, 2.0, 0, 0)
    }

    fn node(name: &str, cpu: f64, mem: f64) -> NodeSnapshot {
        NodeSnapshot::ready(name, ResourceQuantity::new(cpu, mem, 0, 0))
    }

    #[test]
    fn free_fraction_takes_tightest_dimension() {
        let f = NodeScorer::free_fraction(
            &ResourceQuantity::new(2.0, 4.0, 1, 0),
            &ResourceQuantity::new(8.0, 16.0, 2, 0),
            &ResourceQuantity::zero(),
        );
        // cpu 0.75, memory 0.75, gpu 0.5 → 0.5
        assert!((f - 0.5).abs() < 1e-9);
    }

    #[test]
    fn free_fraction_accounts_for_committed() {
        let idle = NodeScorer::free_fraction(&small(), &ResourceQuantity::new(4.0, 8.0, 0, 0), &ResourceQuantity::zero());
        let busy = NodeScorer::free_fraction(
            &small(),
            &ResourceQuantity::new(4.0, 8.0, 0, 0),
            &ResourceQuantity::new(2.0, 2.0, 0, 0),
        );
        assert!(idle > busy);
    }

    #[test]
    fn least_loaded_prefers_bigger_free_share() {
        let scorer = NodeScorer::default();
        let w = make_workload(5, small());
        let roomy = scorer.score(&w, &node("roomy", 16.0, 32.0), &ResourceQuantity::zero(), "least-loaded").unwrap();
        let tight = scorer.score(&w, &node("tight", 2.0, 4.0), &ResourceQuantity::zero(), "least-loaded").unwrap();
        assert!(roomy > tight);
    }

    #[test]
    fn cost_tiers_order_scores() {
        let scorer = NodeScorer::default();
        let w = make_workload(5, small());
        let score = |tier: &str| {
            scorer
                .score(&w, &node("n", 8.0, 16.0).with_label("cost-tier", tier), &ResourceQuantity::zero(), "cost-optimized")
                .unwrap()
        };
        assert_eq!(score("low"), 1.0);
        assert_eq!(score("medium"), 0.5);
        assert_eq!(score("high"), 0.0);
    }

    #[test]
    fn unlabeled_cheaper_nodes_score_higher() {
        let scorer = NodeScorer::default();
        let cheap = scorer.cost_score(&node("cheap", 2.0, 4.0));
        let pricey = scorer.cost_score(&NodeSnapshot::ready("gpu", ResourceQuantity::new(8.0, 16.0, 4, 0)));
        assert!(cheap > pricey);
        assert!(pricey > 0.0 && cheap < 1.0);
    }

    #[test]
    fn power_tiers_order_scores() {
        let scorer = NodeScorer::default();
        let low = scorer.power_score(&node("n", 4.0, 8.0).with_label("power-tier", "low"));
        let high = scorer.power_score(&node("n", 4.0, 8.0).with_label("power-tier", "high"));
        assert!(low > high);
    }

    #[test]
    fn balanced_stays_in_unit_interval() {
        let scorer = NodeScorer::default();
        let w = make_workload(5, small());
        let n = node("n", 4.0, 8.0).with_label("cost-tier", "low").with_label("power-tier", "high");
        let s = scorer.score(&w, &n, &ResourceQuantity::zero(), "balanced").unwrap();
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn higher_priority_never_scores_lower() {
        let scorer = NodeScorer::default();
        let n = node("n", 8.0, 16.0);
        let mut previous = 0.0;
        for priority in 1..=10 {
            let s = scorer
                .score(&make_workload(priority, small()), &n, &ResourceQuantity::zero(), "priority-based")
                .unwrap();
            assert!(s >= previous);
            previous = s;
        }
    }

    #[test]
    fn round_robin_scores_uniformly() {
        let scorer = NodeScorer::default();
        let w = make_workload(5, small());
        for n in [node("a", 2.0, 4.0), node("b", 64.0, 256.0)] {
            assert_eq!(scorer.score(&w, &n, &ResourceQuantity::zero(), "round-robin").unwrap(), 1.0);
        }
    }

    #[test]
    fn preferred_affinity_boosts_matching_nodes() {
        let scorer = NodeScorer::default();
        let mut w = make_workload(5, small());
        w.placement_policy.preferred_affinity.push(PreferredSchedulingTerm {
            weight: 50,
            preference: SelectorTerm {
                match_expressions: vec![LabelRequirement {
                    key: "node-type".to_string(),
                    operator: SelectorOperator::In,
                    values: vec!["gpu-optimized".to_string()],
                }],
            },
        });
        let preferred = node("a", 8.0, 16.0).with_label("node-type", "gpu-optimized");
        let plain = node("b", 8.0, 16.0);

        let s1 = scorer.score(&w, &preferred, &ResourceQuantity::zero(), "least-loaded").unwrap();
        let s2 = scorer.score(&w, &plain, &ResourceQuantity::zero(), "least-loaded").unwrap();
        assert!(s1 > s2);
        assert!(s1 <= 1.0);
    }

    #[test]
    fn unknown_algorithm_is_an_error() {
        let scorer = NodeScorer::default();
        let w = make_workload(5, small());
        assert!(scorer.score(&w, &node("n", 4.0, 8.0), &ResourceQuantity::zero(), "fifo").is_err());
    }
}
