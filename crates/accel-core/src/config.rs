//! grid.toml configuration parser.
//!
//! Every section is optional; omitted fields fall back to the defaults
//! below, so an empty file is a valid configuration.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::WorkloadType;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub scheduler: SchedulerConfig,
    pub scoring: ScoringWeights,
    pub pricing: PricingConfig,
    pub tiers: TierConfig,
    pub optimizer: OptimizerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Algorithm used by `schedule_workload`.
    pub default_algorithm: String,
    /// Upper bound of the workload priority scale.
    pub max_priority: u32,
    /// Keep at most this many history events (oldest dropped first).
    pub history_limit: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_algorithm: "balanced".to_string(),
            max_priority: 10,
            history_limit: None,
        }
    }
}

/// Weights for the balanced algorithm. Normalized by their sum at use time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub least_loaded: f64,
    pub cost: f64,
    pub power: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            least_loaded: 1.0,
            cost: 1.0,
            power: 1.0,
        }
    }
}

impl ScoringWeights {
    /// Weights scaled to sum to 1. Non-positive totals yield equal thirds.
    pub fn normalized(&self) -> (f64, f64, f64) {
        let clamp = |w: f64| if w.is_finite() { w.max(0.0) } else { 0.0 };
        let (l, c, p) = (clamp(self.least_loaded), clamp(self.cost), clamp(self.power));
        let total = l + c + p;
        if total <= 0.0 {
            return (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
        }
        (l / total, c / total, p / total)
    }
}

/// Per-unit hourly rates: currency for cost, watts for power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    pub cpu: f64,
    pub memory_gib: f64,
    pub gpu: f64,
    pub npu: f64,
}

impl RateCard {
    pub fn default_cost() -> Self {
        Self {
            cpu: 0.05,
            memory_gib: 0.01,
            gpu: 1.50,
            npu: 1.00,
        }
    }

    pub fn default_power() -> Self {
        Self {
            cpu: 15.0,
            memory_gib: 0.5,
            gpu: 150.0,
            npu: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub cost: RateCard,
    pub power: RateCard,
    pub workload_multipliers: WorkloadMultipliers,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            cost: RateCard::default_cost(),
            power: RateCard::default_power(),
            workload_multipliers: WorkloadMultipliers::default(),
        }
    }
}

/// Cost multiplier per workload type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadMultipliers {
    pub training: f64,
    pub inference: f64,
    pub batch: f64,
    pub streaming: f64,
    pub serving: f64,
}

impl Default for WorkloadMultipliers {
    fn default() -> Self {
        Self {
            training: 1.2,
            inference: 1.0,
            batch: 0.8,
            streaming: 1.0,
            serving: 1.1,
        }
    }
}

impl WorkloadMultipliers {
    pub fn for_type(&self, workload_type: WorkloadType) -> f64 {
        match workload_type {
            WorkloadType::Training => self.training,
            WorkloadType::Inference => self.inference,
            WorkloadType::Batch => self.batch,
            WorkloadType::Streaming => self.streaming,
            WorkloadType::Serving => self.serving,
        }
    }
}

/// Node tier labels and how they map to relative levels in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    pub cost_label: String,
    pub power_label: String,
    /// Tier value → relative level (0 = cheapest / lowest draw).
    pub levels: HashMap<String, f64>,
    /// Node hourly price at which an unlabeled node scores 0.5.
    pub reference_hourly_cost: f64,
    /// Node wattage at which an unlabeled node scores 0.5.
    pub reference_watts: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            cost_label: "cost-tier".to_string(),
            power_label: "power-tier".to_string(),
            levels: HashMap::from([
                ("low".to_string(), 0.0),
                ("medium".to_string(), 0.5),
                ("high".to_string(), 1.0),
            ]),
            reference_hourly_cost: 2.0,
            reference_watts: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Base score when the snapshot has no nodes.
    pub default_score: f64,
    /// Steepness of the constraint-violation penalty.
    pub penalty_sharpness: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            default_score: 0.8,
            penalty_sharpness: 1.0,
        }
    }
}

impl GridConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: GridConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = GridConfig::from_toml_str("").unwrap();
        assert_eq!(config, GridConfig::default());
        assert_eq!(config.scheduler.default_algorithm, "balanced");
        assert_eq!(config.scheduler.max_priority, 10);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = GridConfig::from_toml_str(
            r#"
[scheduler]
default_algorithm = "cost-optimized"

[pricing.cost]
cpu = 0.1
memory_gib = 0.02
gpu = 3.0
npu = 2.0
"#,
        )
        .unwrap();
        assert_eq!(config.scheduler.default_algorithm, "cost-optimized");
        assert_eq!(config.scheduler.max_priority, 10);
        assert_eq!(config.pricing.cost.gpu, 3.0);
        assert_eq!(config.pricing.power, RateCard::default_power());
    }

    #[test]
    fn weights_normalize_to_one() {
        let (l, c, p) = ScoringWeights {
            least_loaded: 2.0,
            cost: 1.0,
            power: 1.0,
        }
        .normalized();
        assert!((l - 0.5).abs() < 1e-9);
        assert!((l + c + p - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_weights_fall_back_to_equal() {
        let (l, c, p) = ScoringWeights {
            least_loaded: 0.0,
            cost: 0.0,
            power: 0.0,
        }
        .normalized();
        assert_eq!((l, c, p), (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.toml");
        std::fs::write(&path, "[optimizer]\ndefault_score = 0.6\n").unwrap();

        let config = GridConfig::from_file(&path).unwrap();
        assert_eq!(config.optimizer.default_score, 0.6);
        assert_eq!(config.optimizer.penalty_sharpness, 1.0);
    }

    #[test]
    fn roundtrips_through_toml() {
        let toml_str = GridConfig::default().to_toml_string().unwrap();
        assert!(toml_str.contains("default_algorithm"));
        let back = GridConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(back.tiers.cost_label, "cost-tier");
    }

    #[test]
    fn training_costs_more_than_inference() {
        let m = WorkloadMultipliers::default();
        assert!(m.for_type(WorkloadType::Training) >= m.for_type(WorkloadType::Inference));
    }
}
