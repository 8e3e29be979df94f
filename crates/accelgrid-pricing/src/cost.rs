//! Monetary cost of a resource vector.

use accel_core::config::{PricingConfig, RateCard, WorkloadMultipliers};
use accel_core::{CoreResult, ResourceInput, ResourceQuantity, WorkloadType};

use crate::model::{Breakdown, LinearRateModel, Projection};

pub type CostBreakdown = Breakdown;

/// Hourly cost calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct CostCalculator {
    rates: RateCard,
    multipliers: WorkloadMultipliers,
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self::new(RateCard::default_cost())
    }
}

impl LinearRateModel for CostCalculator {
    fn rates(&self) -> &RateCard {
        &self.rates
    }
}

impl CostCalculator {
    pub fn new(rates: RateCard) -> Self {
        Self {
            rates,
            multipliers: WorkloadMultipliers::default(),
        }
    }

    pub fn from_config(pricing: &PricingConfig) -> Self {
        Self {
            rates: pricing.cost,
            multipliers: pricing.workload_multipliers.clone(),
        }
    }

    /// Hourly cost of `q`. Zero resources cost exactly zero.
    pub fn calculate_cost(&self, q: &ResourceQuantity) -> f64 {
        self.hourly(q)
    }

    /// Hourly cost of raw or normalized input.
    pub fn calculate_cost_from<R: ResourceInput + ?Sized>(&self, input: &R) -> CoreResult<f64> {
        self.hourly_from(input)
    }

    pub fn breakdown(&self, q: &ResourceQuantity) -> CostBreakdown {
        LinearRateModel::breakdown(self, q)
    }

    pub fn daily_cost(&self, q: &ResourceQuantity) -> f64 {
        self.projection(q).daily
    }

    pub fn monthly_cost(&self, q: &ResourceQuantity) -> f64 {
        self.projection(q).monthly
    }

    pub fn yearly_cost(&self, q: &ResourceQuantity) -> f64 {
        self.projection(q).yearly
    }

    pub fn projections(&self, q: &ResourceQuantity) -> Projection {
        self.projection(q)
    }

    /// Hourly cost adjusted for the workload's type.
    pub fn estimate_for_workload(&self, workload_type: WorkloadType, q: &ResourceQuantity) -> f64 {
        self.calculate_cost(q) * self.multipliers.for_type(workload_type)
    }

    /// Positive when `optimized` is cheaper than `original`.
    pub fn savings(original: f64, optimized: f64) -> f64 {
        original - optimized
    }
}
