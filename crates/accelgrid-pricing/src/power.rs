//! Power draw of a resource vector, in watts.

use accel_core::config::{PricingConfig, RateCard};
use accel_core::{CoreResult, ResourceInput, ResourceQuantity};

use crate::model::{Breakdown, LinearRateModel, Projection};

pub type PowerBreakdown = Breakdown;

/// Power calculator. Projections are energy in watt-hours.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerCalculator {
    rates: RateCard,
}

impl Default for PowerCalculator {
    fn default() -> Self {
        Self::new(RateCard::default_power())
    }
}

impl LinearRateModel for PowerCalculator {
    fn rates(&self) -> &RateCard {
        &self.rates
    }
}

impl PowerCalculator {
    pub fn new(rates: RateCard) -> Self {
        Self { rates }
    }

    pub fn from_config(pricing: &PricingConfig) -> Self {
        Self::new(pricing.power)
    }

    pub fn calculate_power(&self, q: &ResourceQuantity) -> f64 {
        self.hourly(q)
    }

    pub fn calculate_power_from<R: ResourceInput + ?Sized>(&self, input: &R) -> CoreResult<f64> {
        self.hourly_from(input)
    }

    pub fn breakdown(&self, q: &ResourceQuantity) -> PowerBreakdown {
        LinearRateModel::breakdown(self, q)
    }

    pub fn daily_energy(&self, q: &ResourceQuantity) -> f64 {
        self.projection(q).daily
    }

    pub fn monthly_energy(&self, q: &ResourceQuantity) -> f64 {
        self.projection(q).monthly
    }

    pub fn yearly_energy(&self, q: &ResourceQuantity) -> f64 {
        self.projection(q).yearly
    }

    pub fn projections(&self, q: &ResourceQuantity) -> Projection {
        self.projection(q)
    }
}
