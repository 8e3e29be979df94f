//! The linear rate model shared by cost and power.
//!
//! `value = cpu * rate.cpu + memory * rate.memory_gib + gpu * rate.gpu + npu * rate.npu`
//!
//! Projections use fixed multipliers (a month is 30 days, a year 365);
//! calendar-exact accounting is not attempted.

use serde::{Deserialize, Serialize};

use accel_core::config::RateCard;
use accel_core::{CoreResult, ResourceInput, ResourceQuantity};

pub const HOURS_PER_DAY: f64 = 24.0;
pub const HOURS_PER_MONTH: f64 = 720.0;
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Per-resource contribution to an hourly figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub cpu: f64,
    pub memory: f64,
    pub gpu: f64,
    pub npu: f64,
    /// `cpu + memory + gpu + npu`.
    pub total: f64,
}

impl Breakdown {
    fn from_terms(cpu: f64, memory: f64, gpu: f64, npu: f64) -> Self {
        Self {
            cpu,
            memory,
            gpu,
            npu,
            total: cpu + memory + gpu + npu,
        }
    }
}

/// An hourly figure projected over longer horizons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub hourly: f64,
    pub daily: f64,
    pub monthly: f64,
    pub yearly: f64,
}

impl Projection {
    pub fn from_hourly(hourly: f64) -> Self {
        Self {
            hourly,
            daily: hourly * HOURS_PER_DAY,
            monthly: hourly * HOURS_PER_MONTH,
            yearly: hourly * HOURS_PER_YEAR,
        }
    }
}

/// A calculator that maps a resource vector to a figure through a [`RateCard`].
///
/// Implementors only supply the card; every calculation is provided.
pub trait LinearRateModel {
    fn rates(&self) -> &RateCard;

    fn breakdown(&self, q: &ResourceQuantity) -> Breakdown {
        let r = self.rates();
        Breakdown::from_terms(
            q.cpu_cores * r.cpu,
            q.memory_gib * r.memory_gib,
            f64::from(q.gpu_count) * r.gpu,
            f64::from(q.npu_count) * r.npu,
        )
    }

    fn hourly(&self, q: &ResourceQuantity) -> f64 {
        self.breakdown(q).total
    }

    /// Normalize raw input first; malformed quantities surface as errors.
    fn hourly_from<R: ResourceInput + ?Sized>(&self, input: &R) -> CoreResult<f64> {
        Ok(self.hourly(&input.to_quantity()?))
    }

    fn projection(&self, q: &ResourceQuantity) -> Projection {
        Projection::from_hourly(self.hourly(q))
    }
}
