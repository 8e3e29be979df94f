//! accelgrid-pricing: cost and power rate models.
//!
//! Both calculators are the same linear model over a [`RateCard`]; they
//! differ only in units (currency per hour vs. watts).
//!
//! [`RateCard`]: accel_core::config::RateCard

pub mod cost;
pub mod model;
pub mod power;

pub use cost::{CostBreakdown, CostCalculator};
pub use model::{Breakdown, HOURS_PER_DAY, HOURS_PER_MONTH, HOURS_PER_YEAR, LinearRateModel, Projection};
pub use power::{PowerBreakdown, PowerCalculator};
