//! Built-in scheduling algorithm selectors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The six algorithms every scheduler ships with.
///
/// Selection at runtime goes through the strategy registry by name; this
/// enum is the canonical spelling of the built-in names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    RoundRobin,
    LeastLoaded,
    CostOptimized,
    PowerOptimized,
    Balanced,
    PriorityBased,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::RoundRobin,
        Algorithm::LeastLoaded,
        Algorithm::CostOptimized,
        Algorithm::PowerOptimized,
        Algorithm::Balanced,
        Algorithm::PriorityBased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::RoundRobin => "round-robin",
            Algorithm::LeastLoaded => "least-loaded",
            Algorithm::CostOptimized => "cost-optimized",
            Algorithm::PowerOptimized => "power-optimized",
            Algorithm::Balanced => "balanced",
            Algorithm::PriorityBased => "priority-based",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| CoreError::UnknownAlgorithm(s.to_string()))
    }
}
