//! Resource quantities and their parsing.
//!
//! Every quantity that crosses the core boundary is normalized exactly once
//! into a [`ResourceQuantity`]: fractional CPU cores, memory in GiB, and
//! whole accelerator units. Raw inputs use the familiar cluster notation:
//!
//! - CPU: `"2"`, `"0.5"`, `"250m"` (millicores)
//! - Memory: `"4Gi"`, `"512Mi"`, `"1G"`, `"1048576"` (plain bytes)
//! - Accelerators: non-negative integers

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Normalized resource vector used everywhere inside the core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceQuantity {
    #[serde(default)]
    pub cpu_cores: f64,
    #[serde(default)]
    pub memory_gib: f64,
    #[serde(default)]
    pub gpu_count: u32,
    #[serde(default)]
    pub npu_count: u32,
}

impl ResourceQuantity {
    pub fn new(cpu_cores: f64, memory_gib: f64, gpu_count: u32, npu_count: u32) -> Self {
        Self {
            cpu_cores,
            memory_gib,
            gpu_count,
            npu_count,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.cpu_cores == 0.0 && self.memory_gib == 0.0 && self.gpu_count == 0 && self.npu_count == 0
    }

    /// Whether any accelerator (GPU or NPU) is part of this vector.
    pub fn has_accelerators(&self) -> bool {
        self.gpu_count > 0 || self.npu_count > 0
    }

    /// Componentwise subtraction, floored at zero.
    pub fn saturating_sub(&self, other: &ResourceQuantity) -> ResourceQuantity {
        ResourceQuantity {
            cpu_cores: (self.cpu_cores - other.cpu_cores).max(0.0),
            memory_gib: (self.memory_gib - other.memory_gib).max(0.0),
            gpu_count: self.gpu_count.saturating_sub(other.gpu_count),
            npu_count: self.npu_count.saturating_sub(other.npu_count),
        }
    }

    /// True when every component of `self` is covered by `available`.
    pub fn fits_within(&self, available: &ResourceQuantity) -> bool {
        self.cpu_cores <= available.cpu_cores + f64::EPSILON
            && self.memory_gib <= available.memory_gib + f64::EPSILON
            && self.gpu_count <= available.gpu_count
            && self.npu_count <= available.npu_count
    }

    /// Reject NaN, infinite, or negative components.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.cpu_cores.is_finite() || self.cpu_cores < 0.0 {
            return Err(CoreError::malformed("cpu", &self.cpu_cores.to_string()));
        }
        if !self.memory_gib.is_finite() || self.memory_gib < 0.0 {
            return Err(CoreError::malformed("memory", &self.memory_gib.to_string()));
        }
        Ok(())
    }
}

impl Add for ResourceQuantity {
    type Output = ResourceQuantity;

    fn add(self, rhs: ResourceQuantity) -> ResourceQuantity {
        ResourceQuantity {
            cpu_cores: self.cpu_cores + rhs.cpu_cores,
            memory_gib: self.memory_gib + rhs.memory_gib,
            gpu_count: self.gpu_count.saturating_add(rhs.gpu_count),
            npu_count: self.npu_count.saturating_add(rhs.npu_count),
        }
    }
}

impl AddAssign for ResourceQuantity {
    fn add_assign(&mut self, rhs: ResourceQuantity) {
        *self = *self + rhs;
    }
}

impl Sum for ResourceQuantity {
    fn sum<I: Iterator<Item = ResourceQuantity>>(iter: I) -> Self {
        iter.fold(ResourceQuantity::zero(), Add::add)
    }
}

/// Resource requirements as written by users, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResources {
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub memory: String,
    #[serde(default)]
    pub gpu: i32,
    #[serde(default)]
    pub npu: i32,
}

impl RawResources {
    pub fn new(cpu: &str, memory: &str, gpu: i32, npu: i32) -> Self {
        Self {
            cpu: cpu.to_string(),
            memory: memory.to_string(),
            gpu,
            npu,
        }
    }

    /// Normalize into a [`ResourceQuantity`].
    pub fn normalize(&self) -> CoreResult<ResourceQuantity> {
        Ok(ResourceQuantity {
            cpu_cores: parse_cpu(&self.cpu)?,
            memory_gib: parse_memory(&self.memory)?,
            gpu_count: accelerator_count("gpu", self.gpu)?,
            npu_count: accelerator_count("npu", self.npu)?,
        })
    }
}

/// Anything that can be turned into a normalized quantity.
///
/// Lets calculators accept either form without two parallel APIs.
pub trait ResourceInput {
    fn to_quantity(&self) -> CoreResult<ResourceQuantity>;
}

impl ResourceInput for ResourceQuantity {
    fn to_quantity(&self) -> CoreResult<ResourceQuantity> {
        self.validate()?;
        Ok(*self)
    }
}

impl ResourceInput for RawResources {
    fn to_quantity(&self) -> CoreResult<ResourceQuantity> {
        self.normalize()
    }
}

/// Parse a CPU quantity into fractional cores. Empty input means zero.
pub fn parse_cpu(input: &str) -> CoreResult<f64> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    let (number, suffix) = split_number(s);
    let value = parse_non_negative("cpu", input, number)?;
    match suffix {
        "" => Ok(value),
        "m" => Ok(value / 1000.0),
        _ => Err(CoreError::malformed("cpu", input)),
    }
}

/// Parse a memory quantity into GiB. Empty input means zero.
pub fn parse_memory(input: &str) -> CoreResult<f64> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    let (number, suffix) = split_number(s);
    let value = parse_non_negative("memory", input, number)?;
    let multiplier: f64 = match suffix {
        "" => 1.0,
        "k" | "K" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "E" => 1e18,
        "Ki" => 1024.0,
        "Mi" => 1024.0 * 1024.0,
        "Gi" => BYTES_PER_GIB,
        "Ti" => BYTES_PER_GIB * 1024.0,
        "Pi" => BYTES_PER_GIB * 1024.0 * 1024.0,
        "Ei" => BYTES_PER_GIB * 1024.0 * 1024.0 * 1024.0,
        _ => return Err(CoreError::malformed("memory", input)),
    };
    Ok(value * multiplier / BYTES_PER_GIB)
}

/// Parse an accelerator count written as a string, e.g. `"2"`.
pub fn parse_count(kind: &'static str, input: &str) -> CoreResult<u32> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(0);
    }
    s.parse::<u32>().map_err(|_| CoreError::malformed(kind, input))
}

fn accelerator_count(kind: &'static str, value: i32) -> CoreResult<u32> {
    u32::try_from(value).map_err(|_| CoreError::malformed(kind, &value.to_string()))
}

/// Split `"512Mi"` into `("512", "Mi")`.
fn split_number(s: &str) -> (&str, &str) {
    let idx = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    s.split_at(idx)
}

fn parse_non_negative(kind: &'static str, input: &str, number: &str) -> CoreResult<f64> {
    let value: f64 = number
        .parse()
        .map_err(|_| CoreError::malformed(kind, input))?;
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::malformed(kind, input));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_cpu() {
        assert_eq!(parse_cpu("2").unwrap(), 2.0);
        assert_eq!(parse_cpu("0.5").unwrap(), 0.5);
        assert_eq!(parse_cpu("250m").unwrap(), 0.25);
        assert_eq!(parse_cpu("").unwrap(), 0.0);
    }

    #[test]
    fn parses_binary_and_decimal_memory() {
        assert_eq!(parse_memory("4Gi").unwrap(), 4.0);
        assert!((parse_memory("512Mi").unwrap() - 0.5).abs() < 0.01);
        assert!((parse_memory("1G").unwrap() - 0.931).abs() < 0.01);
        assert_eq!(parse_memory("1Ti").unwrap(), 1024.0);
        assert_eq!(parse_memory("1073741824").unwrap(), 1.0);
    }

    #[test]
    fn memory_grows_with_unit() {
        let sizes: Vec<f64> = ["100Mi", "1Gi", "1000Mi", "2Gi"]
            .iter()
            .map(|s| parse_memory(s).unwrap())
            .collect();
        // 1Gi (1024Mi) is larger than 1000Mi, so compare pairwise where ordering is known.
        assert!(sizes[0] < sizes[1]);
        assert!(sizes[2] < sizes[3]);
    }

    #[test]
    fn rejects_malformed_quantities() {
        assert!(matches!(parse_cpu("two"), Err(CoreError::MalformedQuantity { kind: "cpu", .. })));
        assert!(matches!(parse_cpu("2x"), Err(CoreError::MalformedQuantity { .. })));
        assert!(matches!(parse_memory("4Qi"), Err(CoreError::MalformedQuantity { kind: "memory", .. })));
        assert!(matches!(parse_memory("Gi"), Err(CoreError::MalformedQuantity { .. })));
        assert!(matches!(parse_count("gpu", "1.5"), Err(CoreError::MalformedQuantity { .. })));
    }

    #[test]
    fn negative_accelerators_are_malformed() {
        let raw = RawResources::new("1", "1Gi", -1, 0);
        assert!(matches!(raw.normalize(), Err(CoreError::MalformedQuantity { kind: "gpu", .. })));
    }

    #[test]
    fn normalizes_raw_requirements() {
        let raw = RawResources::new("2", "4Gi", 1, 0);
        let q = raw.normalize().unwrap();
        assert_eq!(q, ResourceQuantity::new(2.0, 4.0, 1, 0));
        assert!(q.has_accelerators());
    }

    #[test]
    fn subtraction_saturates() {
        let a = ResourceQuantity::new(2.0, 4.0, 1, 0);
        let b = ResourceQuantity::new(3.0, 1.0, 2, 0);
        assert_eq!(a.saturating_sub(&b), ResourceQuantity::new(0.0, 3.0, 0, 0));
    }

    #[test]
    fn fits_within_is_componentwise() {
        let need = ResourceQuantity::new(2.0, 4.0, 1, 0);
        assert!(need.fits_within(&ResourceQuantity::new(8.0, 16.0, 2, 0)));
        assert!(!need.fits_within(&ResourceQuantity::new(8.0, 16.0, 0, 4)));
    }

    #[test]
    fn sums_quantities() {
        let total: ResourceQuantity = vec![
            ResourceQuantity::new(1.0, 2.0, 1, 0),
            ResourceQuantity::new(0.5, 1.0, 0, 1),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, ResourceQuantity::new(1.5, 3.0, 1, 1));
    }

    #[test]
    fn validate_rejects_nan() {
        let q = ResourceQuantity::new(f64::NAN, 1.0, 0, 0);
        assert!(q.to_quantity().is_err());
    }
}
