//! Replica recommendation from observed utilization.
//!
//! For each tracked dimension the desired count is
//! `ceil(current * utilization / target)`, the same proportional rule a
//! horizontal autoscaler uses. The larger of the CPU and memory answers
//! wins, then the result is clamped to `[min_replicas, max_replicas]`.

use tracing::debug;

use accel_core::{AutoscalingSpec, PodSnapshot, WorkloadRequest};

/// Mean usage over request across the pods that report usage, as a
/// percentage. `None` when no pod reports for that dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Utilization {
    pub cpu_pct: Option<f64>,
    pub memory_pct: Option<f64>,
}

impl Utilization {
    pub fn observe(workload: &WorkloadRequest, pods: &[&PodSnapshot]) -> Self {
        let mut cpu = Vec::new();
        let mut memory = Vec::new();
        for pod in pods {
            let Some(usage) = pod.usage else { continue };
            let requested_cpu = if pod.requests.cpu_cores > 0.0 {
                pod.requests.cpu_cores
            } else {
                workload.resources.cpu_cores
            };
            let requested_mem = if pod.requests.memory_gib > 0.0 {
                pod.requests.memory_gib
            } else {
                workload.resources.memory_gib
            };
            if requested_cpu > 0.0 {
                cpu.push(usage.cpu_cores / requested_cpu * 100.0);
            }
            if requested_mem > 0.0 {
                memory.push(usage.memory_gib / requested_mem * 100.0);
            }
        }
        Self {
            cpu_pct: mean(&cpu),
            memory_pct: mean(&memory),
        }
    }
}

/// Recommended replica count; always at least 1.
///
/// Disabled or absent autoscaling yields 1. Without utilization data the
/// current pod count is kept, clamped to the configured bounds.
pub fn recommend_replicas(workload: &WorkloadRequest, pods: &[PodSnapshot]) -> u32 {
    let spec = match &workload.autoscaling {
        Some(spec) if spec.enabled => spec,
        _ => return 1,
    };

    let owned: Vec<&PodSnapshot> = pods
        .iter()
        .filter(|p| p.belongs_to(&workload.id, &workload.namespace))
        .collect();
    let (lo, hi) = bounds(spec);
    if owned.is_empty() {
        return lo;
    }

    let current = u32::try_from(owned.len()).unwrap_or(u32::MAX);
    let utilization = Utilization::observe(workload, &owned);
    let desired = [
        desired_for(current, utilization.cpu_pct, spec.target_cpu_pct),
        desired_for(current, utilization.memory_pct, spec.target_memory_pct),
    ]
    .into_iter()
    .flatten()
    .max()
    .unwrap_or(current);

    let recommended = desired.clamp(lo, hi);
    debug!(
        workload = %workload.id,
        current,
        desired,
        recommended,
        cpu_pct = ?utilization.cpu_pct,
        memory_pct = ?utilization.memory_pct,
        "replica recommendation"
    );
    recommended
}

fn desired_for(current: u32, utilization_pct: Option<f64>, target_pct: u32) -> Option<u32> {
    let utilization = utilization_pct?;
    if target_pct == 0 {
        return None;
    }
    let desired = (f64::from(current) * utilization / f64::from(target_pct)).ceil();
    // Saturating float→int cast; NaN maps to 0 and is clamped later.
    Some(desired as u32)
}

fn bounds(spec: &AutoscalingSpec) -> (u32, u32) {
    let lo = spec.min_replicas.max(1);
    (lo, spec.max_replicas.max(lo))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
