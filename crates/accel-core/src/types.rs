//! Domain types exchanged between the core and its callers.
//!
//! Workloads and snapshots are supplied per call and never mutated.
//! Decisions, reservations, and events are plain values; the crates that
//! own shared state wrap them in their own synchronization.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::quantity::ResourceQuantity;

/// Pod label that ties a pod to the workload that owns it.
pub const WORKLOAD_LABEL: &str = "accelgrid.io/workload";

/// Lowest workload priority.
pub const MIN_PRIORITY: u32 = 1;

// ── Workload ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadType {
    Training,
    Inference,
    Batch,
    Streaming,
    Serving,
}

impl WorkloadType {
    pub const ALL: [WorkloadType; 5] = [
        WorkloadType::Training,
        WorkloadType::Inference,
        WorkloadType::Batch,
        WorkloadType::Streaming,
        WorkloadType::Serving,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadType::Training => "training",
            WorkloadType::Inference => "inference",
            WorkloadType::Batch => "batch",
            WorkloadType::Streaming => "streaming",
            WorkloadType::Serving => "serving",
        }
    }
}

impl fmt::Display for WorkloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkloadType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown workload type: {s}")))
    }
}

/// A workload asking to be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadRequest {
    pub id: String,
    pub namespace: String,
    pub workload_type: WorkloadType,
    /// 1 (lowest) up to the scheduler's configured maximum.
    pub priority: u32,
    pub resources: ResourceQuantity,
    #[serde(default)]
    pub cost_constraints: CostConstraints,
    #[serde(default)]
    pub power_constraints: PowerConstraints,
    #[serde(default)]
    pub placement_policy: PlacementPolicy,
    #[serde(default)]
    pub autoscaling: Option<AutoscalingSpec>,
}

impl WorkloadRequest {
    /// Check the fields every operation relies on.
    pub fn validate(&self, max_priority: u32) -> CoreResult<()> {
        if self.id.trim().is_empty() {
            return Err(CoreError::InvalidInput("workload id is empty".to_string()));
        }
        if self.namespace.trim().is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "workload {} has no namespace",
                self.id
            )));
        }
        if !(MIN_PRIORITY..=max_priority).contains(&self.priority) {
            return Err(CoreError::InvalidInput(format!(
                "priority {} outside {MIN_PRIORITY}..={max_priority}",
                self.priority
            )));
        }
        self.resources.validate()
    }
}

/// Cost ceilings. Zero means "no ceiling".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostConstraints {
    #[serde(default)]
    pub max_cost_per_hour: f64,
    #[serde(default)]
    pub budget_limit: f64,
    #[serde(default)]
    pub prefer_spot: bool,
}

/// Power ceilings. Zero means "no ceiling".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerConstraints {
    #[serde(default)]
    pub max_power_usage: f64,
    #[serde(default)]
    pub prefer_green: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoscalingSpec {
    pub enabled: bool,
    pub min_replicas: u32,
    pub max_replicas: u32,
    /// Target CPU utilization percentage. Zero disables the signal.
    #[serde(default)]
    pub target_cpu_pct: u32,
    /// Target memory utilization percentage. Zero disables the signal.
    #[serde(default)]
    pub target_memory_pct: u32,
}

// ── Placement policy ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementPolicy {
    /// Exact-match labels a node must carry.
    #[serde(default)]
    pub node_selector: HashMap<String, String>,
    #[serde(default)]
    pub required_affinity: Option<NodeSelector>,
    #[serde(default)]
    pub preferred_affinity: Vec<PreferredSchedulingTerm>,
    #[serde(default)]
    pub anti_affinity: Vec<AntiAffinityTerm>,
    #[serde(default)]
    pub tolerations: Vec<Toleration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

/// One `(key, operator, values)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRequirement {
    pub key: String,
    pub operator: SelectorOperator,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Requirements ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorTerm {
    #[serde(default)]
    pub match_expressions: Vec<LabelRequirement>,
}

/// Terms ORed together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSelector {
    #[serde(default)]
    pub terms: Vec<SelectorTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferredSchedulingTerm {
    /// 1..=100
    pub weight: u32,
    pub preference: SelectorTerm,
}

/// Selector over pod or reservation labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelSelector {
    #[serde(default)]
    pub match_labels: HashMap<String, String>,
    #[serde(default)]
    pub match_expressions: Vec<LabelRequirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntiAffinityTerm {
    pub label_selector: LabelSelector,
    pub topology_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaintEffect {
    NoSchedule,
    PreferNoSchedule,
    NoExecute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taint {
    pub key: String,
    #[serde(default)]
    pub value: String,
    pub effect: TaintEffect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TolerationOperator {
    #[default]
    Equal,
    Exists,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toleration {
    /// Empty key with `Exists` tolerates every taint.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub operator: TolerationOperator,
    #[serde(default)]
    pub value: String,
    /// `None` tolerates every effect.
    #[serde(default)]
    pub effect: Option<TaintEffect>,
}

// ── Cluster snapshots ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCondition {
    Ready,
    DiskPressure,
    MemoryPressure,
    PidPressure,
    NetworkUnavailable,
}

/// Point-in-time view of a cluster node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub allocatable: ResourceQuantity,
    /// Conditions currently true on the node.
    #[serde(default)]
    pub conditions: HashSet<NodeCondition>,
    #[serde(default)]
    pub taints: Vec<Taint>,
}

impl NodeSnapshot {
    /// A ready node with no pressure conditions.
    pub fn ready(name: &str, allocatable: ResourceQuantity) -> Self {
        Self {
            name: name.to_string(),
            labels: HashMap::new(),
            allocatable,
            conditions: HashSet::from([NodeCondition::Ready]),
            taints: Vec::new(),
        }
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    pub fn has_condition(&self, condition: NodeCondition) -> bool {
        self.conditions.contains(&condition)
    }

    pub fn is_ready(&self) -> bool {
        self.has_condition(NodeCondition::Ready)
    }
}

/// Point-in-time view of a running pod.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodSnapshot {
    pub name: String,
    pub namespace: String,
    /// Node the pod is bound to, if any.
    #[serde(default)]
    pub node_name: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub requests: ResourceQuantity,
    /// Observed usage, when metrics are available.
    #[serde(default)]
    pub usage: Option<ResourceQuantity>,
}

impl PodSnapshot {
    /// Whether this pod belongs to the given workload.
    pub fn belongs_to(&self, workload_id: &str, namespace: &str) -> bool {
        self.namespace == namespace
            && self.labels.get(WORKLOAD_LABEL).is_some_and(|w| w == workload_id)
    }
}

/// Everything the optimizer needs for one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadState {
    #[serde(default)]
    pub workload: Option<WorkloadRequest>,
    #[serde(default)]
    pub pods: Vec<PodSnapshot>,
    #[serde(default)]
    pub nodes: Vec<NodeSnapshot>,
}

// ── Decisions and bookkeeping ──────────────────────────────────────

/// The outcome of one scheduling call. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingDecision {
    pub selected_node: String,
    /// Always within `[0, 1]`.
    pub score: f64,
    pub algorithm: String,
    /// Unix epoch seconds.
    pub timestamp: u64,
}

/// A provisional hold on node resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceReservation {
    pub workload_id: String,
    pub namespace: String,
    pub node_name: String,
    pub reserved: ResourceQuantity,
    #[serde(default)]
    pub priority: u32,
    /// Labels used when matching anti-affinity selectors.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// An entry in the scheduling history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingEvent {
    pub workload_id: String,
    pub namespace: String,
    pub algorithm: String,
    pub selected_node: String,
    pub score: f64,
    pub timestamp: u64,
}

/// The outcome of an optimization pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Always within `[0, 1]`.
    pub score: f64,
    /// Hourly cost estimate.
    pub estimated_cost: f64,
    /// Power draw estimate in watts.
    pub estimated_power: f64,
    /// At least 1.
    pub recommended_replicas: u32,
    /// Best feasible node, when any node was supplied and fit.
    pub assigned_node: Option<String>,
    pub algorithm: String,
}
