//! Hard-constraint feasibility filtering.
//!
//! A node is feasible for a workload when all of the following hold:
//! - it is `Ready` and reports neither disk nor memory pressure
//! - `allocatable - committed` covers the request in every dimension,
//!   where `committed` is the sum of bound pods and outstanding
//!   reservations on that node
//! - its labels satisfy the node selector and required affinity
//! - every `NoSchedule` / `NoExecute` taint is tolerated
//! - no pod or reservation in the same topology domain matches an
//!   anti-affinity selector
//!
//! The filter runs before any scoring, regardless of algorithm.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use accel_core::{
    NodeCondition, NodeSnapshot, PodSnapshot, ResourceQuantity, ResourceReservation, WorkloadRequest,
};

use crate::affinity::{exact_labels_match, label_selector_matches, node_selector_matches, untolerated_taint};

/// The cluster state a feasibility check is evaluated against.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterView<'a> {
    pub nodes: &'a [NodeSnapshot],
    pub pods: &'a [PodSnapshot],
    pub reservations: &'a [ResourceReservation],
}

impl<'a> ClusterView<'a> {
    pub fn new(
        nodes: &'a [NodeSnapshot],
        pods: &'a [PodSnapshot],
        reservations: &'a [ResourceReservation],
    ) -> Self {
        Self {
            nodes,
            pods,
            reservations,
        }
    }
}

/// Why a node was filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotReady,
    DiskPressure,
    MemoryPressure,
    InsufficientCapacity { resource: &'static str },
    NodeSelector,
    NodeAffinity,
    UntoleratedTaint { key: String },
    AntiAffinity { topology_key: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotReady => f.write_str("node not ready"),
            Rejection::DiskPressure => f.write_str("disk pressure"),
            Rejection::MemoryPressure => f.write_str("memory pressure"),
            Rejection::InsufficientCapacity { resource } => write!(f, "insufficient {resource}"),
            Rejection::NodeSelector => f.write_str("node selector mismatch"),
            Rejection::NodeAffinity => f.write_str("required affinity mismatch"),
            Rejection::UntoleratedTaint { key } => write!(f, "untolerated taint {key}"),
            Rejection::AntiAffinity { topology_key } => {
                write!(f, "anti-affinity conflict in {topology_key} domain")
            }
        }
    }
}

/// Resources already held on `node_name` by pods and by reservations
/// other than the workload's own.
pub fn committed_on(view: &ClusterView<'_>, node_name: &str, workload: &WorkloadRequest) -> ResourceQuantity {
    let pods: ResourceQuantity = view
        .pods
        .iter()
        .filter(|p| p.node_name.as_deref() == Some(node_name))
        .map(|p| p.requests)
        .sum();
    let reserved: ResourceQuantity = view
        .reservations
        .iter()
        .filter(|r| r.node_name == node_name && !is_own(r, workload))
        .map(|r| r.reserved)
        .sum();
    pods + reserved
}

/// Check every hard constraint, returning the first violated one.
pub fn check(workload: &WorkloadRequest, node: &NodeSnapshot, view: &ClusterView<'_>) -> Result<(), Rejection> {
    if !node.is_ready() {
        return Err(Rejection::NotReady);
    }
    if node.has_condition(NodeCondition::DiskPressure) {
        return Err(Rejection::DiskPressure);
    }
    if node.has_condition(NodeCondition::MemoryPressure) {
        return Err(Rejection::MemoryPressure);
    }

    let free = node
        .allocatable
        .saturating_sub(&committed_on(view, &node.name, workload));
    check_capacity(&workload.resources, &free)?;

    let policy = &workload.placement_policy;
    if !exact_labels_match(&policy.node_selector, &node.labels) {
        return Err(Rejection::NodeSelector);
    }
    if let Some(required) = &policy.required_affinity
        && !node_selector_matches(required, &node.labels)
    {
        return Err(Rejection::NodeAffinity);
    }
    if let Some(taint) = untolerated_taint(&policy.tolerations, &node.taints) {
        return Err(Rejection::UntoleratedTaint {
            key: taint.key.clone(),
        });
    }
    check_anti_affinity(workload, node, view)
}

pub fn is_feasible(workload: &WorkloadRequest, node: &NodeSnapshot, view: &ClusterView<'_>) -> bool {
    check(workload, node, view).is_ok()
}

/// The feasible subset of `view.nodes`, in input order.
pub fn feasible_nodes<'a>(workload: &WorkloadRequest, view: &ClusterView<'a>) -> Vec<&'a NodeSnapshot> {
    view.nodes
        .iter()
        .filter(|node| match check(workload, node, view) {
            Ok(()) => true,
            Err(reason) => {
                debug!(
                    workload = %workload.id,
                    node = %node.name,
                    %reason,
                    "node filtered out"
                );
                false
            }
        })
        .collect()
}

fn check_capacity(need: &ResourceQuantity, free: &ResourceQuantity) -> Result<(), Rejection> {
    let resource = if need.cpu_cores > free.cpu_cores + f64::EPSILON {
        "cpu"
    } else if need.memory_gib > free.memory_gib + f64::EPSILON {
        "memory"
    } else if need.gpu_count > free.gpu_count {
        "gpu"
    } else if need.npu_count > free.npu_count {
        "npu"
    } else {
        return Ok(());
    };
    Err(Rejection::InsufficientCapacity { resource })
}

fn check_anti_affinity(
    workload: &WorkloadRequest,
    node: &NodeSnapshot,
    view: &ClusterView<'_>,
) -> Result<(), Rejection> {
    for term in &workload.placement_policy.anti_affinity {
        // Nodes without the topology label form no domain.
        let Some(domain_value) = node.labels.get(&term.topology_key) else {
            continue;
        };
        let mut domain: HashSet<&str> = view
            .nodes
            .iter()
            .filter(|n| n.labels.get(&term.topology_key) == Some(domain_value))
            .map(|n| n.name.as_str())
            .collect();
        domain.insert(node.name.as_str());

        let pod_conflict = view.pods.iter().any(|p| {
            p.node_name.as_deref().is_some_and(|n| domain.contains(n))
                && label_selector_matches(&term.label_selector, &p.labels)
        });
        let reservation_conflict = view.reservations.iter().any(|r| {
            !is_own(r, workload)
                && domain.contains(r.node_name.as_str())
                && label_selector_matches(&term.label_selector, &r.labels)
        });

        if pod_conflict || reservation_conflict {
            return Err(Rejection::AntiAffinity {
                topology_key: term.topology_key.clone(),
            });
        }
    }
    Ok(())
}

fn is_own(reservation: &ResourceReservation, workload: &WorkloadRequest) -> bool {
    reservation.workload_id == workload.id && reservation.namespace == workload.namespace
}
