//! AdvancedScheduler: filters, scores, and picks a node for a workload.
//!
//! Each call runs the same pipeline:
//! 1. validate the workload and resolve the algorithm
//! 2. drop infeasible nodes (live reservations count as committed)
//! 3. pick a node: the round-robin cursor for rotating strategies, the
//!    first highest score otherwise
//! 4. append the decision to the history
//!
//! The cursor, reservation map, and history are the only shared state.
//! Each is synchronized on its own, so a scheduler can sit behind an
//! `Arc` and serve concurrent callers.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use accel_core::{
    GridConfig, NodeSnapshot, PodSnapshot, ResourceReservation, SchedulingDecision, SchedulingEvent,
    WorkloadRequest, epoch_secs,
};
use accelgrid_placement::{
    ClusterView, NodeScorer, ScoringStrategy, Selection, committed_on, feasible_nodes,
};

use crate::cancel::{CancelSignal, check_canceled};
use crate::cursor::RoundRobinCursor;
use crate::error::{SchedulerError, SchedulerResult};
use crate::history::{AlgorithmStats, SchedulingHistory};
use crate::reservation::ReservationStore;

/// A feasible node and its score under one algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRanking {
    pub node: String,
    pub score: f64,
}

#[derive(Debug)]
pub struct AdvancedScheduler {
    scorer: NodeScorer,
    default_algorithm: String,
    max_priority: u32,
    cursor: RoundRobinCursor,
    reservations: ReservationStore,
    history: SchedulingHistory,
}

impl Default for AdvancedScheduler {
    fn default() -> Self {
        Self::new(&GridConfig::default())
    }
}

impl AdvancedScheduler {
    pub fn new(config: &GridConfig) -> Self {
        let history = match config.scheduler.history_limit {
            Some(limit) => SchedulingHistory::with_capacity_limit(limit),
            None => SchedulingHistory::new(),
        };
        let scorer = NodeScorer::new(config);
        Self {
            max_priority: scorer.max_priority(),
            scorer,
            default_algorithm: config.scheduler.default_algorithm.clone(),
            cursor: RoundRobinCursor::new(),
            reservations: ReservationStore::new(),
            history,
        }
    }

    /// Add or replace a scoring strategy.
    pub fn register_strategy(&mut self, strategy: Arc<dyn ScoringStrategy>) {
        self.scorer.register(strategy);
    }

    pub fn scorer(&self) -> &NodeScorer {
        &self.scorer
    }

    pub fn default_algorithm(&self) -> &str {
        &self.default_algorithm
    }

    pub fn max_priority(&self) -> u32 {
        self.max_priority
    }

    /// Schedule with the configured default algorithm.
    pub fn schedule_workload(
        &self,
        workload: &WorkloadRequest,
        nodes: &[NodeSnapshot],
    ) -> SchedulerResult<SchedulingDecision> {
        self.schedule_with_algorithm(workload, nodes, &self.default_algorithm)
    }

    pub fn schedule_with_algorithm(
        &self,
        workload: &WorkloadRequest,
        nodes: &[NodeSnapshot],
        algorithm: &str,
    ) -> SchedulerResult<SchedulingDecision> {
        self.schedule_with_pods_cancellable(workload, nodes, &[], algorithm, None)
    }

    pub fn schedule_with_algorithm_cancellable(
        &self,
        workload: &WorkloadRequest,
        nodes: &[NodeSnapshot],
        algorithm: &str,
        cancel: Option<&CancelSignal>,
    ) -> SchedulerResult<SchedulingDecision> {
        self.schedule_with_pods_cancellable(workload, nodes, &[], algorithm, cancel)
    }

    /// Full entry point: bound pods count as committed capacity and as
    /// anti-affinity peers, and `cancel` is polled between nodes.
    pub fn schedule_with_pods_cancellable(
        &self,
        workload: &WorkloadRequest,
        nodes: &[NodeSnapshot],
        pods: &[PodSnapshot],
        algorithm: &str,
        cancel: Option<&CancelSignal>,
    ) -> SchedulerResult<SchedulingDecision> {
        workload.validate(self.max_priority)?;
        if nodes.is_empty() {
            return Err(SchedulerError::NoFeasibleNodes(workload.id.clone()));
        }
        let strategy = self.scorer.strategy(algorithm)?;
        check_canceled(cancel)?;

        let reservations = self.reservations.all();
        let view = ClusterView::new(nodes, pods, &reservations);
        let feasible = feasible_nodes(workload, &view);
        if feasible.is_empty() {
            return Err(SchedulerError::InsufficientResources(workload.id.clone()));
        }

        let (node, score) = match strategy.selection() {
            Selection::Rotating => {
                let idx = self
                    .cursor
                    .next(feasible.len())
                    .ok_or_else(|| SchedulerError::InsufficientResources(workload.id.clone()))?;
                let node = feasible[idx];
                let committed = committed_on(&view, &node.name, workload);
                let score = self.scorer.score_with(strategy.as_ref(), workload, node, &committed);
                (node, score)
            }
            Selection::HighestScore => {
                let mut best: Option<(&NodeSnapshot, f64)> = None;
                for node in feasible {
                    check_canceled(cancel)?;
                    let committed = committed_on(&view, &node.name, workload);
                    let score = self.scorer.score_with(strategy.as_ref(), workload, node, &committed);
                    // Strict comparison keeps the first maximal node.
                    if best.is_none_or(|(_, s)| score > s) {
                        best = Some((node, score));
                    }
                }
                best.ok_or_else(|| SchedulerError::InsufficientResources(workload.id.clone()))?
            }
        };

        let decision = SchedulingDecision {
            selected_node: node.name.clone(),
            score: score.clamp(0.0, 1.0),
            algorithm: strategy.name().to_string(),
            timestamp: epoch_secs(),
        };
        self.record_scheduling_event(SchedulingEvent {
            workload_id: workload.id.clone(),
            namespace: workload.namespace.clone(),
            algorithm: decision.algorithm.clone(),
            selected_node: decision.selected_node.clone(),
            score: decision.score,
            timestamp: decision.timestamp,
        });

        info!(
            workload = %workload.id,
            namespace = %workload.namespace,
            node = %decision.selected_node,
            algorithm = %decision.algorithm,
            score = decision.score,
            "workload scheduled"
        );
        Ok(decision)
    }

    /// Score every feasible node without selecting one.
    ///
    /// Highest score first; ties keep input order. Touches neither the
    /// cursor nor the history, and an empty or fully filtered node list
    /// yields an empty ranking.
    pub fn rank_nodes(
        &self,
        workload: &WorkloadRequest,
        nodes: &[NodeSnapshot],
        pods: &[PodSnapshot],
        algorithm: &str,
        cancel: Option<&CancelSignal>,
    ) -> SchedulerResult<Vec<NodeRanking>> {
        workload.validate(self.max_priority)?;
        let strategy = self.scorer.strategy(algorithm)?;
        check_canceled(cancel)?;

        let reservations = self.reservations.all();
        let view = ClusterView::new(nodes, pods, &reservations);
        let mut ranking = Vec::new();
        for node in feasible_nodes(workload, &view) {
            check_canceled(cancel)?;
            let committed = committed_on(&view, &node.name, workload);
            ranking.push(NodeRanking {
                node: node.name.clone(),
                score: self.scorer.score_with(strategy.as_ref(), workload, node, &committed),
            });
        }
        ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
        debug!(workload = %workload.id, algorithm, candidates = ranking.len(), "ranked nodes");
        Ok(ranking)
    }

    // ── Reservations ────────────────────────────────────────────────

    pub fn reservations(&self) -> &ReservationStore {
        &self.reservations
    }

    pub fn create_reservation(&self, reservation: ResourceReservation) -> SchedulerResult<()> {
        self.reservations.create(reservation)
    }

    pub fn delete_reservation(&self, workload_id: &str, namespace: &str) -> SchedulerResult<ResourceReservation> {
        self.reservations.delete(workload_id, namespace)
    }

    pub fn has_reservation(&self, workload_id: &str, namespace: &str) -> bool {
        self.reservations.has(workload_id, namespace)
    }

    pub fn get_reservations_for_node(&self, node_name: &str) -> Vec<ResourceReservation> {
        self.reservations.for_node(node_name)
    }

    // ── History ─────────────────────────────────────────────────────

    pub fn history(&self) -> &SchedulingHistory {
        &self.history
    }

    pub fn record_scheduling_event(&self, event: SchedulingEvent) {
        self.history.record(event);
    }

    pub fn get_scheduling_history(&self, workload_id: &str, namespace: &str) -> Vec<SchedulingEvent> {
        self.history.for_workload(workload_id, namespace)
    }

    pub fn get_algorithm_statistics(&self) -> BTreeMap<String, AlgorithmStats> {
        self.history.statistics()
    }
}
