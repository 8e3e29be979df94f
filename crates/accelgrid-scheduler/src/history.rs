//! Append-only log of scheduling decisions and per-algorithm statistics.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use accel_core::SchedulingEvent;

/// Aggregate over every recorded decision made by one algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmStats {
    pub count: usize,
    pub average_score: f64,
}

/// Events are kept in insertion order. Unbounded unless a capacity limit
/// is set, in which case the oldest entries are dropped first.
#[derive(Debug, Default)]
pub struct SchedulingHistory {
    events: RwLock<VecDeque<SchedulingEvent>>,
    limit: Option<usize>,
}

impl SchedulingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::new()),
            limit: Some(limit.max(1)),
        }
    }

    pub fn capacity_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn record(&self, event: SchedulingEvent) {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        events.push_back(event);
        if let Some(limit) = self.limit {
            while events.len() > limit {
                events.pop_front();
            }
        }
    }

    /// Events for one workload, oldest first.
    pub fn for_workload(&self, workload_id: &str, namespace: &str) -> Vec<SchedulingEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.workload_id == workload_id && e.namespace == namespace)
            .cloned()
            .collect()
    }

    /// Every retained event, oldest first.
    pub fn all(&self) -> Vec<SchedulingEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn statistics(&self) -> BTreeMap<String, AlgorithmStats> {
        let events = self.events.read().unwrap_or_else(PoisonError::into_inner);
        let mut sums: BTreeMap<String, (usize, f64)> = BTreeMap::new();
        for event in events.iter() {
            let entry = sums.entry(event.algorithm.clone()).or_default();
            entry.0 += 1;
            entry.1 += event.score;
        }
        sums.into_iter()
            .map(|(algorithm, (count, total))| {
                let stats = AlgorithmStats {
                    count,
                    average_score: total / count as f64,
                };
                (algorithm, stats)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(id: &str, algorithm: &str, node: &str, score: f64) -> SchedulingEvent {
        SchedulingEvent {
            workload_id: id.to_string(),
            namespace: "ml".to_string(),
            algorithm: algorithm.to_string(),
            selected_node: node.to_string(),
            score,
            timestamp: 0,
        }
    }

    #[test]
    fn queries_keep_insertion_order() {
        let history = SchedulingHistory::new();
        history.record(make_event("job", "balanced", "node-2", 0.5));
        history.record(make_event("other", "balanced", "node-1", 0.9));
        history.record(make_event("job", "least-loaded", "node-1", 0.7));

        let events = history.for_workload("job", "ml");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].selected_node, "node-2");
        assert_eq!(events[1].selected_node, "node-1");
        assert!(history.for_workload("job", "prod").is_empty());
    }

    #[test]
    fn statistics_average_per_algorithm() {
        let history = SchedulingHistory::new();
        history.record(make_event("a", "balanced", "n", 0.4));
        history.record(make_event("b", "balanced", "n", 0.8));
        history.record(make_event("c", "round-robin", "n", 1.0));

        let stats = history.statistics();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["balanced"].count, 2);
        assert!((stats["balanced"].average_score - 0.6).abs() < 1e-9);
        assert_eq!(stats["round-robin"].average_score, 1.0);
    }

    #[test]
    fn empty_history_has_no_statistics() {
        let history = SchedulingHistory::new();
        assert!(history.is_empty());
        assert!(history.statistics().is_empty());
    }

    #[test]
    fn capacity_limit_drops_oldest() {
        let history = SchedulingHistory::with_capacity_limit(2);
        history.record(make_event("a", "balanced", "n", 0.1));
        history.record(make_event("b", "balanced", "n", 0.2));
        history.record(make_event("c", "balanced", "n", 0.3));

        assert_eq!(history.len(), 2);
        let ids: Vec<_> = history.all().into_iter().map(|e| e.workload_id).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }
}
