//! Integration tests for the optimization pass.
//!
//! Fixtures mirror a small accelerator cluster: one CPU-only node, one
//! two-GPU node, and one NPU node.

use std::collections::HashMap;
use std::sync::Arc;

use accel_core::{
    AutoscalingSpec, CostConstraints, GridConfig, NodeSnapshot, PlacementPolicy, PodSnapshot, PowerConstraints,
    ResourceQuantity, ResourceReservation, WORKLOAD_LABEL, WorkloadRequest, WorkloadState, WorkloadType,
};
use accelgrid_optimizer::{OptimizationEngine, OptimizerError};
use accelgrid_scheduler::AdvancedScheduler;

fn make_workload(workload_type: WorkloadType, priority: u32) -> WorkloadRequest {
    WorkloadRequest {
        id: "trainer".to_string(),
        namespace: "ml".to_string(),
        workload_type,
        priority,
        resources: ResourceQuantity::new(2.0, 4.0, 1, 0),
        cost_constraints: CostConstraints {
            max_cost_per_hour: 5.0,
            budget_limit: 0.0,
            prefer_spot: false,
        },
        power_constraints: PowerConstraints {
            max_power_usage: 250.0,
            prefer_green: false,
        },
        placement_policy: PlacementPolicy::default(),
        autoscaling: None,
    }
}

fn cluster() -> Vec<NodeSnapshot> {
    vec![
        NodeSnapshot::ready("node-1", ResourceQuantity::new(4.0, 8.0, 0, 0)),
        NodeSnapshot::ready("node-2", ResourceQuantity::new(8.0, 16.0, 2, 0)),
        NodeSnapshot::ready("node-3", ResourceQuantity::new(6.0, 12.0, 0, 1)),
    ]
}

fn state(workload: WorkloadRequest) -> WorkloadState {
    WorkloadState {
        workload: Some(workload),
        pods: Vec::new(),
        nodes: cluster(),
    }
}

fn trainer_pod(i: usize, cpu_used: f64) -> PodSnapshot {
    PodSnapshot {
        name: format!("trainer-{i}"),
        namespace: "ml".to_string(),
        node_name: Some("node-2".to_string()),
        labels: HashMap::from([(WORKLOAD_LABEL.to_string(), "trainer".to_string())]),
        requests: ResourceQuantity::new(2.0, 4.0, 0, 0),
        usage: Some(ResourceQuantity::new(cpu_used, 2.0, 0, 0)),
    }
}

#[test]
fn optimizes_onto_the_gpu_node() {
    let engine = OptimizationEngine::default();
    let result = engine.optimize(&state(make_workload(WorkloadType::Training, 5))).unwrap();

    assert!((0.0..=1.0).contains(&result.score));
    assert!(result.estimated_cost >= 0.0);
    assert!(result.estimated_power >= 0.0);
    assert_eq!(result.assigned_node.as_deref(), Some("node-2"));
    assert_eq!(result.algorithm, "balanced");
    assert_eq!(result.recommended_replicas, 1);
}

#[test]
fn standard_request_fits_common_ceilings() {
    let engine = OptimizationEngine::default();
    let result = engine.optimize(&state(make_workload(WorkloadType::Training, 5))).unwrap();
    assert!(result.estimated_cost <= 5.0);
    assert!(result.estimated_power <= 250.0);

    let ranking = engine
        .scheduler()
        .rank_nodes(&make_workload(WorkloadType::Training, 5), &cluster(), &[], "balanced", None)
        .unwrap();
    assert_eq!(result.score, ranking[0].score);
}

#[test]
fn cost_ceiling_violation_lowers_score() {
    let engine = OptimizationEngine::default();
    let mut w = make_workload(WorkloadType::Training, 5);
    w.cost_constraints.max_cost_per_hour = 0.1;
    let result = engine.optimize(&state(w)).unwrap();
    assert!(result.score < 1.0);
    assert!(result.score >= 0.0);
}

#[test]
fn power_ceiling_violation_lowers_score() {
    let engine = OptimizationEngine::default();
    let mut w = make_workload(WorkloadType::Training, 5);
    w.power_constraints.max_power_usage = 10.0;

    let unpenalized = engine.optimize(&state(make_workload(WorkloadType::Training, 5))).unwrap();
    let result = engine.optimize(&state(w)).unwrap();
    assert!(result.score < 1.0);
    assert!(result.score < unpenalized.score);
}

#[test]
fn violation_caps_even_a_perfect_base() {
    // Empty node set with a default score of 1.0 is the best possible base.
    let mut config = GridConfig::default();
    config.optimizer.default_score = 1.0;
    let engine = OptimizationEngine::new(&config);

    let mut w = make_workload(WorkloadType::Inference, 5);
    w.cost_constraints.max_cost_per_hour = 1.5;
    let mut s = state(w);
    s.nodes.clear();

    let result = engine.optimize(&s).unwrap();
    assert!(result.score < 1.0);
}

#[test]
fn monthly_budget_counts_as_a_violation() {
    let engine = OptimizationEngine::default();
    let mut w = make_workload(WorkloadType::Training, 5);
    w.cost_constraints.budget_limit = 100.0;
    let unpenalized = engine.optimize(&state(make_workload(WorkloadType::Training, 5))).unwrap();
    let result = engine.optimize(&state(w)).unwrap();
    assert!(result.score < unpenalized.score);
}

#[test]
fn every_type_and_priority_stays_normalized() {
    let engine = OptimizationEngine::default();
    let types = [
        WorkloadType::Training,
        WorkloadType::Inference,
        WorkloadType::Batch,
        WorkloadType::Streaming,
        WorkloadType::Serving,
    ];
    for workload_type in types {
        for priority in [1, 5, 10] {
            let result = engine.optimize(&state(make_workload(workload_type, priority))).unwrap();
            assert!((0.0..=1.0).contains(&result.score), "{workload_type} p{priority}");
        }
    }
}

#[test]
fn training_costs_at_least_inference() {
    let engine = OptimizationEngine::default();
    let training = engine.optimize(&state(make_workload(WorkloadType::Training, 5))).unwrap();
    let inference = engine.optimize(&state(make_workload(WorkloadType::Inference, 5))).unwrap();
    assert!(training.estimated_cost >= inference.estimated_cost);
}

#[test]
fn empty_cluster_uses_default_score() {
    let engine = OptimizationEngine::default();
    let s = WorkloadState {
        workload: Some(make_workload(WorkloadType::Inference, 5)),
        ..Default::default()
    };
    let result = engine.optimize(&s).unwrap();
    assert_eq!(result.score, 0.8);
    assert!(result.assigned_node.is_none());
}

#[test]
fn infeasible_cluster_scores_zero() {
    let engine = OptimizationEngine::default();
    let mut w = make_workload(WorkloadType::Training, 5);
    w.resources.gpu_count = 8;
    let result = engine.optimize(&state(w)).unwrap();
    assert_eq!(result.score, 0.0);
    assert!(result.assigned_node.is_none());
}

#[test]
fn missing_workload_is_rejected() {
    let engine = OptimizationEngine::default();
    let s = WorkloadState {
        workload: None,
        pods: Vec::new(),
        nodes: cluster(),
    };
    assert!(matches!(engine.optimize(&s), Err(OptimizerError::InvalidInput(_))));
}

#[test]
fn unknown_default_algorithm_is_reported() {
    let mut config = GridConfig::default();
    config.scheduler.default_algorithm = "fastest".to_string();
    let engine = OptimizationEngine::new(&config);
    assert!(matches!(
        engine.optimize(&state(make_workload(WorkloadType::Training, 5))),
        Err(OptimizerError::Scheduling(_))
    ));
}

#[test]
fn autoscaling_enabled_stays_within_bounds() {
    let engine = OptimizationEngine::default();
    let mut w = make_workload(WorkloadType::Serving, 5);
    w.autoscaling = Some(AutoscalingSpec {
        enabled: true,
        min_replicas: 1,
        max_replicas: 10,
        target_cpu_pct: 70,
        target_memory_pct: 80,
    });
    let mut s = state(w);
    s.pods = (0..3).map(|i| trainer_pod(i, 1.8)).collect();

    let result = engine.optimize(&s).unwrap();
    assert!((1..=10).contains(&result.recommended_replicas));
    // 3 pods at 90% cpu against a 70% target.
    assert_eq!(result.recommended_replicas, 4);
}

#[test]
fn autoscaling_disabled_recommends_one() {
    let engine = OptimizationEngine::default();
    let mut w = make_workload(WorkloadType::Serving, 5);
    w.autoscaling = Some(AutoscalingSpec {
        enabled: false,
        min_replicas: 3,
        max_replicas: 10,
        target_cpu_pct: 70,
        target_memory_pct: 80,
    });
    let mut s = state(w);
    s.pods = (0..3).map(|i| trainer_pod(i, 2.0)).collect();
    assert_eq!(engine.optimize(&s).unwrap().recommended_replicas, 1);
}

#[test]
fn shared_scheduler_reservations_are_respected() {
    let config = GridConfig::default();
    let scheduler = Arc::new(AdvancedScheduler::new(&config));
    scheduler
        .create_reservation(ResourceReservation {
            workload_id: "other".to_string(),
            namespace: "ml".to_string(),
            node_name: "node-2".to_string(),
            reserved: ResourceQuantity::new(1.0, 1.0, 2, 0),
            priority: 5,
            labels: HashMap::new(),
        })
        .unwrap();

    let engine = OptimizationEngine::with_scheduler(&config, scheduler.clone());
    let result = engine.optimize(&state(make_workload(WorkloadType::Training, 5))).unwrap();
    assert!(result.assigned_node.is_none());
    assert_eq!(result.score, 0.0);
    assert!(scheduler.history().is_empty());
}

#[test]
fn canceled_pass_returns_canceled() {
    let engine = OptimizationEngine::default();
    let (tx, rx) = tokio::sync::watch::channel(false);
    tx.send(true).unwrap();
    assert_eq!(
        engine
            .optimize_cancellable(&state(make_workload(WorkloadType::Training, 5)), Some(&rx))
            .unwrap_err(),
        OptimizerError::Canceled
    );
}

#[test]
fn state_round_trips_through_json() {
    let json = r#"{
        "workload": {
            "id": "trainer",
            "namespace": "ml",
            "workload_type": "training",
            "priority": 5,
            "resources": { "cpu_cores": 2.0, "memory_gib": 4.0, "gpu_count": 1 }
        },
        "nodes": [
            { "name": "node-2", "allocatable": { "cpu_cores": 8.0, "memory_gib": 16.0, "gpu_count": 2 },
              "conditions": ["ready"] }
        ]
    }"#;
    let s: WorkloadState = serde_json::from_str(json).unwrap();
    let result = OptimizationEngine::default().optimize(&s).unwrap();
    assert_eq!(result.assigned_node.as_deref(), Some("node-2"));
}
