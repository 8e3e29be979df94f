use std::path::Path;

use accel_core::{GridConfig, NodeSnapshot, PodSnapshot, WorkloadRequest};
use accelgrid_scheduler::AdvancedScheduler;

use super::read_json;

pub fn schedule(
    config: &GridConfig,
    workload: &Path,
    nodes: &Path,
    pods: Option<&Path>,
    algorithm: Option<&str>,
) -> anyhow::Result<()> {
    let workload: WorkloadRequest = read_json(workload)?;
    let nodes: Vec<NodeSnapshot> = read_json(nodes)?;
    let pods: Vec<PodSnapshot> = match pods {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let scheduler = AdvancedScheduler::new(config);
    let algorithm = algorithm.unwrap_or(scheduler.default_algorithm());
    let decision = scheduler.schedule_with_pods_cancellable(&workload, &nodes, &pods, algorithm, None)?;

    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}
