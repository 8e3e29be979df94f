use std::path::Path;

use accel_core::{GridConfig, WorkloadState};
use accelgrid_optimizer::OptimizationEngine;

use super::read_json;

pub fn optimize(config: &GridConfig, state: &Path) -> anyhow::Result<()> {
    let state: WorkloadState = read_json(state)?;
    let result = OptimizationEngine::new(config).optimize(&state)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
