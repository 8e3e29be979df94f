use serde::Serialize;

use accel_core::{GridConfig, RawResources, ResourceInput, WorkloadType};
use accelgrid_pricing::{Breakdown, CostCalculator, PowerCalculator, Projection};

/// Flags of the `cost` sub-command.
pub struct CostRequest {
    pub cpu: String,
    pub memory: String,
    pub gpu: i32,
    pub npu: i32,
    pub power: bool,
    pub workload_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CostReport {
    /// "cost" (currency/hour) or "power" (watts).
    pub metric: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_type: Option<WorkloadType>,
    pub breakdown: Breakdown,
    pub projection: Projection,
}

pub fn build_report(config: &GridConfig, request: &CostRequest) -> anyhow::Result<CostReport> {
    let raw = RawResources::new(&request.cpu, &request.memory, request.gpu, request.npu);
    let quantity = raw.to_quantity()?;
    let workload_type = request
        .workload_type
        .as_deref()
        .map(str::parse::<WorkloadType>)
        .transpose()?;

    let report = if request.power {
        let calc = PowerCalculator::from_config(&config.pricing);
        CostReport {
            metric: "power",
            workload_type: None,
            breakdown: calc.breakdown(&quantity),
            projection: calc.projections(&quantity),
        }
    } else {
        let calc = CostCalculator::from_config(&config.pricing);
        let multiplier = workload_type.map_or(1.0, |t| config.pricing.workload_multipliers.for_type(t));
        CostReport {
            metric: "cost",
            workload_type,
            breakdown: calc.breakdown(&quantity),
            projection: Projection::from_hourly(calc.calculate_cost(&quantity) * multiplier),
        }
    };
    Ok(report)
}

pub fn cost(config: &GridConfig, request: &CostRequest, format: &str) -> anyhow::Result<()> {
    let report = build_report(config, request)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("{}", format_report(&report));
        }
    }

    Ok(())
}

fn format_report(report: &CostReport) -> String {
    let unit = if report.metric == "power" { "W" } else { "/h" };
    let (b, p) = (&report.breakdown, &report.projection);
    let mut out = String::new();
    if let Some(t) = report.workload_type {
        out.push_str(&format!("workload type: {t}\n"));
    }
    out.push_str(&format!("cpu      {:>12.4} {unit}\n", b.cpu));
    out.push_str(&format!("memory   {:>12.4} {unit}\n", b.memory));
    out.push_str(&format!("gpu      {:>12.4} {unit}\n", b.gpu));
    out.push_str(&format!("npu      {:>12.4} {unit}\n", b.npu));
    out.push_str(&format!("total    {:>12.4} {unit}\n", b.total));
    out.push_str(&format!("hourly   {:>12.4}\n", p.hourly));
    out.push_str(&format!("daily    {:>12.4}\n", p.daily));
    out.push_str(&format!("monthly  {:>12.4}\n", p.monthly));
    out.push_str(&format!("yearly   {:>12.4}", p.yearly));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(cpu: &str, memory: &str, gpu: i32) -> CostRequest {
        CostRequest {
            cpu: cpu.to_string(),
            memory: memory.to_string(),
            gpu,
            npu: 0,
            power: false,
            workload_type: None,
        }
    }

    #[test]
    fn cost_report_projects_hourly() {
        let report = build_report(&GridConfig::default(), &request("2", "4Gi", 1)).unwrap();
        assert_eq!(report.metric, "cost");
        assert!((report.projection.hourly - report.breakdown.total).abs() < 1e-9);
        assert!((report.projection.monthly - report.projection.hourly * 720.0).abs() < 0.01);
    }

    #[test]
    fn workload_multiplier_applies_to_projection() {
        let mut training = request("2", "4Gi", 1);
        training.workload_type = Some("training".to_string());
        let base = build_report(&GridConfig::default(), &request("2", "4Gi", 1)).unwrap();
        let scaled = build_report(&GridConfig::default(), &training).unwrap();
        assert!(scaled.projection.hourly > base.projection.hourly);
    }

    #[test]
    fn power_mode_reports_watts() {
        let mut req = request("500m", "512Mi", 0);
        req.power = true;
        let report = build_report(&GridConfig::default(), &req).unwrap();
        assert_eq!(report.metric, "power");
        assert!(report.breakdown.total > 0.0);
        assert!(format_report(&report).contains("W"));
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(build_report(&GridConfig::default(), &request("two", "4Gi", 0)).is_err());
        let mut bad_type = request("1", "1Gi", 0);
        bad_type.workload_type = Some("gaming".to_string());
        assert!(build_report(&GridConfig::default(), &bad_type).is_err());
    }
}
