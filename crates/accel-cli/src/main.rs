use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "accelgrid",
    about = "AccelGrid: cost- and power-aware placement for accelerator workloads",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to grid.toml (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a node for a workload and print the decision as JSON
    Schedule {
        /// Workload request (JSON)
        #[arg(short, long)]
        workload: PathBuf,
        /// Node snapshots (JSON array)
        #[arg(short, long)]
        nodes: PathBuf,
        /// Pod snapshots (JSON array), counted as committed capacity
        #[arg(short, long)]
        pods: Option<PathBuf>,
        /// Scheduling algorithm; the configured default when omitted
        #[arg(short, long)]
        algorithm: Option<String>,
    },
    /// Run an optimization pass over a workload state and print the result
    Optimize {
        /// Workload state with workload, pods, and nodes (JSON)
        #[arg(short, long)]
        state: PathBuf,
    },
    /// Price a resource vector in cost or power, with projections.
    ///
    /// CPU accepts cores or millicores ("500m"); memory accepts byte
    /// multiples ("512Mi", "4Gi", "1G").
    Cost {
        #[arg(long, default_value = "0")]
        cpu: String,
        #[arg(long, default_value = "0")]
        memory: String,
        #[arg(long, default_value_t = 0)]
        gpu: i32,
        #[arg(long, default_value_t = 0)]
        npu: i32,
        /// Report power draw (watts) instead of cost
        #[arg(long)]
        power: bool,
        /// Apply the multiplier for this workload type (cost only)
        #[arg(long)]
        workload_type: Option<String>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("accelgrid=info".parse()?)
        .add_directive("accel_cli=info".parse()?);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Schedule {
            workload,
            nodes,
            pods,
            algorithm,
        } => commands::schedule::schedule(&config, &workload, &nodes, pods.as_deref(), algorithm.as_deref()),
        Commands::Optimize { state } => commands::optimize::optimize(&config, &state),
        Commands::Cost {
            cpu,
            memory,
            gpu,
            npu,
            power,
            workload_type,
            format,
        } => {
            let request = commands::cost::CostRequest {
                cpu,
                memory,
                gpu,
                npu,
                power,
                workload_type,
            };
            commands::cost::cost(&config, &request, &format)
        }
    }
}
