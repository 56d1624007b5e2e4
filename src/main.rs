use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tsearch_stress::harness::{run_instances, StopFlag, STRESSOR};
use tsearch_stress::{ExitStatus, SizePolicy, StressConfig};

#[derive(Parser, Debug)]
#[command(name = "tsearch-stress", about = "Stress the allocator and caches with a binary search tree workload")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the populate/find/delete workload.
    Run {
        /// Number of 32-bit integers in the dataset (1024 to 4194304).
        #[arg(long = "tsearch-size", alias = "size")]
        size: Option<u64>,
        /// Without an explicit size, use the largest allowed dataset.
        #[arg(long)]
        maximize: bool,
        /// Without an explicit size, use the smallest allowed dataset.
        #[arg(long)]
        minimize: bool,
        /// Verify find and delete results.
        #[arg(long)]
        verify: bool,
        /// Stop each worker after N bogo operations (0 = unlimited).
        #[arg(long = "tsearch-ops", alias = "ops")]
        ops: Option<u64>,
        /// Stop after this many seconds.
        #[arg(long, short = 't')]
        timeout: Option<u64>,
        /// Number of workers.
        #[arg(long = "tsearch", alias = "instances", default_value_t = 1)]
        instances: usize,
        /// Seed for the key source (random if omitted).
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Describe the stressor and its options.
    Describe,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let status = match cli.command {
        Commands::Run {
            size,
            maximize,
            minimize,
            verify,
            ops,
            timeout,
            instances,
            seed,
        } => {
            let mut config = StressConfig {
                size,
                size_policy: SizePolicy::from_flags(maximize, minimize),
                verify,
                instances,
                ..StressConfig::default()
            };
            if let Some(ops) = ops {
                config = config.with_max_ops(ops);
            }
            if let Some(secs) = timeout {
                config = config.with_timeout(Duration::from_secs(secs));
            }
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            run_stress(&config)?
        }
        Commands::Describe => {
            print!("{}", STRESSOR.describe());
            ExitStatus::Success
        }
    };

    process::exit(status.code());
}

fn run_stress(config: &StressConfig) -> Result<ExitStatus> {
    let resolved = config.resolve().context("invalid tsearch options")?;
    if resolved.max_ops.is_none() && resolved.timeout.is_none() {
        tracing::warn!(
            stressor = STRESSOR.name,
            "no --tsearch-ops or --timeout given, running until interrupted"
        );
    }

    let flag = StopFlag::new();
    let interrupt = flag.clone();
    ctrlc::set_handler(move || {
        // second interrupt: give up on the summary
        if interrupt.is_set() {
            process::exit(ExitStatus::Failure.code());
        }
        tracing::info!(stressor = STRESSOR.name, "interrupted, finishing current cycle");
        interrupt.stop();
    })
    .context("cannot install interrupt handler")?;
    let report = run_instances(&resolved, &flag);

    for summary in report.summaries() {
        println!("{}", summary.report());
        for failure in &summary.recent_failures {
            println!("  {}", failure);
        }
    }
    for (instance, err) in report.errors() {
        eprintln!("instance {}: {}", instance, err);
    }

    let status = report.status();
    println!(
        "{}: {} bogo ops across {} instance(s), exit status {}",
        STRESSOR.name,
        report.total_cycles(),
        resolved.instances,
        status
    );
    Ok(status)
}
