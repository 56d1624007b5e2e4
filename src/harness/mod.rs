//! Process harness: stop conditions, stressor descriptor, worker instances
//!
//! Each instance runs on its own thread with its own dataset, tree, key
//! source and counter; nothing is shared between instances except the stop
//! flag.

mod registry;
mod stop;

pub use registry::{HelpEntry, StressorClass, StressorInfo, VerifyMode, STRESSOR};
pub use stop::{MaxCycles, StopBudget, StopCondition, StopFlag};

use std::thread;

use tracing::{error, info};

use crate::config::ResolvedConfig;
use crate::engine::TreeExercise;
use crate::metrics::{ExitStatus, RunSummary};
use crate::StressError;

/// Results of every instance of one invocation.
#[derive(Debug)]
pub struct InvocationReport {
    /// Per-instance outcome, in instance order
    pub instances: Vec<Result<RunSummary, StressError>>,
}

impl InvocationReport {
    /// Worst exit status across instances.
    pub fn status(&self) -> ExitStatus {
        self.instances
            .iter()
            .map(|outcome| match outcome {
                Ok(summary) => summary.status,
                Err(err) => err.exit_status(),
            })
            .max()
            .unwrap_or(ExitStatus::Success)
    }

    /// Completed cycles summed over instances.
    pub fn total_cycles(&self) -> u64 {
        self.summaries().map(|s| s.cycles).sum()
    }

    /// Successful instance summaries.
    pub fn summaries(&self) -> impl Iterator<Item = &RunSummary> {
        self.instances.iter().filter_map(|outcome| outcome.as_ref().ok())
    }

    /// Fatal errors, with their instance number.
    pub fn errors(&self) -> impl Iterator<Item = (usize, &StressError)> {
        self.instances
            .iter()
            .enumerate()
            .filter_map(|(instance, outcome)| outcome.as_ref().err().map(|e| (instance, e)))
    }
}

/// Run one instance to completion.
pub fn run_instance(
    config: &ResolvedConfig,
    instance: usize,
    stop: &dyn StopCondition,
) -> Result<RunSummary, StressError> {
    let mut exercise = TreeExercise::new(config, instance)?;
    exercise.run(stop)
}

/// Run `config.instances` workers in parallel until `flag` is set or each
/// worker's op limit or deadline is reached.
pub fn run_instances(config: &ResolvedConfig, flag: &StopFlag) -> InvocationReport {
    info!(
        stressor = STRESSOR.name,
        instances = config.instances,
        size = config.size,
        verify = config.verify,
        seed = config.seed,
        "dispatching workers"
    );

    let instances: Vec<Result<RunSummary, StressError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..config.instances)
            .map(|instance| {
                let budget = StopBudget::new(flag.clone())
                    .with_max_ops(config.max_ops)
                    .with_timeout(config.timeout);
                thread::Builder::new()
                    .name(format!("{}-{}", STRESSOR.name, instance))
                    .spawn_scoped(scope, move || run_instance(config, instance, &budget))
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(instance, handle)| match handle {
                Ok(handle) => handle
                    .join()
                    .unwrap_or(Err(StressError::WorkerPanicked { instance })),
                Err(err) => {
                    error!(stressor = STRESSOR.name, instance, "cannot spawn worker: {err}");
                    Err(StressError::WorkerSpawn { instance })
                }
            })
            .collect()
    });

    InvocationReport { instances }
}
