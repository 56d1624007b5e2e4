//! Throughput accounting and run outcome
//!
//! One bogo-op = one completed populate/find/delete cycle.

mod counter;

pub use counter::{CycleCounter, ProcState, StateCell};

use std::fmt;
use std::time::Duration;

use crate::verify::VerificationFailure;

/// Process exit status reported to the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExitStatus {
    /// Normal completion
    Success,
    /// Completed, but verification mismatches were observed
    Failure,
    /// Out of memory for the dataset or the tree
    NoResource,
}

impl ExitStatus {
    /// Numeric process exit code.
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::NoResource => 3,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExitStatus::Success => "success",
            ExitStatus::Failure => "failure",
            ExitStatus::NoResource => "no resource",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// Outcome of one stressor instance.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RunSummary {
    /// Worker instance number
    pub instance: usize,

    /// Dataset size (number of 32-bit integers)
    pub size: usize,

    /// Completed cycles
    pub cycles: u64,

    /// Lookups performed in the find phase
    pub lookups: u64,

    /// Removals attempted in the delete phase
    pub deletions: u64,

    /// Verification mismatches
    pub verification_failures: u64,

    /// Delete misses explained by duplicate collapse
    pub collapsed_duplicates: u64,

    /// First mismatches, for the report
    #[cfg_attr(feature = "serde", serde(skip))]
    pub recent_failures: Vec<VerificationFailure>,

    /// Wall-clock time spent in the run state
    pub elapsed: Duration,

    /// Final lifecycle state
    pub state: ProcState,

    /// Exit status
    pub status: ExitStatus,
}

impl RunSummary {
    /// Completed cycles per second.
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.cycles as f64 / secs
        } else {
            0.0
        }
    }

    /// Tree operations (inserts + lookups + deletes) per second.
    pub fn tree_ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            let inserts = self.cycles * self.size as u64;
            (inserts + self.lookups + self.deletions) as f64 / secs
        } else {
            0.0
        }
    }

    /// Generate report
    pub fn report(&self) -> String {
        format!(
            "instance {}: {} bogo ops in {:.2}s ({:.2} ops/s, {:.0} tree ops/s)\n  size: {}\n  verification failures: {}\n  collapsed duplicates: {}\n  status: {}",
            self.instance,
            self.cycles,
            self.elapsed.as_secs_f64(),
            self.ops_per_sec(),
            self.tree_ops_per_sec(),
            self.size,
            self.verification_failures,
            self.collapsed_duplicates,
            self.status
        )
    }
}
