//! # Tree-search stress workload
//!
//! Repeatedly builds, queries and tears down a balanced binary search tree
//! over a synthetic dataset of 32-bit integers, putting sustained pressure on
//! the allocator, the cache hierarchy and the tree implementation.
//!
//! ## Cycle
//!
//! 1. **Populate**: insert all `n` keys into an empty tree
//! 2. **Find**: look every key up (optionally verifying the match)
//! 3. **Delete**: remove every key, leaving the tree empty
//!
//! One cycle is one bogo-op.
//!
//! ## Usage Example
//!
//! ```no_run
//! use tsearch_stress::{harness::MaxCycles, StressConfig, TreeExercise};
//!
//! let config = StressConfig::with_size(1024).with_verify(true).resolve()?;
//! let mut exercise = TreeExercise::new(&config, 0)?;
//! let summary = exercise.run(&MaxCycles(10))?;
//! assert_eq!(summary.cycles, 10);
//! # Ok::<(), tsearch_stress::StressError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules
pub mod config;   // Size resolution and workload configuration
pub mod dataset;  // Key generation
pub mod tree;     // AVL tree over dataset indices
pub mod engine;   // Populate/find/delete cycle driver
pub mod verify;   // Optional outcome checks
pub mod metrics;  // Cycle counter, lifecycle, run summary
pub mod harness;  // Stop conditions, workers, stressor descriptor

// Re-exports for convenience
pub use config::{ResolvedConfig, SizePolicy, StressConfig, DEFAULT_SIZE, MAX_SIZE, MIN_SIZE};
pub use dataset::{Dataset, KeySource, SeededSource};
pub use engine::{CycleReport, TreeExercise};
pub use metrics::{CycleCounter, ExitStatus, ProcState, RunSummary};
pub use tree::{Placement, SearchTree};
pub use verify::{VerificationFailure, Verifier};

use config::ConfigError;
use dataset::DatasetError;
use thiserror::Error;
use tree::TreeError;

/// Errors that end a stress invocation
#[derive(Error, Debug)]
pub enum StressError {
    /// Configuration rejected before any allocation
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// Dataset buffer could not be allocated
    #[error("resource exhaustion: {0}")]
    DatasetAllocation(#[from] DatasetError),

    /// Tree node could not be allocated during the populate phase
    #[error("resource exhaustion at element {index}: {source}")]
    NodeAllocation {
        /// Element whose insertion failed
        index: usize,
        /// Underlying tree error
        #[source]
        source: TreeError,
    },

    /// Tree still held nodes after the delete phase
    #[error("tree corrupted: {remaining} nodes left after delete phase")]
    TreeCorruption {
        /// Nodes left in the tree
        remaining: usize,
    },

    /// Worker thread could not be started
    #[error("cannot spawn worker instance {instance}")]
    WorkerSpawn {
        /// Instance number
        instance: usize,
    },

    /// Worker thread panicked
    #[error("worker instance {instance} panicked")]
    WorkerPanicked {
        /// Instance number
        instance: usize,
    },
}

impl StressError {
    /// Whether the error is a memory/resource exhaustion.
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(
            self,
            StressError::DatasetAllocation(_)
                | StressError::NodeAllocation { .. }
                | StressError::WorkerSpawn { .. }
        )
    }

    /// Exit status the harness reports for this error.
    pub fn exit_status(&self) -> ExitStatus {
        if self.is_resource_exhaustion() {
            ExitStatus::NoResource
        } else {
            ExitStatus::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_mapping() {
        let err = StressError::NodeAllocation {
            index: 3,
            source: TreeError::NodeLimit { limit: 3 },
        };
        assert_eq!(err.exit_status(), ExitStatus::NoResource);
        assert_eq!(
            err.to_string(),
            "resource exhaustion at element 3: cannot allocate new tree node (limit of 3 nodes reached)"
        );

        let err = StressError::from(DatasetError { len: 8 });
        assert_eq!(err.exit_status(), ExitStatus::NoResource);

        let err = StressError::TreeCorruption { remaining: 2 };
        assert_eq!(err.exit_status(), ExitStatus::Failure);

        let err: StressError = StressConfig::with_size(1).resolve().unwrap_err().into();
        assert!(matches!(err, StressError::Configuration(_)));
        assert_eq!(err.exit_status(), ExitStatus::Failure);
    }
}
