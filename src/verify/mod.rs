//! Optional cross-checking of find and delete outcomes
//!
//! Mismatches are logged and counted, never propagated: a failed check does
//! not stop the cycle, the invocation, or the cycle counter.

use bitvec::prelude::*;
use thiserror::Error;
use tracing::{error, trace};

/// A single verification mismatch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// An inserted element could not be found.
    #[error("element {index} could not be found")]
    NotFound {
        /// Dataset index
        index: usize,
    },

    /// The node found for an element stores a different value.
    #[error("element {index} found {actual}, expecting {expected}")]
    ValueMismatch {
        /// Dataset index
        index: usize,
        /// Value the element holds
        expected: i32,
        /// Value stored by the node that was found
        actual: i32,
    },

    /// An element that should still be present could not be deleted.
    #[error("element {index} could not be deleted, not found")]
    DeleteNotFound {
        /// Dataset index
        index: usize,
    },
}

impl VerificationFailure {
    /// Dataset index the failure refers to.
    pub fn index(&self) -> usize {
        match self {
            VerificationFailure::NotFound { index }
            | VerificationFailure::ValueMismatch { index, .. }
            | VerificationFailure::DeleteNotFound { index } => *index,
        }
    }
}

/// Per-invocation verification state.
#[derive(Debug)]
pub struct Verifier {
    enabled: bool,

    /// Stressor/instance label used in diagnostics
    label: String,

    /// Elements whose key collapsed onto an earlier element this cycle
    collapsed: BitVec,

    failures: u64,
    collapsed_misses: u64,

    /// First failures kept for reporting
    recent: Vec<VerificationFailure>,
}

/// Maximum failures retained for the run summary.
pub const MAX_RECORDED_FAILURES: usize = 16;

impl Verifier {
    /// Verifier for a dataset of `len` elements.
    pub fn new(enabled: bool, len: usize, label: impl Into<String>) -> Self {
        Self {
            enabled,
            label: label.into(),
            collapsed: if enabled { bitvec![0; len] } else { BitVec::new() },
            failures: 0,
            collapsed_misses: 0,
            recent: Vec::new(),
        }
    }

    /// Whether checks run.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Forget the previous cycle's collapsed duplicates.
    pub fn begin_cycle(&mut self) {
        if self.enabled {
            self.collapsed.fill(false);
        }
    }

    /// Record that element `index` collapsed onto an existing node.
    pub fn note_collapsed(&mut self, index: usize, owner: usize) {
        if !self.enabled {
            return;
        }
        self.collapsed.set(index, true);
        trace!(
            stressor = %self.label,
            index,
            owner,
            "duplicate key collapsed onto existing node"
        );
    }

    /// Whether element `index` collapsed this cycle.
    pub fn is_collapsed(&self, index: usize) -> bool {
        self.enabled && self.collapsed[index]
    }

    /// Check a find outcome: `found` is the value stored by the node that
    /// was found, if any.
    pub fn check_find(&mut self, index: usize, expected: i32, found: Option<i32>) {
        if !self.enabled {
            return;
        }
        match found {
            None => self.fail(VerificationFailure::NotFound { index }),
            Some(actual) if actual != expected => self.fail(VerificationFailure::ValueMismatch {
                index,
                expected,
                actual,
            }),
            Some(_) => {}
        }
    }

    /// Check a delete outcome.
    pub fn check_delete(&mut self, index: usize, removed: bool) {
        if !self.enabled || removed {
            return;
        }
        if self.collapsed[index] {
            self.collapsed_misses += 1;
            return;
        }
        self.fail(VerificationFailure::DeleteNotFound { index });
    }

    fn fail(&mut self, failure: VerificationFailure) {
        error!(stressor = %self.label, index = failure.index(), "{failure}");
        self.failures += 1;
        if self.recent.len() < MAX_RECORDED_FAILURES {
            self.recent.push(failure);
        }
    }

    /// Total mismatches observed.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Delete misses explained by duplicate collapse.
    pub fn collapsed_misses(&self) -> u64 {
        self.collapsed_misses
    }

    /// First recorded mismatches.
    pub fn recent_failures(&self) -> &[VerificationFailure] {
        &self.recent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_noop() {
        let mut verifier = Verifier::new(false, 8, "tsearch");
        verifier.check_find(0, 1, None);
        verifier.check_find(1, 1, Some(2));
        verifier.check_delete(2, false);
        assert_eq!(verifier.failures(), 0);
        assert!(verifier.recent_failures().is_empty());
    }

    #[test]
    fn test_find_failures() {
        let mut verifier = Verifier::new(true, 8, "tsearch");
        verifier.check_find(0, 7, Some(7));
        assert_eq!(verifier.failures(), 0);

        verifier.check_find(1, 7, None);
        verifier.check_find(2, 7, Some(9));
        assert_eq!(verifier.failures(), 2);
        assert_eq!(
            verifier.recent_failures(),
            &[
                VerificationFailure::NotFound { index: 1 },
                VerificationFailure::ValueMismatch {
                    index: 2,
                    expected: 7,
                    actual: 9
                },
            ]
        );
    }

    #[test]
    fn test_collapsed_delete_miss_is_not_a_failure() {
        let mut verifier = Verifier::new(true, 4, "tsearch");
        verifier.note_collapsed(3, 1);
        assert!(verifier.is_collapsed(3));

        verifier.check_delete(3, false);
        assert_eq!(verifier.failures(), 0);
        assert_eq!(verifier.collapsed_misses(), 1);

        verifier.check_delete(2, false);
        assert_eq!(verifier.failures(), 1);

        verifier.begin_cycle();
        assert!(!verifier.is_collapsed(3));
    }

    #[test]
    fn test_recorded_failures_are_capped() {
        let mut verifier = Verifier::new(true, 64, "tsearch");
        for index in 0..40 {
            verifier.check_find(index, 0, None);
        }
        assert_eq!(verifier.failures(), 40);
        assert_eq!(verifier.recent_failures().len(), MAX_RECORDED_FAILURES);
        assert_eq!(verifier.recent_failures()[0].index(), 0);
    }
}
