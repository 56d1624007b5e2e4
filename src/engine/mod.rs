//! Tree exercise engine
//!
//! Each cycle:
//!   1. regenerate keys in place
//!   2. populate: insert elements 0..n into a fresh tree
//!   3. find:     look up every element (stop may end this phase early)
//!   4. delete:   remove every element (never interrupted)
//!   5. count the cycle
//!
//! The tree is rebuilt every cycle so node memory is allocated and released
//! again each time round.

mod guard;

pub use guard::PopulateGuard;

use std::time::Instant;

use tracing::{debug, error, info};

use crate::config::ResolvedConfig;
use crate::dataset::{Dataset, KeySource, SeededSource};
use crate::harness::{StopCondition, STRESSOR};
use crate::metrics::{CycleCounter, ExitStatus, ProcState, RunSummary, StateCell};
use crate::tree::{Placement, SearchTree};
use crate::verify::Verifier;
use crate::StressError;

/// Outcome of a single populate/find/delete cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Nodes in the tree after populate
    pub nodes: usize,
    /// Elements that collapsed onto an existing node
    pub collapsed: usize,
    /// Lookups performed before the find phase ended
    pub lookups: usize,
    /// Elements actually removed in the delete phase
    pub removed: usize,
}

/// Drives repeated populate/find/delete cycles over one dataset.
#[derive(Debug)]
pub struct TreeExercise<S: KeySource = SeededSource> {
    instance: usize,
    dataset: Dataset,
    source: S,
    verifier: Verifier,
    counter: CycleCounter,
    state: StateCell,

    /// Cap on live tree nodes, for simulating allocation failure
    node_limit: Option<usize>,

    lookups: u64,
    deletions: u64,
    collapsed: u64,
}

impl TreeExercise<SeededSource> {
    /// Engine for `instance`, seeded from the resolved configuration.
    pub fn new(config: &ResolvedConfig, instance: usize) -> Result<Self, StressError> {
        let source = SeededSource::new(config.instance_seed(instance));
        Self::with_source(config.size, config.verify, source, instance)
    }
}

impl<S: KeySource> TreeExercise<S> {
    /// Engine with an explicit key source.
    ///
    /// Allocates the dataset; failure is fatal and reported as resource
    /// exhaustion.
    pub fn with_source(
        size: usize,
        verify: bool,
        source: S,
        instance: usize,
    ) -> Result<Self, StressError> {
        let dataset = Dataset::allocate(size).map_err(|err| {
            error!(stressor = STRESSOR.name, instance, "{err}");
            StressError::DatasetAllocation(err)
        })?;
        debug!(
            stressor = STRESSOR.name,
            instance,
            size,
            bytes = dataset.size_bytes(),
            "dataset allocated"
        );

        Ok(Self {
            instance,
            dataset,
            source,
            verifier: Verifier::new(verify, size, format!("{}-{}", STRESSOR.name, instance)),
            counter: CycleCounter::new(),
            state: StateCell::new(),
            node_limit: None,
            lookups: 0,
            deletions: 0,
            collapsed: 0,
        })
    }

    /// Refuse tree node allocation once `limit` nodes are live.
    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Handle on the cycle counter.
    pub fn counter(&self) -> CycleCounter {
        self.counter.clone()
    }

    /// Handle on the lifecycle state.
    pub fn state(&self) -> StateCell {
        self.state.clone()
    }

    /// The dataset as last generated.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Keys for in-place rewriting, for hand-crafted key sets.
    ///
    /// The dataset length is fixed at construction.
    pub fn keys_mut(&mut self) -> &mut [i32] {
        self.dataset.keys_mut()
    }

    /// Draw a fresh set of keys from the engine's source.
    pub fn regenerate(&mut self) {
        self.dataset.regenerate(&mut self.source);
    }

    /// Verification state.
    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    /// Fresh, empty tree honouring the node limit.
    pub fn new_tree(&self) -> SearchTree {
        match self.node_limit {
            Some(limit) => SearchTree::with_node_limit(limit),
            None => SearchTree::new(),
        }
    }

    /// Run cycles until `stop` ends the loop or a fatal error occurs.
    ///
    /// At least one cycle always runs.
    pub fn run<C: StopCondition + ?Sized>(&mut self, stop: &C) -> Result<RunSummary, StressError> {
        self.set_state(ProcState::Run);
        debug!(
            stressor = STRESSOR.name,
            instance = self.instance,
            size = self.dataset.len(),
            verify = self.verifier.is_enabled(),
            "starting cycles"
        );
        let started = Instant::now();

        let result = loop {
            self.regenerate();
            if let Err(err) = self.run_cycle(stop) {
                break Err(err);
            }
            if !stop.keep_stressing(self.counter.get()) {
                break Ok(());
            }
        };

        self.set_state(ProcState::Deinit);
        let elapsed = started.elapsed();
        self.set_state(ProcState::Exit);

        result?;

        let status = if self.verifier.failures() > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        };
        let summary = RunSummary {
            instance: self.instance,
            size: self.dataset.len(),
            cycles: self.counter.get(),
            lookups: self.lookups,
            deletions: self.deletions,
            verification_failures: self.verifier.failures(),
            collapsed_duplicates: self.collapsed,
            recent_failures: self.verifier.recent_failures().to_vec(),
            elapsed,
            state: self.state.get(),
            status,
        };
        info!(
            stressor = STRESSOR.name,
            instance = self.instance,
            cycles = summary.cycles,
            ops_per_sec = summary.ops_per_sec(),
            failures = summary.verification_failures,
            "run complete"
        );
        Ok(summary)
    }

    /// One populate/find/delete cycle over the current keys.
    pub fn run_cycle<C: StopCondition + ?Sized>(
        &mut self,
        stop: &C,
    ) -> Result<CycleReport, StressError> {
        self.verifier.begin_cycle();
        let mut tree = self.new_tree();

        let collapsed = self.populate(&mut tree)?;
        let nodes = tree.len();
        let lookups = self.find_all(&tree, stop);
        let removed = self.delete_all(&mut tree);

        if !tree.is_empty() {
            error!(
                stressor = STRESSOR.name,
                instance = self.instance,
                remaining = tree.len(),
                "tree not empty after delete phase"
            );
            return Err(StressError::TreeCorruption {
                remaining: tree.len(),
            });
        }

        self.counter.increment();
        Ok(CycleReport {
            nodes,
            collapsed,
            lookups,
            removed,
        })
    }

    /// Insert every element in index order; returns the number of elements
    /// that collapsed onto an existing node.
    ///
    /// If an insertion fails, everything inserted so far is removed again
    /// and the failure is returned.
    pub fn populate(&mut self, tree: &mut SearchTree) -> Result<usize, StressError> {
        let keys = self.dataset.keys();
        let mut guard = PopulateGuard::new(tree, keys);
        let mut collapsed = 0;

        for index in 0..keys.len() {
            match guard.insert_next() {
                Ok(Placement::Inserted) => {}
                Ok(Placement::Existing(owner)) => {
                    collapsed += 1;
                    self.verifier.note_collapsed(index, owner);
                }
                Err(source) => {
                    error!(
                        stressor = STRESSOR.name,
                        instance = self.instance,
                        index,
                        "cannot allocate new tree node"
                    );
                    // guard drop unwinds elements 0..index
                    return Err(StressError::NodeAllocation { index, source });
                }
            }
        }

        guard.commit();
        self.collapsed += collapsed as u64;
        Ok(collapsed)
    }

    /// Look up every element in index order, checking `stop` before each
    /// lookup; returns the number of lookups performed.
    pub fn find_all<C: StopCondition + ?Sized>(&mut self, tree: &SearchTree, stop: &C) -> usize {
        let keys = self.dataset.keys();
        let mut lookups = 0;

        for (index, &key) in keys.iter().enumerate() {
            if stop.stop_requested() {
                debug!(
                    stressor = STRESSOR.name,
                    instance = self.instance,
                    index,
                    "find phase interrupted"
                );
                break;
            }
            let found = tree.find(keys, key).map(|element| keys[element]);
            self.verifier.check_find(index, key, found);
            lookups += 1;
        }

        self.lookups += lookups as u64;
        lookups
    }

    /// Remove every element in index order; returns the number of nodes
    /// removed.
    pub fn delete_all(&mut self, tree: &mut SearchTree) -> usize {
        let keys = self.dataset.keys();
        let mut removed = 0;

        for (index, &key) in keys.iter().enumerate() {
            let hit = tree.remove(keys, key).is_some();
            self.verifier.check_delete(index, hit);
            removed += usize::from(hit);
        }

        self.deletions += keys.len() as u64;
        removed
    }

    fn set_state(&self, next: ProcState) {
        self.state.set(next);
        debug!(
            stressor = STRESSOR.name,
            instance = self.instance,
            state = %next,
            "state transition"
        );
    }
}
