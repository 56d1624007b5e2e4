//! Cycle counter and lifecycle state

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// Completed populate/find/delete cycles (bogo-ops).
///
/// Clones share the same count so a harness thread can watch a worker.
#[derive(Debug, Clone, Default)]
pub struct CycleCounter {
    count: Arc<AtomicU64>,
}

impl CycleCounter {
    /// Counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed cycle.
    #[inline]
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Cycles completed so far.
    #[inline]
    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Lifecycle state of one stressor invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum ProcState {
    /// Allocating the dataset
    Init = 0,
    /// Running cycles
    Run = 1,
    /// Tearing down after stop or fatal error
    Deinit = 2,
    /// Finished
    Exit = 3,
}

impl ProcState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ProcState::Init,
            1 => ProcState::Run,
            2 => ProcState::Deinit,
            _ => ProcState::Exit,
        }
    }

    /// Lower-case name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ProcState::Init => "init",
            ProcState::Run => "run",
            ProcState::Deinit => "deinit",
            ProcState::Exit => "exit",
        }
    }
}

impl fmt::Display for ProcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable lifecycle state; clones share the same cell.
#[derive(Debug, Clone)]
pub struct StateCell {
    state: Arc<AtomicU8>,
}

impl Default for StateCell {
    fn default() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(ProcState::Init as u8)),
        }
    }
}

impl StateCell {
    /// Cell in [`ProcState::Init`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn get(&self) -> ProcState {
        ProcState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move to `next`. States only move forward.
    pub fn set(&self, next: ProcState) {
        self.state.fetch_max(next as u8, Ordering::AcqRel);
    }
}
