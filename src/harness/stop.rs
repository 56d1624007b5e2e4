//! Stop conditions polled by the engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Externally supplied signal that ends the cycle loop.
///
/// Polled, never interrupt-driven: once per element in the find phase and
/// once per completed cycle.
pub trait StopCondition {
    /// Whether a stop has been requested (per-element check).
    fn stop_requested(&self) -> bool;

    /// Whether another cycle should start after `completed` cycles.
    fn keep_stressing(&self, completed: u64) -> bool {
        let _ = completed;
        !self.stop_requested()
    }
}

/// Shared stop flag, settable from any thread.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    flag: Arc<AtomicBool>,
}

impl StopFlag {
    /// Flag in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether a stop was requested.
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl StopCondition for StopFlag {
    fn stop_requested(&self) -> bool {
        self.is_set()
    }
}

/// Op-count limit, deadline and shared flag combined.
#[derive(Debug, Clone)]
pub struct StopBudget {
    flag: StopFlag,
    max_ops: Option<u64>,
    deadline: Option<Instant>,
}

impl StopBudget {
    /// Budget that only stops on the flag.
    pub fn new(flag: StopFlag) -> Self {
        Self {
            flag,
            max_ops: None,
            deadline: None,
        }
    }

    /// Stop after `max_ops` completed cycles; zero means unlimited.
    pub fn with_max_ops(mut self, max_ops: Option<u64>) -> Self {
        self.max_ops = max_ops.filter(|&ops| ops > 0);
        self
    }

    /// Stop once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.deadline = timeout.map(|t| Instant::now() + t);
        self
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

impl StopCondition for StopBudget {
    fn stop_requested(&self) -> bool {
        self.flag.is_set() || self.expired()
    }

    fn keep_stressing(&self, completed: u64) -> bool {
        if self.stop_requested() {
            return false;
        }
        match self.max_ops {
            Some(max) => completed < max,
            None => true,
        }
    }
}

/// Stop after a fixed number of cycles; never interrupts the find phase.
#[derive(Debug, Clone, Copy)]
pub struct MaxCycles(pub u64);

impl StopCondition for MaxCycles {
    fn stop_requested(&self) -> bool {
        false
    }

    fn keep_stressing(&self, completed: u64) -> bool {
        completed < self.0
    }
}
