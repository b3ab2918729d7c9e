//! Continuous time primitives.
//!
//! # Design
//!
//! The planner works in continuous seconds (`f64`) because reservation
//! intervals are real time ranges, not tick counts: an edge traversal can take
//! 1.37 s and an open-ended claim must extend to infinity.  `f64` carries both
//! naturally; `FOREVER` is the canonical open end.
//!
//! Budget enforcement measures real wall-clock time, so a small [`Stopwatch`]
//! wraps `std::time::Instant` with second-valued reads.

use std::time::Instant;

/// The open end of a reservation that never expires.
///
/// An agent parked at a node holds it from some start time to `FOREVER`;
/// `Reorganize` never trims such an interval away.
pub const FOREVER: f64 = f64::INFINITY;

// ── Stopwatch ─────────────────────────────────────────────────────────────────

/// Wall-clock stopwatch used for planning-cycle budget checks.
///
/// Restarted at the top of every cycle; read once per agent iteration.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Start (or conceptually restart) a stopwatch now.
    pub fn start() -> Self {
        Self { started: Instant::now() }
    }

    /// Reset the start point to now.
    #[inline]
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }

    /// Seconds elapsed since the last (re)start.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}
