//! Observer hooks for planning cycles.
//!
//! The planner drives an observer through each cycle so hosts can collect
//! telemetry without the planner knowing about output formats.  All methods
//! default to no-ops; implement only what you need.

use mapf_core::AgentId;

use crate::whca::CycleReport;

/// How one agent's replan ended.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentOutcome {
    /// A plan was found and its reservations committed.
    Committed {
        /// Actions in the committed path.
        path_len: usize,
        /// When the plan completes (end of its last reservation).
        arrival: f64,
    },
    /// The agent's own node was contested; it was claimed exclusively and a
    /// single wait step issued.
    ForcedClaim,
    /// A plan was committed, but the agent was still deadlocked and its path
    /// was replaced by a random hop to a free neighbor.
    DeadlockHop,
}

/// Receives planning-cycle events.
pub trait PlanningObserver {
    /// A planning cycle is starting.
    fn on_cycle_start(&mut self, time: f64, agent_count: usize) {
        let _ = (time, agent_count);
    }

    /// One agent's replan finished.
    fn on_agent_planned(&mut self, time: f64, agent: AgentId, outcome: &AgentOutcome) {
        let _ = (time, agent, outcome);
    }

    /// The wall-clock budget ran out; the cycle aborts and `pending` agents
    /// keep their previous plans.
    fn on_timeout(&mut self, time: f64, elapsed: f64, pending: usize) {
        let _ = (time, elapsed, pending);
    }

    /// The cycle finished (normally or via timeout).
    fn on_cycle_end(&mut self, time: f64, report: &CycleReport) {
        let _ = (time, report);
    }
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl PlanningObserver for NoopObserver {}
