//! Speculative scheduling sessions.
//!
//! A session owns a deep copy of the live reservation table, so "what if
//! agent X drove here at time T" questions can be answered and tentatively
//! booked without disturbing committed plans.  The planner
//! creates sessions ([`WhcaPlanner::schedule_init`]) and runs searches
//! against them ([`WhcaPlanner::schedule_path`]); booking results into the
//! session is the caller's explicit step via [`ScheduleSession::overwrite_path`].
//!
//! [`WhcaPlanner::schedule_init`]: crate::WhcaPlanner::schedule_init
//! [`WhcaPlanner::schedule_path`]: crate::WhcaPlanner::schedule_path

use mapf_core::AgentId;
use mapf_reserve::{Interval, ReservationTable, ReserveResult};
use rustc_hash::FxHashMap;

/// Detached reservation state for hypothetical scheduling.
pub struct ScheduleSession {
    pub(crate) table:    ReservationTable,
    pub(crate) paths:    FxHashMap<AgentId, Vec<Interval>>,
    pub(crate) sequence: Vec<AgentId>,
}

impl ScheduleSession {
    pub(crate) fn new(table: ReservationTable) -> Self {
        Self {
            table,
            paths: FxHashMap::default(),
            sequence: Vec::new(),
        }
    }

    /// The session's own table snapshot.
    #[inline]
    pub fn table(&self) -> &ReservationTable {
        &self.table
    }

    /// The path currently booked for `agent` in this session, if any.
    pub fn scheduled_path(&self, agent: AgentId) -> Option<&[Interval]> {
        self.paths.get(&agent).map(Vec::as_slice)
    }

    /// Agents in most-recently-booked order, latest first.
    #[inline]
    pub fn sequence(&self) -> &[AgentId] {
        &self.sequence
    }

    /// Replace `agent`'s booked path: the old claims are carefully removed
    /// (their bounds may have drifted from independent reorganization), the
    /// new ones added, and the agent moves to the front of the booking order.
    pub fn overwrite_path(&mut self, agent: AgentId, path: Vec<Interval>) -> ReserveResult<()> {
        if let Some(old) = self.paths.get(&agent) {
            self.table.careful_remove_all(old, agent);
        }
        self.table.add_all(&path, agent)?;
        self.paths.insert(agent, path);
        self.sequence.retain(|a| *a != agent);
        self.sequence.insert(0, agent);
        Ok(())
    }
}
