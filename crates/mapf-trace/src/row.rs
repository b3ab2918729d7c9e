//! Plain data row types written by trace backends.

/// How one agent's replan ended, flattened for tabular output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Committed,
    ForcedClaim,
    DeadlockHop,
}

impl OutcomeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Committed => "committed",
            OutcomeKind::ForcedClaim => "forced_claim",
            OutcomeKind::DeadlockHop => "deadlock_hop",
        }
    }
}

/// One agent's result within one planning cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentOutcomeRow {
    pub time:     f64,
    pub agent_id: u32,
    pub outcome:  OutcomeKind,
    /// Actions in the committed path; zero for non-committed outcomes.
    pub path_len: u32,
    /// Plan completion time.  `NaN` when the outcome carries no arrival;
    /// written as an empty field.
    pub arrival:  f64,
}

/// Summary statistics for one planning cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSummaryRow {
    pub time:          f64,
    pub agent_count:   u32,
    pub planned:       u32,
    pub forced_claims: u32,
    pub deadlock_hops: u32,
    pub skipped:       u32,
    pub timed_out:     bool,
    pub elapsed_secs:  f64,
}
