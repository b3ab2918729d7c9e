//! `TraceObserver<W>` — bridges `PlanningObserver` to a `TraceWriter`.

use mapf_core::AgentId;
use mapf_plan::{AgentOutcome, CycleReport, PlanningObserver};

use crate::row::{AgentOutcomeRow, CycleSummaryRow, OutcomeKind};
use crate::writer::TraceWriter;
use crate::TraceError;

/// A [`PlanningObserver`] that writes per-agent outcomes and cycle summaries
/// to any [`TraceWriter`] backend.
///
/// Outcome rows are buffered and written once per cycle, so a timed-out
/// cycle still lands as one consistent batch.  Errors from the writer are
/// stored internally because observer methods have no return value; after
/// the planning loop, check for them with [`take_error`][Self::take_error].
pub struct TraceObserver<W: TraceWriter> {
    writer:      W,
    agent_count: usize,
    pending:     Vec<AgentOutcomeRow>,
    last_error:  Option<TraceError>,
}

impl<W: TraceWriter> TraceObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, agent_count: 0, pending: Vec::new(), last_error: None }
    }

    /// Take the stored write error (if any) after the planning loop.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<TraceError> {
        self.last_error.take()
    }

    /// Flush the backend and unwrap it (e.g. to inspect files afterwards).
    pub fn into_writer(mut self) -> (W, Option<TraceError>) {
        let result = self.writer.finish();
        self.store_err(result);
        (self.writer, self.last_error)
    }

    fn store_err(&mut self, result: crate::TraceResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: TraceWriter> PlanningObserver for TraceObserver<W> {
    fn on_cycle_start(&mut self, _time: f64, agent_count: usize) {
        self.agent_count = agent_count;
        self.pending.clear();
    }

    fn on_agent_planned(&mut self, time: f64, agent: AgentId, outcome: &AgentOutcome) {
        let (kind, path_len, arrival) = match outcome {
            AgentOutcome::Committed { path_len, arrival } => {
                (OutcomeKind::Committed, *path_len as u32, *arrival)
            }
            AgentOutcome::ForcedClaim => (OutcomeKind::ForcedClaim, 0, f64::NAN),
            AgentOutcome::DeadlockHop => (OutcomeKind::DeadlockHop, 0, f64::NAN),
        };
        self.pending.push(AgentOutcomeRow {
            time,
            agent_id: agent.0,
            outcome: kind,
            path_len,
            arrival,
        });
    }

    fn on_cycle_end(&mut self, time: f64, report: &CycleReport) {
        if !self.pending.is_empty() {
            let rows = std::mem::take(&mut self.pending);
            let result = self.writer.write_outcomes(&rows);
            self.store_err(result);
        }
        let row = CycleSummaryRow {
            time,
            agent_count:   self.agent_count as u32,
            planned:       report.planned as u32,
            forced_claims: report.forced_claims as u32,
            deadlock_hops: report.deadlock_hops as u32,
            skipped:       report.skipped as u32,
            timed_out:     report.timed_out,
            elapsed_secs:  report.elapsed,
        };
        let result = self.writer.write_cycle_summary(&row);
        self.store_err(result);
    }
}
