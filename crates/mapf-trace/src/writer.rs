//! The `TraceWriter` trait implemented by all backend writers.

use crate::{AgentOutcomeRow, CycleSummaryRow, TraceResult};

/// Sink for planner trace rows.
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with [`TraceObserver::take_error`].
///
/// [`TraceObserver::take_error`]: crate::TraceObserver::take_error
pub trait TraceWriter {
    /// Write the batch of per-agent outcomes of one cycle.
    fn write_outcomes(&mut self, rows: &[AgentOutcomeRow]) -> TraceResult<()>;

    /// Write one cycle summary row.
    fn write_cycle_summary(&mut self, row: &CycleSummaryRow) -> TraceResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> TraceResult<()>;
}
