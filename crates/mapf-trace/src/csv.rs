//! CSV trace backend.
//!
//! Creates two files in the configured output directory:
//! - `agent_outcomes.csv`
//! - `cycle_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::TraceWriter;
use crate::{AgentOutcomeRow, CycleSummaryRow, TraceResult};

/// Writes planner traces to two CSV files.
pub struct CsvTraceWriter {
    outcomes:  Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvTraceWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> TraceResult<Self> {
        let mut outcomes = Writer::from_path(dir.join("agent_outcomes.csv"))?;
        outcomes.write_record(["time", "agent_id", "outcome", "path_len", "arrival"])?;

        let mut summaries = Writer::from_path(dir.join("cycle_summaries.csv"))?;
        summaries.write_record([
            "time",
            "agent_count",
            "planned",
            "forced_claims",
            "deadlock_hops",
            "skipped",
            "timed_out",
            "elapsed_secs",
        ])?;

        Ok(Self { outcomes, summaries, finished: false })
    }
}

impl TraceWriter for CsvTraceWriter {
    fn write_outcomes(&mut self, rows: &[AgentOutcomeRow]) -> TraceResult<()> {
        for row in rows {
            let arrival =
                if row.arrival.is_finite() { row.arrival.to_string() } else { String::new() };
            self.outcomes.write_record(&[
                row.time.to_string(),
                row.agent_id.to_string(),
                row.outcome.as_str().to_string(),
                row.path_len.to_string(),
                arrival,
            ])?;
        }
        Ok(())
    }

    fn write_cycle_summary(&mut self, row: &CycleSummaryRow) -> TraceResult<()> {
        self.summaries.write_record(&[
            row.time.to_string(),
            row.agent_count.to_string(),
            row.planned.to_string(),
            row.forced_claims.to_string(),
            row.deadlock_hops.to_string(),
            row.skipped.to_string(),
            (row.timed_out as u8).to_string(),
            row.elapsed_secs.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> TraceResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.outcomes.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
