//! `mapf-trace` — planner trace writers.
//!
//! The CSV backend creates two files per run:
//!
//! | File                 | One row per              |
//! |----------------------|--------------------------|
//! | `agent_outcomes.csv` | agent per planning cycle |
//! | `cycle_summaries.csv`| planning cycle           |
//!
//! Backends implement [`TraceWriter`] and are driven by [`TraceObserver`],
//! which implements `mapf_plan::PlanningObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mapf_trace::{CsvTraceWriter, TraceObserver};
//!
//! let writer = CsvTraceWriter::new(Path::new("./trace"))?;
//! let mut obs = TraceObserver::new(writer);
//! for cycle in 0..cycles {
//!     planner.find_paths(now, &mut agents, &mut obs)?;
//! }
//! let (_, err) = obs.into_writer();
//! if let Some(e) = err {
//!     eprintln!("trace error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvTraceWriter;
pub use error::{TraceError, TraceResult};
pub use observer::TraceObserver;
pub use row::{AgentOutcomeRow, CycleSummaryRow, OutcomeKind};
pub use writer::TraceWriter;
