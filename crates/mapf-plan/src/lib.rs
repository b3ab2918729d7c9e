//! `mapf-plan` — windowed cooperative path planning (WHCA*).
//!
//! One [`WhcaPlanner`] owns the live [reservation
//! table](mapf_reserve::ReservationTable) and replans the whole fleet each
//! cycle: agents are ordered by priority, each searches space-time inside a
//! sliding window against everyone else's claims, and commits its result
//! before the next agent plans.  Searches are guided by a resumable backward
//! A* per agent, so the forward search pays only for the cells it actually
//! touches.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`whca`]       | `WhcaPlanner`, `CycleReport` — the cycle driver       |
//! | [`builder`]    | `WhcaPlannerBuilder` — validated construction         |
//! | [`config`]     | `PlannerConfig` — window, budgets, toggles            |
//! | [`space_time`] | `SpaceTimeAStar` — windowed forward search            |
//! | [`rra`]        | `ReverseAStar` — resumable backward heuristic         |
//! | [`deadlock`]   | `DeadlockHandler` — stuck detection and random hops   |
//! | [`session`]    | `ScheduleSession` — speculative what-if scheduling    |
//! | [`observer`]   | `PlanningObserver` — per-cycle instrumentation hooks  |
//! | [`error`]      | `PlanError`, `PlanResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                             |
//! |---------|----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types. |

pub mod builder;
pub mod config;
pub mod deadlock;
pub mod error;
pub mod observer;
pub mod rra;
pub mod session;
pub mod space_time;
pub mod whca;


pub use builder::WhcaPlannerBuilder;
pub use config::PlannerConfig;
pub use deadlock::DeadlockHandler;
pub use error::{PlanError, PlanResult};
pub use observer::{AgentOutcome, NoopObserver, PlanningObserver};
pub use rra::ReverseAStar;
pub use session::ScheduleSession;
pub use space_time::{SearchPlan, SearchQuery, SpaceTimeAStar};
pub use whca::{CycleReport, WhcaPlanner};
