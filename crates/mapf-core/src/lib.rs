//! `mapf-core` — foundational types for the `rust_mapf` planning framework.
//!
//! This crate is a dependency of every other `mapf-*` crate.  It intentionally
//! has no `mapf-*` dependencies and minimal external ones (only `rand`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                          |
//! |-------------|---------------------------------------------------|
//! | [`ids`]     | `AgentId`, `NodeId`                               |
//! | [`time`]    | `FOREVER`, `Stopwatch`                            |
//! | [`rng`]     | `PlannerRng` (seed-derived deterministic streams) |
//! | [`agent`]   | `Agent` — the planner-facing robot record         |
//! | [`path`]    | `Path`, `PathAction` — the planner's output       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod agent;
pub mod ids;
pub mod path;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use agent::Agent;
pub use ids::{AgentId, NodeId};
pub use path::{Path, PathAction};
pub use rng::PlannerRng;
pub use time::{FOREVER, Stopwatch};
