//! `mapf-graph` — waypoint graph, backward adjacency, and spatial snapping.
//!
//! # Crate layout
//!
//! | Module    | Contents                                             |
//! |-----------|------------------------------------------------------|
//! | [`graph`] | `Graph` (forward + transposed CSR, R-tree), `GraphBuilder` |
//! | [`error`] | `GraphError`, `GraphResult<T>`                       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                             |
//! |---------|----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types. |

pub mod error;
pub mod graph;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult};
pub use graph::{Graph, GraphBuilder};
