//! `mapf-reserve` — time-interval reservations over graph nodes.
//!
//! Agents claim `(node, [start, end))` intervals here before driving; the
//! table guarantees that successfully inserted claims are pairwise disjoint
//! per node, which is the collision-freedom invariant the whole planner
//! rests on.
//!
//! # Crate layout
//!
//! | Module       | Contents                                  |
//! |--------------|-------------------------------------------|
//! | [`interval`] | `Interval` — the claim value type         |
//! | [`table`]    | `ReservationTable` — per-node timelines   |
//! | [`error`]    | `ReserveError`, `ReserveResult<T>`        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                             |
//! |---------|----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types. |

pub mod error;
pub mod interval;
pub mod table;

mod timeline;

#[cfg(test)]
mod tests;

pub use error::{ReserveError, ReserveResult};
pub use interval::Interval;
pub use table::ReservationTable;
