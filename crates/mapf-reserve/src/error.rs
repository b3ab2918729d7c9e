//! Reservation-table errors.

use mapf_core::{AgentId, NodeId};
use thiserror::Error;

pub type ReserveResult<T> = Result<T, ReserveError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReserveError {
    /// The requested range overlaps a claim already in the table.  Carries
    /// the stored claim, not the rejected request.
    #[error("node {node} already claimed by {holder} over [{start:.3}, {end:.3})")]
    Conflict {
        node:   NodeId,
        start:  f64,
        end:    f64,
        holder: AgentId,
    },

    /// The interval names a node outside the table.
    #[error("{node} out of range for a table over {count} nodes")]
    NodeOutOfRange { node: NodeId, count: usize },
}
