//! Graph-subsystem error type.

use thiserror::Error;

use mapf_core::NodeId;

/// Errors produced by `mapf-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("edge endpoint {node} is out of range (graph has {count} nodes)")]
    EdgeOutOfRange { node: NodeId, count: usize },

    #[error("edge {from} -> {to} has non-positive travel time {cost}")]
    NonPositiveCost { from: NodeId, to: NodeId, cost: f64 },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;
