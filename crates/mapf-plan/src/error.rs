//! Planner errors.

use mapf_core::AgentId;
use mapf_reserve::ReserveError;
use thiserror::Error;

pub type PlanResult<T> = Result<T, PlanError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// A configuration field failed builder validation.
    #[error("invalid planner parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The same agent was registered twice at construction.
    #[error("agent {0} registered more than once")]
    DuplicateAgent(AgentId),

    /// A reservation operation failed.  During a planning cycle this means a
    /// search produced intervals conflicting with claims it should have seen,
    /// which is an invariant violation, not a recoverable condition.
    #[error(transparent)]
    Reserve(#[from] ReserveError),
}
