//! The planner-facing agent record.
//!
//! Agents are owned by the host (bot/task layer); the planner consumes a
//! mutable slice of them each cycle, reads position/destination/flags, and
//! writes only the [`Path`] output slot.

use crate::{NodeId, Path};
use crate::ids::AgentId;

/// One robot as the planner sees it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id: AgentId,

    /// The node the agent occupies, or the node it is currently moving
    /// toward if mid-edge.  All planning starts here.
    pub next_node: NodeId,

    /// Where the agent wants to end up.
    pub destination: NodeId,

    /// When the agent physically reaches `next_node`.  Zero for an agent
    /// already parked; a mid-edge agent is planned from this moment rather
    /// than from the cycle timestamp.
    pub arrival_time: f64,

    /// Whether the agent may traverse blocked cells (e.g. an unladen robot
    /// driving beneath stored inventory).
    pub can_pass_blocked: bool,

    /// Pinned agents (e.g. docked at a charger) are never re-planned.
    pub fixed_position: bool,

    /// Set by the host when the agent needs a fresh plan this cycle.
    pub request_reoptimization: bool,

    /// Output slot: the planner overwrites this with the committed plan.
    pub path: Path,
}

impl Agent {
    /// A freshly placed agent: parked at `at`, wanting to reach `destination`,
    /// requesting a plan, with no special capabilities.
    pub fn new(id: AgentId, at: NodeId, destination: NodeId) -> Self {
        Self {
            id,
            next_node: at,
            destination,
            arrival_time: 0.0,
            can_pass_blocked: false,
            fixed_position: false,
            request_reoptimization: true,
            path: Path::new(),
        }
    }

    /// `true` once the agent's current node is its destination.
    #[inline]
    pub fn at_destination(&self) -> bool {
        self.next_node == self.destination
    }
}
