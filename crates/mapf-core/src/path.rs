//! The planner's output: an ordered list of drive/wait actions.

use std::collections::VecDeque;
use std::fmt;

use crate::NodeId;

// ── PathAction ────────────────────────────────────────────────────────────────

/// One step of a committed plan: drive to `node`, optionally come to a stop
/// there, and wait `wait_time` seconds before departing onward.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathAction {
    pub node: NodeId,
    /// Whether the agent must come to a full stop at `node` (always set on
    /// the terminal action and on any action with a positive wait).
    pub stop_at_node: bool,
    /// Seconds to hold position at `node` before moving on.
    pub wait_time: f64,
}

impl PathAction {
    #[inline]
    pub fn new(node: NodeId, stop_at_node: bool, wait_time: f64) -> Self {
        Self { node, stop_at_node, wait_time }
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// An agent's current plan, written by the planner and consumed front-first
/// by the host's movement layer.
///
/// Searches reconstruct plans tail-to-head, so insertion at the front is the
/// hot operation; the backing store is a `VecDeque`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    actions: VecDeque<PathAction>,
}

impl Path {
    pub fn new() -> Self {
        Self { actions: VecDeque::new() }
    }

    /// Prepend an action (used during backward path reconstruction).
    #[inline]
    pub fn add_first(&mut self, node: NodeId, stop_at_node: bool, wait_time: f64) {
        self.actions.push_front(PathAction::new(node, stop_at_node, wait_time));
    }

    /// Append an action.
    #[inline]
    pub fn add_last(&mut self, node: NodeId, stop_at_node: bool, wait_time: f64) {
        self.actions.push_back(PathAction::new(node, stop_at_node, wait_time));
    }

    /// The next action to execute, if any.
    #[inline]
    pub fn next_action(&self) -> Option<&PathAction> {
        self.actions.front()
    }

    /// The final action of the plan, if any.
    #[inline]
    pub fn last_action(&self) -> Option<&PathAction> {
        self.actions.back()
    }

    /// Remove and return the next action (host calls this on completion).
    #[inline]
    pub fn pop_first(&mut self) -> Option<PathAction> {
        self.actions.pop_front()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterate actions front to back.
    pub fn iter(&self) -> impl Iterator<Item = &PathAction> {
        self.actions.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path[")?;
        for (i, a) in self.actions.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", a.node.0)?;
            if a.wait_time > 0.0 {
                write!(f, "(+{:.1}s)", a.wait_time)?;
            }
        }
        write!(f, "]")
    }
}
