//! The reservation interval value type.

use mapf_core::{FOREVER, NodeId};

/// A claim on one node for the time range `[start, end)`.
///
/// `end` may be [`FOREVER`] for an agent parked indefinitely.  Two intervals
/// that merely touch (`a.end == b.start`) do not conflict: the leaving agent
/// vacates the node at the exact instant the next one enters.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub node:  NodeId,
    pub start: f64,
    pub end:   f64,
}

impl Interval {
    #[inline]
    pub fn new(node: NodeId, start: f64, end: f64) -> Self {
        Self { node, start, end }
    }

    /// An open-ended claim: `node` held from `start` onward.
    #[inline]
    pub fn to_forever(node: NodeId, start: f64) -> Self {
        Self { node, start, end: FOREVER }
    }

    /// Strict-overlap test against `[start, end)`.
    #[inline]
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && start < self.end
    }

    /// Whether `t` falls inside this interval.
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }

    /// Whether the claim is open-ended.
    #[inline]
    pub fn is_open_ended(&self) -> bool {
        self.end == FOREVER
    }
}
