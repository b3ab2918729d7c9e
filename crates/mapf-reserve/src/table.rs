//! The reservation table: disjoint time intervals per graph node.

use mapf_core::{AgentId, NodeId};

use crate::error::{ReserveError, ReserveResult};
use crate::interval::Interval;
use crate::timeline::NodeTimeline;

/// Maps every graph node to its set of disjoint, owned time intervals.
///
/// The table is the single synchronization point between agents: a claim that
/// would overlap an existing one is rejected with [`ReserveError::Conflict`],
/// so two agents can never hold the same node at the same time once their
/// insertions both succeed.
///
/// `Clone` produces a fully independent snapshot; speculative planning runs
/// against such a copy without ever touching the live table.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReservationTable {
    timelines: Vec<NodeTimeline>,
}

impl ReservationTable {
    /// An empty table over `node_count` nodes.
    pub fn new(node_count: usize) -> Self {
        Self { timelines: vec![NodeTimeline::default(); node_count] }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.timelines.len()
    }

    /// Claim `interval` for `owner`.
    ///
    /// Fails without inserting if the range overlaps any existing claim,
    /// including one held by `owner` itself: callers re-planning an agent must
    /// remove its stale intervals first.
    pub fn add(&mut self, interval: Interval, owner: AgentId) -> ReserveResult<()> {
        let count = self.timelines.len();
        let timeline = self
            .timelines
            .get_mut(interval.node.index())
            .ok_or(ReserveError::NodeOutOfRange { node: interval.node, count })?;
        timeline
            .insert(interval.start, interval.end, owner)
            .map_err(|held| ReserveError::Conflict {
                node:   interval.node,
                start:  held.start,
                end:    held.end,
                holder: held.owner,
            })
    }

    /// Claim every interval in order, stopping at the first conflict.
    /// Intervals added before the failing one stay in the table.
    pub fn add_all(&mut self, intervals: &[Interval], owner: AgentId) -> ReserveResult<()> {
        for interval in intervals {
            self.add(*interval, owner)?;
        }
        Ok(())
    }

    /// Remove the claim matching `interval` exactly.  Removing an absent
    /// interval is a no-op; returns whether anything was removed.
    pub fn remove(&mut self, interval: Interval) -> bool {
        match self.timelines.get_mut(interval.node.index()) {
            Some(timeline) => timeline.remove(interval.start, interval.end),
            None => false,
        }
    }

    /// Remove every claim in `intervals` by exact match.
    pub fn remove_all(&mut self, intervals: &[Interval]) {
        for interval in intervals {
            self.remove(*interval);
        }
    }

    /// Remove every claim of `owner` overlapping the range of each interval.
    ///
    /// Unlike [`remove_all`](Self::remove_all) this does not require exact
    /// bounds: a snapshot that was independently reorganized holds trimmed
    /// copies of the original intervals, and those must still come out when
    /// the original list is replayed against it.  Returns the number of
    /// claims removed.
    pub fn careful_remove_all(&mut self, intervals: &[Interval], owner: AgentId) -> usize {
        let mut removed = 0;
        for interval in intervals {
            if let Some(timeline) = self.timelines.get_mut(interval.node.index()) {
                removed += timeline.careful_remove(interval.start, interval.end, owner);
            }
        }
        removed
    }

    /// The earliest claim on `node` overlapping `[start, end)`, with its owner.
    pub fn get(&self, node: NodeId, start: f64, end: f64) -> Option<(Interval, AgentId)> {
        let slot = self.timelines.get(node.index())?.first_overlap(start, end)?;
        Some((Interval::new(node, slot.start, slot.end), slot.owner))
    }

    /// The latest claim on `node`, with its owner.
    pub fn get_last(&self, node: NodeId) -> Option<(Interval, AgentId)> {
        let slot = self.timelines.get(node.index())?.last()?;
        Some((Interval::new(node, slot.start, slot.end), slot.owner))
    }

    /// Whether `[start, end)` on `node` overlaps no existing claim.
    #[inline]
    pub fn is_free(&self, node: NodeId, start: f64, end: f64) -> bool {
        match self.timelines.get(node.index()) {
            Some(timeline) => timeline.is_free(start, end),
            None => false,
        }
    }

    /// Drop every claim on `node`, whoever holds it.
    pub fn clear(&mut self, node: NodeId) {
        if let Some(timeline) = self.timelines.get_mut(node.index()) {
            timeline.clear();
        }
    }

    /// Discard history before `t`: claims ending at or before `t` are removed
    /// and a claim straddling `t` has its start clipped to `t`.  Called once
    /// per planning cycle so the table never accumulates past intervals.
    pub fn reorganize(&mut self, t: f64) {
        for timeline in &mut self.timelines {
            timeline.trim_to(t);
        }
    }

    /// All claims on `node` in start order.
    pub fn intervals_at(&self, node: NodeId) -> impl Iterator<Item = (Interval, AgentId)> + '_ {
        self.timelines
            .get(node.index())
            .into_iter()
            .flat_map(move |timeline| {
                timeline.iter().map(move |s| (Interval::new(node, s.start, s.end), s.owner))
            })
    }

    /// Total number of claims across all nodes.
    pub fn len(&self) -> usize {
        self.timelines.iter().map(NodeTimeline::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
