//! Per-node interval storage.
//!
//! One [`NodeTimeline`] holds every reservation on a single node as a
//! start-sorted, pairwise-disjoint `Vec` of slots.  Planning workloads insert
//! and remove near the sorted tail and scan short runs, so a flat vector
//! beats a tree here.

use mapf_core::AgentId;

/// One stored claim: `[start, end)` held by `owner`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct Slot {
    pub start: f64,
    pub end:   f64,
    pub owner: AgentId,
}

impl Slot {
    #[inline]
    fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && start < self.end
    }
}

/// The reservations on one node.
///
/// Invariant: `slots` is sorted by `start` and no two slots overlap.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct NodeTimeline {
    slots: Vec<Slot>,
}

impl NodeTimeline {
    /// Try to insert `[start, end)` for `owner`.  On conflict, returns the
    /// first stored slot that overlaps the request and inserts nothing.
    pub fn insert(&mut self, start: f64, end: f64, owner: AgentId) -> Result<(), Slot> {
        let idx = self.slots.partition_point(|s| s.start < start);
        // Sorted + disjoint, so only the immediate neighbors can overlap.
        if idx > 0 && self.slots[idx - 1].overlaps(start, end) {
            return Err(self.slots[idx - 1]);
        }
        if idx < self.slots.len() && self.slots[idx].overlaps(start, end) {
            return Err(self.slots[idx]);
        }
        self.slots.insert(idx, Slot { start, end, owner });
        Ok(())
    }

    /// Remove the slot matching `[start, end)` exactly.  Returns `false` when
    /// no such slot exists.
    pub fn remove(&mut self, start: f64, end: f64) -> bool {
        let idx = self.slots.partition_point(|s| s.start < start);
        if idx < self.slots.len() && self.slots[idx].start == start && self.slots[idx].end == end {
            self.slots.remove(idx);
            return true;
        }
        false
    }

    /// Remove every slot owned by `owner` that overlaps `[start, end)`.
    /// Tolerates bounds that no longer match the stored slot exactly, as
    /// happens after [`trim_to`](Self::trim_to) has trimmed them.
    pub fn careful_remove(&mut self, start: f64, end: f64, owner: AgentId) -> usize {
        let before = self.slots.len();
        self.slots.retain(|s| s.owner != owner || !s.overlaps(start, end));
        before - self.slots.len()
    }

    /// The first slot (in start order) overlapping `[start, end)`.
    pub fn first_overlap(&self, start: f64, end: f64) -> Option<&Slot> {
        let idx = self.slots.partition_point(|s| s.end <= start);
        self.slots.get(idx).filter(|s| s.start < end)
    }

    /// The slot with the greatest start, if any.
    #[inline]
    pub fn last(&self) -> Option<&Slot> {
        self.slots.last()
    }

    /// Whether `[start, end)` overlaps no stored slot.
    #[inline]
    pub fn is_free(&self, start: f64, end: f64) -> bool {
        self.first_overlap(start, end).is_none()
    }

    /// Drop every slot that ends at or before `t` and clip the start of a
    /// slot straddling `t` up to `t`.
    pub fn trim_to(&mut self, t: f64) {
        let past = self.slots.partition_point(|s| s.end <= t);
        if past > 0 {
            self.slots.drain(..past);
        }
        // At most the first survivor can straddle `t`.
        if let Some(first) = self.slots.first_mut() {
            if first.start < t {
                first.start = t;
            }
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
