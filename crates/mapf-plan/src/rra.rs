//! Reverse Resumable A* — incremental backward search for heuristics.
//!
//! One instance serves one (agent, destination) pair.  The search runs
//! backward from the destination over transposed edges and is extended on
//! demand: `search(n)` pops the frontier only until `n` is finalized, and a
//! later query resumes exactly where the previous one stopped.  A finalized
//! cost is the exact shortest time from that node to the destination, which
//! the forward space-time search consumes as a perfect heuristic.
//!
//! The frontier is ordered by `g + straight-line time bound to the anchor`,
//! where the anchor is the agent's position at construction.  The anchor only
//! steers which region gets expanded first; finalized costs are exact no
//! matter where the agent has moved since, so instances stay valid until the
//! destination changes or a deadlock forces a rebuild.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use mapf_core::{Agent, NodeId};
use mapf_graph::Graph;
use rustc_hash::{FxHashMap, FxHashSet};

// ── Open list ─────────────────────────────────────────────────────────────────

struct OpenEntry {
    f:    f64,
    node: NodeId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    // Reversed for a min-heap; node id breaks ties deterministically.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.node.cmp(&self.node))
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

/// Backward search state for one agent's destination.
pub struct ReverseAStar {
    destination:      NodeId,
    anchor:           NodeId,
    can_pass_blocked: bool,
    g:                FxHashMap<NodeId, f64>,
    parent:           FxHashMap<NodeId, NodeId>,
    closed:           FxHashSet<NodeId>,
    open:             BinaryHeap<OpenEntry>,
}

impl ReverseAStar {
    /// Root a fresh search at `agent`'s destination.
    pub fn new(graph: &Graph, agent: &Agent) -> Self {
        let mut rra = Self {
            destination:      agent.destination,
            anchor:           agent.next_node,
            can_pass_blocked: agent.can_pass_blocked,
            g:                FxHashMap::default(),
            parent:           FxHashMap::default(),
            closed:           FxHashSet::default(),
            open:             BinaryHeap::new(),
        };
        rra.g.insert(rra.destination, 0.0);
        rra.open.push(OpenEntry {
            f:    graph.time_lower_bound(rra.destination, rra.anchor),
            node: rra.destination,
        });
        rra
    }

    /// The destination this instance is rooted at.  The orchestrator rebuilds
    /// the instance when an agent's destination no longer matches.
    #[inline]
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Whether `node`'s backward cost is already finalized.
    #[inline]
    pub fn is_closed(&self, node: NodeId) -> bool {
        self.closed.contains(&node)
    }

    /// Extend the frontier until `target` is finalized.  Returns `false` only
    /// when the frontier exhausts first, i.e. `target` cannot reach the
    /// destination at all.
    pub fn search(&mut self, graph: &Graph, target: NodeId) -> bool {
        if self.closed.contains(&target) {
            return true;
        }
        while let Some(entry) = self.open.pop() {
            let node = entry.node;
            if !self.closed.insert(node) {
                continue; // stale heap entry
            }
            let g_node = match self.g.get(&node) {
                Some(g) => *g,
                None => continue,
            };
            for (pred, cost) in graph.backward_neighbors(node) {
                if !self.can_pass_blocked && graph.is_blocked(pred) {
                    continue;
                }
                if self.closed.contains(&pred) {
                    continue;
                }
                let cand = g_node + cost;
                let better = match self.g.get(&pred) {
                    Some(known) => cand < *known,
                    None => true,
                };
                if better {
                    self.g.insert(pred, cand);
                    self.parent.insert(pred, node);
                    self.open.push(OpenEntry {
                        f:    cand + graph.time_lower_bound(pred, self.anchor),
                        node: pred,
                    });
                }
            }
            if node == target {
                return true;
            }
        }
        false
    }

    /// Exact time from `node` to the destination, extending the search if
    /// needed.  `None` means the destination is unreachable from `node`.
    pub fn cost_to_destination(&mut self, graph: &Graph, node: NodeId) -> Option<f64> {
        if self.search(graph, node) {
            self.g.get(&node).copied()
        } else {
            None
        }
    }

    /// The finalized cost of `node` without extending the search.
    #[inline]
    pub fn finalized_cost(&self, node: NodeId) -> Option<f64> {
        if self.closed.contains(&node) {
            self.g.get(&node).copied()
        } else {
            None
        }
    }

    /// The shortest-path corridor from `from` to the destination, both
    /// endpoints included.  Only meaningful once `from` is finalized.
    pub fn path_to_destination(&self, from: NodeId) -> Vec<NodeId> {
        let mut nodes = vec![from];
        let mut cur = from;
        while cur != self.destination {
            match self.parent.get(&cur) {
                Some(next) => {
                    nodes.push(*next);
                    cur = *next;
                }
                None => break,
            }
        }
        nodes
    }
}
