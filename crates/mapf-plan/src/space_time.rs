//! Space-time A* — the forward search that produces committed plans.
//!
//! States are `(node, arrival time)` pairs.  From a state the agent may
//! drive to a neighbor or wait in place for one wait step; no action may
//! extend past the planning window.  Every action is checked against the
//! reservation table, with a transition occupying *both* endpoints for the
//! whole transit: node `a` stays claimed until the agent has fully arrived
//! at `b`, so a following agent can never enter `a` mid-transit.
//!
//! Termination candidates are ranked by `f = g + h` with `h` supplied by the
//! agent's [`ReverseAStar`] instance: the first state popped that either
//! reaches the destination or sits at the window edge with no legal action
//! left is the plan.  A state that runs out of actions mid-window is a dead
//! end, not a parking spot — its node is claimed by someone else, so the
//! search drops it.  When even waiting at the start is illegal the search
//! fails and the orchestrator falls back to a forced claim.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use mapf_core::{FOREVER, NodeId, Path};
use mapf_graph::Graph;
use mapf_reserve::{Interval, ReservationTable};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::rra::ReverseAStar;

// ── Query / result ────────────────────────────────────────────────────────────

/// Inputs describing one forward search.
#[derive(Copy, Clone, Debug)]
pub struct SearchQuery {
    pub start:       NodeId,
    pub destination: NodeId,
    /// When the agent stands ready at `start`.
    pub start_time:  f64,
    /// Horizon: no action may complete after this instant.
    pub window_end:  f64,
    /// Duration of one wait action.
    pub wait_step:   f64,
    pub can_pass_blocked: bool,
    /// Accept the destination only if the agent could then hold it forever.
    pub hold_destination: bool,
}

/// A successful search: the realized path, the intervals it would claim, and
/// when the plan completes.
///
/// The reservation list covers every visited node from `start_time` through
/// `arrival` and ends at `arrival`; holding the terminal node beyond that is
/// the caller's open-ended tail, not the search's.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchPlan {
    pub path:         Path,
    pub reservations: Vec<Interval>,
    pub arrival:      f64,
}

// ── Internal state ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct State {
    node:   NodeId,
    time:   f64,
    g:      f64,
    parent: Option<usize>,
}

struct OpenEntry {
    f:   f64,
    idx: usize,
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
    // Reversed for a min-heap; insertion order breaks ties deterministically.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

/// One forward search over `(node, time)` states.
///
/// Borrows the live (or speculative) reservation table read-only; committing
/// the returned reservations is the caller's decision.
pub struct SpaceTimeAStar<'a> {
    graph:  &'a Graph,
    table:  &'a ReservationTable,
    rra:    &'a mut ReverseAStar,
    query:  SearchQuery,
    bias:   Option<&'a FxHashMap<NodeId, f64>>,
    arena:  Vec<State>,
    open:   BinaryHeap<OpenEntry>,
    best_g: FxHashMap<(NodeId, u64), f64>,
    closed: FxHashSet<(NodeId, u64)>,
}

impl<'a> SpaceTimeAStar<'a> {
    pub fn new(
        graph: &'a Graph,
        table: &'a ReservationTable,
        rra: &'a mut ReverseAStar,
        query: SearchQuery,
    ) -> Self {
        Self {
            graph,
            table,
            rra,
            query,
            bias: None,
            arena: Vec::new(),
            open: BinaryHeap::new(),
            best_g: FxHashMap::default(),
            closed: FxHashSet::default(),
        }
    }

    /// Charge the given per-node surcharge when a move enters a node.
    pub fn set_bias(&mut self, bias: &'a FxHashMap<NodeId, f64>) {
        self.bias = Some(bias);
    }

    /// Run the search to completion.  `None` means not even waiting at the
    /// start node is legal.
    pub fn run(mut self) -> Option<SearchPlan> {
        let graph = self.graph;
        let table = self.table;

        // An unreachable destination leaves the heuristic at zero and move
        // generation suppressed below, so the plan degrades to waiting out
        // the window in place.
        let h0 = self.heuristic(self.query.start);
        self.push(self.query.start, self.query.start_time, 0.0, h0, None);

        while let Some(entry) = self.open.pop() {
            let State { node, time, g, .. } = self.arena[entry.idx];
            if !self.closed.insert((node, time.to_bits())) {
                continue; // stale heap entry
            }

            if node == self.query.destination
                && (!self.query.hold_destination || table.is_free(node, time, FOREVER))
            {
                return Some(self.finish(entry.idx));
            }

            let mut has_action = false;

            // Wait in place for one step.
            let t_wait = time + self.query.wait_step;
            if t_wait <= self.query.window_end && table.is_free(node, time, t_wait) {
                has_action = true;
                let h = self.heuristic(node);
                self.push(node, t_wait, g + self.query.wait_step, g + self.query.wait_step + h, Some(entry.idx));
            }

            // Drive to a neighbor.
            for (next, cost) in graph.neighbors(node) {
                if !self.query.can_pass_blocked && graph.is_blocked(next) {
                    continue;
                }
                let t_next = time + cost;
                if t_next > self.query.window_end {
                    continue;
                }
                if !table.is_free(node, time, t_next) || !table.is_free(next, time, t_next) {
                    continue;
                }
                // Never drive toward a node the destination is unreachable from.
                let Some(h) = self.rra.cost_to_destination(graph, next) else {
                    continue;
                };
                has_action = true;
                let mut g_next = g + cost;
                if let Some(bias) = self.bias {
                    if let Some(penalty) = bias.get(&next) {
                        g_next += *penalty;
                    }
                }
                self.push(next, t_next, g_next, g_next + h, Some(entry.idx));
            }

            // Out of actions at the window edge: park here until the horizon.
            if !has_action && t_wait > self.query.window_end {
                return Some(self.finish(entry.idx));
            }
        }
        None
    }

    fn heuristic(&mut self, node: NodeId) -> f64 {
        self.rra.cost_to_destination(self.graph, node).unwrap_or(0.0)
    }

    fn push(&mut self, node: NodeId, time: f64, g: f64, f: f64, parent: Option<usize>) {
        let key = (node, time.to_bits());
        if self.closed.contains(&key) {
            return;
        }
        if let Some(known) = self.best_g.get(&key) {
            if *known <= g {
                return;
            }
        }
        self.best_g.insert(key, g);
        let idx = self.arena.len();
        self.arena.push(State { node, time, g, parent });
        self.open.push(OpenEntry { f, idx });
    }

    /// Walk the parent chain and fold consecutive states at the same node
    /// into per-visit path actions and reservation intervals.
    fn finish(&self, terminal: usize) -> SearchPlan {
        let mut chain = Vec::new();
        let mut cur = Some(terminal);
        while let Some(idx) = cur {
            chain.push(idx);
            cur = self.arena[idx].parent;
        }
        chain.reverse();

        let arrival = self.arena[terminal].time;
        let mut plan = SearchPlan { path: Path::new(), reservations: Vec::new(), arrival };
        if chain.len() == 1 {
            // Never acted: nothing to drive and nothing to claim; the
            // caller's open-ended tail covers holding position.
            return plan;
        }

        let state = |i: usize| self.arena[chain[i]];
        let mut i = 0;
        while i < chain.len() {
            let node = state(i).node;
            let mut j = i;
            while j + 1 < chain.len() && state(j + 1).node == node {
                j += 1;
            }
            let is_last = j + 1 == chain.len();
            // A visit is occupied from the start of the transit in (the
            // previous state's time) until the transit out completes.
            let enter = if i == 0 { state(0).time } else { state(i - 1).time };
            let leave = if is_last { state(j).time } else { state(j + 1).time };
            let waited = state(j).time - state(i).time;
            plan.path.add_last(node, waited > 0.0 || is_last, waited);
            plan.reservations.push(Interval::new(node, enter, leave));
            i = j + 1;
        }
        plan
    }
}
