//! Stall detection and randomized recovery.
//!
//! Windowed planning with priorities can leave a ring of agents each waiting
//! for the next to move.  The handler watches per-agent progress (a change of
//! current node) and, once an agent has sat still past the configured
//! threshold, shoves it to a random free neighbor.  The hop only rewrites the
//! agent's path; reservations follow at the next planning cycle.

use mapf_core::{Agent, AgentId, NodeId, Path, PlannerRng};
use mapf_graph::Graph;
use mapf_reserve::ReservationTable;
use rustc_hash::FxHashMap;

/// Stream tag for deriving the handler's RNG from the planner seed.
const HOP_STREAM: u64 = 0xD1;

#[derive(Copy, Clone, Debug)]
struct ProgressRecord {
    node:  NodeId,
    since: f64,
}

/// Detects stalled agents and breaks symmetry with random hops.
pub struct DeadlockHandler {
    max_wait_time: f64,
    wait_step:     f64,
    rng:           PlannerRng,
    progress:      FxHashMap<AgentId, ProgressRecord>,
}

impl DeadlockHandler {
    pub fn new(max_wait_time: f64, wait_step: f64, seed: u64) -> Self {
        Self {
            max_wait_time,
            wait_step,
            rng: PlannerRng::derived(seed, HOP_STREAM),
            progress: FxHashMap::default(),
        }
    }

    /// Refresh progress tracking; call once per planning cycle.
    pub fn update(&mut self, agents: &[Agent], now: f64) {
        for agent in agents {
            let record = self
                .progress
                .entry(agent.id)
                .or_insert(ProgressRecord { node: agent.next_node, since: now });
            if record.node != agent.next_node {
                record.node = agent.next_node;
                record.since = now;
            }
        }
        // Drop records of agents that left the fleet.
        let present: rustc_hash::FxHashSet<AgentId> = agents.iter().map(|a| a.id).collect();
        self.progress.retain(|id, _| present.contains(id));
    }

    /// Whether `agent` has gone without progress longer than the threshold.
    /// An agent resting at its destination is parked, not deadlocked.
    pub fn is_in_deadlock(&self, agent: &Agent, now: f64) -> bool {
        if agent.at_destination() {
            return false;
        }
        match self.progress.get(&agent.id) {
            Some(record) => now - record.since > self.max_wait_time,
            None => false,
        }
    }

    /// Replace the agent's path with a single move to a random adjacent node
    /// that is unreserved for the next wait step.  Returns whether a hop was
    /// possible; with every neighbor claimed the path is left untouched.
    pub fn random_hop(
        &mut self,
        graph: &Graph,
        table: &ReservationTable,
        agent: &mut Agent,
        now: f64,
    ) -> bool {
        let candidates: Vec<NodeId> = graph
            .neighbors(agent.next_node)
            .map(|(n, _)| n)
            .filter(|n| agent.can_pass_blocked || !graph.is_blocked(*n))
            .filter(|n| table.is_free(*n, now, now + self.wait_step))
            .collect();
        match self.rng.choose(&candidates) {
            Some(hop) => {
                let mut path = Path::new();
                path.add_first(*hop, true, 0.0);
                agent.path = path;
                true
            }
            None => false,
        }
    }
}
