//! The WHCA* orchestrator: priority-ordered cooperative replanning.
//!
//! [`WhcaPlanner::find_paths`] drives one planning cycle:
//!
//! 1. **Reorganize** — trim the live table to the cycle time and drop claims
//!    of agents that left the fleet; seed claims for agents that joined.
//! 2. **Prioritize** — order agents by explicit priority (descending), then
//!    obstacle-capability (capable agents last, they have the most options),
//!    then straight-line distance to destination (nearest first).
//! 3. **Bias pre-pass** (optional) — accumulate a soft surcharge on every
//!    node along each agent's intended corridor, so later searches prefer
//!    routing around traffic instead of through it.
//! 4. **Replan** — per agent: drop its stale claims, refresh its backward
//!    search, run space-time A* within the window, and commit the result
//!    plus an open-ended tail at the terminal node.  A failed search forces
//!    an exclusive claim of the agent's own node with a single wait action.
//!    Wall-clock budgets are checked between agents; exhaustion aborts the
//!    cycle and leaves the remaining agents on their previous plans.
//!
//! Single-writer discipline: one planner owns the live table, and cycles,
//! [`find_path`](WhcaPlanner::find_path) queries, and speculative sessions
//! must be serialized by the caller.  Sessions own independent snapshots, so
//! only the live commit path actually mutates shared state.

use mapf_core::{Agent, AgentId, FOREVER, NodeId, Path, Stopwatch};
use mapf_graph::Graph;
use mapf_reserve::{Interval, ReservationTable, ReserveError};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::PlannerConfig;
use crate::deadlock::DeadlockHandler;
use crate::error::PlanResult;
use crate::observer::{AgentOutcome, PlanningObserver};
use crate::rra::ReverseAStar;
use crate::session::ScheduleSession;
use crate::space_time::{SearchPlan, SearchQuery, SpaceTimeAStar};

/// Corridor surcharge per node: one wait step plus a hair, so cutting through
/// a marked corridor costs slightly more than waiting it out once.
const BIAS_FACTOR: f64 = 1.0001;

/// What one call to [`WhcaPlanner::find_paths`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CycleReport {
    /// Cycle timestamp.
    pub time:          f64,
    /// Agents that received a fresh committed plan.
    pub planned:       usize,
    /// Agents whose contested node was claimed by force.
    pub forced_claims: usize,
    /// Committed agents whose path was replaced by a deadlock hop.
    pub deadlock_hops: usize,
    /// Agents left untouched (not requesting, pinned, or at destination).
    pub skipped:       usize,
    /// Whether the wall-clock budget aborted the cycle early.
    pub timed_out:     bool,
    /// Wall-clock seconds the cycle took.
    pub elapsed:       f64,
}

fn is_candidate(agent: &Agent) -> bool {
    agent.request_reoptimization && !agent.fixed_position && !agent.at_destination()
}

// ── Planner ───────────────────────────────────────────────────────────────────

/// The windowed cooperative planner.  Owns the graph, the live reservation
/// table, and all per-agent search state.
pub struct WhcaPlanner {
    pub(crate) graph:      Graph,
    pub(crate) config:     PlannerConfig,
    pub(crate) table:      ReservationTable,
    pub(crate) committed:  FxHashMap<AgentId, Vec<Interval>>,
    pub(crate) rra:        FxHashMap<AgentId, ReverseAStar>,
    pub(crate) priorities: FxHashMap<AgentId, i32>,
    pub(crate) deadlock:   Option<DeadlockHandler>,
    pub(crate) stopwatch:  Stopwatch,
}

impl WhcaPlanner {
    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The live reservation table.
    #[inline]
    pub fn table(&self) -> &ReservationTable {
        &self.table
    }

    /// The committed reservation list of one agent: its path's claims plus
    /// the open-ended tail at its resting node.
    pub fn committed_intervals(&self, agent: AgentId) -> Option<&[Interval]> {
        self.committed.get(&agent).map(Vec::as_slice)
    }

    /// Set the priority used to order `agent` within a cycle.  Agents without
    /// an entry rank lowest (priority 0).
    pub fn update_agent_priority(&mut self, agent: AgentId, priority: i32) {
        self.priorities.insert(agent, priority);
    }

    // ── The planning cycle ────────────────────────────────────────────────

    /// Run one planning cycle at time `now` over the live agent set.
    ///
    /// Reorders `agents` by planning priority and writes each planned
    /// agent's `path`.  Returns the cycle summary; a wall-clock timeout is
    /// reported there, not as an error.
    pub fn find_paths<O: PlanningObserver>(
        &mut self,
        now: f64,
        agents: &mut [Agent],
        observer: &mut O,
    ) -> PlanResult<CycleReport> {
        self.stopwatch.restart();
        observer.on_cycle_start(now, agents.len());
        let mut report = CycleReport { time: now, ..CycleReport::default() };

        self.table.reorganize(now);
        self.purge_missing(agents);
        self.seed_newcomers(agents, now)?;

        // Priority order decides who gets first choice of space-time slots.
        let priorities = &self.priorities;
        let graph = &self.graph;
        agents.sort_by(|a, b| {
            let pa = priorities.get(&a.id).copied().unwrap_or(0);
            let pb = priorities.get(&b.id).copied().unwrap_or(0);
            pb.cmp(&pa)
                .then_with(|| a.can_pass_blocked.cmp(&b.can_pass_blocked))
                .then_with(|| {
                    graph
                        .distance(a.next_node, a.destination)
                        .total_cmp(&graph.distance(b.next_node, b.destination))
                })
        });

        if let Some(handler) = &mut self.deadlock {
            handler.update(agents, now);
        }

        let surcharge = self.config.wait_step * BIAS_FACTOR;
        let mut bias: FxHashMap<NodeId, f64> = FxHashMap::default();
        if self.config.use_bias {
            for agent in agents.iter() {
                if !is_candidate(agent) {
                    continue;
                }
                self.ensure_rra(agent, now);
                if let Some(corridor) = self.corridor_nodes(agent) {
                    for node in corridor {
                        *bias.entry(node).or_insert(0.0) += surcharge;
                    }
                }
            }
        }

        let candidates = agents.iter().filter(|a| is_candidate(a)).count();
        let shared_budget =
            self.config.runtime_limit_per_agent * agents.len() as f64 * self.config.budget_margin;
        let mut attempted = 0usize;

        for agent in agents.iter_mut() {
            if !is_candidate(agent) {
                report.skipped += 1;
                continue;
            }

            let elapsed = self.stopwatch.elapsed_secs();
            if elapsed > shared_budget || elapsed > self.config.runtime_limit_overall {
                observer.on_timeout(now, elapsed, candidates - attempted);
                report.timed_out = true;
                break;
            }
            attempted += 1;

            // The agent's previous claims come out; the cycle's reorganize
            // may have trimmed them, so removal is by overlap, not identity.
            if let Some(stale) = self.committed.remove(&agent.id) {
                self.table.careful_remove_all(&stale, agent.id);
            }

            self.ensure_rra(agent, now);

            let own_corridor = if self.config.use_bias {
                let corridor = self.corridor_nodes(agent);
                if let Some(nodes) = &corridor {
                    // Leave everyone else's surcharge, not our own.
                    for node in nodes {
                        if let Some(penalty) = bias.get_mut(node) {
                            *penalty -= surcharge;
                        }
                    }
                }
                corridor
            } else {
                None
            };

            let query = SearchQuery {
                start:            agent.next_node,
                destination:      agent.destination,
                start_time:       now.max(agent.arrival_time),
                window_end:       now + self.config.window_length,
                wait_step:        self.config.wait_step,
                can_pass_blocked: agent.can_pass_blocked,
                hold_destination: true,
            };
            let plan = {
                let rra = self
                    .rra
                    .entry(agent.id)
                    .or_insert_with(|| ReverseAStar::new(&self.graph, agent));
                let mut astar = SpaceTimeAStar::new(&self.graph, &self.table, rra, query);
                if self.config.use_bias {
                    astar.set_bias(&bias);
                }
                astar.run()
            };

            if let Some(nodes) = &own_corridor {
                for node in nodes {
                    *bias.entry(*node).or_insert(0.0) += surcharge;
                }
            }

            match plan {
                None => {
                    self.force_claim(agent, now)?;
                    report.forced_claims += 1;
                    observer.on_agent_planned(now, agent.id, &AgentOutcome::ForcedClaim);
                }
                Some(plan) => {
                    let arrival = plan.arrival;
                    self.commit(agent, plan, now)?;
                    report.planned += 1;

                    let mut outcome =
                        AgentOutcome::Committed { path_len: agent.path.len(), arrival };
                    if let Some(handler) = &mut self.deadlock {
                        if handler.is_in_deadlock(agent, now)
                            && handler.random_hop(&self.graph, &self.table, agent, now)
                        {
                            report.deadlock_hops += 1;
                            outcome = AgentOutcome::DeadlockHop;
                        }
                    }
                    observer.on_agent_planned(now, agent.id, &outcome);
                }
            }
        }

        report.elapsed = self.stopwatch.elapsed_secs();
        observer.on_cycle_end(now, &report);
        Ok(report)
    }

    // ── Single-path query ─────────────────────────────────────────────────

    /// Answer "what is this agent's path and arrival time right now" against
    /// the live table, without committing anything.
    ///
    /// The claim pinning the agent at its current node is lifted for the
    /// search and restored afterward; on success the agent's `path` is
    /// written and the plan's completion time returned.
    pub fn find_path(&mut self, now: f64, agent: &mut Agent) -> PlanResult<Option<f64>> {
        let window_end = now + self.config.window_length;
        let parked = self.table.get(agent.next_node, now, window_end);
        if let Some((held, _)) = parked {
            self.table.remove(held);
        }

        self.ensure_rra(agent, now);
        let query = SearchQuery {
            start:            agent.next_node,
            destination:      agent.destination,
            start_time:       now.max(agent.arrival_time),
            window_end,
            wait_step:        self.config.wait_step,
            can_pass_blocked: agent.can_pass_blocked,
            hold_destination: true,
        };
        let plan = {
            let rra = self
                .rra
                .entry(agent.id)
                .or_insert_with(|| ReverseAStar::new(&self.graph, agent));
            SpaceTimeAStar::new(&self.graph, &self.table, rra, query).run()
        };

        if let Some((held, owner)) = parked {
            self.table.add(held, owner)?;
        }

        match plan {
            Some(plan) => {
                let arrival = plan.arrival;
                agent.path = plan.path;
                Ok(Some(arrival))
            }
            None => Ok(None),
        }
    }

    /// The start of the open-ended claim on `node`, if the node is the
    /// resting place of some committed path.
    pub fn find_end_reservation(&self, node: NodeId) -> Option<f64> {
        let (interval, _) = self.table.get_last(node)?;
        interval.is_open_ended().then_some(interval.start)
    }

    // ── Speculative scheduling ────────────────────────────────────────────

    /// Open a scheduling session over a snapshot of the live table.
    pub fn schedule_init(&self) -> ScheduleSession {
        ScheduleSession::new(self.table.clone())
    }

    /// Search for `agent`'s path within `session`, treating `extra` as a
    /// candidate prefix of claims the caller is considering.
    ///
    /// On success the found reservations are appended to `extra` and the
    /// completion time returned; the session's booked state is restored
    /// either way (booking is [`ScheduleSession::overwrite_path`]).  Returns
    /// `Ok(None)` when no claimable plan exists in the window.  A reservation
    /// conflict while staging `extra` is reported as an error and leaves the
    /// session half-staged, mirroring the invariant violation it signals.
    pub fn schedule_path(
        &mut self,
        session: &mut ScheduleSession,
        start_time: f64,
        agent: &mut Agent,
        extra: &mut Vec<Interval>,
    ) -> PlanResult<Option<f64>> {
        let window_end = start_time + self.config.window_length;

        // First touch: import the agent's committed plan into the session and
        // lift the claim pinning it at its current node.  The search re-claims
        // the node, so nothing is added back.
        if !session.paths.contains_key(&agent.id) {
            let committed = self.committed.get(&agent.id).cloned().unwrap_or_default();
            session.paths.insert(agent.id, committed);
            if let Some((held, _)) = session.table.get(agent.next_node, start_time, window_end) {
                session.table.remove(held);
            }
        }

        self.ensure_rra(agent, start_time);

        // Stage: the agent's own booking comes out, the candidate prefix in.
        let own = session.paths.remove(&agent.id).unwrap_or_default();
        session.table.careful_remove_all(&own, agent.id);
        session.table.add_all(extra, agent.id)?;

        let query = SearchQuery {
            start:            agent.next_node,
            destination:      agent.destination,
            start_time:       start_time.max(agent.arrival_time),
            window_end,
            wait_step:        self.config.wait_step,
            can_pass_blocked: agent.can_pass_blocked,
            hold_destination: true,
        };
        let plan = {
            let rra = self
                .rra
                .entry(agent.id)
                .or_insert_with(|| ReverseAStar::new(&self.graph, agent));
            SpaceTimeAStar::new(&self.graph, &session.table, rra, query).run()
        };

        // Unstage.
        session.table.careful_remove_all(extra, agent.id);
        session.table.add_all(&own, agent.id)?;
        session.paths.insert(agent.id, own);

        match plan {
            Some(plan) if !plan.reservations.is_empty() => {
                let arrival = plan.arrival;
                agent.path = plan.path;
                extra.extend(plan.reservations);
                Ok(Some(arrival))
            }
            _ => Ok(None),
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Remove all trace of agents no longer in the fleet.
    fn purge_missing(&mut self, agents: &[Agent]) {
        let present: FxHashSet<AgentId> = agents.iter().map(|a| a.id).collect();
        let missing: Vec<AgentId> = self
            .committed
            .keys()
            .filter(|id| !present.contains(*id))
            .copied()
            .collect();
        for id in missing {
            if let Some(stale) = self.committed.remove(&id) {
                self.table.careful_remove_all(&stale, id);
            }
            self.rra.remove(&id);
        }
    }

    /// Give agents seen for the first time a parked claim at their node.
    /// A newcomer on contested ground starts with no claims; its first
    /// replan resolves the conflict.
    fn seed_newcomers(&mut self, agents: &[Agent], now: f64) -> PlanResult<()> {
        for agent in agents {
            if self.committed.contains_key(&agent.id) {
                continue;
            }
            let mut seed = Vec::new();
            if self.table.is_free(agent.next_node, now, FOREVER) {
                let claim = Interval::to_forever(agent.next_node, now);
                self.table.add(claim, agent.id)?;
                seed.push(claim);
            }
            self.committed.insert(agent.id, seed);
        }
        Ok(())
    }

    /// Rebuild the agent's backward search if it is missing, rooted at a
    /// stale destination, or poisoned by a deadlock.
    fn ensure_rra(&mut self, agent: &Agent, now: f64) {
        let deadlocked = self
            .deadlock
            .as_ref()
            .is_some_and(|h| h.is_in_deadlock(agent, now));
        let valid = !deadlocked
            && self
                .rra
                .get(&agent.id)
                .is_some_and(|r| r.destination() == agent.destination);
        if !valid {
            self.rra.insert(agent.id, ReverseAStar::new(&self.graph, agent));
        }
    }

    /// The agent's intended corridor: its shortest-path node list from the
    /// current node to its destination, if reachable.
    fn corridor_nodes(&mut self, agent: &Agent) -> Option<Vec<NodeId>> {
        let rra = self.rra.get_mut(&agent.id)?;
        if rra.search(&self.graph, agent.next_node) {
            Some(rra.path_to_destination(agent.next_node))
        } else {
            None
        }
    }

    /// Degenerate fallback: the agent's own node is contested, so every
    /// claim there is cleared, the node claimed exclusively forever, and a
    /// single wait step issued.  Other agents whose lists referenced the
    /// node lose those entries and re-plan around it next cycle.
    fn force_claim(&mut self, agent: &mut Agent, now: f64) -> PlanResult<()> {
        self.table.clear(agent.next_node);
        let claim = Interval::to_forever(agent.next_node, now);
        self.table.add(claim, agent.id)?;
        for (other, list) in self.committed.iter_mut() {
            if *other != agent.id {
                list.retain(|iv| iv.node != agent.next_node);
            }
        }
        self.committed.insert(agent.id, vec![claim]);

        let mut path = Path::new();
        path.add_first(agent.next_node, true, self.config.wait_step);
        agent.path = path;
        Ok(())
    }

    /// Commit a successful plan: write the path, claim its reservations, and
    /// append the open-ended tail at the resting node.
    fn commit(&mut self, agent: &mut Agent, plan: SearchPlan, now: f64) -> PlanResult<()> {
        let SearchPlan { path, reservations: mut own, .. } = plan;
        agent.path = path;
        self.table.add_all(&own, agent.id)?;

        let (tail_node, tail_start) = match own.last() {
            Some(last) => (last.node, last.end),
            None => (agent.next_node, now),
        };
        let tail = Interval::to_forever(tail_node, tail_start);
        own.push(tail);
        // The tail can lose a race for a node another agent is still
        // vacating; the next cycle re-plans around the hole.
        match self.table.add(tail, agent.id) {
            Ok(()) | Err(ReserveError::Conflict { .. }) => {}
            Err(e) => return Err(e.into()),
        }
        self.committed.insert(agent.id, own);

        // An empty path means the window closed before the agent could act;
        // a fresh backward search next cycle re-anchors near its position.
        if agent.path.is_empty() {
            self.rra.remove(&agent.id);
        }
        Ok(())
    }
}
