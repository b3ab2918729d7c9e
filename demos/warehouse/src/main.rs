//! warehouse — end-to-end demo for the mapf planning stack.
//!
//! Five robots shuttle totes across a 13×8 aisle-and-rack floor: fetch at a
//! rack face, drop on a north-wall conveyor, return to a south-wall depot.
//! The same seeded workload runs under three task-assignment strategies and
//! a comparison table closes the run.  Scale comment: bump ROBOT_COUNT /
//! TASK_COUNT and swap in a real floor graph to size up.

mod layout;

use std::collections::VecDeque;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use mapf_core::{Agent, AgentId, NodeId, PlannerRng};
use mapf_graph::Graph;
use mapf_plan::{PlannerConfig, WhcaPlanner, WhcaPlannerBuilder};
use mapf_reserve::Interval;
use mapf_trace::{CsvTraceWriter, TraceObserver};

use layout::{Warehouse, build_warehouse};

// ── Constants ─────────────────────────────────────────────────────────────────

const ROBOT_COUNT: usize = 5;
const TASK_COUNT:  usize = 12;
const SEED:        u64   = 42;
const CYCLE_SECS:  f64   = 2.0; // host re-planning period
const MAX_CYCLES:  usize = 400;

// ── Tasks and missions ────────────────────────────────────────────────────────

/// One tote: fetch from a rack face, drop on a conveyor head.
#[derive(Copy, Clone, Debug)]
struct Task {
    pick:     NodeId,
    conveyor: NodeId,
}

/// What a robot is currently doing.  The leg's goal node lives in the
/// agent's `destination` field; `Fetch` keeps its task for the hand-over.
#[derive(Copy, Clone, Debug)]
enum Mission {
    Idle,
    Fetch(Task),
    Deliver,
    Return,
}

/// The seeded workload.  Rebuilt identically for every strategy run.
fn make_tasks(picks: &[NodeId], conveyors: &[NodeId]) -> VecDeque<Task> {
    let mut rng = PlannerRng::derived(SEED, 1);
    (0..TASK_COUNT)
        .map(|i| Task {
            pick:     picks[rng.gen_range(0..picks.len())],
            conveyor: conveyors[i % conveyors.len()],
        })
        .collect()
}

// ── Assignment strategies ─────────────────────────────────────────────────────

/// How open tasks are matched to idle robots.  Each variant carries its own
/// parameters; all dispatch goes through [`AssignStrategy::pick_robot`].
enum AssignStrategy {
    /// Rotate through idle robots regardless of position.
    RoundRobin { cursor: usize },
    /// Idle robot with the shortest straight-line distance to the pick face.
    NearestIdle,
    /// Probe every idle robot with a speculative search against a table
    /// snapshot and take the earliest estimated arrival.
    EarliestArrival,
}

impl AssignStrategy {
    fn label(&self) -> &'static str {
        match self {
            AssignStrategy::RoundRobin { .. } => "round-robin",
            AssignStrategy::NearestIdle => "nearest-idle",
            AssignStrategy::EarliestArrival => "earliest-arrival",
        }
    }

    /// Choose a robot from `idle` (indices into `agents`) for `task`.
    fn pick_robot(
        &mut self,
        planner: &mut WhcaPlanner,
        now:     f64,
        agents:  &[Agent],
        idle:    &[usize],
        task:    &Task,
    ) -> Result<Option<usize>> {
        match self {
            AssignStrategy::RoundRobin { cursor } => {
                let i = idle[*cursor % idle.len()];
                *cursor += 1;
                Ok(Some(i))
            }
            AssignStrategy::NearestIdle => Ok(nearest(planner.graph(), agents, idle, task.pick)),
            AssignStrategy::EarliestArrival => {
                let mut session = planner.schedule_init();
                let mut best: Option<(f64, usize)> = None;
                for &i in idle {
                    let mut probe = agents[i].clone();
                    probe.destination = task.pick;
                    let mut extra: Vec<Interval> = Vec::new();
                    if let Some(arrival) =
                        planner.schedule_path(&mut session, now, &mut probe, &mut extra)?
                    {
                        if best.map_or(true, |(t, _)| arrival < t) {
                            best = Some((arrival, i));
                        }
                    }
                }
                // Nobody reaches the pick inside the window: fall back to
                // straight-line distance.
                Ok(best
                    .map(|(_, i)| i)
                    .or_else(|| nearest(planner.graph(), agents, idle, task.pick)))
            }
        }
    }
}

fn nearest(graph: &Graph, agents: &[Agent], idle: &[usize], target: NodeId) -> Option<usize> {
    idle.iter().copied().min_by(|&a, &b| {
        graph
            .distance(agents[a].next_node, target)
            .total_cmp(&graph.distance(agents[b].next_node, target))
    })
}

// ── Movement ──────────────────────────────────────────────────────────────────

/// Walk a robot along its committed plan until sim time `until`.
///
/// Unit robot speed: driving an edge takes its length in seconds.  The
/// leading action covers the node the robot already occupies; later actions
/// are hops.  A hop is taken only when it completes inside the cycle,
/// leaving `next_node` at its target and `arrival_time` at its completion,
/// which is where the next cycle's search resumes.
fn advance(agent: &mut Agent, graph: &Graph, now: f64, until: f64) {
    let mut t = now.max(agent.arrival_time);
    while let Some(step) = agent.path.next_action().copied() {
        let drive = if step.node == agent.next_node {
            0.0
        } else {
            graph.distance(agent.next_node, step.node)
        };
        if t + drive > until {
            break;
        }
        t += drive;
        agent.next_node = step.node;
        agent.arrival_time = t;
        if t + step.wait_time > until {
            break;
        }
        t += step.wait_time;
        agent.path.pop_first();
    }
}

// ── Scenario runner ───────────────────────────────────────────────────────────

struct RunStats {
    label:         &'static str,
    delivered:     usize,
    cycles:        usize,
    forced_claims: usize,
    deadlock_hops: usize,
    planning_secs: f64,
}

fn run_scenario(mut strategy: AssignStrategy) -> Result<RunStats> {
    let label = strategy.label();
    let Warehouse { graph, picks, depots, conveyors } = build_warehouse()?;

    // 1. Fleet: one robot parked per depot.
    let mut agents: Vec<Agent> = (0..ROBOT_COUNT)
        .map(|i| Agent::new(AgentId(i as u32), depots[i], depots[i]))
        .collect();

    // 2. Planner tuned to the host's re-planning period.
    let config = PlannerConfig {
        seed: SEED,
        use_bias: true,
        ..PlannerConfig::auto_tuned(CYCLE_SECS, ROBOT_COUNT)
    };
    let mut planner = WhcaPlannerBuilder::new(graph, config)
        .agents(agents.iter().map(|a| (a.id, a.next_node)))
        .build()?;

    // 3. Trace output.
    let trace_dir = format!("output/warehouse/{label}");
    std::fs::create_dir_all(&trace_dir)?;
    let mut observer = TraceObserver::new(CsvTraceWriter::new(Path::new(&trace_dir))?);

    let mut queue = make_tasks(&picks, &conveyors);
    let mut missions = vec![Mission::Idle; ROBOT_COUNT];
    let mut stats = RunStats {
        label,
        delivered: 0,
        cycles: 0,
        forced_claims: 0,
        deadlock_hops: 0,
        planning_secs: 0.0,
    };

    // 4. Cycle loop: assign, plan, drive, transition.
    for cycle in 0..MAX_CYCLES {
        let now = cycle as f64 * CYCLE_SECS;

        let mut idle: Vec<usize> = (0..ROBOT_COUNT)
            .filter(|&i| matches!(missions[i], Mission::Idle))
            .collect();
        while !idle.is_empty() {
            let Some(task) = queue.front().copied() else { break };
            let Some(i) = strategy.pick_robot(&mut planner, now, &agents, &idle, &task)? else {
                break;
            };
            queue.pop_front();
            idle.retain(|&j| j != i);
            missions[i] = Mission::Fetch(task);
            agents[i].destination = task.pick;
        }

        for (agent, mission) in agents.iter_mut().zip(&missions) {
            agent.request_reoptimization = !matches!(*mission, Mission::Idle);
        }
        let report = planner.find_paths(now, &mut agents, &mut observer)?;
        agents.sort_by_key(|a| a.id.0); // find_paths orders by planning priority
        stats.planning_secs += report.elapsed;
        stats.forced_claims += report.forced_claims;
        stats.deadlock_hops += report.deadlock_hops;

        for agent in agents.iter_mut() {
            advance(agent, planner.graph(), now, now + CYCLE_SECS);
        }

        for i in 0..ROBOT_COUNT {
            if !agents[i].at_destination() {
                continue;
            }
            match missions[i] {
                Mission::Fetch(task) => {
                    missions[i] = Mission::Deliver;
                    agents[i].destination = task.conveyor;
                    // Loaded robots outrank empty ones at the table.
                    planner.update_agent_priority(agents[i].id, 1);
                }
                Mission::Deliver => {
                    stats.delivered += 1;
                    missions[i] = Mission::Return;
                    agents[i].destination = depots[i];
                    planner.update_agent_priority(agents[i].id, 0);
                }
                Mission::Return => missions[i] = Mission::Idle,
                Mission::Idle => {}
            }
        }

        stats.cycles = cycle + 1;
        if queue.is_empty() && missions.iter().all(|m| matches!(m, Mission::Idle)) {
            break;
        }
    }

    let (_, err) = observer.into_writer();
    if let Some(e) = err {
        eprintln!("trace error ({label}): {e}");
    }
    Ok(stats)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== warehouse — multi-agent path-finding demo ===");
    println!("Robots: {ROBOT_COUNT}  |  Totes: {TASK_COUNT}  |  Seed: {SEED}");
    println!();

    let floor = build_warehouse()?;
    println!(
        "Floor: {} waypoints, {} lane segments, {} pick faces, {} conveyors",
        floor.graph.node_count(),
        floor.graph.edge_count(),
        floor.picks.len(),
        floor.conveyors.len(),
    );
    println!();

    let strategies = [
        AssignStrategy::RoundRobin { cursor: 0 },
        AssignStrategy::NearestIdle,
        AssignStrategy::EarliestArrival,
    ];

    let t0 = Instant::now();
    let mut results = Vec::new();
    for strategy in strategies {
        let stats = run_scenario(strategy)?;
        println!(
            "{:<18} {} totes in {} cycles ({:.0} s simulated)",
            stats.label,
            stats.delivered,
            stats.cycles,
            stats.cycles as f64 * CYCLE_SECS,
        );
        results.push(stats);
    }
    println!();

    println!(
        "{:<18} {:>6} {:>7} {:>8} {:>6} {:>9}",
        "Strategy", "Totes", "Cycles", "Forced", "Hops", "Plan ms"
    );
    println!("{}", "-".repeat(58));
    for s in &results {
        println!(
            "{:<18} {:>6} {:>7} {:>8} {:>6} {:>9.2}",
            s.label,
            s.delivered,
            s.cycles,
            s.forced_claims,
            s.deadlock_hops,
            s.planning_secs * 1_000.0,
        );
    }
    println!();
    println!(
        "Wall time {:.3} s  |  traces under output/warehouse/",
        t0.elapsed().as_secs_f64()
    );

    Ok(())
}
