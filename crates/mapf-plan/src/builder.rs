//! Construction and validation of [`WhcaPlanner`].

use mapf_core::{AgentId, NodeId, Stopwatch};
use mapf_graph::Graph;
use mapf_reserve::{Interval, ReservationTable};
use rustc_hash::FxHashMap;

use crate::config::PlannerConfig;
use crate::deadlock::DeadlockHandler;
use crate::error::{PlanError, PlanResult};
use crate::whca::WhcaPlanner;

/// Builder for [`WhcaPlanner`].
///
/// Every agent present at startup is registered with its starting node; the
/// built planner holds an open-ended claim there for each, so the very first
/// cycle already sees a consistent table.
///
/// ```
/// use mapf_core::AgentId;
/// use mapf_graph::GraphBuilder;
/// use mapf_plan::{PlannerConfig, WhcaPlannerBuilder};
///
/// let mut g = GraphBuilder::new();
/// let a = g.add_node(0.0, 0.0);
/// let b = g.add_node(1.0, 0.0);
/// g.add_lane(a, b, 1.0);
///
/// let planner = WhcaPlannerBuilder::new(g.build().unwrap(), PlannerConfig::default())
///     .agent(AgentId(0), a)
///     .agent(AgentId(1), b)
///     .build()
///     .unwrap();
/// assert_eq!(planner.find_end_reservation(b), Some(0.0));
/// ```
pub struct WhcaPlannerBuilder {
    graph:  Graph,
    config: PlannerConfig,
    starts: Vec<(AgentId, NodeId)>,
}

impl WhcaPlannerBuilder {
    pub fn new(graph: Graph, config: PlannerConfig) -> Self {
        Self { graph, config, starts: Vec::new() }
    }

    /// Register an agent standing at `node` when planning begins.
    pub fn agent(mut self, id: AgentId, node: NodeId) -> Self {
        self.starts.push((id, node));
        self
    }

    /// Register a batch of starting positions.
    pub fn agents<I>(mut self, starts: I) -> Self
    where
        I: IntoIterator<Item = (AgentId, NodeId)>,
    {
        self.starts.extend(starts);
        self
    }

    /// Validate the configuration and seed the reservation table.
    ///
    /// Fails on an out-of-range parameter, a duplicated agent id, or two
    /// agents claiming the same starting node.
    pub fn build(self) -> PlanResult<WhcaPlanner> {
        self.config.validate()?;

        let mut table = ReservationTable::new(self.graph.node_count());
        let mut committed: FxHashMap<AgentId, Vec<Interval>> = FxHashMap::default();
        for (id, node) in &self.starts {
            if committed.contains_key(id) {
                return Err(PlanError::DuplicateAgent(*id));
            }
            let claim = Interval::to_forever(*node, 0.0);
            table.add(claim, *id)?;
            committed.insert(*id, vec![claim]);
        }

        let deadlock = if self.config.use_deadlock_handler {
            Some(DeadlockHandler::new(
                self.config.max_wait_time,
                self.config.wait_step,
                self.config.seed,
            ))
        } else {
            None
        };

        Ok(WhcaPlanner {
            graph: self.graph,
            config: self.config,
            table,
            committed,
            rra: FxHashMap::default(),
            priorities: FxHashMap::default(),
            deadlock,
            stopwatch: Stopwatch::start(),
        })
    }
}
