//! Planner configuration.

use crate::error::{PlanError, PlanResult};

/// Tunables for the WHCA* planning cycle.
///
/// All durations are in seconds of simulation time except the two runtime
/// limits and the budget margin, which bound *wall-clock* time spent planning.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerConfig {
    /// Planning horizon: no committed action may extend past
    /// `cycle time + window_length`.
    pub window_length: f64,

    /// Duration of one explicit wait action.
    pub wait_step: f64,

    /// Wall-clock budget per agent.  The cycle aborts once elapsed time
    /// exceeds `runtime_limit_per_agent × agent count × budget_margin`.
    pub runtime_limit_per_agent: f64,

    /// Hard wall-clock budget for the whole cycle.
    pub runtime_limit_overall: f64,

    /// Early-warning fraction of the per-agent budget, in `(0, 1]`.
    pub budget_margin: f64,

    /// Soft-penalize routing through corridors other agents intend to use.
    pub use_bias: bool,

    /// Detect stalled agents and break cyclic waits with random hops.
    pub use_deadlock_handler: bool,

    /// Seconds without progress before an agent counts as deadlocked.
    pub max_wait_time: f64,

    /// Seed for all planner randomness (deadlock hops).
    pub seed: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            window_length:           15.0,
            wait_step:               2.0,
            runtime_limit_per_agent: 0.1,
            runtime_limit_overall:   1.0,
            budget_margin:           0.9,
            use_bias:                false,
            use_deadlock_handler:    true,
            max_wait_time:           30.0,
            seed:                    0,
        }
    }
}

impl PlannerConfig {
    /// The preset for hosts that re-plan every `clocking` seconds: both
    /// runtime limits derive from the re-planning period so a cycle always
    /// finishes before the next one is due.
    pub fn auto_tuned(clocking: f64, agent_count: usize) -> Self {
        Self {
            window_length:           15.0,
            use_bias:                false,
            runtime_limit_per_agent: clocking / agent_count.max(1) as f64,
            runtime_limit_overall:   clocking,
            ..Self::default()
        }
    }

    /// Validate every field.  Called by the planner builder; exposed so hosts
    /// can check externally loaded configurations early.
    pub fn validate(&self) -> PlanResult<()> {
        fn positive(name: &'static str, value: f64) -> PlanResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PlanError::InvalidParameter { name, value })
            }
        }

        positive("window_length", self.window_length)?;
        positive("wait_step", self.wait_step)?;
        positive("runtime_limit_per_agent", self.runtime_limit_per_agent)?;
        positive("runtime_limit_overall", self.runtime_limit_overall)?;
        positive("max_wait_time", self.max_wait_time)?;

        // A wait step longer than the window would leave agents with no legal
        // fallback action.
        if self.wait_step > self.window_length {
            return Err(PlanError::InvalidParameter {
                name:  "wait_step",
                value: self.wait_step,
            });
        }
        if !(self.budget_margin > 0.0 && self.budget_margin <= 1.0) {
            return Err(PlanError::InvalidParameter {
                name:  "budget_margin",
                value: self.budget_margin,
            });
        }
        Ok(())
    }
}
