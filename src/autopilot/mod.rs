//! The per-tick decision pipeline.
//!
//! One tick runs, strictly in sequence: the directional search once per target
//! category, the threat scan, feature assembly, the policy call, direction
//! selection and, in training mode, scoring and the stall guard. Nothing is
//! kept between ticks except the stall guard's idle counter.

pub mod features;
pub mod policy;
pub mod reward;
pub mod search;
pub mod threat;

use micromegas_tracing::prelude::{span_scope, warn};

use crate::components::Direction;
use crate::config::{AutopilotConfig, AutopilotMode, InvalidOutputAction};
use crate::error::AutopilotError;
use crate::world::{GridWorld, validate_dimensions};

pub use features::{AgentPose, FeatureAssembler, FeatureVector, Observation, TargetCategory, select_direction};
pub use policy::{DecisionPolicy, HeuristicPolicy, ScriptedPolicy};
pub use reward::{EpisodeCounters, RewardWeights, StallGuard};
pub use search::{DirectionalSearch, SearchResult};
pub use threat::{ThreatReading, ThreatScan};

/// Result of one decision tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub direction: Direction,
    /// Shaped fitness, in training mode only.
    pub fitness: Option<f64>,
    /// The stall guard ended the episode this tick.
    pub stalled: bool,
}

/// Run one tick against borrowed parts. The ECS layer keeps the parts in
/// separate resources and calls this directly.
pub fn run_tick<W: GridWorld + ?Sized>(
    assembler: &FeatureAssembler,
    policy: &mut dyn DecisionPolicy,
    config: &AutopilotConfig,
    stall: &mut StallGuard,
    world: &W,
    pose: AgentPose,
    counters: &EpisodeCounters,
) -> Result<TickOutcome, AutopilotError> {
    span_scope!("autopilot_tick");
    validate_dimensions(world)?;

    let observation = assembler.observe(world, pose);
    let outputs = policy.evaluate(observation.features.as_slice());
    let direction = match select_direction(&outputs, pose.facing) {
        Ok(direction) => direction,
        Err(err) => match config.invalid_output {
            InvalidOutputAction::Reject => return Err(err.into()),
            InvalidOutputAction::KeepHeading => {
                warn!("policy {} output rejected, keeping heading: {}", policy.kind(), err);
                pose.facing
            }
        },
    };

    let (fitness, stalled) = match config.mode {
        AutopilotMode::Training => {
            let stalled = stall.observe(counters.base_score);
            // A stall ends the episode as a death; score it that way.
            let fitness = if stalled {
                config.reward.score(&EpisodeCounters {
                    alive: false,
                    ..counters.clone()
                })
            } else {
                config.reward.score(counters)
            };
            policy.record_fitness(fitness);
            (Some(fitness), stalled)
        }
        AutopilotMode::Tournament => (None, false),
    };

    Ok(TickOutcome {
        direction,
        fitness,
        stalled,
    })
}

/// Owns everything one agent needs to decide.
pub struct Autopilot {
    pub assembler: FeatureAssembler,
    pub policy: Box<dyn DecisionPolicy>,
    pub config: AutopilotConfig,
    pub stall: StallGuard,
}

impl Autopilot {
    pub fn new(assembler: FeatureAssembler, policy: Box<dyn DecisionPolicy>, config: AutopilotConfig) -> Self {
        let stall = config.stall_guard();
        Self {
            assembler,
            policy,
            config,
            stall,
        }
    }

    /// Standard categories, heuristic policy, default configuration.
    pub fn standard() -> Self {
        Self::new(
            FeatureAssembler::standard(),
            Box::new(HeuristicPolicy::default()),
            AutopilotConfig::default(),
        )
    }

    pub fn tick<W: GridWorld + ?Sized>(
        &mut self,
        world: &W,
        pose: AgentPose,
        counters: &EpisodeCounters,
    ) -> Result<TickOutcome, AutopilotError> {
        run_tick(
            &self.assembler,
            self.policy.as_mut(),
            &self.config,
            &mut self.stall,
            world,
            pose,
            counters,
        )
    }

    /// Start a new episode.
    pub fn reset(&mut self) {
        self.stall.reset();
    }
}

impl std::fmt::Debug for Autopilot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autopilot")
            .field("assembler", &self.assembler)
            .field("policy", &self.policy.kind())
            .field("config", &self.config)
            .field("stall", &self.stall)
            .finish()
    }
}
