use bevy::prelude::*;

use crate::autopilot::policy::{DecisionPolicy, HeuristicPolicy};

/// The host game's own score, mirrored into `EpisodeCounters::base_score`.
#[derive(Resource, Debug, Default)]
pub struct GameScore(pub u64);

/// Latest shaped fitness of the running episode.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct Fitness(pub f64);

/// The policy driving the agent. Swap it by inserting a new handle.
#[derive(Resource)]
pub struct PolicyHandle(pub Box<dyn DecisionPolicy>);

impl PolicyHandle {
    pub fn new(policy: impl DecisionPolicy + 'static) -> Self {
        Self(Box::new(policy))
    }
}

impl Default for PolicyHandle {
    fn default() -> Self {
        Self::new(HeuristicPolicy::default())
    }
}

// ---------------------------------------------------------------------------
// Session stats
// ---------------------------------------------------------------------------

/// Totals across every episode of this run.
#[derive(Resource, Debug, Default)]
pub struct AutopilotStats {
    pub episodes: u32,
    pub stalled_episodes: u32,
    pub best_fitness: Option<f64>,
}

impl AutopilotStats {
    pub fn record_episode(&mut self, fitness: f64) {
        self.best_fitness = Some(match self.best_fitness {
            Some(best) => best.max(fitness),
            None => fitness,
        });
    }
}
