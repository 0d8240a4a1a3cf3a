//! Drives the agent from inside the host game's ECS.
//!
//! Each frame in `PlayingState::Playing` the maze and the current entities are
//! folded into a `WorldView`, one autopilot tick runs, and the chosen move is
//! written to the agent's `InputDirection` for the host's movement system.

use bevy::prelude::*;
use micromegas_tracing::prelude::{imetric, info, span_fn, span_scope, warn};

use crate::app_state::{AppState, PlayingState};
use crate::autopilot::features::{AgentPose, FeatureAssembler};
use crate::autopilot::reward::{EpisodeCounters, StallGuard};
use crate::autopilot::run_tick;
use crate::components::{Agent, BonusItem, Enemy, Facing, Frightened, GridPosition, InputDirection, Pellet, PowerPellet};
use crate::config::{AutopilotConfig, AutopilotMode};
use crate::events::{AgentDied, AgentStalled, LevelAdvanced, MajorItemEaten, MinorItemEaten, ThreatEliminated};
use crate::maze::MazeMap;
use crate::resources::{AutopilotStats, Fitness, GameScore, PolicyHandle};
use crate::world::{Occupant, ThreatMood, WorldView};

pub struct AutopilotPlugin;

impl Plugin for AutopilotPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutopilotConfig>();
        app.init_resource::<FeatureAssembler>();
        app.init_resource::<PolicyHandle>();
        app.init_resource::<EpisodeCounters>();
        app.init_resource::<StallGuard>();
        app.init_resource::<GameScore>();
        app.init_resource::<Fitness>();
        app.init_resource::<AutopilotStats>();

        app.add_observer(on_minor_item_eaten);
        app.add_observer(on_major_item_eaten);
        app.add_observer(on_threat_eliminated);
        app.add_observer(on_level_advanced);
        app.add_observer(on_agent_died);

        app.add_systems(OnEnter(AppState::InGame), start_episode);
        app.add_systems(OnEnter(AppState::GameOver), finish_episode);
        app.add_systems(
            Update,
            autopilot_decide
                .run_if(in_state(PlayingState::Playing))
                .run_if(resource_exists::<MazeMap>),
        );
    }
}

// ---------------------------------------------------------------------------
// Episode lifecycle
// ---------------------------------------------------------------------------

#[span_fn]
fn start_episode(
    mut commands: Commands,
    config: Res<AutopilotConfig>,
    policy: Res<PolicyHandle>,
    mut stats: ResMut<AutopilotStats>,
) {
    stats.episodes += 1;
    commands.insert_resource(EpisodeCounters::default());
    commands.insert_resource(config.stall_guard());
    commands.insert_resource(Fitness::default());
    info!(
        "episode {} started: policy={} mode={:?}",
        stats.episodes,
        policy.0.kind(),
        config.mode
    );
}

#[span_fn]
fn finish_episode(fitness: Res<Fitness>, counters: Res<EpisodeCounters>, mut stats: ResMut<AutopilotStats>) {
    stats.record_episode(fitness.0);
    info!(
        "episode {} over: fitness={} ticks={} alive={}",
        stats.episodes, fitness.0, counters.survival_ticks, counters.alive
    );
}

// ---------------------------------------------------------------------------
// Counter observers
// ---------------------------------------------------------------------------

fn on_minor_item_eaten(_trigger: On<MinorItemEaten>, mut counters: ResMut<EpisodeCounters>) {
    counters.minor_items_eaten += 1;
}

fn on_major_item_eaten(_trigger: On<MajorItemEaten>, mut counters: ResMut<EpisodeCounters>) {
    counters.major_items_eaten += 1;
}

fn on_threat_eliminated(_trigger: On<ThreatEliminated>, mut counters: ResMut<EpisodeCounters>) {
    counters.threats_eliminated += 1;
}

fn on_level_advanced(_trigger: On<LevelAdvanced>, mut counters: ResMut<EpisodeCounters>) {
    counters.leveled_up = true;
}

/// The decision system stops once the agent is dead, so the death penalty
/// is scored here.
fn on_agent_died(
    _trigger: On<AgentDied>,
    config: Res<AutopilotConfig>,
    mut counters: ResMut<EpisodeCounters>,
    mut fitness: ResMut<Fitness>,
    mut policy: ResMut<PolicyHandle>,
) {
    if !counters.alive {
        return;
    }
    counters.alive = false;
    if config.mode == AutopilotMode::Training {
        fitness.0 = config.reward.score(&counters);
        policy.0.record_fitness(fitness.0);
    }
}

// ---------------------------------------------------------------------------
// Decision tick
// ---------------------------------------------------------------------------

#[span_fn]
#[allow(clippy::too_many_arguments)]
fn autopilot_decide(
    mut commands: Commands,
    maze: Res<MazeMap>,
    assembler: Res<FeatureAssembler>,
    config: Res<AutopilotConfig>,
    score: Res<GameScore>,
    mut policy: ResMut<PolicyHandle>,
    mut stall: ResMut<StallGuard>,
    mut counters: ResMut<EpisodeCounters>,
    mut fitness: ResMut<Fitness>,
    mut stats: ResMut<AutopilotStats>,
    mut agent_query: Query<(&GridPosition, &Facing, &mut InputDirection), With<Agent>>,
    enemy_query: Query<(&GridPosition, Has<Frightened>), With<Enemy>>,
    item_query: Query<
        (&GridPosition, Has<PowerPellet>, Has<BonusItem>),
        Or<(With<Pellet>, With<PowerPellet>, With<BonusItem>)>,
    >,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Ok((position, facing, mut input)) = agent_query.single_mut() else {
        return;
    };
    if !counters.alive {
        return;
    }

    let mut world = WorldView::new(&maze);
    for (pos, frightened) in &enemy_query {
        let mood = if frightened {
            ThreatMood::Frightened
        } else {
            ThreatMood::Active
        };
        world.add(*pos, Occupant::Hostile(mood));
    }
    for (pos, power, bonus) in &item_query {
        let occupant = if power {
            Occupant::PowerPellet
        } else if bonus {
            Occupant::Bonus
        } else {
            Occupant::Pellet
        };
        world.add(*pos, occupant);
    }

    counters.base_score = i64::try_from(score.0).unwrap_or(i64::MAX);
    counters.survival_ticks += 1;

    let pose = AgentPose {
        position: *position,
        facing: facing.0,
    };
    let outcome = match run_tick(
        &assembler,
        policy.0.as_mut(),
        &config,
        &mut stall,
        &world,
        pose,
        &counters,
    ) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!("autopilot tick failed: {}", err);
            return;
        }
    };

    input.0 = Some(outcome.direction);
    if let Some(value) = outcome.fitness {
        fitness.0 = value;
    }

    if outcome.stalled {
        counters.alive = false;
        stats.stalled_episodes += 1;
        info!(
            "agent stalled after {} idle ticks: fitness={}",
            stall.idle_ticks(),
            fitness.0
        );
        imetric!("stalled_episodes", "count", stats.stalled_episodes as u64);
        commands.trigger(AgentStalled);
        next_state.set(AppState::GameOver);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
