pub mod app_state;
pub mod autopilot;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod maze;
pub mod plugins;
pub mod resources;
pub mod world;

use bevy::prelude::*;

use app_state::{AppState, PlayingState};
use plugins::autopilot::AutopilotPlugin;
use plugins::telemetry::TelemetryPlugin;

/// Everything a host game needs to let the autopilot play: the state machine,
/// the decision loop and its telemetry.
///
/// The host still provides `StatesPlugin` (part of `DefaultPlugins`), the
/// `MazeMap` resource and the entities the autopilot reads.
pub struct CandidePlugin;

impl Plugin for CandidePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>();
        app.add_sub_state::<PlayingState>();

        app.add_plugins(AutopilotPlugin);
        app.add_plugins(TelemetryPlugin);
    }
}
