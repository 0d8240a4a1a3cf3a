use bevy::prelude::*;

/// Top-level lifecycle of the host game, as seen by the autopilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, States)]
pub enum AppState {
    #[default]
    MainMenu,
    InGame,
    GameOver,
}

/// The autopilot only decides while the agent is `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, SubStates)]
#[source(AppState = AppState::InGame)]
pub enum PlayingState {
    #[default]
    LevelIntro,
    Playing,
    PlayerDeath,
    LevelComplete,
}
