//! Episode events. The host game triggers the first five; the autopilot
//! triggers `AgentStalled` when it ends an unproductive episode.

use bevy::prelude::*;

#[derive(Event)]
pub struct MinorItemEaten;

#[derive(Event)]
pub struct MajorItemEaten;

#[derive(Event)]
pub struct ThreatEliminated;

#[derive(Event)]
pub struct LevelAdvanced;

#[derive(Event)]
pub struct AgentDied;

#[derive(Event)]
pub struct AgentStalled;
