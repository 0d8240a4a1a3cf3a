//! Frame-level telemetry: frame time plus the running episode's fitness.

use bevy::prelude::*;
use micromegas_tracing::prelude::{fmetric, imetric, span_scope};

use crate::autopilot::reward::EpisodeCounters;
use crate::resources::Fitness;

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Last, (frame_telemetry, episode_telemetry));
    }
}

fn frame_telemetry(time: Res<Time>) {
    span_scope!("frame");
    let dt_ms = time.delta_secs_f64() * 1000.0;
    fmetric!("frame_time_ms", "ms", dt_ms);
}

fn episode_telemetry(fitness: Option<Res<Fitness>>, counters: Option<Res<EpisodeCounters>>) {
    let (Some(fitness), Some(counters)) = (fitness, counters) else {
        return;
    };
    if !counters.is_changed() {
        return;
    }
    span_scope!("episode_telemetry");
    fmetric!("fitness", "points", fitness.0);
    imetric!("survival_ticks", "ticks", counters.survival_ticks);
}
