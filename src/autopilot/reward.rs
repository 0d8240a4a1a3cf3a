//! Fitness shaping and the inactivity guard.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Weights of the shaped fitness. The shape of the formula is fixed; only
/// the coefficients are tunable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardWeights {
    pub minor_item: f64,
    pub major_item: f64,
    pub threat_eliminated: f64,
    pub level_bonus: f64,
    pub death_penalty: f64,
    /// Charged per tick survived beyond `grace_period`.
    pub time_penalty_rate: f64,
    pub grace_period: u64,
    pub survival_reward_rate: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            minor_item: 50.0,
            major_item: 100.0,
            threat_eliminated: 200.0,
            level_bonus: 500.0,
            death_penalty: 100.0,
            time_penalty_rate: 0.1,
            grace_period: 1000,
            survival_reward_rate: 0.5,
        }
    }
}

/// Cumulative per-episode counters supplied by the simulation.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeCounters {
    /// The game's own score.
    pub base_score: i64,
    pub minor_items_eaten: u32,
    pub major_items_eaten: u32,
    pub threats_eliminated: u32,
    pub survival_ticks: u64,
    pub alive: bool,
    pub leveled_up: bool,
}

impl Default for EpisodeCounters {
    fn default() -> Self {
        Self {
            base_score: 0,
            minor_items_eaten: 0,
            major_items_eaten: 0,
            threats_eliminated: 0,
            survival_ticks: 0,
            alive: true,
            leveled_up: false,
        }
    }
}

impl RewardWeights {
    /// Fitness for the counters as they stand. Recomputed from scratch every
    /// call; nothing is carried between calls.
    pub fn score(&self, counters: &EpisodeCounters) -> f64 {
        let mut score = counters.base_score as f64;

        score += self.minor_item * f64::from(counters.minor_items_eaten);
        score += self.major_item * f64::from(counters.major_items_eaten);
        score += self.threat_eliminated * f64::from(counters.threats_eliminated);

        if counters.leveled_up {
            score += self.level_bonus;
        }
        if !counters.alive {
            score -= self.death_penalty;
        }

        let overtime = counters.survival_ticks.saturating_sub(self.grace_period);
        score -= self.time_penalty_rate * overtime as f64;
        score += self.survival_reward_rate * counters.survival_ticks as f64;

        score
    }
}

/// Ends episodes whose base score stopped rising.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct StallGuard {
    limit: u32,
    last_score: i64,
    idle_ticks: u32,
}

impl StallGuard {
    /// Sixty ticks per second, ten seconds.
    pub const DEFAULT_LIMIT: u32 = 60 * 10;

    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            last_score: 0,
            idle_ticks: 0,
        }
    }

    /// Record this tick's base score. Returns true once the agent has gone
    /// more than `limit` ticks without raising it.
    pub fn observe(&mut self, base_score: i64) -> bool {
        if base_score > self.last_score {
            self.last_score = base_score;
            self.idle_ticks = 0;
        }
        let stalled = self.idle_ticks > self.limit;
        self.idle_ticks = self.idle_ticks.saturating_add(1);
        stalled
    }

    pub fn reset(&mut self) {
        self.last_score = 0;
        self.idle_ticks = 0;
    }

    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for StallGuard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters() -> EpisodeCounters {
        EpisodeCounters {
            base_score: 120,
            minor_items_eaten: 3,
            major_items_eaten: 1,
            threats_eliminated: 2,
            survival_ticks: 400,
            alive: true,
            leveled_up: false,
        }
    }

    #[test]
    fn reference_weights() {
        let weights = RewardWeights::default();
        // 120 + 150 + 100 + 400 + 0.5 * 400
        assert!((weights.score(&counters()) - 970.0).abs() < 1e-9);
    }

    #[test]
    fn death_and_level_adjustments() {
        let weights = RewardWeights::default();
        let base = weights.score(&counters());

        let dead = EpisodeCounters {
            alive: false,
            ..counters()
        };
        assert!((weights.score(&dead) - (base - 100.0)).abs() < 1e-9);

        let advanced = EpisodeCounters {
            leveled_up: true,
            ..counters()
        };
        assert!((weights.score(&advanced) - (base + 500.0)).abs() < 1e-9);
    }

    #[test]
    fn time_penalty_only_after_grace_period() {
        let weights = RewardWeights::default();
        let at_grace = EpisodeCounters {
            survival_ticks: 1000,
            ..EpisodeCounters::default()
        };
        assert!((weights.score(&at_grace) - 500.0).abs() < 1e-9);

        let late = EpisodeCounters {
            survival_ticks: 1015,
            ..EpisodeCounters::default()
        };
        // 0.5 * 1015 - 0.1 * 15 keeps its fractional part.
        assert!((weights.score(&late) - 506.0).abs() < 1e-9);

        let odd = EpisodeCounters {
            survival_ticks: 1003,
            ..EpisodeCounters::default()
        };
        assert!((weights.score(&odd) - 501.2).abs() < 1e-9);
    }

    #[test]
    fn score_is_pure() {
        let weights = RewardWeights::default();
        let c = counters();
        assert_eq!(weights.score(&c), weights.score(&c));
    }

    #[test]
    fn weights_deserialize_with_defaults() {
        let weights: RewardWeights = serde_json::from_str(r#"{"death_penalty": 250.0}"#).unwrap();
        assert_eq!(weights.death_penalty, 250.0);
        assert_eq!(weights.minor_item, 50.0);
        assert_eq!(weights.grace_period, 1000);
    }

    #[test]
    fn stall_guard_trips_after_limit() {
        let mut guard = StallGuard::new(3);
        // Idle ticks 0..=3 are tolerated; the fifth idle observation trips.
        for _ in 0..4 {
            assert!(!guard.observe(0));
        }
        assert!(guard.observe(0));
    }

    #[test]
    fn stall_guard_resets_on_progress() {
        let mut guard = StallGuard::new(2);
        assert!(!guard.observe(0));
        assert!(!guard.observe(0));
        assert!(!guard.observe(0));
        assert!(!guard.observe(10));
        assert_eq!(guard.idle_ticks(), 1);
        assert!(!guard.observe(10));
        assert!(!guard.observe(10));
        assert!(guard.observe(10));

        guard.reset();
        assert_eq!(guard.idle_ticks(), 0);
        assert!(!guard.observe(0));
    }
}
