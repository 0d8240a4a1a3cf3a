//! Decision policies: the black box between features and moves.

use crate::autopilot::features::{MOVEMENT_INPUTS, POLICY_OUTPUTS, THREAT_INPUTS};

/// Maps a feature vector to one score per relative direction.
///
/// Implementations may be backed by anything (an evolved network, a remote
/// service); a call that has to wait for its result blocks in `evaluate`.
pub trait DecisionPolicy: Send + Sync {
    fn kind(&self) -> &'static str;

    /// Scores in `forward, left, right, behind` order.
    fn evaluate(&mut self, inputs: &[f32]) -> Vec<f32>;

    /// Fitness reported back after each training tick.
    fn record_fitness(&mut self, _fitness: f64) {}
}

// ---------------------------------------------------------------------------
// Heuristic policy
// ---------------------------------------------------------------------------

/// Hand-tuned baseline that reads the feature layout directly.
///
/// Blocked moves score lowest, then each target category adds its weight to
/// the directions leading toward it, frightened enemies attract and active
/// ones veto.
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    pub category_weights: Vec<f32>,
    pub frightened_bonus: f32,
    pub threat_penalty: f32,
    pub forward_bias: f32,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self {
            category_weights: vec![1.0, 2.0, 4.0],
            frightened_bonus: 3.0,
            threat_penalty: 10.0,
            forward_bias: 0.1,
        }
    }
}

impl HeuristicPolicy {
    fn category_weight(&self, category: usize) -> f32 {
        self.category_weights.get(category).copied().unwrap_or(1.0)
    }
}

impl DecisionPolicy for HeuristicPolicy {
    fn kind(&self) -> &'static str {
        "heuristic"
    }

    /// An input of unexpected shape produces an empty output, which the
    /// caller rejects as malformed.
    fn evaluate(&mut self, inputs: &[f32]) -> Vec<f32> {
        let fixed = MOVEMENT_INPUTS + THREAT_INPUTS;
        if inputs.len() < fixed || (inputs.len() - fixed) % POLICY_OUTPUTS != 0 {
            return Vec::new();
        }
        let categories = (inputs.len() - fixed) / POLICY_OUTPUTS;
        let threats = &inputs[MOVEMENT_INPUTS + POLICY_OUTPUTS * categories..];

        (0..POLICY_OUTPUTS)
            .map(|dir| {
                if inputs[dir] < 0.5 {
                    return -self.threat_penalty * 2.0;
                }

                let mut score = if dir == 0 { self.forward_bias } else { 0.0 };
                for category in 0..categories {
                    let bit = inputs[MOVEMENT_INPUTS + POLICY_OUTPUTS * category + dir];
                    score += bit * self.category_weight(category);
                }

                let path_clear = threats[2 * dir] > 0.5;
                let passive = threats[2 * dir + 1] > 0.5;
                if passive {
                    score += self.frightened_bonus;
                } else if !path_clear {
                    score -= self.threat_penalty;
                }
                score
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Scripted policy
// ---------------------------------------------------------------------------

/// Replays a fixed list of outputs, cycling when it runs out. Keeps what it
/// was shown so tests can inspect it.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPolicy {
    script: Vec<Vec<f32>>,
    cursor: usize,
    pub seen_inputs: Vec<Vec<f32>>,
    pub fitness_log: Vec<f64>,
}

impl ScriptedPolicy {
    pub fn new(script: Vec<Vec<f32>>) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    /// Always answers with the same output.
    pub fn constant(outputs: Vec<f32>) -> Self {
        Self::new(vec![outputs])
    }
}

impl DecisionPolicy for ScriptedPolicy {
    fn kind(&self) -> &'static str {
        "scripted"
    }

    fn evaluate(&mut self, inputs: &[f32]) -> Vec<f32> {
        self.seen_inputs.push(inputs.to_vec());
        if self.script.is_empty() {
            return Vec::new();
        }
        let outputs = self.script[self.cursor % self.script.len()].clone();
        self.cursor += 1;
        outputs
    }

    fn record_fitness(&mut self, fitness: f64) {
        self.fitness_log.push(fitness);
    }
}
