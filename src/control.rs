use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::ThreadRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DeepqError, Result};

/// Index of the row maximum, ties resolved to the lowest index.
pub fn argmax(row: ArrayView1<f32>) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (index, &value) in row.iter().enumerate() {
        if value > best_value {
            best = index;
            best_value = value;
        }
    }
    best
}

/// Action-selection policy over a batch of per-action value estimates.
///
/// One built-in implementation, [`EpsilonGreedy`]; new policies implement
/// [`act`] (the exploring path) and inherit the greedy short-circuit from
/// [`select`].
///
/// [`act`]: Control::act
/// [`select`]: Control::select
pub trait Control {
    /// Choose one action per row of `q_values` under the policy's
    /// exploration rule.
    fn act(&mut self, q_values: ArrayView2<f32>) -> Result<Vec<usize>>;

    /// Current exploration constant.
    fn exploration(&self) -> f32;

    /// Set the exploration constant to `fixed`, or apply one decay step
    /// (`exploration *= 1 - decay`) when `fixed` is `None`. Called once
    /// per learning step.
    fn update_exploration(&mut self, fixed: Option<f32>);

    /// Policy name, for metrics and display.
    fn name(&self) -> &'static str;

    /// Choose one action per row: the arg-max when `greedy`, the policy's
    /// exploring path otherwise.
    fn select(&mut self, q_values: ArrayView2<f32>, greedy: bool) -> Result<Vec<usize>> {
        if greedy {
            Ok(q_values.rows().into_iter().map(argmax).collect())
        } else {
            self.act(q_values)
        }
    }
}

/// Epsilon-greedy control: with probability `exploration` a uniformly
/// random action, otherwise the value-maximizing one. The random draw is
/// made independently for every row of the batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    exploration: f32,
    decay: f32,
    #[serde(skip)]
    rng: ThreadRng,
}

impl EpsilonGreedy {
    /// Create a policy with the given exploration constant and per-step
    /// decay, both validated to lie in [0, 1].
    pub fn new(exploration: f32, decay: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&exploration) {
            return Err(DeepqError::invalid_parameter(
                "exploration",
                "must be in [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&decay) {
            return Err(DeepqError::invalid_parameter(
                "exploration_decay",
                "must be in [0, 1]",
            ));
        }
        Ok(EpsilonGreedy {
            exploration,
            decay,
            rng: rand::thread_rng(),
        })
    }

    /// Exploration decay applied at each [`Control::update_exploration`].
    pub fn decay(&self) -> f32 {
        self.decay
    }
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        EpsilonGreedy {
            exploration: 0.1,
            decay: 0.0,
            rng: rand::thread_rng(),
        }
    }
}

impl Control for EpsilonGreedy {
    fn act(&mut self, q_values: ArrayView2<f32>) -> Result<Vec<usize>> {
        if !(0.0..=1.0).contains(&self.exploration) {
            return Err(DeepqError::InvalidExplorationRange(self.exploration));
        }

        let num_actions = q_values.ncols();
        let actions = q_values
            .rows()
            .into_iter()
            .map(|row| {
                if self.rng.gen::<f32>() < self.exploration {
                    self.rng.gen_range(0..num_actions)
                } else {
                    argmax(row)
                }
            })
            .collect();
        Ok(actions)
    }

    fn exploration(&self) -> f32 {
        self.exploration
    }

    fn update_exploration(&mut self, fixed: Option<f32>) {
        match fixed {
            Some(value) => self.exploration = value,
            None => self.exploration *= 1.0 - self.decay,
        }
    }

    fn name(&self) -> &'static str {
        "epsilon-greedy"
    }
}
