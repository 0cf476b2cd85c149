use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{DeepqError, Result};
use crate::estimator::ValueEstimator;

fn max_value(row: ArrayView1<f32>) -> f32 {
    row.iter().fold(f32::NEG_INFINITY, |max, &value| max.max(value))
}

/// Target rule turning a batch of transitions into regression targets for
/// the value estimator.
///
/// One built-in implementation, [`QLearning`]; read-only over both the
/// batch and the estimator.
pub trait Evaluation {
    /// Expected future reward for each transition in the batch, aligned to
    /// the input rows.
    fn evaluate(
        &self,
        rewards: ArrayView1<f32>,
        dones: &[bool],
        next_observations: ArrayView2<f32>,
        estimator: &dyn ValueEstimator,
    ) -> Result<Array1<f32>>;

    /// Rule name, for metrics and display.
    fn name(&self) -> &'static str;
}

/// One-step Q-Learning targets.
///
/// Terminal transitions keep their reward; every other row adds the
/// discounted value of the best next action. The estimator call is the
/// expensive step, so only the non-terminal rows are forwarded through it
/// and the results scattered back at their original positions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QLearning {
    discount: f32,
}

impl QLearning {
    /// Create the rule with a discount factor in (0, 1].
    pub fn new(discount: f32) -> Result<Self> {
        if !(discount > 0.0 && discount <= 1.0) {
            return Err(DeepqError::invalid_parameter(
                "discount",
                "must be in (0, 1]",
            ));
        }
        Ok(QLearning { discount })
    }

    pub fn discount(&self) -> f32 {
        self.discount
    }
}

impl Default for QLearning {
    fn default() -> Self {
        QLearning { discount: 0.99 }
    }
}

impl Evaluation for QLearning {
    fn evaluate(
        &self,
        rewards: ArrayView1<f32>,
        dones: &[bool],
        next_observations: ArrayView2<f32>,
        estimator: &dyn ValueEstimator,
    ) -> Result<Array1<f32>> {
        debug_assert_eq!(rewards.len(), dones.len());
        debug_assert_eq!(rewards.len(), next_observations.nrows());

        let mut targets = rewards.to_owned();

        let continuing: Vec<usize> = dones
            .iter()
            .enumerate()
            .filter(|(_, &done)| !done)
            .map(|(index, _)| index)
            .collect();
        if continuing.is_empty() {
            return Ok(targets);
        }

        let continuations = next_observations.select(Axis(0), &continuing);
        let next_values = estimator.predict(continuations.view());
        for (row, &index) in continuing.iter().enumerate() {
            targets[index] += self.discount * max_value(next_values.row(row));
        }

        Ok(targets)
    }

    fn name(&self) -> &'static str {
        "q-learning"
    }
}
