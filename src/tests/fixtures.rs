use std::cell::RefCell;

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{DeepqError, Result};
use crate::estimator::ValueEstimator;

/// Linear value model with a closed-form gradient: Q = obs · W + b.
#[derive(Clone, Debug)]
pub struct LinearEstimator {
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
}

impl LinearEstimator {
    pub fn zeros(observation_width: usize, num_actions: usize) -> Self {
        LinearEstimator {
            weights: Array2::zeros((observation_width, num_actions)),
            bias: Array1::zeros(num_actions),
        }
    }

    pub fn from_weights(weights: Array2<f32>) -> Self {
        let num_actions = weights.ncols();
        LinearEstimator {
            weights,
            bias: Array1::zeros(num_actions),
        }
    }
}

impl ValueEstimator for LinearEstimator {
    fn predict(&self, observations: ArrayView2<f32>) -> Array2<f32> {
        observations.dot(&self.weights) + &self.bias
    }

    fn fit(
        &mut self,
        observations: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        learning_rate: f32,
    ) -> Result<()> {
        let batch = observations.nrows() as f32;
        let residuals = self.predict(observations.view()) - &targets;
        let weight_gradient = observations.t().dot(&residuals) * (2.0 / batch);
        let bias_gradient = residuals.sum_axis(Axis(0)) * (2.0 / batch);
        self.weights = &self.weights - &(weight_gradient * learning_rate);
        self.bias = &self.bias - &(bias_gradient * learning_rate);
        Ok(())
    }

    fn parameters(&self) -> Vec<Array1<f32>> {
        vec![
            Array1::from_iter(self.weights.iter().copied()),
            self.bias.clone(),
        ]
    }

    fn set_parameters(&mut self, parameters: &[Array1<f32>]) -> Result<()> {
        if parameters.len() != 2
            || parameters[0].len() != self.weights.len()
            || parameters[1].len() != self.bias.len()
        {
            return Err(DeepqError::Estimator(
                "parameter layout mismatch".to_string(),
            ));
        }
        for (weight, &value) in self.weights.iter_mut().zip(parameters[0].iter()) {
            *weight = value;
        }
        self.bias.assign(&parameters[1]);
        Ok(())
    }
}

/// Wrapper recording the row count of every batch forwarded through
/// `predict`, so tests can observe which rows reach the estimator.
#[derive(Clone, Debug)]
pub struct CountingEstimator {
    pub inner: LinearEstimator,
    pub forwarded_rows: RefCell<Vec<usize>>,
}

impl CountingEstimator {
    pub fn new(inner: LinearEstimator) -> Self {
        CountingEstimator {
            inner,
            forwarded_rows: RefCell::new(Vec::new()),
        }
    }
}

impl ValueEstimator for CountingEstimator {
    fn predict(&self, observations: ArrayView2<f32>) -> Array2<f32> {
        self.forwarded_rows.borrow_mut().push(observations.nrows());
        self.inner.predict(observations)
    }

    fn fit(
        &mut self,
        observations: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        learning_rate: f32,
    ) -> Result<()> {
        self.inner.fit(observations, targets, learning_rate)
    }

    fn parameters(&self) -> Vec<Array1<f32>> {
        self.inner.parameters()
    }

    fn set_parameters(&mut self, parameters: &[Array1<f32>]) -> Result<()> {
        self.inner.set_parameters(parameters)
    }
}
