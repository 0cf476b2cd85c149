//! # Deepq - Learning Core for Value-Based Reinforcement Learning
//!
//! Deepq implements the learning core of a Deep Q-Learning agent: how past
//! experience is stored, how actions are chosen under exploration, how
//! temporal-difference targets are computed, and how the value estimator is
//! updated from sampled experience. The estimator itself, the environment
//! and the outer training loop are collaborators the crate only talks to
//! at their boundaries.
//!
//! ## Key Features
//!
//! - **Replay Memory**: bounded FIFO store of transitions kept as
//!   index-aligned per-field sequences, with uniform and most-recent
//!   sampling
//! - **Exploration Control**: epsilon-greedy action selection with
//!   per-step decay, behind a trait for custom policies
//! - **Target Evaluation**: one-step Q-Learning targets that forward only
//!   non-terminal rows through the estimator
//! - **Target Freezing**: optional periodically-synced frozen copy of the
//!   estimator for stable targets and action selection
//! - **Backend Freedom**: the value model is any type implementing
//!   [`estimator::ValueEstimator`] - the crate never constructs one
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deepq::agent::DqnAgentBuilder;
//! # use deepq::error::Result;
//! # use deepq::estimator::ValueEstimator;
//! # use ndarray::{array, Array1, Array2, ArrayView2};
//! # #[derive(Clone)]
//! # struct Linear { weights: Array2<f32> }
//! # impl ValueEstimator for Linear {
//! #     fn predict(&self, observations: ArrayView2<f32>) -> Array2<f32> {
//! #         observations.dot(&self.weights)
//! #     }
//! #     fn fit(&mut self, observations: ArrayView2<f32>, targets: ArrayView2<f32>, learning_rate: f32) -> Result<()> {
//! #         let residuals = self.predict(observations.view()) - &targets;
//! #         let gradient = observations.t().dot(&residuals) / observations.nrows() as f32;
//! #         self.weights = &self.weights - &(gradient * learning_rate);
//! #         Ok(())
//! #     }
//! #     fn parameters(&self) -> Vec<Array1<f32>> {
//! #         vec![Array1::from_iter(self.weights.iter().copied())]
//! #     }
//! #     fn set_parameters(&mut self, parameters: &[Array1<f32>]) -> Result<()> {
//! #         for (weight, &value) in self.weights.iter_mut().zip(parameters[0].iter()) { *weight = value; }
//! #         Ok(())
//! #     }
//! # }
//!
//! // Any ValueEstimator implementation works here; see the trait docs.
//! let estimator = Linear { weights: Array2::zeros((4, 2)) };
//! let mut agent = DqnAgentBuilder::new()
//!     .sample_size(32)
//!     .exploration(1.0)
//!     .exploration_decay(1e-3)
//!     .freeze_interval(100)
//!     .build(estimator)
//!     .unwrap();
//!
//! // The standard loop: act, step the environment, remember, learn.
//! let observation = array![0.1f32, 0.0, -0.2, 0.3];
//! let action = agent.act(observation.view(), false).unwrap();
//! let (reward, done) = (1.0, false); // from the environment
//! let next_observation = array![0.2f32, 0.1, -0.1, 0.2];
//! agent
//!     .remember(observation.view(), action, reward, done, Some(next_observation.view()))
//!     .unwrap();
//! if let Some(metrics) = agent.learn().unwrap() {
//!     println!("loss = {}, exploration = {}", metrics.loss, metrics.exploration);
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - The orchestrating [`agent::DqnAgent`] and its builder
//! - [`control`] - Exploration policies ([`control::EpsilonGreedy`])
//! - [`error`] - Error types and result handling
//! - [`estimator`] - The [`estimator::ValueEstimator`] boundary trait
//! - [`evaluation`] - Target rules ([`evaluation::QLearning`])
//! - [`memory`] - Bounded FIFO replay memory

pub mod agent;
pub mod control;
pub mod error;
pub mod estimator;
pub mod evaluation;
pub mod memory;

#[cfg(test)]
mod tests;
