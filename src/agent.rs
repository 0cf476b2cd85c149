use log::{debug, trace};
use ndarray::{ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::control::{Control, EpsilonGreedy};
use crate::error::{DeepqError, Result};
use crate::estimator::ValueEstimator;
use crate::evaluation::{Evaluation, QLearning};
use crate::memory::{Memory, SampleMethod};

/// Metrics record returned by a completed [`DqnAgent::learn`] step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnMetrics {
    /// Mean-squared error between the taken-action values and the targets.
    pub loss: f32,
    /// Exploration constant after this step's decay.
    pub exploration: f32,
    pub learning_rate: f32,
}

/// Deep Q-Learning agent.
///
/// Composes a bounded replay [`Memory`], an exploration [`Control`]
/// policy, a target [`Evaluation`] rule and an externally-owned
/// [`ValueEstimator`] into the three operations of the standard RL loop:
/// [`act`], [`remember`] and [`learn`]. With a positive `freeze_interval`,
/// a frozen copy of the estimator answers both action selection and target
/// computation, and is re-synced from the live estimator every
/// `freeze_interval` learning steps.
///
/// All operations take `&mut self`: the agent is the sole serializer of
/// memory writes, sampling and parameter updates. Wrap it in external
/// mutual exclusion before feeding it from parallel rollouts.
///
/// [`act`]: DqnAgent::act
/// [`remember`]: DqnAgent::remember
/// [`learn`]: DqnAgent::learn
///
/// # Example
///
/// ```rust,no_run
/// use deepq::agent::DqnAgentBuilder;
/// use deepq::error::Result;
/// use deepq::estimator::ValueEstimator;
/// use ndarray::{array, Array1, Array2, ArrayView2};
///
/// #[derive(Clone)]
/// struct Linear {
///     weights: Array2<f32>,
/// }
///
/// impl ValueEstimator for Linear {
///     fn predict(&self, observations: ArrayView2<f32>) -> Array2<f32> {
///         observations.dot(&self.weights)
///     }
///     fn fit(
///         &mut self,
///         observations: ArrayView2<f32>,
///         targets: ArrayView2<f32>,
///         learning_rate: f32,
///     ) -> Result<()> {
///         let residuals = self.predict(observations.view()) - &targets;
///         let gradient = observations.t().dot(&residuals) / observations.nrows() as f32;
///         self.weights = &self.weights - &(gradient * learning_rate);
///         Ok(())
///     }
///     fn parameters(&self) -> Vec<Array1<f32>> {
///         vec![Array1::from_iter(self.weights.iter().copied())]
///     }
///     fn set_parameters(&mut self, parameters: &[Array1<f32>]) -> Result<()> {
///         for (weight, &value) in self.weights.iter_mut().zip(parameters[0].iter()) {
///             *weight = value;
///         }
///         Ok(())
///     }
/// }
///
/// // 4-dimensional observations, 2 actions.
/// let estimator = Linear { weights: Array2::zeros((4, 2)) };
/// let mut agent = DqnAgentBuilder::new()
///     .exploration(0.2)
///     .exploration_decay(1e-4)
///     .freeze_interval(100)
///     .build(estimator)
///     .unwrap();
///
/// let observation = array![0.1f32, 0.0, -0.2, 0.3];
/// let action = agent.act(observation.view(), false).unwrap();
/// // ... step the environment with `action` ...
/// agent.remember(observation.view(), action, 1.0, false, Some(observation.view())).unwrap();
/// if let Some(metrics) = agent.learn().unwrap() {
///     println!("loss = {}", metrics.loss);
/// }
/// ```
pub struct DqnAgent<V> {
    estimator: V,
    frozen_estimator: Option<V>,
    memory: Memory,
    control: Box<dyn Control>,
    evaluation: Box<dyn Evaluation>,
    sample_size: usize,
    learning_rate: f32,
    freeze_interval: usize,
    freeze_countdown: usize,
}

impl<V: ValueEstimator> DqnAgent<V> {
    /// Create an agent around `estimator` with the default configuration
    /// (epsilon-greedy control at 0.1 exploration, Q-Learning targets at
    /// 0.99 discount, no target freezing).
    pub fn new(estimator: V) -> Self {
        DqnAgent {
            estimator,
            frozen_estimator: None,
            memory: Memory::new(DqnAgentBuilder::DEFAULT_MAX_MEMORY_LEN),
            control: Box::new(EpsilonGreedy::default()),
            evaluation: Box::new(QLearning::default()),
            sample_size: DqnAgentBuilder::DEFAULT_SAMPLE_SIZE,
            learning_rate: DqnAgentBuilder::DEFAULT_LEARNING_RATE,
            freeze_interval: 0,
            freeze_countdown: 0,
        }
    }

    /// Choose an action for a single observation.
    ///
    /// The observation is wrapped into a batch of one and run through the
    /// frozen estimator when freezing is enabled (the frozen copy serves
    /// acting as well as target computation), otherwise the live one. The
    /// resulting values go through [`Control::select`].
    pub fn act(&mut self, observation: ArrayView1<f32>, greedy: bool) -> Result<usize> {
        let observations = observation.insert_axis(Axis(0));
        let q_values = match self.frozen_estimator.as_ref() {
            Some(frozen) => frozen.predict(observations),
            None => self.estimator.predict(observations),
        };
        let actions = self.control.select(q_values.view(), greedy)?;
        Ok(actions[0])
    }

    /// Record one environment transition in the replay memory.
    pub fn remember(
        &mut self,
        observation: ArrayView1<f32>,
        action: usize,
        reward: f32,
        done: bool,
        next_observation: Option<ArrayView1<f32>>,
    ) -> Result<()> {
        self.memory
            .remember(observation, action, reward, done, next_observation)
    }

    /// Perform one learning step.
    ///
    /// Returns `Ok(None)` while the memory holds fewer than `sample_size`
    /// transitions, so the outer loop can call this every step without
    /// special-casing warm-up. Otherwise: draw a uniform sample, compute
    /// targets against the frozen estimator when enabled, regress the
    /// taken-action values toward them with one gradient step on the live
    /// estimator, run the periodic frozen sync, decay the exploration
    /// constant, and report the step's metrics.
    pub fn learn(&mut self) -> Result<Option<LearnMetrics>> {
        if self.memory.len() < self.sample_size {
            trace!(
                "learn skipped: {} of {} transitions buffered",
                self.memory.len(),
                self.sample_size
            );
            return Ok(None);
        }

        let batch = self.memory.sample(self.sample_size, SampleMethod::Uniform)?;

        let targets = {
            let target_estimator: &dyn ValueEstimator = match self.frozen_estimator.as_ref() {
                Some(frozen) => frozen,
                None => &self.estimator,
            };
            self.evaluation.evaluate(
                batch.rewards.view(),
                &batch.dones,
                batch.next_observations.view(),
                target_estimator,
            )?
        };

        // Gather the taken-action estimates for the loss, then write the
        // targets over them: entries left at their current predictions
        // contribute zero gradient in `fit`.
        let mut fitted = self.estimator.predict(batch.observations.view());
        let mut loss = 0.0;
        for (row, &action) in batch.actions.iter().enumerate() {
            let residual = fitted[[row, action]] - targets[row];
            loss += residual * residual;
            fitted[[row, action]] = targets[row];
        }
        let loss = loss / batch.len() as f32;

        self.estimator
            .fit(batch.observations.view(), fitted.view(), self.learning_rate)?;

        if self.freeze_interval > 0 {
            self.freeze_countdown -= 1;
            if self.freeze_countdown == 0 {
                if let Some(frozen) = self.frozen_estimator.as_mut() {
                    frozen.copy_parameters_from(&self.estimator)?;
                }
                self.freeze_countdown = self.freeze_interval;
                debug!(
                    "synced frozen estimator, next sync in {} steps",
                    self.freeze_interval
                );
            }
        }

        self.control.update_exploration(None);

        Ok(Some(LearnMetrics {
            loss,
            exploration: self.control.exploration(),
            learning_rate: self.learning_rate,
        }))
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn estimator(&self) -> &V {
        &self.estimator
    }

    pub fn estimator_mut(&mut self) -> &mut V {
        &mut self.estimator
    }

    /// The frozen target copy, when freezing is enabled.
    pub fn frozen_estimator(&self) -> Option<&V> {
        self.frozen_estimator.as_ref()
    }

    pub fn control(&self) -> &dyn Control {
        self.control.as_ref()
    }

    pub fn control_mut(&mut self) -> &mut dyn Control {
        self.control.as_mut()
    }

    pub fn exploration(&self) -> f32 {
        self.control.exploration()
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

/// Builder for [`DqnAgent`].
///
/// Scalar options configure the built-in [`EpsilonGreedy`] and
/// [`QLearning`] components; supplying a custom [`control`] or
/// [`evaluation`] replaces the corresponding built-in, and the scalar
/// options for it are ignored.
///
/// [`control`]: DqnAgentBuilder::control
/// [`evaluation`]: DqnAgentBuilder::evaluation
pub struct DqnAgentBuilder {
    sample_size: usize,
    learning_rate: f32,
    discount: f32,
    exploration: f32,
    exploration_decay: f32,
    max_memory_len: usize,
    freeze_interval: usize,
    control: Option<Box<dyn Control>>,
    evaluation: Option<Box<dyn Evaluation>>,
}

impl DqnAgentBuilder {
    pub const DEFAULT_SAMPLE_SIZE: usize = 32;
    pub const DEFAULT_LEARNING_RATE: f32 = 1e-3;
    pub const DEFAULT_MAX_MEMORY_LEN: usize = 1000;

    pub fn new() -> Self {
        DqnAgentBuilder {
            sample_size: Self::DEFAULT_SAMPLE_SIZE,
            learning_rate: Self::DEFAULT_LEARNING_RATE,
            discount: 0.99,
            exploration: 0.1,
            exploration_decay: 0.0,
            max_memory_len: Self::DEFAULT_MAX_MEMORY_LEN,
            freeze_interval: 0,
            control: None,
            evaluation: None,
        }
    }

    /// Transitions drawn per learning step.
    pub fn sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Discount factor for the built-in Q-Learning targets.
    pub fn discount(mut self, discount: f32) -> Self {
        self.discount = discount;
        self
    }

    /// Initial exploration constant for the built-in epsilon-greedy policy.
    pub fn exploration(mut self, exploration: f32) -> Self {
        self.exploration = exploration;
        self
    }

    /// Per-learning-step exploration decay for the built-in policy.
    pub fn exploration_decay(mut self, exploration_decay: f32) -> Self {
        self.exploration_decay = exploration_decay;
        self
    }

    /// Replay memory capacity.
    pub fn max_memory_len(mut self, max_memory_len: usize) -> Self {
        self.max_memory_len = max_memory_len;
        self
    }

    /// Learning steps between frozen-estimator syncs; 0 disables freezing.
    pub fn freeze_interval(mut self, freeze_interval: usize) -> Self {
        self.freeze_interval = freeze_interval;
        self
    }

    /// Replace the built-in exploration policy.
    pub fn control(mut self, control: Box<dyn Control>) -> Self {
        self.control = Some(control);
        self
    }

    /// Replace the built-in target rule.
    pub fn evaluation(mut self, evaluation: Box<dyn Evaluation>) -> Self {
        self.evaluation = Some(evaluation);
        self
    }

    /// Validate the configuration and assemble the agent around
    /// `estimator`. A positive `freeze_interval` clones the estimator for
    /// the frozen target copy.
    pub fn build<V: ValueEstimator + Clone>(self, estimator: V) -> Result<DqnAgent<V>> {
        if self.sample_size == 0 {
            return Err(DeepqError::invalid_parameter(
                "sample_size",
                "must be at least 1",
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(DeepqError::invalid_parameter(
                "learning_rate",
                "must be a positive finite value",
            ));
        }
        if self.max_memory_len == 0 {
            return Err(DeepqError::invalid_parameter(
                "max_memory_len",
                "must be at least 1",
            ));
        }

        let control: Box<dyn Control> = match self.control {
            Some(control) => control,
            None => Box::new(EpsilonGreedy::new(self.exploration, self.exploration_decay)?),
        };
        let evaluation: Box<dyn Evaluation> = match self.evaluation {
            Some(evaluation) => evaluation,
            None => Box::new(QLearning::new(self.discount)?),
        };

        let frozen_estimator = if self.freeze_interval > 0 {
            Some(estimator.clone())
        } else {
            None
        };

        Ok(DqnAgent {
            estimator,
            frozen_estimator,
            memory: Memory::new(self.max_memory_len),
            control,
            evaluation,
            sample_size: self.sample_size,
            learning_rate: self.learning_rate,
            freeze_interval: self.freeze_interval,
            freeze_countdown: self.freeze_interval,
        })
    }
}

impl Default for DqnAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
