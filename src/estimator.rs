use ndarray::{Array1, Array2, ArrayView2};

use crate::error::Result;

/// Interface to the externally-owned value model.
///
/// The agent never constructs an estimator and never looks inside one: it
/// forwards observation batches, requests single gradient steps, and copies
/// parameters between structurally-identical instances for target freezing.
/// The estimator owns its architecture, its training-mode forward pass, its
/// gradient computation and its optimizer algorithm.
///
/// # Example
///
/// ```rust
/// use deepq::error::Result;
/// use deepq::estimator::ValueEstimator;
/// use ndarray::{Array1, Array2, ArrayView2};
///
/// /// A bias-free linear model: Q = observations · weights.
/// #[derive(Clone)]
/// struct Linear {
///     weights: Array2<f32>,
/// }
///
/// impl ValueEstimator for Linear {
///     fn predict(&self, observations: ArrayView2<f32>) -> Array2<f32> {
///         observations.dot(&self.weights)
///     }
///
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
///
///     fn parameters(&self) -> Vec<Array1<f32>> {
///         vec![Array1::from_iter(self.weights.iter().copied())]
///     }
///
///     fn set_parameters(&mut self, parameters: &[Array1<f32>]) -> Result<()> {
///         for (weight, &value) in self.weights.iter_mut().zip(parameters[0].iter()) {
///             *weight = value;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait ValueEstimator {
    /// Inference-mode forward pass.
    ///
    /// Maps a `batch × width` observation block to a `batch × actions`
    /// value block.
    fn predict(&self, observations: ArrayView2<f32>) -> Array2<f32>;

    /// Apply one gradient-descent step pulling the estimator's outputs
    /// toward `targets` (same `batch × actions` shape as [`predict`]).
    ///
    /// Target entries equal to the current predictions contribute zero
    /// gradient, so a caller can update a subset of actions by writing
    /// into a prediction matrix. Runs the forward pass in training mode.
    ///
    /// [`predict`]: ValueEstimator::predict
    fn fit(
        &mut self,
        observations: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        learning_rate: f32,
    ) -> Result<()>;

    /// Enumerate the trainable parameters as flat arrays.
    ///
    /// The grouping is estimator-defined; it only has to agree between
    /// structurally-identical instances so that [`set_parameters`] can
    /// consume the output of [`parameters`].
    ///
    /// [`parameters`]: ValueEstimator::parameters
    /// [`set_parameters`]: ValueEstimator::set_parameters
    fn parameters(&self) -> Vec<Array1<f32>>;

    /// Overwrite the trainable parameters from a [`parameters`] enumeration.
    ///
    /// [`parameters`]: ValueEstimator::parameters
    fn set_parameters(&mut self, parameters: &[Array1<f32>]) -> Result<()>;

    /// Overwrite this estimator's parameters from a structurally-identical
    /// source. Used to sync a frozen target copy at its scheduled cadence.
    fn copy_parameters_from(&mut self, source: &dyn ValueEstimator) -> Result<()> {
        self.set_parameters(&source.parameters())
    }
}
