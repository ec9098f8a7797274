//! # Training
//!
//! [`Trainer`] is the lifecycle every trainer follows:
//!
//! ```text
//! Untrained --fit--> Trained --set_learning_rate--> Untrained
//! ```
//!
//! A trainer owns the [`DataTable`] it was built with. `fit` runs the epoch loop on
//! the train split; `predict`, `compute_eval_loss` and `compute_test_loss` require a
//! trained model.
//!
//! [`OlsGdTrainer`] fits a linear least-squares model `Y ≈ [X | 1] Wᵀ` by full-batch
//! gradient descent.

pub mod ols;

pub use ols::{OlsGdTrainer, OlsGdTrainerBuilder, WeightBiasParams};

use crate::backend::{Backend, Tensor2D};
use crate::error::TrainerError;
use crate::loss::{Loss, LossMetric};
use crate::table::{DataTable, Split};
use serde::{Deserialize, Serialize};

/// Step size policy for gradient descent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningRate {
    /// Fixed user-supplied step.
    Constant(f64),
    /// `1 / ||X_aug||²`, the inverse of an upper bound on the Lipschitz
    /// constant of the least-squares gradient.
    Lipschitz,
    /// Starts from the Lipschitz step, then uses the Barzilai-Borwein step
    /// `(s·s) / (s·y)` whenever the curvature `s·y` is positive.
    BarzilaiBorwein,
}

impl LearningRate {
    pub fn validate(&self) -> Result<(), TrainerError> {
        match *self {
            LearningRate::Constant(lr) if !(lr.is_finite() && lr > 0.0) => {
                Err(TrainerError::InvalidParameter(format!(
                    "learning rate must be finite and positive, got {}",
                    lr
                )))
            }
            _ => Ok(()),
        }
    }

    /// `true` for the step sizes derived from the data.
    pub fn is_variable(&self) -> bool {
        !matches!(self, LearningRate::Constant(_))
    }
}

impl Default for LearningRate {
    fn default() -> Self {
        LearningRate::Constant(0.01)
    }
}

/// Hyperparameters shared by trainers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub learning_rate: LearningRate,
    /// Training stops as converged once the loss falls below this value.
    pub tolerance: f64,
    /// Log every epoch at `info` level instead of `trace`.
    pub verbose: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_rate: LearningRate::default(),
            tolerance: 1e-6,
            verbose: false,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), TrainerError> {
        self.learning_rate.validate()?;
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(TrainerError::InvalidParameter(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Outcome of one `fit` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub epochs_run: usize,
    pub final_loss: f64,
    /// Loss fell below the tolerance.
    pub converged: bool,
    /// Early stopping ended the loop.
    pub stopped_early: bool,
    /// Step size in effect at the last epoch.
    pub learning_rate: f64,
    /// Training loss after each epoch.
    pub loss_history: Vec<f64>,
}

/// Training lifecycle over an owned [`DataTable`].
pub trait Trainer<B: Backend> {
    /// Runs up to `epochs` epochs on the train split and marks the trainer trained.
    fn fit(&mut self, epochs: usize, metric: LossMetric) -> Result<FitReport, TrainerError>;

    /// `Some(patience)` stops `fit` after `patience` epochs without improvement;
    /// `None` disables early stopping.
    fn set_early_stop(&mut self, patience: Option<usize>);

    /// [`fit`](Self::fit) with early stopping enabled for this call only.
    ///
    /// Early stopping is disabled again afterwards, whether or not `fit` succeeded.
    fn fit_with_patience(
        &mut self,
        epochs: usize,
        metric: LossMetric,
        patience: usize,
    ) -> Result<FitReport, TrainerError> {
        self.set_early_stop(Some(patience));
        let result = self.fit(epochs, metric);
        self.set_early_stop(None);
        result
    }

    fn predict(&self, input: &Tensor2D<B>) -> Result<Tensor2D<B>, TrainerError>;

    fn is_trained(&self) -> bool;

    fn data_table(&self) -> &DataTable<B>;

    /// Loss of the predictions on the test split.
    ///
    /// # Errors
    /// [`TrainerError::NotTrained`] before training, [`TrainerError::MissingSplit`]
    /// when the table has no test split.
    fn compute_test_loss(&self, metric: LossMetric) -> Result<f64, TrainerError> {
        split_loss(self, self.data_table().test(), "test", metric)
    }

    /// Loss of the predictions on the eval split.
    fn compute_eval_loss(&self, metric: LossMetric) -> Result<f64, TrainerError> {
        split_loss(self, self.data_table().eval(), "eval", metric)
    }
}

fn split_loss<B, T>(
    trainer: &T,
    split: Option<&Split<B>>,
    name: &'static str,
    metric: LossMetric,
) -> Result<f64, TrainerError>
where
    B: Backend,
    T: Trainer<B> + ?Sized,
{
    if !trainer.is_trained() {
        return Err(TrainerError::NotTrained);
    }
    let split = split.ok_or(TrainerError::MissingSplit(name))?;
    let prediction = trainer.predict(split.x())?;
    Ok(Loss::new(split.y(), metric)?.get_loss(&prediction)?)
}
