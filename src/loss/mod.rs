//! # Loss Metrics
//!
//! Regression losses between a prediction matrix and a ground-truth matrix of the
//! same shape, averaged over every element.
//!
//! Each metric is a unit struct implementing [`LossFunction`]; [`LossMetric`] names
//! them for configuration, and [`Loss`] binds a metric to a ground truth.

use crate::backend::{Backend, Tensor2D};
use crate::error::LossError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A loss function over two same-shaped matrices.
///
/// Callers guarantee equal shapes; [`Loss::get_loss`] checks them.
pub trait LossFunction<B: Backend> {
    /// Mean loss over all elements.
    fn loss(&self, prediction: &Tensor2D<B>, target: &Tensor2D<B>) -> f64;
}

fn element_count<B: Backend>(t: &Tensor2D<B>) -> f64 {
    let (rows, cols) = t.shape();
    (rows * cols) as f64
}

/// Mean Squared Error: `L = (1/n) * Σ(pred_i - target_i)^2`
pub struct MSELoss;

impl<B: Backend> LossFunction<B> for MSELoss {
    fn loss(&self, prediction: &Tensor2D<B>, target: &Tensor2D<B>) -> f64 {
        let diff = prediction.sub(target);
        diff.dot(&diff) / element_count(&diff)
    }
}

/// Mean Absolute Error: `L = (1/n) * Σ|pred_i - target_i|`
pub struct MAELoss;

impl<B: Backend> LossFunction<B> for MAELoss {
    fn loss(&self, prediction: &Tensor2D<B>, target: &Tensor2D<B>) -> f64 {
        prediction.sub(target).map(f64::abs).mean()
    }
}

/// Mean Squared Logarithmic Error:
/// `L = (1/n) * Σ(ln(1 + max(pred_i, ε)) - ln(1 + max(target_i, ε)))^2`
///
/// Both operands are clipped at `ε = 1e-7` so negative values stay finite.
pub struct MSLELoss;

/// Lower clip applied by [`MSLELoss`].
pub const MSLE_EPSILON: f64 = 1e-7;

impl<B: Backend> LossFunction<B> for MSLELoss {
    fn loss(&self, prediction: &Tensor2D<B>, target: &Tensor2D<B>) -> f64 {
        let log1p_clipped = |v: f64| v.max(MSLE_EPSILON).ln_1p();
        let diff = prediction.map(log1p_clipped).sub(&target.map(log1p_clipped));
        diff.dot(&diff) / element_count(&diff)
    }
}

/// Log-Cosh loss: `L = (1/n) * Σ ln(cosh(pred_i - target_i))`
///
/// Evaluated as `x + softplus(-2x) - ln 2`, which does not overflow for large `|x|`.
pub struct LogCoshLoss;

fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn log_cosh(x: f64) -> f64 {
    x + softplus(-2.0 * x) - std::f64::consts::LN_2
}

impl<B: Backend> LossFunction<B> for LogCoshLoss {
    fn loss(&self, prediction: &Tensor2D<B>, target: &Tensor2D<B>) -> f64 {
        prediction.sub(target).map(log_cosh).mean()
    }
}

/// Metric selector for configs and training loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossMetric {
    Mse,
    Mae,
    Msle,
    LogCosh,
}

impl LossMetric {
    /// Evaluates the metric; shapes must already match.
    pub fn evaluate<B: Backend>(&self, prediction: &Tensor2D<B>, target: &Tensor2D<B>) -> f64 {
        match self {
            LossMetric::Mse => MSELoss.loss(prediction, target),
            LossMetric::Mae => MAELoss.loss(prediction, target),
            LossMetric::Msle => MSLELoss.loss(prediction, target),
            LossMetric::LogCosh => LogCoshLoss.loss(prediction, target),
        }
    }
}

impl fmt::Display for LossMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LossMetric::Mse => "mse",
            LossMetric::Mae => "mae",
            LossMetric::Msle => "msle",
            LossMetric::LogCosh => "log_cosh",
        };
        f.write_str(name)
    }
}

impl FromStr for LossMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "mse" => Ok(LossMetric::Mse),
            "mae" => Ok(LossMetric::Mae),
            "msle" => Ok(LossMetric::Msle),
            "log_cosh" | "logcosh" => Ok(LossMetric::LogCosh),
            other => Err(format!("unknown loss metric '{}'", other)),
        }
    }
}

/// A metric bound to a ground-truth matrix.
///
/// ```rust
/// use tabletrain::backend::{CpuBackend, Tensor2D};
/// use tabletrain::loss::{Loss, LossMetric};
///
/// let truth = Tensor2D::<CpuBackend>::new(vec![1.0, 2.0, 3.0], 3, 1);
/// let pred = Tensor2D::<CpuBackend>::new(vec![1.0, 2.0, 5.0], 3, 1);
/// let mse = Loss::new(&truth, LossMetric::Mse).unwrap();
/// assert!((mse.get_loss(&pred).unwrap() - 4.0 / 3.0).abs() < 1e-12);
/// ```
pub struct Loss<'a, B: Backend> {
    ground_truth: &'a Tensor2D<B>,
    metric: LossMetric,
}

impl<'a, B: Backend> Loss<'a, B> {
    /// # Errors
    /// [`LossError::EmptyData`] if `ground_truth` has no elements.
    pub fn new(ground_truth: &'a Tensor2D<B>, metric: LossMetric) -> Result<Self, LossError> {
        if ground_truth.is_empty() {
            return Err(LossError::EmptyData);
        }
        Ok(Self {
            ground_truth,
            metric,
        })
    }

    pub fn metric(&self) -> LossMetric {
        self.metric
    }

    /// # Errors
    /// [`LossError::ShapeMismatch`] if `prediction` differs in shape from the ground truth.
    pub fn get_loss(&self, prediction: &Tensor2D<B>) -> Result<f64, LossError> {
        if prediction.shape() != self.ground_truth.shape() {
            return Err(LossError::ShapeMismatch {
                expected: self.ground_truth.shape(),
                got: prediction.shape(),
            });
        }
        Ok(self.metric.evaluate(prediction, self.ground_truth))
    }
}
