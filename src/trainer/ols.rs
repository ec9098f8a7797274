//! Ordinary least squares fitted by full-batch gradient descent.

use super::{FitReport, LearningRate, Trainer, TrainerConfig};
use crate::backend::{Backend, Tensor2D};
use crate::error::TrainerError;
use crate::loss::LossMetric;
use crate::serialization::{read_params, write_params};
use crate::table::DataTable;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::path::Path;

/// Serializable weights of a trained [`OlsGdTrainer`].
///
/// `weight_bias` is row-major with shape `n_labels x (n_features + 1)`; the last
/// column holds the bias.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightBiasParams {
    pub n_features: usize,
    pub n_labels: usize,
    pub weight_bias: Vec<f64>,
}

/// Linear least-squares trainer.
///
/// Learns `W` (shape `labels x (features + 1)`) minimizing `½||X_aug Wᵀ - Y||²`
/// where `X_aug = [X | 1]`. The gradient `W Z - K` uses the Gram matrix
/// `Z = X_augᵀ X_aug` and `K = Yᵀ X_aug`, both computed once per `fit`, so epochs
/// never touch the raw rows.
///
/// ```rust
/// use tabletrain::backend::{CpuBackend, Tensor2D};
/// use tabletrain::loss::LossMetric;
/// use tabletrain::table::DataTable;
/// use tabletrain::trainer::{LearningRate, OlsGdTrainer, Trainer};
///
/// // y = 2x + 1
/// let data = Tensor2D::<CpuBackend>::from_rows(&[
///     vec![-1.0, -1.0],
///     vec![0.0, 1.0],
///     vec![1.0, 3.0],
/// ]);
/// let table = DataTable::builder(&data).labels(vec![1]).build().unwrap();
/// let mut trainer = OlsGdTrainer::builder()
///     .learning_rate(LearningRate::Lipschitz)
///     .tolerance(1e-12)
///     .build(table)
///     .unwrap();
///
/// let report = trainer.fit(1000, LossMetric::Mse).unwrap();
/// assert!(report.converged);
///
/// let y = trainer.predict(&Tensor2D::new(vec![2.0], 1, 1)).unwrap();
/// assert!((y.get(0, 0) - 5.0).abs() < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct OlsGdTrainer<B: Backend> {
    table: DataTable<B>,
    config: TrainerConfig,
    is_trained: bool,
    is_early_stop: bool,
    patience: usize,
    converged: bool,
    weight_bias: Option<Tensor2D<B>>,
    effective_learning_rate: Option<f64>,
}

/// Fluent builder for [`OlsGdTrainer`].
///
/// Defaults:
/// - `learning_rate`: `Constant(0.01)`
/// - `tolerance`: 1e-6
/// - `verbose`: false
/// - early stopping disabled
#[derive(Debug, Clone)]
pub struct OlsGdTrainerBuilder<B: Backend> {
    config: TrainerConfig,
    patience: Option<usize>,
    _backend: PhantomData<B>,
}

impl<B: Backend> Default for OlsGdTrainerBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> OlsGdTrainerBuilder<B> {
    pub fn new() -> Self {
        Self {
            config: TrainerConfig::default(),
            patience: None,
            _backend: PhantomData,
        }
    }

    pub fn learning_rate(mut self, rate: LearningRate) -> Self {
        self.config.learning_rate = rate;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Sets verbosity for training output.
    ///
    /// When `true`, every epoch's loss is logged at `info` level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Enables early stopping for every `fit` call.
    pub fn early_stop(mut self, patience: usize) -> Self {
        self.patience = Some(patience);
        self
    }

    pub fn config(mut self, config: TrainerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self, table: DataTable<B>) -> Result<OlsGdTrainer<B>, TrainerError> {
        let mut trainer = OlsGdTrainer::new(table, self.config)?;
        trainer.set_early_stop(self.patience);
        Ok(trainer)
    }
}

impl<B: Backend> OlsGdTrainer<B> {
    /// Takes ownership of `table`.
    ///
    /// # Errors
    /// - [`TrainerError::InvalidData`] if the train split is empty or its feature
    ///   and label row counts differ
    /// - [`TrainerError::InvalidParameter`] for an invalid config
    pub fn new(table: DataTable<B>, config: TrainerConfig) -> Result<Self, TrainerError> {
        let (x, y) = (table.x_train(), table.y_train());
        if x.is_empty() || y.is_empty() {
            return Err(TrainerError::InvalidData(format!(
                "empty train split: x {:?}, y {:?}",
                x.shape(),
                y.shape()
            )));
        }
        if x.rows() != y.rows() {
            return Err(TrainerError::InvalidData(format!(
                "x_train has {} rows, y_train has {}",
                x.rows(),
                y.rows()
            )));
        }
        config.validate()?;

        debug!(
            "OlsGdTrainer: {} rows, {} features, {} labels, {:?}",
            x.rows(),
            x.cols(),
            y.cols(),
            config.learning_rate
        );

        Ok(Self {
            table,
            config,
            is_trained: false,
            is_early_stop: false,
            patience: 0,
            converged: false,
            weight_bias: None,
            effective_learning_rate: None,
        })
    }

    pub fn builder() -> OlsGdTrainerBuilder<B> {
        OlsGdTrainerBuilder::new()
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn learning_rate(&self) -> LearningRate {
        self.config.learning_rate
    }

    /// Step size used in the last epoch of the last successful `fit`.
    pub fn effective_learning_rate(&self) -> Option<f64> {
        self.effective_learning_rate
    }

    /// Replaces the step size policy and resets the trainer to untrained.
    pub fn set_learning_rate(&mut self, rate: LearningRate) -> Result<(), TrainerError> {
        rate.validate()?;
        self.config.learning_rate = rate;
        self.reset();
        Ok(())
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn is_early_stop(&self) -> bool {
        self.is_early_stop
    }

    pub fn patience(&self) -> usize {
        self.patience
    }

    /// Learned matrix, `labels x (features + 1)` with the bias last.
    pub fn weight_bias(&self) -> Option<&Tensor2D<B>> {
        self.weight_bias.as_ref()
    }

    /// Bias of each label.
    pub fn bias(&self) -> Option<Vec<f64>> {
        self.weight_bias
            .as_ref()
            .map(|w| w.column(self.table.n_features()))
    }

    pub fn into_data_table(self) -> DataTable<B> {
        self.table
    }

    fn reset(&mut self) {
        self.is_trained = false;
        self.converged = false;
        self.weight_bias = None;
        self.effective_learning_rate = None;
    }

    fn augment(x: &Tensor2D<B>) -> Tensor2D<B> {
        x.hcat(&Tensor2D::full(x.rows(), 1, 1.0))
    }

    pub fn extract_params(&self) -> Result<WeightBiasParams, TrainerError> {
        let weight_bias = self.weight_bias.as_ref().ok_or(TrainerError::NotTrained)?;
        Ok(WeightBiasParams {
            n_features: self.table.n_features(),
            n_labels: self.table.n_labels(),
            weight_bias: weight_bias.to_vec(),
        })
    }

    /// Installs previously extracted weights and marks the trainer trained.
    ///
    /// # Errors
    /// [`TrainerError::FeatureMismatch`] if the parameters were fitted on a different
    /// number of features, [`TrainerError::InvalidParameter`] for any other
    /// inconsistency.
    pub fn load_params(&mut self, params: WeightBiasParams) -> Result<(), TrainerError> {
        let (p, q) = (self.table.n_features(), self.table.n_labels());
        if params.n_features != p {
            return Err(TrainerError::FeatureMismatch {
                expected_features: p,
                got_features: params.n_features,
            });
        }
        if params.n_labels != q {
            return Err(TrainerError::InvalidParameter(format!(
                "expected {} labels, got {}",
                q, params.n_labels
            )));
        }
        if params.weight_bias.len() != q * (p + 1) {
            return Err(TrainerError::InvalidParameter(format!(
                "expected {} weights, got {}",
                q * (p + 1),
                params.weight_bias.len()
            )));
        }
        if params.weight_bias.iter().any(|w| !w.is_finite()) {
            return Err(TrainerError::InvalidParameter(
                "weights must be finite".to_string(),
            ));
        }

        self.weight_bias = Some(Tensor2D::new(params.weight_bias, q, p + 1));
        self.is_trained = true;
        self.converged = false;
        self.effective_learning_rate = None;
        Ok(())
    }

    pub fn save_params_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TrainerError> {
        write_params::<_, TrainerError>(&self.extract_params()?, path)
    }

    pub fn load_params_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), TrainerError> {
        let params: WeightBiasParams = read_params::<_, TrainerError>(path)?;
        self.load_params(params)
    }
}

impl<B: Backend> Trainer<B> for OlsGdTrainer<B> {
    fn fit(&mut self, epochs: usize, metric: LossMetric) -> Result<FitReport, TrainerError> {
        if epochs == 0 {
            return Err(TrainerError::InvalidParameter(
                "epochs must be positive".to_string(),
            ));
        }
        if self.is_early_stop && self.patience == 0 {
            return Err(TrainerError::InvalidParameter(
                "patience must be positive".to_string(),
            ));
        }
        self.reset();

        let y = self.table.y_train();
        let x_aug = Self::augment(self.table.x_train());
        let (_, p1) = x_aug.shape();
        let q = y.cols();

        let x_norm = x_aug.norm();
        let mut w = Tensor2D::<B>::full(q, p1, y.norm() / x_norm);

        let z = x_aug.transpose().matmul(&x_aug);
        let k = y.transpose().matmul(&x_aug);

        let lipschitz_lr = 1.0 / (x_norm * x_norm);
        let mut lr = match self.config.learning_rate {
            LearningRate::Constant(lr) => lr,
            LearningRate::Lipschitz | LearningRate::BarzilaiBorwein => lipschitz_lr,
        };
        let adaptive = self.config.learning_rate == LearningRate::BarzilaiBorwein;

        let mut previous: Option<(Tensor2D<B>, Tensor2D<B>)> = None;
        let mut best = f64::INFINITY;
        let mut since_best = 0;
        let mut converged = false;
        let mut stopped_early = false;
        let mut loss_history = Vec::with_capacity(epochs);

        for epoch in 1..=epochs {
            let grad = w.matmul(&z).sub(&k);

            if adaptive {
                if let Some((w_prev, grad_prev)) = &previous {
                    let s = w.sub(w_prev);
                    let dg = grad.sub(grad_prev);
                    let curvature = s.dot(&dg);
                    if curvature > 0.0 {
                        let step = s.dot(&s) / curvature;
                        if step.is_finite() && step > 0.0 {
                            lr = step;
                        }
                    }
                }
                previous = Some((w.clone(), grad.clone()));
            }

            w = w.sub(&grad.scale(lr));

            let loss = metric.evaluate(&x_aug.matmul(&w.transpose()), y);
            loss_history.push(loss);

            if !loss.is_finite() {
                warn!(
                    "Training diverged at epoch {}: {} = {} (learning rate {})",
                    epoch, metric, loss, lr
                );
                return Err(TrainerError::Diverged { epoch, loss });
            }

            if self.config.verbose {
                info!("Epoch {}: {} = {}", epoch, metric, loss);
            } else {
                trace!("Epoch {}: {} = {}", epoch, metric, loss);
            }

            if loss < self.config.tolerance {
                converged = true;
                break;
            }

            if loss < best {
                best = loss;
                since_best = 0;
            } else {
                since_best += 1;
                if self.is_early_stop && since_best >= self.patience {
                    stopped_early = true;
                    break;
                }
            }
        }

        let report = FitReport {
            epochs_run: loss_history.len(),
            final_loss: loss_history.last().copied().unwrap_or(f64::NAN),
            converged,
            stopped_early,
            learning_rate: lr,
            loss_history,
        };

        if converged {
            info!(
                "Converged after {} epochs: {} = {}",
                report.epochs_run, metric, report.final_loss
            );
        } else {
            warn!(
                "Stopped after {} epochs without converging{}: {} = {} (tolerance {})",
                report.epochs_run,
                if stopped_early { " (early stop)" } else { "" },
                metric,
                report.final_loss,
                self.config.tolerance
            );
        }

        self.weight_bias = Some(w);
        self.effective_learning_rate = Some(lr);
        self.converged = converged;
        self.is_trained = true;
        Ok(report)
    }

    fn set_early_stop(&mut self, patience: Option<usize>) {
        match patience {
            Some(patience) => {
                self.is_early_stop = true;
                self.patience = patience;
            }
            None => self.is_early_stop = false,
        }
    }

    fn predict(&self, input: &Tensor2D<B>) -> Result<Tensor2D<B>, TrainerError> {
        let weight_bias = match (&self.weight_bias, self.is_trained) {
            (Some(w), true) => w,
            _ => return Err(TrainerError::NotTrained),
        };
        let n_features = self.table.n_features();
        if input.cols() != n_features {
            return Err(TrainerError::FeatureMismatch {
                expected_features: n_features,
                got_features: input.cols(),
            });
        }
        Ok(Self::augment(input).matmul(&weight_bias.transpose()))
    }

    fn is_trained(&self) -> bool {
        self.is_trained
    }

    fn data_table(&self) -> &DataTable<B> {
        &self.table
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;
    use crate::table::{Split, SplitSpec};

    type T = Tensor2D<CpuBackend>;

    /// Rows over the grid {-1, 0, 1}², label `2 x0 - 3 x1 + 5`.
    ///
    /// The augmented columns are orthogonal, so the Gram matrix is diag(6, 6, 9).
    fn grid_rows() -> Vec<Vec<f64>> {
        let mut rows = Vec::new();
        for a in [-1.0, 0.0, 1.0] {
            for b in [-1.0, 0.0, 1.0] {
                rows.push(vec![a, b, 2.0 * a - 3.0 * b + 5.0]);
            }
        }
        rows
    }

    fn grid_table() -> DataTable<CpuBackend> {
        DataTable::builder(&T::from_rows(&grid_rows()))
            .labels(vec![2])
            .build()
            .unwrap()
    }

    /// The grid repeated four times with eval/test splits that see the same points.
    fn split_grid_table() -> DataTable<CpuBackend> {
        let rows: Vec<Vec<f64>> = (0..4).flat_map(|_| grid_rows()).collect();
        let config = crate::table::DataTableConfig::labels(vec![2]).with_split(
            SplitSpec::EvalTest {
                eval_percent: 25,
                test_percent: 25,
            },
        );
        DataTable::new(&T::from_rows(&rows), &config).unwrap()
    }

    fn assert_recovers_grid(trainer: &OlsGdTrainer<CpuBackend>) {
        let w = trainer.weight_bias().unwrap().to_vec();
        for (got, want) in w.iter().zip([2.0, -3.0, 5.0]) {
            assert!((got - want).abs() < 1e-4, "weights {:?}", w);
        }
    }

    // === Builder ===

    #[test]
    fn test_builder_default_values() {
        let builder = OlsGdTrainerBuilder::<CpuBackend>::new();
        assert_eq!(builder.config, TrainerConfig::default());
        assert_eq!(builder.patience, None);
    }

    #[test]
    fn test_builder_custom_values() {
        let trainer = OlsGdTrainer::builder()
            .learning_rate(LearningRate::Lipschitz)
            .tolerance(1e-3)
            .verbose(true)
            .early_stop(7)
            .build(grid_table())
            .unwrap();

        assert_eq!(trainer.learning_rate(), LearningRate::Lipschitz);
        assert_eq!(trainer.config().tolerance, 1e-3);
        assert!(trainer.config().verbose);
        assert!(trainer.is_early_stop());
        assert_eq!(trainer.patience(), 7);
        assert!(!trainer.is_trained());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = OlsGdTrainer::builder()
            .learning_rate(LearningRate::Constant(0.0))
            .build(grid_table());
        assert!(matches!(result, Err(TrainerError::InvalidParameter(_))));

        let result = OlsGdTrainer::builder()
            .tolerance(f64::NAN)
            .build(grid_table());
        assert!(matches!(result, Err(TrainerError::InvalidParameter(_))));
    }

    // === Fit ===

    #[test]
    fn test_fit_lipschitz_recovers_weights() {
        let mut trainer = OlsGdTrainer::builder()
            .learning_rate(LearningRate::Lipschitz)
            .tolerance(1e-12)
            .build(grid_table())
            .unwrap();

        let report = trainer.fit(1000, LossMetric::Mse).unwrap();

        assert!(report.converged);
        assert!(!report.stopped_early);
        assert!(report.epochs_run < 1000);
        assert_eq!(report.loss_history.len(), report.epochs_run);
        // ||X_aug||² = 6 + 6 + 9
        assert!((report.learning_rate - 1.0 / 21.0).abs() < 1e-15);
        assert!(trainer.is_trained());
        assert!(trainer.converged());
        assert_recovers_grid(&trainer);
        assert_eq!(trainer.bias().map(|b| b.len()), Some(1));
    }

    #[test]
    fn test_fit_constant_rate_recovers_weights() {
        let mut trainer = OlsGdTrainer::builder()
            .tolerance(1e-12)
            .build(grid_table())
            .unwrap();
        let report = trainer.fit(5000, LossMetric::Mse).unwrap();

        assert!(report.converged);
        assert_eq!(report.learning_rate, 0.01);
        assert_recovers_grid(&trainer);
    }

    #[test]
    fn test_fit_barzilai_borwein_recovers_weights() {
        let mut trainer = OlsGdTrainer::builder()
            .learning_rate(LearningRate::BarzilaiBorwein)
            .tolerance(1e-12)
            .build(grid_table())
            .unwrap();

        let report = trainer.fit(1000, LossMetric::Mse).unwrap();
        assert!(report.converged);
        assert_recovers_grid(&trainer);
    }

    #[test]
    fn test_fit_loss_decreases_with_every_metric() {
        for metric in [
            LossMetric::Mse,
            LossMetric::Mae,
            LossMetric::Msle,
            LossMetric::LogCosh,
        ] {
            let mut trainer = OlsGdTrainer::builder()
                .learning_rate(LearningRate::Lipschitz)
                .tolerance(0.0)
                .build(grid_table())
                .unwrap();
            let report = trainer.fit(50, metric).unwrap();
            let first = report.loss_history[0];
            assert!(
                report.final_loss < first,
                "{}: {} -> {}",
                metric,
                first,
                report.final_loss
            );
        }
    }

    #[test]
    fn test_fit_multiple_labels() {
        let rows: Vec<Vec<f64>> = grid_rows()
            .into_iter()
            .map(|r| vec![r[0], r[1], r[2], -r[0] + 1.0])
            .collect();
        let table = DataTable::builder(&T::from_rows(&rows))
            .features(vec![0, 1])
            .labels(vec![2, 3])
            .build()
            .unwrap();
        let mut trainer = OlsGdTrainer::builder()
            .learning_rate(LearningRate::Lipschitz)
            .tolerance(1e-12)
            .build(table)
            .unwrap();
        trainer.fit(1000, LossMetric::Mse).unwrap();

        let w = trainer.weight_bias().unwrap();
        assert_eq!(w.shape(), (2, 3));
        for (got, want) in w.to_vec().iter().zip([2.0, -3.0, 5.0, -1.0, 0.0, 1.0]) {
            assert!((got - want).abs() < 1e-4);
        }
    }

    #[test]
    fn test_fit_zero_epochs_rejected() {
        let mut trainer = OlsGdTrainer::new(grid_table(), TrainerConfig::default()).unwrap();
        assert!(matches!(
            trainer.fit(0, LossMetric::Mse),
            Err(TrainerError::InvalidParameter(_))
        ));
        assert!(!trainer.is_trained());
    }

    #[test]
    fn test_divergence_is_reported() {
        let mut trainer = OlsGdTrainer::builder()
            .learning_rate(LearningRate::Constant(1.0))
            .build(grid_table())
            .unwrap();

        let result = trainer.fit(10_000, LossMetric::Mse);
        assert!(matches!(result, Err(TrainerError::Diverged { .. })));
        assert!(!trainer.is_trained());
        assert!(trainer.weight_bias().is_none());
    }

    #[test]
    fn test_fit_without_convergence() {
        let mut trainer = OlsGdTrainer::builder()
            .learning_rate(LearningRate::Constant(1e-4))
            .build(grid_table())
            .unwrap();
        let report = trainer.fit(3, LossMetric::Mse).unwrap();

        assert_eq!(report.epochs_run, 3);
        assert!(!report.converged);
        assert!(!report.stopped_early);
        assert!(trainer.is_trained());
        assert!(!trainer.converged());
    }

    // === Early stopping ===

    #[test]
    fn test_early_stop_on_plateau() {
        // Inconsistent labels: the optimum has non-zero loss
        let data = T::from_rows(&[
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 2.0],
            vec![1.0, 3.0],
        ]);
        let table = DataTable::builder(&data).labels(vec![1]).build().unwrap();
        let mut trainer = OlsGdTrainer::builder()
            .learning_rate(LearningRate::Lipschitz)
            .tolerance(0.0)
            .build(table)
            .unwrap();

        let report = trainer.fit_with_patience(100_000, LossMetric::Mse, 5).unwrap();

        assert!(report.stopped_early);
        assert!(!report.converged);
        assert!(report.epochs_run < 100_000);
        assert!(trainer.is_trained());
        assert!(!trainer.is_early_stop());
        // Optimum: slope 2, intercept 0.5, residuals ±0.5
        assert!((report.final_loss - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_fit_with_patience_disables_early_stop_on_error() {
        let mut trainer = OlsGdTrainer::new(grid_table(), TrainerConfig::default()).unwrap();
        let result = trainer.fit_with_patience(10, LossMetric::Mse, 0);

        assert!(matches!(result, Err(TrainerError::InvalidParameter(_))));
        assert!(!trainer.is_early_stop());
    }

    // === State ===

    #[test]
    fn test_predict_requires_training() {
        let trainer = OlsGdTrainer::new(grid_table(), TrainerConfig::default()).unwrap();
        assert!(matches!(
            trainer.predict(&T::zeros(1, 2)),
            Err(TrainerError::NotTrained)
        ));
        assert!(matches!(
            trainer.compute_test_loss(LossMetric::Mse),
            Err(TrainerError::NotTrained)
        ));
        assert!(matches!(
            trainer.extract_params(),
            Err(TrainerError::NotTrained)
        ));
    }

    #[test]
    fn test_predict_feature_mismatch() {
        let mut trainer = OlsGdTrainer::new(grid_table(), TrainerConfig::default()).unwrap();
        trainer.fit(10, LossMetric::Mse).unwrap();
        assert!(matches!(
            trainer.predict(&T::zeros(4, 3)),
            Err(TrainerError::FeatureMismatch {
                expected_features: 2,
                got_features: 3
            })
        ));
    }

    #[test]
    fn test_set_learning_rate_resets() {
        let mut trainer = OlsGdTrainer::builder()
            .learning_rate(LearningRate::Lipschitz)
            .build(grid_table())
            .unwrap();
        trainer.fit(500, LossMetric::Mse).unwrap();
        assert!(trainer.is_trained());

        trainer.set_learning_rate(LearningRate::Constant(0.05)).unwrap();
        assert!(!trainer.is_trained());
        assert!(!trainer.converged());
        assert!(trainer.weight_bias().is_none());
        assert!(trainer.effective_learning_rate().is_none());
        assert!(matches!(
            trainer.predict(&T::zeros(1, 2)),
            Err(TrainerError::NotTrained)
        ));

        assert!(matches!(
            trainer.set_learning_rate(LearningRate::Constant(-1.0)),
            Err(TrainerError::InvalidParameter(_))
        ));
        assert_eq!(trainer.learning_rate(), LearningRate::Constant(0.05));
    }

    #[test]
    fn test_compute_split_losses() {
        let mut trainer = OlsGdTrainer::builder()
            .learning_rate(LearningRate::Lipschitz)
            .tolerance(1e-14)
            .build(split_grid_table())
            .unwrap();
        trainer.fit(2000, LossMetric::Mse).unwrap();

        let test_loss = trainer.compute_test_loss(LossMetric::Mae).unwrap();
        let eval_loss = trainer.compute_eval_loss(LossMetric::Mse).unwrap();
        assert!(test_loss < 1e-5, "test loss {}", test_loss);
        assert!(eval_loss < 1e-10, "eval loss {}", eval_loss);
    }

    #[test]
    fn test_compute_test_loss_missing_split() {
        let mut trainer = OlsGdTrainer::new(grid_table(), TrainerConfig::default()).unwrap();
        trainer.fit(10, LossMetric::Mse).unwrap();
        assert!(matches!(
            trainer.compute_test_loss(LossMetric::Mse),
            Err(TrainerError::MissingSplit("test"))
        ));
        assert!(matches!(
            trainer.compute_eval_loss(LossMetric::Mse),
            Err(TrainerError::MissingSplit("eval"))
        ));
    }

    #[test]
    fn test_new_accepts_pre_split_table() {
        let train = Split::new(T::zeros(3, 2), T::zeros(3, 1));
        let table = DataTable::from_splits(train, None, None).unwrap();
        assert!(OlsGdTrainer::new(table, TrainerConfig::default()).is_ok());
    }

    // === Persistence ===

    #[test]
    fn test_params_save_load() -> Result<(), Box<dyn std::error::Error>> {
        let mut trainer = OlsGdTrainer::builder()
            .learning_rate(LearningRate::Lipschitz)
            .tolerance(1e-12)
            .build(grid_table())?;
        trainer.fit(1000, LossMetric::Mse)?;

        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("ols.bin");
        trainer.save_params_to_file(&path)?;

        let mut restored = OlsGdTrainer::new(grid_table(), TrainerConfig::default())?;
        restored.load_params_from_file(&path)?;

        assert!(restored.is_trained());
        let input = T::from_rows(&[vec![0.5, -0.5]]);
        assert_eq!(trainer.predict(&input)?, restored.predict(&input)?);
        Ok(())
    }

    #[test]
    fn test_load_params_validation() {
        let mut trainer = OlsGdTrainer::new(grid_table(), TrainerConfig::default()).unwrap();

        let wrong_features = WeightBiasParams {
            n_features: 3,
            n_labels: 1,
            weight_bias: vec![0.0; 4],
        };
        assert!(matches!(
            trainer.load_params(wrong_features),
            Err(TrainerError::FeatureMismatch { .. })
        ));

        let wrong_len = WeightBiasParams {
            n_features: 2,
            n_labels: 1,
            weight_bias: vec![0.0; 2],
        };
        assert!(matches!(
            trainer.load_params(wrong_len),
            Err(TrainerError::InvalidParameter(_))
        ));

        let non_finite = WeightBiasParams {
            n_features: 2,
            n_labels: 1,
            weight_bias: vec![0.0, f64::NAN, 1.0],
        };
        assert!(matches!(
            trainer.load_params(non_finite),
            Err(TrainerError::InvalidParameter(_))
        ));
        assert!(!trainer.is_trained());
    }
}
