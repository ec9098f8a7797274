//! # tabletrain
//!
//! Dataset splitting, feature normalization and least-squares training over
//! pluggable tensor backends.
//!
//! ## Pipeline
//!
//! 1. Load or build a numeric matrix ([`Tensor2D`]), e.g. with [`io::read_table_file`].
//! 2. Pick feature and label columns and carve off eval/test rows: [`DataTable`].
//! 3. Optionally normalize features with statistics from the train split: [`DataTableNorm`].
//! 4. Fit a linear model by gradient descent: [`OlsGdTrainer`], scored with a [`LossMetric`].
//!
//! ## Quick Start
//!
//! ```rust
//! use tabletrain::backend::{CpuBackend, Tensor2D};
//! use tabletrain::loss::LossMetric;
//! use tabletrain::normalize::{DataTableNorm, NormType};
//! use tabletrain::table::DataTable;
//! use tabletrain::trainer::{LearningRate, OlsGdTrainer, Trainer, TrainerConfig};
//!
//! // y = 3 * x0 - x1 + 2, last column is the label
//! let rows: Vec<Vec<f64>> = (0..20)
//!     .map(|i| {
//!         let (a, b) = ((i % 5) as f64, (i / 5) as f64);
//!         vec![a, b, 3.0 * a - b + 2.0]
//!     })
//!     .collect();
//! let data = Tensor2D::<CpuBackend>::from_rows(&rows);
//!
//! let table = DataTable::builder(&data)
//!     .labels(vec![2])
//!     .eval_percent(10)
//!     .test_percent(10)
//!     .build()
//!     .unwrap();
//! let table = DataTableNorm::from_table(table, NormType::MinMax)
//!     .unwrap()
//!     .normalized_table()
//!     .unwrap();
//!
//! let config = TrainerConfig {
//!     learning_rate: LearningRate::BarzilaiBorwein,
//!     tolerance: 1e-12,
//!     ..TrainerConfig::default()
//! };
//! let mut trainer = OlsGdTrainer::new(table, config).unwrap();
//! trainer.fit(2000, LossMetric::Mse).unwrap();
//! assert!(trainer.compute_test_loss(LossMetric::Mse).unwrap() < 1e-6);
//! ```
//!
//! ## Module Structure
//!
//! - `backend`: tensor storage and the operations on it (`Backend`, `Tensor2D`)
//! - `table`: column selection and train/eval/test splitting (`DataTable`)
//! - `normalize`: min-max and z-score feature scaling (`DataTableNorm`)
//! - `loss`: regression metrics (MSE, MAE, MSLE, log-cosh)
//! - `trainer`: training lifecycle and the gradient-descent least-squares trainer
//! - `io`: delimited text tables
//! - `config`: JSON run configuration
//! - `serialization`: binary parameter persistence
//! - `error`: error types of every module
//!
//! The library logs through the `log` facade and never installs a logger.

pub mod backend;
pub mod config;
pub mod error;
pub mod io;
pub mod loss;
pub mod normalize;
pub mod serialization;
pub mod table;
pub mod trainer;

pub use backend::{Backend, Tensor2D};
#[cfg(feature = "cpu")]
pub use backend::CpuBackend;
#[cfg(feature = "ndarray")]
pub use backend::NdarrayBackend;
pub use config::RunConfig;
pub use error::{
    ConfigError, DataTableError, DataTableNormError, ErrorKind, LossError, TableIoError,
    TrainerError,
};
pub use loss::{Loss, LossMetric};
pub use normalize::{DataTableNorm, FeatureNormalizer, NormType};
pub use table::{DataTable, DataTableConfig, Split, SplitSpec};
pub use trainer::{FitReport, LearningRate, OlsGdTrainer, Trainer, TrainerConfig};
