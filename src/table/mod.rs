//! # Data Tables
//!
//! A [`DataTable`] holds the feature (X) and label (Y) matrices of a dataset,
//! partitioned into a mandatory train split and optional eval and test splits.
//!
//! Tables are built either from one matrix, by selecting feature and label columns
//! and slicing rows by percentage ([`DataTable::new`], [`DataTable::builder`]), or
//! from matrices that are already split ([`DataTable::from_splits`]).
//!
//! Rows are never shuffled: the first rows go to train, the next to eval and the
//! last to test.
//!
//! ```rust
//! use tabletrain::backend::{CpuBackend, Tensor2D};
//! use tabletrain::table::DataTable;
//!
//! let data = Tensor2D::<CpuBackend>::new((0..300).map(|v| v as f64).collect(), 100, 3);
//! let table = DataTable::builder(&data)
//!     .labels(vec![2])
//!     .eval_percent(30)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(table.x_train().shape(), (70, 2));
//! assert_eq!(table.y_eval().map(|y| y.rows()), Some(30));
//! assert!(!table.has_test());
//! ```

pub mod columns;
pub mod split;

pub use columns::{sub_matrix_cols, sub_matrix_cols_exclude, ColumnSpec};
pub use split::{SplitSizes, SplitSpec};

use crate::backend::{Backend, Tensor2D};
use crate::error::DataTableError;
use log::debug;
use serde::{Deserialize, Serialize};

/// Construction parameters for [`DataTable::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTableConfig {
    pub columns: ColumnSpec,
    #[serde(default)]
    pub split: SplitSpec,
}

impl DataTableConfig {
    /// Features are every column except `y`; no held-out splits.
    pub fn labels(y: Vec<usize>) -> Self {
        Self {
            columns: ColumnSpec::LabelsOnly { y },
            split: SplitSpec::None,
        }
    }

    pub fn with_split(mut self, split: SplitSpec) -> Self {
        self.split = split;
        self
    }
}

/// Paired feature and label matrices of one partition.
#[derive(Debug, Clone)]
pub struct Split<B: Backend> {
    x: Tensor2D<B>,
    y: Tensor2D<B>,
}

impl<B: Backend> Split<B> {
    /// Pairs features with labels. Consistency is checked when the split is
    /// handed to [`DataTable::from_splits`].
    pub fn new(x: Tensor2D<B>, y: Tensor2D<B>) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> &Tensor2D<B> {
        &self.x
    }

    pub fn y(&self) -> &Tensor2D<B> {
        &self.y
    }

    pub fn rows(&self) -> usize {
        self.x.rows()
    }

    pub fn into_parts(self) -> (Tensor2D<B>, Tensor2D<B>) {
        (self.x, self.y)
    }

    fn validate(&self, name: &'static str) -> Result<(), DataTableError> {
        if self.x.is_empty() {
            return Err(DataTableError::EmptyData(format!(
                "{} features have shape {:?}",
                name,
                self.x.shape()
            )));
        }
        if self.y.is_empty() {
            return Err(DataTableError::EmptyData(format!(
                "{} labels have shape {:?}",
                name,
                self.y.shape()
            )));
        }
        if self.x.rows() != self.y.rows() {
            return Err(DataTableError::RowMismatch {
                split: name,
                x_rows: self.x.rows(),
                y_rows: self.y.rows(),
            });
        }
        Ok(())
    }

    fn check_columns_match(
        &self,
        name: &'static str,
        train: &Split<B>,
    ) -> Result<(), DataTableError> {
        if self.x.cols() != train.x.cols() {
            return Err(DataTableError::ColumnMismatch {
                split: name,
                what: "feature",
                expected: train.x.cols(),
                got: self.x.cols(),
            });
        }
        if self.y.cols() != train.y.cols() {
            return Err(DataTableError::ColumnMismatch {
                split: name,
                what: "label",
                expected: train.y.cols(),
                got: self.y.cols(),
            });
        }
        Ok(())
    }
}

/// Train/eval/test partition of a labeled dataset.
///
/// Immutable once built. `clone()` deep-copies every matrix.
#[derive(Debug, Clone)]
pub struct DataTable<B: Backend> {
    train: Split<B>,
    eval: Option<Split<B>>,
    test: Option<Split<B>>,
}

impl<B: Backend> DataTable<B> {
    /// Splits one matrix into features and labels and partitions its rows.
    ///
    /// Rows `[0, train)` go to train, `[train, train + eval)` to eval and the
    /// remainder to test.
    ///
    /// # Errors
    /// [`DataTableError::EmptyData`] for a matrix with a zero dimension, plus every
    /// error of [`ColumnSpec::resolve`] and [`SplitSpec::sizes`].
    pub fn new(data: &Tensor2D<B>, config: &DataTableConfig) -> Result<Self, DataTableError> {
        let (rows, cols) = data.shape();
        if rows == 0 || cols == 0 {
            return Err(DataTableError::EmptyData(format!(
                "input has shape {:?}",
                (rows, cols)
            )));
        }

        let (x_cols, y_cols) = config.columns.resolve(cols)?;
        let sizes = config.split.sizes(rows)?;

        let x = data.select_columns(&x_cols);
        let y = data.select_columns(&y_cols);

        let eval_end = sizes.train + sizes.eval;
        let slice = |begin: usize, end: usize| {
            Split::new(x.slice_rows(begin, end), y.slice_rows(begin, end))
        };

        let train = slice(0, sizes.train);
        let eval = config.split.has_eval().then(|| slice(sizes.train, eval_end));
        let test = config.split.has_test().then(|| slice(eval_end, rows));

        debug!(
            "DataTable: {} rows x {} cols -> {} features, {} labels, split {}/{}/{}",
            rows,
            cols,
            x_cols.len(),
            y_cols.len(),
            sizes.train,
            sizes.eval,
            sizes.test
        );

        Ok(Self { train, eval, test })
    }

    /// Starts a fluent builder over `data`.
    pub fn builder(data: &Tensor2D<B>) -> DataTableBuilder<'_, B> {
        DataTableBuilder::new(data)
    }

    /// Assembles a table from matrices that are already split.
    ///
    /// # Errors
    /// - [`DataTableError::EmptyData`] if any matrix has a zero dimension
    /// - [`DataTableError::RowMismatch`] if features and labels of a split differ in rows
    /// - [`DataTableError::ColumnMismatch`] if eval/test column counts differ from train
    pub fn from_splits(
        train: Split<B>,
        eval: Option<Split<B>>,
        test: Option<Split<B>>,
    ) -> Result<Self, DataTableError> {
        train.validate("train")?;
        for (name, split) in [("eval", &eval), ("test", &test)] {
            if let Some(split) = split {
                split.validate(name)?;
                split.check_columns_match(name, &train)?;
            }
        }

        debug!(
            "DataTable from splits: {} features, {} labels, split {}/{}/{}",
            train.x.cols(),
            train.y.cols(),
            train.rows(),
            eval.as_ref().map_or(0, Split::rows),
            test.as_ref().map_or(0, Split::rows)
        );

        Ok(Self { train, eval, test })
    }

    pub fn x_train(&self) -> &Tensor2D<B> {
        &self.train.x
    }

    pub fn y_train(&self) -> &Tensor2D<B> {
        &self.train.y
    }

    /// `None` when the table was built without an eval split.
    pub fn x_eval(&self) -> Option<&Tensor2D<B>> {
        self.eval.as_ref().map(Split::x)
    }

    pub fn y_eval(&self) -> Option<&Tensor2D<B>> {
        self.eval.as_ref().map(Split::y)
    }

    /// `None` when the table was built without a test split.
    pub fn x_test(&self) -> Option<&Tensor2D<B>> {
        self.test.as_ref().map(Split::x)
    }

    pub fn y_test(&self) -> Option<&Tensor2D<B>> {
        self.test.as_ref().map(Split::y)
    }

    pub fn train(&self) -> &Split<B> {
        &self.train
    }

    pub fn eval(&self) -> Option<&Split<B>> {
        self.eval.as_ref()
    }

    pub fn test(&self) -> Option<&Split<B>> {
        self.test.as_ref()
    }

    pub fn has_eval(&self) -> bool {
        self.eval.is_some()
    }

    pub fn has_test(&self) -> bool {
        self.test.is_some()
    }

    pub fn n_features(&self) -> usize {
        self.train.x.cols()
    }

    pub fn n_labels(&self) -> usize {
        self.train.y.cols()
    }

    pub fn split_sizes(&self) -> SplitSizes {
        SplitSizes {
            train: self.train.rows(),
            eval: self.eval.as_ref().map_or(0, Split::rows),
            test: self.test.as_ref().map_or(0, Split::rows),
        }
    }

    /// Consumes the table, returning its splits.
    pub fn into_splits(self) -> (Split<B>, Option<Split<B>>, Option<Split<B>>) {
        (self.train, self.eval, self.test)
    }

    /// New table with `f` applied to every feature matrix and labels copied.
    /// `f` must keep row counts, and it must map equal column counts to equal
    /// column counts.
    pub(crate) fn try_map_features<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(&Tensor2D<B>) -> Result<Tensor2D<B>, E>,
    {
        let mut map_split = |split: &Split<B>| -> Result<Split<B>, E> {
            Ok(Split::new(f(&split.x)?, split.y.clone()))
        };
        let train = map_split(&self.train)?;
        let eval = self.eval.as_ref().map(&mut map_split).transpose()?;
        let test = self.test.as_ref().map(&mut map_split).transpose()?;
        Ok(Self { train, eval, test })
    }
}

/// Fluent builder for [`DataTable`].
///
/// Defaults:
/// - features: every column that is not a label
/// - no eval or test split
pub struct DataTableBuilder<'a, B: Backend> {
    data: &'a Tensor2D<B>,
    features: Option<Vec<usize>>,
    labels: Vec<usize>,
    eval_percent: Option<u32>,
    test_percent: Option<u32>,
}

impl<'a, B: Backend> DataTableBuilder<'a, B> {
    pub fn new(data: &'a Tensor2D<B>) -> Self {
        Self {
            data,
            features: None,
            labels: Vec::new(),
            eval_percent: None,
            test_percent: None,
        }
    }

    /// Explicit feature columns. Without this call features are the complement
    /// of the label columns.
    pub fn features(mut self, columns: Vec<usize>) -> Self {
        self.features = Some(columns);
        self
    }

    pub fn labels(mut self, columns: Vec<usize>) -> Self {
        self.labels = columns;
        self
    }

    pub fn eval_percent(mut self, percent: u32) -> Self {
        self.eval_percent = Some(percent);
        self
    }

    /// Requires an eval split as well.
    pub fn test_percent(mut self, percent: u32) -> Self {
        self.test_percent = Some(percent);
        self
    }

    /// The configuration the builder currently describes.
    ///
    /// A test percentage without an eval percentage is reported as an invalid
    /// (zero) eval percentage.
    pub fn config(&self) -> Result<DataTableConfig, DataTableError> {
        let columns = match &self.features {
            Some(x) => ColumnSpec::Explicit {
                x: x.clone(),
                y: self.labels.clone(),
            },
            None => ColumnSpec::LabelsOnly {
                y: self.labels.clone(),
            },
        };
        let split = match (self.eval_percent, self.test_percent) {
            (None, None) => SplitSpec::None,
            (Some(eval_percent), None) => SplitSpec::Eval { eval_percent },
            (Some(eval_percent), Some(test_percent)) => SplitSpec::EvalTest {
                eval_percent,
                test_percent,
            },
            (None, Some(_)) => {
                return Err(DataTableError::InvalidPercent {
                    name: "eval_percent",
                    value: 0,
                })
            }
        };
        Ok(DataTableConfig { columns, split })
    }

    pub fn build(self) -> Result<DataTable<B>, DataTableError> {
        let config = self.config()?;
        DataTable::new(self.data, &config)
    }
}
