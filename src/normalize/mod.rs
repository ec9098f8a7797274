//! # Feature Normalization
//!
//! [`FeatureNormalizer`] derives one scalar transform per feature column from the
//! training split of a [`DataTable`] and applies it to any matrix with the same
//! number of columns: the training features themselves, the eval/test splits, or
//! new data at prediction time.
//!
//! | Scheme              | Transform                       | Degenerate column   |
//! |---------------------|---------------------------------|---------------------|
//! | [`NormType::MinMax`] | `(v - min) / (max - min)`      | `max == min` -> `0` |
//! | [`NormType::ZScore`] | `(v - mean) / std` (population) | `std == 0` -> `0`   |
//!
//! Transforms are frozen at derivation time in a [`ColumnTransforms`] snapshot,
//! which can be persisted and reused without the table.
//!
//! ```rust
//! use tabletrain::backend::{CpuBackend, Tensor2D};
//! use tabletrain::normalize::{DataTableNorm, NormType};
//! use tabletrain::table::DataTable;
//!
//! let data = Tensor2D::<CpuBackend>::from_rows(&[
//!     vec![10.0, 20.0, 1.0],
//!     vec![30.0, 40.0, 2.0],
//! ]);
//! let table = DataTable::builder(&data).labels(vec![2]).build().unwrap();
//! let norm = DataTableNorm::from_table(table, NormType::MinMax).unwrap();
//!
//! let x = norm.x_train_normalized().unwrap();
//! assert_eq!(x.to_vec(), vec![0.0, 0.0, 1.0, 1.0]);
//! ```

pub mod transform;

pub use transform::{ColumnTransform, ColumnTransforms, ColumnTransformsParams, NormType};

use crate::backend::{Backend, Tensor2D};
use crate::error::DataTableNormError;
use crate::table::DataTable;
use log::debug;
use std::sync::Arc;

/// Normalizer bound to a shared [`DataTable`].
///
/// Holds a reference-counted handle to the table together with the transforms
/// derived from its `x_train`. `transforms().n_features()` always equals
/// `data_table().n_features()`.
#[derive(Debug, Clone)]
pub struct FeatureNormalizer<B: Backend> {
    table: Arc<DataTable<B>>,
    transforms: ColumnTransforms,
}

/// Name used throughout the data pipeline for [`FeatureNormalizer`].
pub type DataTableNorm<B> = FeatureNormalizer<B>;

impl<B: Backend> FeatureNormalizer<B> {
    /// Derives `kind` transforms from `table.x_train()`.
    pub fn new(table: Arc<DataTable<B>>, kind: NormType) -> Result<Self, DataTableNormError> {
        let transforms = derive_logged(&table, kind)?;
        Ok(Self { table, transforms })
    }

    /// Like [`new`](Self::new), taking ownership of the table.
    pub fn from_table(table: DataTable<B>, kind: NormType) -> Result<Self, DataTableNormError> {
        Self::new(Arc::new(table), kind)
    }

    /// Rebinds to `table` and re-derives the transforms with the current kind.
    ///
    /// Both the table handle and the transforms are replaced; nothing from the
    /// previous derivation is kept. On error the normalizer is left unchanged.
    pub fn set_data_table(&mut self, table: Arc<DataTable<B>>) -> Result<(), DataTableNormError> {
        let transforms = derive_logged(&table, self.transforms.kind())?;
        self.table = table;
        self.transforms = transforms;
        Ok(())
    }

    pub fn kind(&self) -> NormType {
        self.transforms.kind()
    }

    pub fn transforms(&self) -> &ColumnTransforms {
        &self.transforms
    }

    pub fn data_table(&self) -> &DataTable<B> {
        &self.table
    }

    /// Shared handle to the bound table.
    pub fn table_handle(&self) -> Arc<DataTable<B>> {
        Arc::clone(&self.table)
    }

    /// Normalizes a copy of `x`; see [`ColumnTransforms::normalize`].
    pub fn normalize(&self, x: &Tensor2D<B>) -> Result<Tensor2D<B>, DataTableNormError> {
        self.transforms.normalize(x)
    }

    /// Normalizes `x` in its own storage.
    pub fn normalize_owned(&self, x: Tensor2D<B>) -> Result<Tensor2D<B>, DataTableNormError> {
        self.transforms.normalize_owned(x)
    }

    pub fn x_train_normalized(&self) -> Result<Tensor2D<B>, DataTableNormError> {
        self.normalize(self.table.x_train())
    }

    /// # Errors
    /// [`DataTableNormError::MissingSplit`] if the table has no eval split.
    pub fn x_eval_normalized(&self) -> Result<Tensor2D<B>, DataTableNormError> {
        let x = self
            .table
            .x_eval()
            .ok_or(DataTableNormError::MissingSplit("eval"))?;
        self.normalize(x)
    }

    /// # Errors
    /// [`DataTableNormError::MissingSplit`] if the table has no test split.
    pub fn x_test_normalized(&self) -> Result<Tensor2D<B>, DataTableNormError> {
        let x = self
            .table
            .x_test()
            .ok_or(DataTableNormError::MissingSplit("test"))?;
        self.normalize(x)
    }

    /// A new table whose feature matrices are normalized and whose labels are
    /// copied unchanged, ready to be moved into a trainer.
    pub fn normalized_table(&self) -> Result<DataTable<B>, DataTableNormError> {
        self.table.try_map_features(|x| self.transforms.normalize(x))
    }
}

fn derive_logged<B: Backend>(
    table: &DataTable<B>,
    kind: NormType,
) -> Result<ColumnTransforms, DataTableNormError> {
    let transforms = ColumnTransforms::derive(table.x_train(), kind)?;
    debug!(
        "Derived {} {} transforms from {} training rows ({} constant)",
        transforms.n_features(),
        kind,
        table.x_train().rows(),
        transforms.n_constant()
    );
    Ok(transforms)
}
