//! Column selection for building feature and label matrices.

use crate::backend::{Backend, Tensor2D};
use crate::error::DataTableError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which columns of the source matrix are features (X) and which are labels (Y).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSpec {
    /// Both sets given explicitly; they must be disjoint.
    Explicit { x: Vec<usize>, y: Vec<usize> },
    /// Only labels given; features are every other column, in original order.
    LabelsOnly { y: Vec<usize> },
}

impl ColumnSpec {
    /// Resolves the selection against a matrix with `n_cols` columns into
    /// `(feature_indices, label_indices)`.
    pub fn resolve(&self, n_cols: usize) -> Result<(Vec<usize>, Vec<usize>), DataTableError> {
        match self {
            ColumnSpec::Explicit { x, y } => {
                check_indices(x, n_cols)?;
                check_indices(y, n_cols)?;
                check_unique(x)?;
                check_unique(y)?;
                if let Some(&index) = x.iter().find(|i| y.contains(i)) {
                    return Err(DataTableError::OverlappingColumns { index });
                }
                if x.is_empty() {
                    return Err(DataTableError::EmptyColumnSet("feature"));
                }
                if y.is_empty() {
                    return Err(DataTableError::EmptyColumnSet("label"));
                }
                Ok((x.clone(), y.clone()))
            }
            ColumnSpec::LabelsOnly { y } => {
                check_indices(y, n_cols)?;
                check_unique(y)?;
                if y.is_empty() {
                    return Err(DataTableError::EmptyColumnSet("label"));
                }
                let x = complement(y, n_cols);
                if x.is_empty() {
                    return Err(DataTableError::EmptyColumnSet("feature"));
                }
                Ok((x, y.clone()))
            }
        }
    }
}

fn check_indices(indices: &[usize], n_cols: usize) -> Result<(), DataTableError> {
    match indices.iter().find(|&&i| i >= n_cols) {
        Some(&index) => Err(DataTableError::ColumnOutOfRange { index, n_cols }),
        None => Ok(()),
    }
}

fn check_unique(indices: &[usize]) -> Result<(), DataTableError> {
    let mut seen = HashSet::with_capacity(indices.len());
    match indices.iter().find(|&&i| !seen.insert(i)) {
        Some(&index) => Err(DataTableError::DuplicateColumn { index }),
        None => Ok(()),
    }
}

fn complement(indices: &[usize], n_cols: usize) -> Vec<usize> {
    (0..n_cols).filter(|j| !indices.contains(j)).collect()
}

/// Returns a new matrix holding exactly the columns in `indices`, in that order.
///
/// Rows keep their order. The result never shares storage with `source`.
///
/// # Errors
/// [`DataTableError::ColumnOutOfRange`] if any index is `>= source.cols()`.
pub fn sub_matrix_cols<B: Backend>(
    source: &Tensor2D<B>,
    indices: &[usize],
) -> Result<Tensor2D<B>, DataTableError> {
    check_indices(indices, source.cols())?;
    Ok(source.select_columns(indices))
}

/// Returns a new matrix holding every column *not* in `indices`, in original order.
///
/// # Errors
/// [`DataTableError::ColumnOutOfRange`] if any index is `>= source.cols()`.
pub fn sub_matrix_cols_exclude<B: Backend>(
    source: &Tensor2D<B>,
    indices: &[usize],
) -> Result<Tensor2D<B>, DataTableError> {
    let n_cols = source.cols();
    check_indices(indices, n_cols)?;
    Ok(source.select_columns(&complement(indices, n_cols)))
}
