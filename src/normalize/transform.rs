//! Per-column scalar transforms and their frozen snapshot.

use crate::backend::{Backend, Tensor2D};
use crate::error::DataTableNormError;
use crate::serialization::{read_params, write_params};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Normalization scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormType {
    /// `(v - min) / (max - min)`, training data lands in `[0, 1]`.
    MinMax,
    /// `(v - mean) / std` with the population standard deviation.
    ZScore,
}

impl fmt::Display for NormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormType::MinMax => f.write_str("min_max"),
            NormType::ZScore => f.write_str("z_score"),
        }
    }
}

impl FromStr for NormType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "min_max" | "minmax" => Ok(NormType::MinMax),
            "z_score" | "zscore" | "standard" => Ok(NormType::ZScore),
            other => Err(format!("unknown normalization '{}'", other)),
        }
    }
}

/// Scalar-to-scalar transform applied to one feature column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColumnTransform {
    MinMax { min: f64, range: f64 },
    ZScore { mean: f64, std: f64 },
    /// Degenerate column (zero range or zero variance): every value maps to `0.0`.
    Constant,
}

impl ColumnTransform {
    #[inline]
    pub fn apply(&self, v: f64) -> f64 {
        match *self {
            ColumnTransform::MinMax { min, range } => (v - min) / range,
            ColumnTransform::ZScore { mean, std } => (v - mean) / std,
            ColumnTransform::Constant => 0.0,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, ColumnTransform::Constant)
    }
}

/// Serializable parameters of a [`ColumnTransforms`] snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnTransformsParams {
    pub kind: NormType,
    pub transforms: Vec<ColumnTransform>,
}

// Persisted through the bincode impl of `SerializableParams`.

/// One transform per feature column, derived from training statistics.
///
/// The snapshot owns no data: once derived, it is unaffected by anything that
/// happens to the matrix it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTransforms {
    kind: NormType,
    transforms: Vec<ColumnTransform>,
}

impl ColumnTransforms {
    /// Computes one transform per column of `training_features`.
    ///
    /// A column whose minimum equals its maximum becomes [`ColumnTransform::Constant`]
    /// for both schemes.
    ///
    /// # Errors
    /// - [`DataTableNormError::EmptyData`] if the matrix has no rows or no columns
    /// - [`DataTableNormError::NonFiniteStatistics`] if a column holds non-finite
    ///   values or its range or moments overflow `f64`
    pub fn derive<B: Backend>(
        training_features: &Tensor2D<B>,
        kind: NormType,
    ) -> Result<Self, DataTableNormError> {
        if training_features.is_empty() {
            return Err(DataTableNormError::EmptyData(format!(
                "cannot derive {} transforms from shape {:?}",
                kind,
                training_features.shape()
            )));
        }

        let mins = training_features.col_min();
        let maxs = training_features.col_max();
        let (means, stds) = match kind {
            NormType::MinMax => (Vec::new(), Vec::new()),
            NormType::ZScore => (training_features.col_mean(), training_features.col_std(0)),
        };

        let mut transforms = Vec::with_capacity(mins.len());
        for (j, (&min, &max)) in mins.iter().zip(&maxs).enumerate() {
            if !(min.is_finite() && max.is_finite()) {
                return Err(DataTableNormError::NonFiniteStatistics { column: j });
            }
            // min == max is exact, unlike a zero test on the computed std
            if min == max {
                transforms.push(ColumnTransform::Constant);
                continue;
            }
            let transform = match kind {
                NormType::MinMax => ColumnTransform::MinMax {
                    min,
                    range: max - min,
                },
                NormType::ZScore => ColumnTransform::ZScore {
                    mean: means[j],
                    std: stds[j],
                },
            };
            let finite = match transform {
                ColumnTransform::MinMax { range, .. } => range.is_finite(),
                ColumnTransform::ZScore { mean, std } => {
                    mean.is_finite() && std.is_finite() && std > 0.0
                }
                ColumnTransform::Constant => true,
            };
            if !finite {
                return Err(DataTableNormError::NonFiniteStatistics { column: j });
            }
            transforms.push(transform);
        }

        Ok(Self { kind, transforms })
    }

    pub fn kind(&self) -> NormType {
        self.kind
    }

    pub fn transforms(&self) -> &[ColumnTransform] {
        &self.transforms
    }

    pub fn n_features(&self) -> usize {
        self.transforms.len()
    }

    /// Number of degenerate columns.
    pub fn n_constant(&self) -> usize {
        self.transforms.iter().filter(|t| t.is_constant()).count()
    }

    /// Applies transform `j` to column `j` of a copy of `x`.
    ///
    /// # Errors
    /// [`DataTableNormError::FeatureMismatch`] if `x.cols() != self.n_features()`.
    pub fn normalize<B: Backend>(&self, x: &Tensor2D<B>) -> Result<Tensor2D<B>, DataTableNormError> {
        self.check_features(x)?;
        self.normalize_owned(x.clone())
    }

    /// Like [`normalize`](Self::normalize), reusing the storage of `x`.
    pub fn normalize_owned<B: Backend>(
        &self,
        mut x: Tensor2D<B>,
    ) -> Result<Tensor2D<B>, DataTableNormError> {
        self.check_features(&x)?;
        let transforms = &self.transforms;
        x.map_columns_inplace(|j, v| transforms[j].apply(v));
        Ok(x)
    }

    fn check_features<B: Backend>(&self, x: &Tensor2D<B>) -> Result<(), DataTableNormError> {
        if x.cols() != self.transforms.len() {
            return Err(DataTableNormError::FeatureMismatch {
                expected_features: self.transforms.len(),
                got_features: x.cols(),
            });
        }
        Ok(())
    }

    pub fn extract_params(&self) -> ColumnTransformsParams {
        ColumnTransformsParams {
            kind: self.kind,
            transforms: self.transforms.clone(),
        }
    }

    /// Rebuilds a snapshot, rejecting parameters that could not have been derived.
    pub fn from_params(params: ColumnTransformsParams) -> Result<Self, DataTableNormError> {
        if params.transforms.is_empty() {
            return Err(DataTableNormError::EmptyData(
                "parameters hold no column transforms".to_string(),
            ));
        }
        for (j, t) in params.transforms.iter().enumerate() {
            let valid = match (*t, params.kind) {
                (ColumnTransform::MinMax { min, range }, NormType::MinMax) => {
                    min.is_finite() && range.is_finite() && range != 0.0
                }
                (ColumnTransform::ZScore { mean, std }, NormType::ZScore) => {
                    mean.is_finite() && std.is_finite() && std > 0.0
                }
                (ColumnTransform::Constant, _) => true,
                _ => false,
            };
            if !valid {
                return Err(DataTableNormError::SerializationError(format!(
                    "invalid {} transform for column {}: {:?}",
                    params.kind, j, t
                )));
            }
        }
        Ok(Self {
            kind: params.kind,
            transforms: params.transforms,
        })
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DataTableNormError> {
        write_params::<_, DataTableNormError>(&self.extract_params(), path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, DataTableNormError> {
        let params: ColumnTransformsParams = read_params::<_, DataTableNormError>(path)?;
        Self::from_params(params)
    }
}
