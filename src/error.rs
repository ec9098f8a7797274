//! Error types for table construction, normalization, loss evaluation and training.
//!
//! Every error exposes [`ErrorKind`] through a `kind()` method so callers can react to
//! the category of failure without matching on each component's variants.

use std::fmt;

/// Category of a failure, shared by all error types of the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input to a constructor (bad percentages, empty data, bad column sets).
    Construction,
    /// Row or column counts inconsistent with stored state.
    ShapeMismatch,
    /// Operation invoked before its precondition holds (untrained, split absent).
    State,
    /// Non-finite values produced during optimization.
    Numeric,
    /// File system failure.
    Io,
    /// Encoding or decoding of persisted parameters or configs.
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Construction => "construction",
            ErrorKind::ShapeMismatch => "shape mismatch",
            ErrorKind::State => "state",
            ErrorKind::Numeric => "numeric",
            ErrorKind::Io => "io",
            ErrorKind::Serialization => "serialization",
        };
        f.write_str(name)
    }
}

/// Error raised while building a [`DataTable`](crate::table::DataTable).
#[derive(Debug, Clone, PartialEq)]
pub enum DataTableError {
    /// A supplied matrix has zero rows or zero columns.
    EmptyData(String),
    /// A split percentage is 0 or not below 100.
    InvalidPercent { name: &'static str, value: u32 },
    /// `eval_percent + test_percent` leaves nothing for training.
    PercentOverflow { eval_percent: u32, test_percent: u32 },
    /// A requested split rounds down to zero rows.
    EmptySplit {
        split: &'static str,
        percent: u32,
        total_rows: usize,
    },
    /// Eval and test rows together consume every row.
    TrainSplitEmpty { total_rows: usize, held_out: usize },
    /// A column index is not below the column count.
    ColumnOutOfRange { index: usize, n_cols: usize },
    /// A column is listed both as feature and as label.
    OverlappingColumns { index: usize },
    /// A column is listed twice within the feature or the label set.
    DuplicateColumn { index: usize },
    /// The feature or label column set is empty.
    EmptyColumnSet(&'static str),
    /// Features and labels of one split have different row counts.
    RowMismatch {
        split: &'static str,
        x_rows: usize,
        y_rows: usize,
    },
    /// Pre-split matrices disagree on their feature or label column count.
    ColumnMismatch {
        split: &'static str,
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

impl DataTableError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Construction
    }
}

impl fmt::Display for DataTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataTableError::EmptyData(msg) => write!(f, "Empty data: {}", msg),
            DataTableError::InvalidPercent { name, value } => {
                write!(f, "Invalid {}: {} (must be in 1..=99)", name, value)
            }
            DataTableError::PercentOverflow {
                eval_percent,
                test_percent,
            } => write!(
                f,
                "eval_percent + test_percent must be below 100, got {} + {}",
                eval_percent, test_percent
            ),
            DataTableError::EmptySplit {
                split,
                percent,
                total_rows,
            } => write!(
                f,
                "{} split is empty: {}% of {} rows rounds down to 0",
                split, percent, total_rows
            ),
            DataTableError::TrainSplitEmpty {
                total_rows,
                held_out,
            } => write!(
                f,
                "train split is empty: {} of {} rows held out",
                held_out, total_rows
            ),
            DataTableError::ColumnOutOfRange { index, n_cols } => write!(
                f,
                "Column index {} out of range for {} columns",
                index, n_cols
            ),
            DataTableError::OverlappingColumns { index } => {
                write!(f, "Column {} is both a feature and a label", index)
            }
            DataTableError::DuplicateColumn { index } => {
                write!(f, "Column {} is selected more than once", index)
            }
            DataTableError::EmptyColumnSet(what) => write!(f, "Empty {} column set", what),
            DataTableError::RowMismatch {
                split,
                x_rows,
                y_rows,
            } => write!(
                f,
                "Row mismatch in {} split: {} feature rows, {} label rows",
                split, x_rows, y_rows
            ),
            DataTableError::ColumnMismatch {
                split,
                what,
                expected,
                got,
            } => write!(
                f,
                "Column mismatch in {} split: expected {} {} columns, got {}",
                split, expected, what, got
            ),
        }
    }
}

impl std::error::Error for DataTableError {}

/// Error raised by [`FeatureNormalizer`](crate::normalize::FeatureNormalizer) and
/// [`ColumnTransforms`](crate::normalize::ColumnTransforms).
#[derive(Debug)]
pub enum DataTableNormError {
    /// Statistics requested from a matrix with no rows or no columns.
    EmptyData(String),
    /// Matrix column count differs from the number of derived transforms.
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// The requested split is not present in the table.
    MissingSplit(&'static str),
    /// A column's statistics are not finite (non-finite values or `f64` overflow).
    NonFiniteStatistics { column: usize },
    /// Serialization or deserialization error.
    SerializationError(String),
    /// I/O error during file operations.
    IoError(String),
}

impl DataTableNormError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataTableNormError::EmptyData(_) => ErrorKind::Construction,
            DataTableNormError::FeatureMismatch { .. } => ErrorKind::ShapeMismatch,
            DataTableNormError::MissingSplit(_) => ErrorKind::State,
            DataTableNormError::NonFiniteStatistics { .. } => ErrorKind::Numeric,
            DataTableNormError::SerializationError(_) => ErrorKind::Serialization,
            DataTableNormError::IoError(_) => ErrorKind::Io,
        }
    }
}

impl fmt::Display for DataTableNormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataTableNormError::EmptyData(msg) => write!(f, "Empty data: {}", msg),
            DataTableNormError::FeatureMismatch {
                expected_features,
                got_features,
            } => write!(
                f,
                "Feature mismatch: expected {} features, got {}",
                expected_features, got_features
            ),
            DataTableNormError::MissingSplit(split) => {
                write!(f, "Missing split: table has no {} split", split)
            }
            DataTableNormError::NonFiniteStatistics { column } => {
                write!(f, "Non-finite statistics for feature column {}", column)
            }
            DataTableNormError::SerializationError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            DataTableNormError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for DataTableNormError {}

impl From<std::io::Error> for DataTableNormError {
    fn from(err: std::io::Error) -> Self {
        DataTableNormError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for DataTableNormError {
    fn from(err: bincode::Error) -> Self {
        DataTableNormError::SerializationError(err.to_string())
    }
}

/// Error raised by [`Loss`](crate::loss::Loss).
#[derive(Debug, Clone, PartialEq)]
pub enum LossError {
    /// Prediction shape differs from the ground truth shape.
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// Ground truth has no elements.
    EmptyData,
}

impl LossError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LossError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            LossError::EmptyData => ErrorKind::Construction,
        }
    }
}

impl fmt::Display for LossError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossError::ShapeMismatch { expected, got } => write!(
                f,
                "Invalid shape: expected {:?}, got {:?}",
                expected, got
            ),
            LossError::EmptyData => write!(f, "Empty data: ground truth has no elements"),
        }
    }
}

impl std::error::Error for LossError {}

/// Error raised by [`Trainer`](crate::trainer::Trainer) implementations.
#[derive(Debug)]
pub enum TrainerError {
    /// The training split is unusable (empty or inconsistent).
    InvalidData(String),
    /// Invalid hyperparameter value.
    InvalidParameter(String),
    /// Operation requires a trained model.
    NotTrained,
    /// The requested split is not present in the table.
    MissingSplit(&'static str),
    /// Input column count differs from the trained feature count.
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// Loss became NaN or infinite.
    Diverged { epoch: usize, loss: f64 },
    /// Loss evaluation failed.
    Loss(LossError),
    /// Serialization or deserialization error.
    SerializationError(String),
    /// I/O error during file operations.
    IoError(String),
}

impl TrainerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrainerError::InvalidData(_) | TrainerError::InvalidParameter(_) => {
                ErrorKind::Construction
            }
            TrainerError::NotTrained | TrainerError::MissingSplit(_) => ErrorKind::State,
            TrainerError::FeatureMismatch { .. } => ErrorKind::ShapeMismatch,
            TrainerError::Diverged { .. } => ErrorKind::Numeric,
            TrainerError::Loss(e) => e.kind(),
            TrainerError::SerializationError(_) => ErrorKind::Serialization,
            TrainerError::IoError(_) => ErrorKind::Io,
        }
    }
}

impl fmt::Display for TrainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainerError::InvalidData(msg) => write!(f, "Invalid training data: {}", msg),
            TrainerError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            TrainerError::NotTrained => write!(f, "Trainer has not been fitted"),
            TrainerError::MissingSplit(split) => {
                write!(f, "Missing split: table has no {} split", split)
            }
            TrainerError::FeatureMismatch {
                expected_features,
                got_features,
            } => write!(
                f,
                "Feature mismatch: expected {} features, got {}",
                expected_features, got_features
            ),
            TrainerError::Diverged { epoch, loss } => {
                write!(f, "Training diverged at epoch {}: loss = {}", epoch, loss)
            }
            TrainerError::Loss(e) => write!(f, "Loss error: {}", e),
            TrainerError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            TrainerError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for TrainerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrainerError::Loss(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LossError> for TrainerError {
    fn from(err: LossError) -> Self {
        TrainerError::Loss(err)
    }
}

impl From<std::io::Error> for TrainerError {
    fn from(err: std::io::Error) -> Self {
        TrainerError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for TrainerError {
    fn from(err: bincode::Error) -> Self {
        TrainerError::SerializationError(err.to_string())
    }
}

/// Error raised while reading or writing delimited text tables.
#[derive(Debug)]
pub enum TableIoError {
    /// I/O error during file operations.
    IoError(String),
    /// Malformed delimited input.
    CsvError(String),
    /// A field could not be parsed as a number.
    ParseError {
        row: usize,
        col: usize,
        value: String,
    },
    /// A record has a different number of fields than the first one.
    Ragged {
        row: usize,
        expected: usize,
        got: usize,
    },
    /// The input holds no data records.
    Empty,
}

impl TableIoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TableIoError::IoError(_) => ErrorKind::Io,
            TableIoError::CsvError(_) | TableIoError::ParseError { .. } => {
                ErrorKind::Serialization
            }
            TableIoError::Ragged { .. } => ErrorKind::ShapeMismatch,
            TableIoError::Empty => ErrorKind::Construction,
        }
    }
}

impl fmt::Display for TableIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIoError::IoError(msg) => write!(f, "I/O error: {}", msg),
            TableIoError::CsvError(msg) => write!(f, "CSV error: {}", msg),
            TableIoError::ParseError { row, col, value } => write!(
                f,
                "Cannot parse {:?} as a number at row {}, column {}",
                value, row, col
            ),
            TableIoError::Ragged { row, expected, got } => write!(
                f,
                "Row {} has {} fields, expected {}",
                row, got, expected
            ),
            TableIoError::Empty => write!(f, "Empty data: no records"),
        }
    }
}

impl std::error::Error for TableIoError {}

impl From<std::io::Error> for TableIoError {
    fn from(err: std::io::Error) -> Self {
        TableIoError::IoError(err.to_string())
    }
}

impl From<csv::Error> for TableIoError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            TableIoError::IoError(err.to_string())
        } else {
            TableIoError::CsvError(err.to_string())
        }
    }
}

/// Error raised while loading a [`RunConfig`](crate::config::RunConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error while reading the config file.
    IoError(String),
    /// The document is not valid JSON or does not match the schema.
    ParseError(String),
    /// A field holds a value no run can use.
    InvalidValue(String),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::IoError(_) => ErrorKind::Io,
            ConfigError::ParseError(_) => ErrorKind::Serialization,
            ConfigError::InvalidValue(_) => ErrorKind::Construction,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
