//! Run configuration.
//!
//! A [`RunConfig`] is one JSON document describing a whole training run, from the
//! input file down to the metric. Every section except `table` has defaults:
//!
//! ```json
//! {
//!   "input": "data/train.csv",
//!   "csv": { "delimiter": ";", "has_header": true },
//!   "table": {
//!     "columns": { "labels_only": { "y": [3] } },
//!     "split": { "eval_test": { "eval_percent": 10, "test_percent": 20 } }
//!   },
//!   "normalization": "z_score",
//!   "trainer": { "learning_rate": "barzilai_borwein", "tolerance": 1e-8 },
//!   "epochs": 500,
//!   "metric": "mse",
//!   "patience": 20
//! }
//! ```

use crate::error::ConfigError;
use crate::io::CsvOptions;
use crate::loss::LossMetric;
use crate::normalize::NormType;
use crate::table::DataTableConfig;
use crate::trainer::TrainerConfig;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_epochs() -> usize {
    100
}

fn default_metric() -> LossMetric {
    LossMetric::Mse
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// CSV file to train on. Programs may take it from the command line instead.
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub csv: CsvOptions,
    pub table: DataTableConfig,
    /// Feature normalization applied before training; `None` trains on raw features.
    #[serde(default)]
    pub normalization: Option<NormType>,
    #[serde(default)]
    pub trainer: TrainerConfig,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_metric")]
    pub metric: LossMetric,
    /// Enables early stopping with this patience.
    #[serde(default)]
    pub patience: Option<usize>,
}

impl RunConfig {
    /// A run over `table` with every other section at its default.
    pub fn new(table: DataTableConfig) -> Self {
        Self {
            input: None,
            csv: CsvOptions::default(),
            table,
            normalization: None,
            trainer: TrainerConfig::default(),
            epochs: default_epochs(),
            metric: default_metric(),
            patience: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!("Loaded run config from {}", path.display());
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the values that deserialize fine but cannot drive a run.
    ///
    /// Table layout problems are left to [`DataTable::new`](crate::table::DataTable::new),
    /// which needs the data to judge them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.epochs == 0 {
            return Err(ConfigError::InvalidValue(
                "epochs must be greater than 0".to_string(),
            ));
        }
        if self.patience == Some(0) {
            return Err(ConfigError::InvalidValue(
                "patience must be greater than 0".to_string(),
            ));
        }
        if !self.csv.delimiter.is_ascii() {
            return Err(ConfigError::InvalidValue(format!(
                "csv delimiter {:?} is not a single-byte character",
                self.csv.delimiter
            )));
        }
        self.trainer
            .validate()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnSpec, SplitSpec};
    use crate::trainer::LearningRate;
    use std::io::Write;

    const FULL: &str = r#"{
        "input": "data/train.csv",
        "csv": { "delimiter": ";", "has_header": false },
        "table": {
            "columns": { "explicit": { "x": [0, 1], "y": [2] } },
            "split": { "eval_test": { "eval_percent": 10, "test_percent": 20 } }
        },
        "normalization": "min_max",
        "trainer": { "learning_rate": "lipschitz", "tolerance": 1e-8 },
        "epochs": 250,
        "metric": "log_cosh",
        "patience": 5
    }"#;

    #[test]
    fn test_parse_full_config() {
        let config = RunConfig::from_json_str(FULL).unwrap();
        assert_eq!(config.input, Some(PathBuf::from("data/train.csv")));
        assert_eq!(config.csv.delimiter, ';');
        assert!(!config.csv.has_header);
        assert_eq!(config.csv.precision, 6);
        assert_eq!(
            config.table.columns,
            ColumnSpec::Explicit {
                x: vec![0, 1],
                y: vec![2]
            }
        );
        assert_eq!(
            config.table.split,
            SplitSpec::EvalTest {
                eval_percent: 10,
                test_percent: 20
            }
        );
        assert_eq!(config.normalization, Some(NormType::MinMax));
        assert_eq!(config.trainer.learning_rate, LearningRate::Lipschitz);
        assert_eq!(config.trainer.tolerance, 1e-8);
        assert_eq!(config.epochs, 250);
        assert_eq!(config.metric, LossMetric::LogCosh);
        assert_eq!(config.patience, Some(5));
    }

    #[test]
    fn test_defaults() {
        let config =
            RunConfig::from_json_str(r#"{"table": {"columns": {"labels_only": {"y": [0]}}}}"#)
                .unwrap();
        assert_eq!(config, RunConfig::new(DataTableConfig::labels(vec![0])));
        assert_eq!(config.epochs, 100);
        assert_eq!(config.metric, LossMetric::Mse);
        assert_eq!(config.trainer, TrainerConfig::default());
    }

    #[test]
    fn test_missing_table_is_parse_error() {
        assert!(matches!(
            RunConfig::from_json_str(r#"{"epochs": 3}"#),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_values() {
        let table = r#""table": {"columns": {"labels_only": {"y": [0]}}}"#;
        for body in [
            format!("{{{}, \"epochs\": 0}}", table),
            format!("{{{}, \"patience\": 0}}", table),
            format!(
                "{{{}, \"trainer\": {{\"learning_rate\": {{\"constant\": -1.0}}}}}}",
                table
            ),
        ] {
            assert!(
                matches!(
                    RunConfig::from_json_str(&body),
                    Err(ConfigError::InvalidValue(_))
                ),
                "accepted {}",
                body
            );
        }
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let mut config = RunConfig::new(DataTableConfig::labels(vec![3]));
        config.normalization = Some(NormType::ZScore);
        config.patience = Some(10);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_json_string().unwrap().as_bytes())
            .unwrap();

        let loaded = RunConfig::from_json_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            RunConfig::from_json_file("/nonexistent/run.json"),
            Err(ConfigError::IoError(_))
        ));
    }
}
