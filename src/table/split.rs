//! Row-percentage splitting into train/eval/test partitions.

use crate::error::DataTableError;
use serde::{Deserialize, Serialize};

/// How the rows of a single matrix are partitioned.
///
/// Percentages are whole numbers in `1..=99`. Held-out split sizes are
/// `floor(total_rows * percent / 100)`; training keeps the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSpec {
    /// Every row goes to training.
    #[default]
    None,
    /// Train plus a trailing eval split.
    Eval { eval_percent: u32 },
    /// Train, then eval, then a trailing test split.
    EvalTest { eval_percent: u32, test_percent: u32 },
}

/// Row counts of each partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSizes {
    pub train: usize,
    pub eval: usize,
    pub test: usize,
}

impl SplitSizes {
    pub fn total(&self) -> usize {
        self.train + self.eval + self.test
    }
}

fn check_percent(name: &'static str, value: u32) -> Result<(), DataTableError> {
    if value == 0 || value >= 100 {
        return Err(DataTableError::InvalidPercent { name, value });
    }
    Ok(())
}

/// `floor(total * percent / 100)` without overflowing for large `total`.
fn percent_of(total: usize, percent: u32) -> usize {
    let p = percent as usize;
    total / 100 * p + total % 100 * p / 100
}

fn held_out(
    split: &'static str,
    total_rows: usize,
    percent: u32,
) -> Result<usize, DataTableError> {
    let rows = percent_of(total_rows, percent);
    if rows == 0 {
        return Err(DataTableError::EmptySplit {
            split,
            percent,
            total_rows,
        });
    }
    Ok(rows)
}

impl SplitSpec {
    /// Validates the percentages and computes the row count of each partition.
    ///
    /// # Errors
    /// - [`DataTableError::InvalidPercent`] for a percentage of 0 or `>= 100`
    /// - [`DataTableError::PercentOverflow`] when `eval_percent + test_percent >= 100`
    /// - [`DataTableError::EmptySplit`] when a requested split rounds down to zero rows
    /// - [`DataTableError::TrainSplitEmpty`] when eval and test consume every row
    pub fn sizes(&self, total_rows: usize) -> Result<SplitSizes, DataTableError> {
        let (eval, test) = match *self {
            SplitSpec::None => (0, 0),
            SplitSpec::Eval { eval_percent } => {
                check_percent("eval_percent", eval_percent)?;
                (held_out("eval", total_rows, eval_percent)?, 0)
            }
            SplitSpec::EvalTest {
                eval_percent,
                test_percent,
            } => {
                check_percent("eval_percent", eval_percent)?;
                check_percent("test_percent", test_percent)?;
                if eval_percent + test_percent >= 100 {
                    return Err(DataTableError::PercentOverflow {
                        eval_percent,
                        test_percent,
                    });
                }
                (
                    held_out("eval", total_rows, eval_percent)?,
                    held_out("test", total_rows, test_percent)?,
                )
            }
        };

        if eval + test >= total_rows {
            return Err(DataTableError::TrainSplitEmpty {
                total_rows,
                held_out: eval + test,
            });
        }

        Ok(SplitSizes {
            train: total_rows - eval - test,
            eval,
            test,
        })
    }

    pub fn has_eval(&self) -> bool {
        !matches!(self, SplitSpec::None)
    }

    pub fn has_test(&self) -> bool {
        matches!(self, SplitSpec::EvalTest { .. })
    }
}
