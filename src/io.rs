//! Delimited text tables.
//!
//! Reads a numeric CSV (or any single-byte-delimited text) into a [`Tensor2D`] and
//! writes one back with a fixed number of decimals. The core never calls into this
//! module; it exists for programs that feed tables from files.

use crate::backend::{Backend, Tensor2D};
use crate::error::TableIoError;
use csv::{ReaderBuilder, WriterBuilder};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Text format options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field separator, as a single ASCII character.
    pub delimiter: char,
    /// Skip the first record when reading; write `c0,c1,...` when writing.
    pub has_header: bool,
    /// Decimals written per value.
    pub precision: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: true,
            precision: 6,
        }
    }
}

impl CsvOptions {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    fn delimiter_byte(&self) -> Result<u8, TableIoError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(TableIoError::CsvError(format!(
                "delimiter {:?} is not a single-byte character",
                self.delimiter
            )))
        }
    }
}

/// Parses every record of `reader` as a row of numbers.
///
/// Empty lines are skipped and fields are trimmed.
///
/// # Errors
/// [`TableIoError::ParseError`] for a non-numeric field, [`TableIoError::Ragged`]
/// when records differ in length, [`TableIoError::Empty`] when there are no records.
pub fn read_table<B: Backend, R: Read>(
    reader: R,
    options: &CsvOptions,
) -> Result<Tensor2D<B>, TableIoError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter_byte()?)
        .has_headers(options.has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut data = Vec::new();
    let mut n_cols = None;
    let mut n_rows = 0;

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        match n_cols {
            None => n_cols = Some(record.len()),
            Some(expected) if expected != record.len() => {
                return Err(TableIoError::Ragged {
                    row,
                    expected,
                    got: record.len(),
                })
            }
            Some(_) => {}
        }
        for (col, field) in record.iter().enumerate() {
            let value: f64 = field.parse().map_err(|_| TableIoError::ParseError {
                row,
                col,
                value: field.to_string(),
            })?;
            data.push(value);
        }
        n_rows += 1;
    }

    let n_cols = n_cols.ok_or(TableIoError::Empty)?;
    if n_cols == 0 {
        return Err(TableIoError::Empty);
    }
    debug!("Read table: {} rows x {} cols", n_rows, n_cols);
    Ok(Tensor2D::new(data, n_rows, n_cols))
}

pub fn read_table_file<B: Backend, P: AsRef<Path>>(
    path: P,
    options: &CsvOptions,
) -> Result<Tensor2D<B>, TableIoError> {
    let file = File::open(path)?;
    read_table(BufReader::new(file), options)
}

/// Writes `table` row by row with `options.precision` decimals.
pub fn write_table<B: Backend, W: Write>(
    writer: W,
    table: &Tensor2D<B>,
    options: &CsvOptions,
) -> Result<(), TableIoError> {
    let mut wtr = WriterBuilder::new()
        .delimiter(options.delimiter_byte()?)
        .from_writer(writer);

    let (rows, cols) = table.shape();
    if options.has_header {
        wtr.write_record((0..cols).map(|j| format!("c{}", j)))?;
    }
    let values = table.to_vec();
    for row in values.chunks(cols.max(1)).take(rows) {
        wtr.write_record(
            row.iter()
                .map(|v| format!("{:.*}", options.precision, v)),
        )?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_table_file<B: Backend, P: AsRef<Path>>(
    path: P,
    table: &Tensor2D<B>,
    options: &CsvOptions,
) -> Result<(), TableIoError> {
    let file = File::create(path)?;
    write_table(BufWriter::new(file), table, options)
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    type T = Tensor2D<CpuBackend>;

    #[test]
    fn test_read_with_header() {
        let text = "a,b,c\n1,2,3\n4.5, -5 ,6e1\n";
        let t: T = read_table(text.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(t.shape(), (2, 3));
        assert_eq!(t.to_vec(), vec![1.0, 2.0, 3.0, 4.5, -5.0, 60.0]);
    }

    #[test]
    fn test_read_without_header_and_custom_delimiter() {
        let options = CsvOptions::default().with_header(false).with_delimiter(';');
        let t: T = read_table("1;2\n3;4\n".as_bytes(), &options).unwrap();
        assert_eq!(t.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_read_parse_error() {
        let result: Result<T, _> = read_table("x,y\n1,abc\n".as_bytes(), &CsvOptions::default());
        match result {
            Err(TableIoError::ParseError { row, col, value }) => {
                assert_eq!((row, col), (0, 1));
                assert_eq!(value, "abc");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_ragged() {
        let result: Result<T, _> = read_table("x,y\n1,2\n3\n".as_bytes(), &CsvOptions::default());
        assert!(matches!(
            result,
            Err(TableIoError::Ragged {
                row: 1,
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_read_empty() {
        let result: Result<T, _> = read_table("x,y\n".as_bytes(), &CsvOptions::default());
        assert!(matches!(result, Err(TableIoError::Empty)));
    }

    #[test]
    fn test_write_precision_and_header() {
        let t = T::from_rows(&[vec![1.0, 2.5], vec![-0.126, 3.0]]);
        let mut out = Vec::new();
        write_table(&mut out, &t, &CsvOptions::default().with_precision(2)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "c0,c1\n1.00,2.50\n-0.13,3.00\n");
    }

    #[test]
    fn test_file_roundtrip() {
        let t = T::from_rows(&[vec![1.5, 2.0], vec![3.25, -4.0]]);
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("table.csv");
        let options = CsvOptions::default().with_delimiter('\t');

        write_table_file(&path, &t, &options).unwrap();
        let back: T = read_table_file(&path, &options).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_missing_file() {
        let result: Result<T, _> = read_table_file("/nonexistent/table.csv", &CsvOptions::default());
        assert!(matches!(result, Err(TableIoError::IoError(_))));
    }
}
