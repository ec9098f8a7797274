//! Splits a CSV table and writes min-max normalized features for every split.
//!
//! ```text
//! cargo run --example normalize_splits -- data.csv <label column> [out dir]
//! ```
//!
//! Writes `x_train.csv`, `x_eval.csv`, `x_test.csv` (normalized) plus the matching
//! label files, and `transforms.bin` holding the fitted statistics.
use std::error::Error;
use std::path::PathBuf;

use tabletrain::io::{read_table_file, write_table_file, CsvOptions};
use tabletrain::{CpuBackend, DataTable, DataTableNorm, NormType};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let input = args.next().ok_or("usage: normalize_splits <csv> <label column> [out dir]")?;
    let label: usize = args.next().ok_or("missing label column")?.parse()?;
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));

    let options = CsvOptions::default();
    let data = read_table_file::<CpuBackend, _>(&input, &options)?;
    let table = DataTable::builder(&data)
        .labels(vec![label])
        .eval_percent(15)
        .test_percent(15)
        .build()?;

    let norm = DataTableNorm::from_table(table, NormType::MinMax)?;
    println!(
        "{} features, {} constant",
        norm.transforms().n_features(),
        norm.transforms().n_constant()
    );

    std::fs::create_dir_all(&out_dir)?;
    let table = norm.data_table();
    write_table_file(out_dir.join("x_train.csv"), &norm.x_train_normalized()?, &options)?;
    write_table_file(out_dir.join("y_train.csv"), table.y_train(), &options)?;
    for (name, split) in [("eval", table.eval()), ("test", table.test())] {
        if let Some(split) = split {
            write_table_file(
                out_dir.join(format!("x_{}.csv", name)),
                &norm.normalize(split.x())?,
                &options,
            )?;
            write_table_file(out_dir.join(format!("y_{}.csv", name)), split.y(), &options)?;
            println!("{}: {} rows", name, split.rows());
        }
    }
    norm.transforms().save_to_file(out_dir.join("transforms.bin"))?;
    println!("Wrote splits to {}", out_dir.display());
    Ok(())
}
