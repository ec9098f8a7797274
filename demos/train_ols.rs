//! Trains a least-squares model end to end.
//!
//! `cargo run --example train_ols -- run.json` reads a [`RunConfig`] and its CSV
//! input; without arguments a synthetic dataset is used. Set `RUST_LOG=debug` to see
//! split sizes and per-run details.
use std::error::Error;
use std::sync::Arc;

use tabletrain::io::read_table_file;
use tabletrain::table::SplitSpec;
use tabletrain::{
    CpuBackend, DataTable, DataTableConfig, DataTableNorm, LearningRate, NormType,
    OlsGdTrainer, RunConfig, Tensor2D, Trainer,
};

/// y = 1.5 x0 - 2 x1 + 0.5 x2 + 4 with a small deterministic wobble.
fn synthetic() -> Tensor2D<CpuBackend> {
    let rows: Vec<Vec<f64>> = (0..200)
        .map(|i| {
            let x0 = (i % 10) as f64;
            let x1 = ((i * 7) % 13) as f64 * 0.5;
            let x2 = ((i * 3) % 17) as f64 - 8.0;
            let noise = ((i * 31) % 11) as f64 * 0.01 - 0.05;
            vec![x0, x1, x2, 1.5 * x0 - 2.0 * x1 + 0.5 * x2 + 4.0 + noise]
        })
        .collect();
    Tensor2D::from_rows(&rows)
}

fn synthetic_config() -> RunConfig {
    let mut config = RunConfig::new(DataTableConfig::labels(vec![3]).with_split(
        SplitSpec::EvalTest {
            eval_percent: 10,
            test_percent: 20,
        },
    ));
    config.normalization = Some(NormType::ZScore);
    config.trainer.learning_rate = LearningRate::BarzilaiBorwein;
    config.trainer.tolerance = 1e-10;
    config.epochs = 500;
    config.patience = Some(25);
    config
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (config, data) = match std::env::args().nth(1) {
        Some(path) => {
            let config = RunConfig::from_json_file(&path)?;
            let input = config
                .input
                .clone()
                .ok_or("run config has no \"input\" file")?;
            let data = read_table_file::<CpuBackend, _>(input, &config.csv)?;
            (config, data)
        }
        None => (synthetic_config(), synthetic()),
    };
    println!("Loaded {} rows x {} columns", data.rows(), data.cols());

    let table = DataTable::new(&data, &config.table)?;
    let sizes = table.split_sizes();
    println!(
        "Split: train {}, eval {}, test {}",
        sizes.train, sizes.eval, sizes.test
    );

    let (table, transforms) = match config.normalization {
        Some(kind) => {
            let norm = DataTableNorm::new(Arc::new(table), kind)?;
            (norm.normalized_table()?, Some(norm.transforms().clone()))
        }
        None => (table, None),
    };

    let mut trainer = OlsGdTrainer::builder()
        .config(config.trainer.clone())
        .build(table)?;
    let report = match config.patience {
        Some(patience) => trainer.fit_with_patience(config.epochs, config.metric, patience)?,
        None => trainer.fit(config.epochs, config.metric)?,
    };

    println!(
        "Fit: {} epochs, final {} = {:.6}, converged: {}, early stop: {}",
        report.epochs_run, config.metric, report.final_loss, report.converged, report.stopped_early
    );
    if trainer.data_table().has_eval() {
        println!(
            "Eval {}: {:.6}",
            config.metric,
            trainer.compute_eval_loss(config.metric)?
        );
    }
    if trainer.data_table().has_test() {
        println!(
            "Test {}: {:.6}",
            config.metric,
            trainer.compute_test_loss(config.metric)?
        );
    }

    if let Some(weights) = trainer.weight_bias() {
        println!("Weights (bias last): {:?}", weights.to_vec());
    }
    if let Some(transforms) = transforms {
        println!("Normalization: {}", serde_json::to_string(&transforms.extract_params())?);
    }

    let summary = serde_json::json!({
        "epochs_run": report.epochs_run,
        "final_loss": report.final_loss,
        "converged": report.converged,
        "stopped_early": report.stopped_early,
        "learning_rate": report.learning_rate,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
