#![cfg(feature = "cpu")]

use std::sync::Arc;

use tabletrain::io::{read_table, write_table_file, CsvOptions};
use tabletrain::normalize::ColumnTransforms;
use tabletrain::table::SplitSpec;
use tabletrain::{
    Backend, CpuBackend, DataTable, DataTableConfig, DataTableError, DataTableNorm, LearningRate,
    LossMetric, NormType, OlsGdTrainer, TableIoError, Tensor2D, Trainer, TrainerConfig,
    TrainerError,
};

/// 20 rows of `x0, x1, y` with `y = 2 x0 - x1 + 3`.
fn csv_text() -> String {
    let mut text = String::from("x0,x1,y\n");
    for i in 0..20 {
        let x0 = (i % 4) as f64;
        let x1 = ((i * 3) % 7) as f64;
        text.push_str(&format!("{},{},{}\n", x0, x1, 2.0 * x0 - x1 + 3.0));
    }
    text
}

fn config() -> DataTableConfig {
    DataTableConfig::labels(vec![2]).with_split(SplitSpec::EvalTest {
        eval_percent: 10,
        test_percent: 20,
    })
}

fn trainer_config() -> TrainerConfig {
    TrainerConfig {
        learning_rate: LearningRate::BarzilaiBorwein,
        tolerance: 1e-16,
        verbose: false,
    }
}

fn load<B: Backend>() -> DataTable<B> {
    let data: Tensor2D<B> = read_table(csv_text().as_bytes(), &CsvOptions::default()).unwrap();
    DataTable::new(&data, &config()).unwrap()
}

#[test]
fn csv_to_trained_model() {
    let table = load::<CpuBackend>();
    let sizes = table.split_sizes();
    assert_eq!((sizes.train, sizes.eval, sizes.test), (14, 2, 4));

    let norm = DataTableNorm::new(Arc::new(table), NormType::ZScore).unwrap();
    let mut trainer = OlsGdTrainer::new(norm.normalized_table().unwrap(), trainer_config()).unwrap();

    let report = trainer.fit(5000, LossMetric::Mse).unwrap();
    assert!(report.converged);
    assert_eq!(report.loss_history.len(), report.epochs_run);

    assert!(trainer.compute_eval_loss(LossMetric::Mse).unwrap() < 1e-8);
    assert!(trainer.compute_test_loss(LossMetric::Mae).unwrap() < 1e-4);

    // Raw features go through the same transforms before predicting
    let raw = Tensor2D::<CpuBackend>::from_rows(&[vec![10.0, -2.0]]);
    let y = trainer.predict(&norm.normalize(&raw).unwrap()).unwrap();
    assert!((y.get(0, 0) - 25.0).abs() < 1e-4);
}

#[test]
fn persisted_model_reproduces_predictions() {
    let tmp = tempfile::tempdir().unwrap();
    let norm = DataTableNorm::from_table(load::<CpuBackend>(), NormType::MinMax).unwrap();
    let normalized = norm.normalized_table().unwrap();

    let mut trainer = OlsGdTrainer::new(normalized.clone(), trainer_config()).unwrap();
    trainer.fit(5000, LossMetric::Mse).unwrap();
    trainer.save_params_to_file(tmp.path().join("model.bin")).unwrap();
    norm.transforms()
        .save_to_file(tmp.path().join("transforms.bin"))
        .unwrap();

    let transforms = ColumnTransforms::load_from_file(tmp.path().join("transforms.bin")).unwrap();
    let mut restored = OlsGdTrainer::new(normalized, TrainerConfig::default()).unwrap();
    assert!(!restored.is_trained());
    restored
        .load_params_from_file(tmp.path().join("model.bin"))
        .unwrap();
    assert!(restored.is_trained());

    let raw = Tensor2D::<CpuBackend>::from_rows(&[vec![1.0, 5.0], vec![3.0, 0.0]]);
    let expected = trainer.predict(&norm.normalize(&raw).unwrap()).unwrap();
    let got = restored.predict(&transforms.normalize(&raw).unwrap()).unwrap();
    assert_eq!(got, expected);
}

#[test]
fn normalized_splits_written_to_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let norm = DataTableNorm::from_table(load::<CpuBackend>(), NormType::MinMax).unwrap();
    let x_test = norm.x_test_normalized().unwrap();

    let path = tmp.path().join("x_test.csv");
    let options = CsvOptions::default().with_precision(12);
    write_table_file(&path, &x_test, &options).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let back: Tensor2D<CpuBackend> = read_table(text.as_bytes(), &options).unwrap();
    assert_eq!(back.shape(), x_test.shape());
    for (a, b) in back.to_vec().iter().zip(x_test.to_vec()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn errors_surface_per_stage() {
    let ragged = read_table::<CpuBackend, _>("a,b\n1,2\n3\n".as_bytes(), &CsvOptions::default());
    assert!(matches!(ragged, Err(TableIoError::Ragged { .. })));

    let data: Tensor2D<CpuBackend> =
        read_table(csv_text().as_bytes(), &CsvOptions::default()).unwrap();
    let bad = DataTableConfig::labels(vec![2]).with_split(SplitSpec::EvalTest {
        eval_percent: 60,
        test_percent: 40,
    });
    assert!(matches!(
        DataTable::new(&data, &bad),
        Err(DataTableError::PercentOverflow { .. })
    ));

    let trainer = OlsGdTrainer::new(load::<CpuBackend>(), trainer_config()).unwrap();
    assert!(matches!(
        trainer.compute_test_loss(LossMetric::Mse),
        Err(TrainerError::NotTrained)
    ));
}

#[test]
fn patience_applies_to_one_fit_only() {
    let mut trainer = OlsGdTrainer::new(load::<CpuBackend>(), trainer_config()).unwrap();
    trainer
        .fit_with_patience(50, LossMetric::Mse, 3)
        .unwrap();
    assert!(!trainer.is_early_stop());

    trainer.set_learning_rate(LearningRate::Lipschitz).unwrap();
    assert!(!trainer.is_trained());
    assert!(trainer.weight_bias().is_none());
}

#[cfg(feature = "ndarray")]
#[test]
fn backends_agree() {
    use tabletrain::NdarrayBackend;

    fn fitted_weights<B: Backend>() -> Vec<f64> {
        let config = TrainerConfig {
            learning_rate: LearningRate::Lipschitz,
            tolerance: 0.0,
            verbose: false,
        };
        let mut trainer = OlsGdTrainer::new(load::<B>(), config).unwrap();
        trainer.fit(200, LossMetric::Mse).unwrap();
        trainer.weight_bias().unwrap().to_vec()
    }

    let cpu = fitted_weights::<CpuBackend>();
    let nd = fitted_weights::<NdarrayBackend>();
    for (a, b) in cpu.iter().zip(&nd) {
        assert!((a - b).abs() < 1e-9);
    }
}
