use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tabletrain::loss::LossMetric;
use tabletrain::normalize::{ColumnTransforms, NormType};
use tabletrain::table::{DataTable, DataTableConfig, SplitSpec};
use tabletrain::trainer::{LearningRate, OlsGdTrainer, Trainer, TrainerConfig};
use tabletrain::{CpuBackend, Tensor2D};

/// `rows x (features + 1)` matrix, label last.
fn make_data(rows: usize, features: usize) -> Tensor2D<CpuBackend> {
    let mut data = Vec::with_capacity(rows * (features + 1));
    for i in 0..rows {
        let mut label = 1.0;
        for j in 0..features {
            let v = ((i * (j + 3) + j) % 97) as f64 * 0.1;
            label += (j as f64 + 1.0) * v;
            data.push(v);
        }
        data.push(label);
    }
    Tensor2D::new(data, rows, features + 1)
}

fn split_config(features: usize) -> DataTableConfig {
    DataTableConfig::labels(vec![features]).with_split(SplitSpec::EvalTest {
        eval_percent: 10,
        test_percent: 20,
    })
}

fn bench_split(c: &mut Criterion) {
    for rows in [1_000, 10_000, 100_000].iter() {
        let data = make_data(*rows, 8);
        let config = split_config(8);
        c.bench_with_input(BenchmarkId::new("data_table_new", rows), rows, |b, _| {
            b.iter(|| DataTable::new(black_box(&data), &config).unwrap());
        });
    }
}

fn bench_normalize(c: &mut Criterion) {
    for rows in [1_000, 10_000, 100_000].iter() {
        let table = DataTable::new(&make_data(*rows, 8), &split_config(8)).unwrap();
        for kind in [NormType::MinMax, NormType::ZScore] {
            let transforms = ColumnTransforms::derive(table.x_train(), kind).unwrap();
            c.bench_with_input(
                BenchmarkId::new(format!("normalize_{}", kind), rows),
                rows,
                |b, _| {
                    b.iter(|| transforms.normalize(black_box(table.x_train())).unwrap());
                },
            );
        }
    }
}

fn bench_fit(c: &mut Criterion) {
    let table = DataTable::new(&make_data(5_000, 8), &split_config(8)).unwrap();
    for (name, rate) in [
        ("lipschitz", LearningRate::Lipschitz),
        ("barzilai_borwein", LearningRate::BarzilaiBorwein),
    ] {
        let config = TrainerConfig {
            learning_rate: rate,
            tolerance: 0.0,
            verbose: false,
        };
        c.bench_function(&format!("fit_100_epochs_{}", name), |b| {
            b.iter(|| {
                let mut trainer = OlsGdTrainer::new(table.clone(), config.clone()).unwrap();
                trainer.fit(100, LossMetric::Mse).unwrap();
                black_box(trainer.weight_bias().cloned())
            });
        });
    }
}

criterion_group!(benches, bench_split, bench_normalize, bench_fit);
criterion_main!(benches);
