use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use housing_dashboard::training::{LinearRegression, RandomForest, Regressor};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_valuation_data(n_rows: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let x = Array2::from_shape_fn((n_rows, 6), |(_, j)| match j {
        0 => 2012.5 + rng.gen::<f64>(),
        1 => rng.gen::<f64>() * 45.0,
        2 => rng.gen::<f64>() * 6500.0,
        3 => rng.gen_range(0..=10) as f64,
        4 => 24.93 + rng.gen::<f64>() * 0.09,
        _ => 121.47 + rng.gen::<f64>() * 0.1,
    });

    let y = x
        .rows()
        .into_iter()
        .map(|row| 45.0 - 0.25 * row[1] - 0.006 * row[2] + 1.2 * row[3] + rng.gen::<f64>() * 3.0)
        .collect();

    (x, y)
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [331, 1000, 5000].iter() {
        let (x, y) = create_valuation_data(*n_rows);

        group.bench_with_input(BenchmarkId::new("random_forest", n_rows), &(x.clone(), y.clone()), |b, (x, y)| {
            b.iter(|| {
                let mut forest = RandomForest::new(100).with_random_state(42);
                forest.fit(black_box(x), black_box(y)).unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("linear_regression", n_rows), &(x, y), |b, (x, y)| {
            b.iter(|| {
                let mut linear = LinearRegression::new();
                linear.fit(black_box(x), black_box(y)).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Train once
    let (x, y) = create_valuation_data(331);
    let mut forest = RandomForest::new(100).with_random_state(42);
    forest.fit(&x, &y).unwrap();

    let single = x.slice(ndarray::s![0..1, ..]).to_owned();
    group.bench_function("random_forest_single", |b| {
        b.iter(|| forest.predict(black_box(&single)).unwrap())
    });

    let (batch, _) = create_valuation_data(83);
    group.bench_function("random_forest_test_split", |b| {
        b.iter(|| forest.predict(black_box(&batch)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
