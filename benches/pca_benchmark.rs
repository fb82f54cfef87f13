use covariance_pca::{Dataset, PcaModel, PcaOptions};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::{Array, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

fn generate_dataset(n_samples: usize, n_features: usize) -> (Dataset, Vec<String>) {
    let data: Array2<f64> = Array::random((n_samples, n_features), Uniform::new(0., 10.));
    let names: Vec<String> = (0..n_features).map(|j| format!("v{}", j)).collect();
    let dataset = Dataset::new(names.clone(), data).expect("generated names are unique");
    (dataset, names)
}

// Benchmark for PcaModel::fit
fn bench_pca_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("PCA_fit");

    for &(n_samples, n_features) in [(100, 10), (1000, 20), (5000, 50)].iter() {
        let (dataset, names) = generate_dataset(n_samples, n_features);
        group.throughput(Throughput::Elements((n_samples * n_features) as u64));
        for normalize in [false, true] {
            group.bench_with_input(
                BenchmarkId::new(
                    if normalize { "fit_normalized" } else { "fit" },
                    format!("{}x{}", n_samples, n_features),
                ),
                &dataset,
                |b, dataset| {
                    b.iter(|| PcaModel::fit(dataset, &names[..], PcaOptions { normalize }).unwrap());
                },
            );
        }
    }
    group.finish();
}

// Benchmark for projecting onto the top half of the PCs and back
fn bench_project_back(c: &mut Criterion) {
    let mut group = c.benchmark_group("PCA_project_back");

    for &(n_samples, n_features) in [(1000, 20), (5000, 50)].iter() {
        let (dataset, names) = generate_dataset(n_samples, n_features);
        let model = PcaModel::fit(&dataset, &names[..], PcaOptions { normalize: true }).unwrap();
        group.throughput(Throughput::Elements((n_samples * n_features) as u64));
        group.bench_with_input(
            BenchmarkId::new("project_back", format!("{}x{}", n_samples, n_features)),
            &model,
            |b, model| {
                b.iter(|| model.project_back(n_features / 2).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_pca_fit, bench_project_back);
criterion_main!(benches);
