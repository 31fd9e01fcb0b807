//! Performance benchmarks for evonet

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use evonet::{AccuracyEvaluator, Config, Dataset, MutationRates, Network, Population};
use ndarray::Array1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn benchmark_forward(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let net = Network::random(&[784, 32, 32, 10], &mut rng).unwrap();
    let input = Array1::from_elem(784, 0.5f32);

    c.bench_function("network_forward_784_32_32_10", |b| {
        b.iter(|| net.forward(black_box(&input)))
    });
}

fn benchmark_mutation(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut net = Network::random(&[784, 32, 32, 10], &mut rng).unwrap();
    let rates = MutationRates::default();

    c.bench_function("network_mutate", |b| {
        b.iter(|| net.mutate(&rates, &mut rng))
    });
}

fn benchmark_breed(c: &mut Criterion) {
    let mut group = c.benchmark_group("breed");

    for population_size in [4, 10, 20] {
        let mut config = Config::default();
        config.topology.input_dim = 64;
        config.topology.hidden = vec![16];
        config.topology.n_classes = 4;
        config.evolution.population_size = population_size;
        config.evolution.n_survivors = population_size / 2;
        config.evolution.sample_fraction = 1.0;

        let dataset = Dataset::synthetic(200, 64, 4, 42).unwrap();
        let evaluator = AccuracyEvaluator::new(dataset, 1.0).unwrap();
        let mut population = Population::new(&config, evaluator, 42).unwrap();

        group.bench_with_input(
            BenchmarkId::new("population", population_size),
            &population_size,
            |b, _| {
                b.iter(|| {
                    population.breed().unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_forward, benchmark_mutation, benchmark_breed);
criterion_main!(benches);
