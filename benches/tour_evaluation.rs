use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hicorder::config::OptimizerConfig;
use hicorder::dist::runner::ParallelRunner;
use hicorder::graph::genetic::GeneticOptimizer;
use hicorder::graph::tour::{Tig, Tour};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Random tour with links decaying away from the diagonal
fn random_tour(n: usize, rng: &mut StdRng) -> Tour {
    let mut m = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n.min(i + 20) {
            let links = rng.gen_range(0..100) / (j - i) as u32;
            m[[i, j]] = links;
            m[[j, i]] = links;
        }
    }
    let tigs = (0..n)
        .map(|index| Tig {
            index,
            size: rng.gen_range(10_000..2_000_000),
        })
        .collect();
    let mut tour = Tour::new(tigs, Arc::new(m));
    tour.shuffle(rng);
    tour
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("tour_evaluate");
    let mut rng = StdRng::seed_from_u64(42);

    for n in [50, 200, 1000] {
        let tour = random_tour(n, &mut rng);
        group.bench_with_input(BenchmarkId::new("evaluate", n), &tour, |b, tour| {
            b.iter(|| black_box(tour.evaluate()))
        });
    }
    group.finish();
}

fn bench_ga_generations(c: &mut Criterion) {
    let mut group = c.benchmark_group("ga");
    group.sample_size(10);
    let mut rng = StdRng::seed_from_u64(42);
    let tour = random_tour(200, &mut rng);
    let runner = ParallelRunner::new(num_cpus::get()).unwrap();

    let config = OptimizerConfig {
        max_generations: 20,
        ngen: 1_000,
        ..OptimizerConfig::default()
    };
    group.bench_function(BenchmarkId::new("20_generations", runner.threads()), |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            let evolved = GeneticOptimizer::new(&config, &runner)
                .evolve(&tour, 1, &mut rng, |_, _| Ok(()))
                .unwrap();
            black_box(evolved.score)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_ga_generations);
criterion_main!(benches);
