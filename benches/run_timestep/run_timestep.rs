use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use vaxsim::{InitialInfections, Parameters, Population, ScoringPolicy};

static POPULATION: usize = 10_000;
static SEED: u64 = 123;
static DAYS: usize = 60;
static HAZARD: f64 = 0.000_5;

fn snapshot() -> Population {
    let parameters = Parameters {
        population_size: POPULATION,
        initial_infections: InitialInfections::Fraction(0.05),
        interaction_hazard: HAZARD,
        seed: SEED,
        ..Parameters::default()
    };
    let mut population = Population::new(parameters).expect("failed to build population");
    population
        .assign_scores(&mut ScoringPolicy::RandomPriority)
        .expect("failed to score population");
    population
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let population = snapshot();

    c.bench_function("run_timestep", |bencher| {
        bencher.iter_batched_ref(
            || population.clone(),
            |population| black_box(population.run_timestep()),
            BatchSize::LargeInput,
        );
    });

    c.bench_function("run 60 days", |bencher| {
        bencher.iter_batched(
            || population.clone(),
            |mut population| {
                population.run_days(DAYS);
                population
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
