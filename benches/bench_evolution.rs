use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use genpool::chromosome::{AlleleBounds, RealArray};
use genpool::evolution::{self, Evaluator};
use genpool::operators::{
    CrossoverOperator, MutationOperator, SeedOperator, SelectOne, SelectTwo,
};
use genpool::population::{Entity, Population};
use genpool::rng::RandomNumberGenerator;

struct NegativeSphere;

impl Evaluator<RealArray> for NegativeSphere {
    fn evaluate(&self, entity: &Entity<RealArray>) -> Option<f64> {
        let sum: f64 = entity.chromosome(0).iter().map(|x| x * x).sum();
        Some(1.0 / (1.0 + sum))
    }
}

fn build_population(stable: usize, len: usize) -> Population<RealArray> {
    let mut pop = Population::builder(RealArray)
        .stable_size(stable)
        .shape(1, len)
        .bounds(AlleleBounds {
            min_real: -2.0,
            max_real: 2.0,
            ..AlleleBounds::default()
        })
        .evaluator(Arc::new(NegativeSphere))
        .build()
        .unwrap();
    pop.ops_mut().seed = Some(SeedOperator::RandomUniform);
    pop.ops_mut().select_one = Some(SelectOne::BestOfTwo);
    pop.ops_mut().select_two = Some(SelectTwo::BestOfTwo);
    pop.ops_mut().crossover = Some(CrossoverOperator::SinglePoint);
    pop.ops_mut().mutate = Some(MutationOperator::Multipoint);
    pop
}

fn bench_generational_loop(c: &mut Criterion) {
    c.bench_function("evolve 50 entities x 10 generations", |b| {
        b.iter(|| {
            let mut pop = build_population(50, 16);
            let mut rng = RandomNumberGenerator::from_seed(42);
            let generations = evolution::run(&mut pop, 10, &mut rng, None).unwrap();
            black_box(generations)
        })
    });
}

fn bench_pool_churn(c: &mut Criterion) {
    c.bench_function("acquire/release 1000 entities", |b| {
        let mut pop = build_population(50, 16);
        b.iter(|| {
            for _ in 0..1000 {
                let id = pop.acquire();
                pop.release(id).unwrap();
            }
            black_box(pop.size())
        })
    });
}

criterion_group!(benches, bench_generational_loop, bench_pool_churn);
criterion_main!(benches);
