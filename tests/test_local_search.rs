use std::sync::Arc;

use genpool::chromosome::{AlleleBounds, RealArray};
use genpool::evolution::Evaluator;
use genpool::local_search::{
    differential_evolution, random_ascent, random_search, steepest_ascent,
    DifferentialEvolutionParams, GaussianAlleleMutator,
};
use genpool::operators::SeedOperator;
use genpool::population::{Entity, Population, MIN_FITNESS};
use genpool::rng::RandomNumberGenerator;

// A piecewise-improvable landscape: fitness grows as alleles approach
// zero, with no local maxima to get stuck on.
struct NegativeSphere;

impl Evaluator<RealArray> for NegativeSphere {
    fn evaluate(&self, entity: &Entity<RealArray>) -> Option<f64> {
        let sum: f64 = entity.chromosome(0).iter().map(|x| x * x).sum();
        Some(1.0 / (1.0 + sum))
    }
}

fn search_population(stable: usize, len: usize) -> Population<RealArray> {
    let mut pop = Population::builder(RealArray)
        .stable_size(stable)
        .shape(1, len)
        .bounds(AlleleBounds {
            min_real: -4.0,
            max_real: 4.0,
            ..AlleleBounds::default()
        })
        .evaluator(Arc::new(NegativeSphere))
        .build()
        .unwrap();
    pop.ops_mut().seed = Some(SeedOperator::RandomUniform);
    pop
}

#[test]
fn test_hill_climbing_monotonicity_scenario() {
    let mut pop = search_population(4, 6);
    pop.set_hill_climbing_parameters(Arc::new(GaussianAlleleMutator { sigma: 0.4 }));
    let mut rng = RandomNumberGenerator::from_seed(201);

    // Seed a start entity and pin its alleles to zero so its fitness is
    // exactly 1.0, the landscape's maximum basin value.
    let start = pop.acquire();
    pop.seed_entity(start, &mut rng).unwrap();
    for allele in pop.entity_mut(start).unwrap().chromosome_mut(0).iter_mut() {
        *allele = 0.0;
    }
    pop.score_entity(start).unwrap();
    assert_eq!(pop.entity(start).unwrap().fitness(), 1.0);

    let mut logged = Vec::new();
    let iterations = {
        let mut hook = |_: usize, best: &Entity<RealArray>| {
            logged.push(best.fitness());
            true
        };
        random_ascent(&mut pop, Some(start), 100, &mut rng, Some(&mut hook)).unwrap()
    };

    assert_eq!(iterations, 100);
    assert!(pop.entity(start).unwrap().fitness() >= 1.0);
    for pair in logged.windows(2) {
        assert!(pair[1] >= pair[0], "fitness regressed: {:?}", pair);
    }
}

#[test]
fn test_differential_evolution_population_size_scenario() {
    let mut pop = search_population(10, 5);
    pop.set_differential_evolution_parameters(DifferentialEvolutionParams::default());
    let mut rng = RandomNumberGenerator::from_seed(202);

    let generations = differential_evolution(&mut pop, 5, &mut rng, None).unwrap();
    assert_eq!(generations, 5);
    assert_eq!(pop.size(), 10);
    for rank in 0..pop.size() {
        assert_ne!(
            pop.fitness_by_rank(rank).unwrap(),
            MIN_FITNESS,
            "entity at rank {} was never scored",
            rank
        );
    }
}

#[test]
fn test_gradient_search_beats_its_starting_point() {
    let mut pop = search_population(4, 3);
    pop.set_gradient_parameters(
        Arc::new(|entity: &Entity<RealArray>, out: &mut [f64]| {
            out.copy_from_slice(entity.chromosome(0));
        }),
        Arc::new(|entity: &mut Entity<RealArray>, values: &[f64]| {
            entity.chromosome_mut(0).copy_from_slice(values);
        }),
        Arc::new(|_: &Entity<RealArray>, point: &[f64], grad: &mut [f64]| {
            // d/dx of 1/(1 + sum x^2).
            let sum: f64 = point.iter().map(|x| x * x).sum();
            let denom = (1.0 + sum) * (1.0 + sum);
            let mut sq = 0.0;
            for (g, &x) in grad.iter_mut().zip(point) {
                *g = -2.0 * x / denom;
                sq += *g * *g;
            }
            (sq / grad.len() as f64).sqrt()
        }),
        3,
        0.5,
    );
    let mut rng = RandomNumberGenerator::from_seed(203);

    let start = pop.acquire();
    pop.entity_mut(start)
        .unwrap()
        .chromosome_mut(0)
        .copy_from_slice(&[2.0, -1.5, 1.0]);
    pop.score_entity(start).unwrap();
    let initial = pop.entity(start).unwrap().fitness();

    let iterations = steepest_ascent(&mut pop, Some(start), 150, &mut rng, None).unwrap();
    assert!(iterations > 0);

    let best = pop.best().unwrap();
    let final_fitness = pop.entity(best).unwrap().fitness();
    assert!(
        final_fitness > initial,
        "gradient search did not improve: {} -> {}",
        initial,
        final_fitness
    );
}

#[test]
fn test_random_search_baseline_improves_or_holds() {
    let mut pop = search_population(4, 3);
    let mut rng = RandomNumberGenerator::from_seed(204);

    let start = pop.acquire();
    pop.seed_entity(start, &mut rng).unwrap();
    pop.score_entity(start).unwrap();
    let initial = pop.entity(start).unwrap().fitness();

    random_search(&mut pop, Some(start), 80, &mut rng, None).unwrap();
    let best = pop.best().unwrap();
    assert!(pop.entity(best).unwrap().fitness() >= initial);
}
