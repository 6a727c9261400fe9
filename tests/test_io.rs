use std::fs::File;
use std::io::{BufReader, BufWriter};

use genpool::chromosome::{AlleleBounds, RealArray};
use genpool::io::{read_population, write_population};
use genpool::operators::{
    CrossoverOperator, MutationOperator, SeedOperator, SelectOne, SelectTwo,
};
use genpool::population::Population;
use genpool::rng::RandomNumberGenerator;

fn build_population(entities: usize) -> Population<RealArray> {
    let mut pop = Population::builder(RealArray)
        .stable_size(entities)
        .shape(2, 4)
        .bounds(AlleleBounds {
            min_real: -1.0,
            max_real: 1.0,
            ..AlleleBounds::default()
        })
        .crossover_ratio(0.8)
        .mutation_ratio(0.2)
        .allele_mutation_prob(0.05)
        .build()
        .unwrap();
    pop.ops_mut().seed = Some(SeedOperator::RandomUniform);
    pop.ops_mut().select_one = Some(SelectOne::Sus);
    pop.ops_mut().select_two = Some(SelectTwo::Roulette);
    pop.ops_mut().crossover = Some(CrossoverOperator::DoublePoint);
    pop.ops_mut().mutate = Some(MutationOperator::SinglePointDrift);

    let mut rng = RandomNumberGenerator::from_seed(301);
    pop.fill_and_seed(&mut rng).unwrap();
    for rank in 0..pop.size() {
        let id = pop.id_by_rank(rank).unwrap();
        pop.entity_mut(id).unwrap().set_fitness(1.0 / (rank + 1) as f64);
    }
    pop.sort();
    pop
}

#[test]
fn test_disk_round_trip_of_twenty_entities() {
    let pop = build_population(20);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("population.bin");

    {
        let mut writer = BufWriter::new(File::create(&path).unwrap());
        write_population(&pop, &mut writer).unwrap();
    }

    let restored = {
        let mut reader = BufReader::new(File::open(&path).unwrap());
        read_population(&mut reader, RealArray).unwrap()
    };

    assert_eq!(restored.size(), 20);
    assert_eq!(restored.shape(), pop.shape());
    assert_eq!(restored.stable_size(), pop.stable_size());
    assert_eq!(restored.crossover_ratio(), pop.crossover_ratio());
    assert_eq!(restored.mutation_ratio(), pop.mutation_ratio());
    assert_eq!(restored.allele_mutation_prob(), pop.allele_mutation_prob());
    assert_eq!(restored.bounds(), pop.bounds());
    assert_eq!(restored.ops().seed, pop.ops().seed);
    assert_eq!(restored.ops().select_one, pop.ops().select_one);
    assert_eq!(restored.ops().select_two, pop.ops().select_two);
    assert_eq!(restored.ops().crossover, pop.ops().crossover);
    assert_eq!(restored.ops().mutate, pop.ops().mutate);

    for rank in 0..20 {
        let original = pop.entity_by_rank(rank).unwrap();
        let reloaded = restored.entity_by_rank(rank).unwrap();
        assert_eq!(original.fitness(), reloaded.fitness());
        for (a, b) in original.chromosomes().iter().zip(reloaded.chromosomes()) {
            for (x, y) in a.iter().zip(b) {
                assert_eq!(x.to_bits(), y.to_bits(), "allele changed across round trip");
            }
        }
    }
}

#[test]
fn test_round_tripped_population_can_keep_evolving() {
    use genpool::evolution::{self, Evaluator};
    use genpool::population::Entity;
    use std::io::Cursor;
    use std::sync::Arc;

    struct SumOfSquares;
    impl Evaluator<RealArray> for SumOfSquares {
        fn evaluate(&self, entity: &Entity<RealArray>) -> Option<f64> {
            let sum: f64 = entity
                .chromosomes()
                .iter()
                .flat_map(|c| c.iter())
                .map(|x| x * x)
                .sum();
            Some(1.0 + sum)
        }
    }

    let pop = build_population(12);
    let mut buffer = Vec::new();
    write_population(&pop, &mut buffer).unwrap();

    let mut restored = read_population(&mut Cursor::new(&buffer), RealArray).unwrap();
    restored.set_evaluator(Arc::new(SumOfSquares));

    let mut rng = RandomNumberGenerator::from_seed(302);
    let generations = evolution::run(&mut restored, 3, &mut rng, None).unwrap();
    assert_eq!(generations, 3);
    assert_eq!(restored.size(), 12);
}
