//! Random search: the baseline the other strategies are measured
//! against.

use crate::chromosome::Representation;
use crate::error::{GeneticError, Result};
use crate::local_search::IterationHook;
use crate::population::{EntityId, Population};
use crate::rng::RandomNumberGenerator;

/// Seeds a fresh candidate each iteration and keeps it only when it
/// strictly beats the current best. With no `start` entity a random
/// one is seeded. Returns the number of iterations performed.
pub fn random_search<R: Representation>(
    pop: &mut Population<R>,
    start: Option<EntityId>,
    max_iterations: usize,
    rng: &mut RandomNumberGenerator,
    mut hook: Option<IterationHook<'_, R>>,
) -> Result<usize> {
    if pop.evaluator().is_none() {
        return Err(GeneticError::OperatorUnset("evaluator"));
    }
    if pop.ops().seed.is_none() {
        return Err(GeneticError::OperatorUnset("seed"));
    }

    let mut putative = pop.acquire();
    let mut best = match start {
        Some(id) => {
            pop.entity(id)?;
            id
        }
        None => {
            let id = pop.acquire();
            pop.seed_entity(id, rng)?;
            id
        }
    };

    if !pop.entity(best)?.is_scored() {
        pop.score_entity(best)?;
    }

    let mut iteration = 0;
    while iteration < max_iterations {
        if let Some(hook) = hook.as_mut() {
            if !hook(iteration, pop.entity(best)?) {
                break;
            }
        }
        iteration += 1;

        pop.seed_entity(putative, rng)?;
        pop.score_entity(putative)?;

        if pop.entity(putative)?.fitness() > pop.entity(best)?.fitness() {
            std::mem::swap(&mut best, &mut putative);
        }
    }

    pop.release(putative)?;
    Ok(iteration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::{AlleleBounds, RealArray};
    use crate::evolution::Evaluator;
    use crate::operators::seed::SeedOperator;
    use crate::population::Entity;
    use std::sync::Arc;

    struct NegativeSphere;

    impl Evaluator<RealArray> for NegativeSphere {
        fn evaluate(&self, entity: &Entity<RealArray>) -> Option<f64> {
            Some(-entity.chromosome(0).iter().map(|x| x * x).sum::<f64>())
        }
    }

    fn search_pop() -> Population<RealArray> {
        let mut pop = Population::builder(RealArray)
            .stable_size(4)
            .shape(1, 3)
            .bounds(AlleleBounds {
                min_real: -2.0,
                max_real: 2.0,
                ..AlleleBounds::default()
            })
            .evaluator(Arc::new(NegativeSphere))
            .build()
            .unwrap();
        pop.ops_mut().seed = Some(SeedOperator::RandomUniform);
        pop
    }

    #[test]
    fn test_search_never_regresses() {
        let mut pop = search_pop();
        let mut rng = RandomNumberGenerator::from_seed(71);
        let start = pop.acquire();
        pop.seed_entity(start, &mut rng).unwrap();
        pop.score_entity(start).unwrap();
        let initial = pop.entity(start).unwrap().fitness();

        let iterations = random_search(&mut pop, Some(start), 50, &mut rng, None).unwrap();
        assert_eq!(iterations, 50);

        let best = pop.best().unwrap();
        assert!(pop.entity(best).unwrap().fitness() >= initial);
        assert_eq!(pop.size(), 1);
    }

    #[test]
    fn test_missing_seed_operator_is_an_error() {
        let mut pop = search_pop();
        pop.ops_mut().seed = None;
        let mut rng = RandomNumberGenerator::from_seed(72);
        assert!(matches!(
            random_search(&mut pop, None, 10, &mut rng, None),
            Err(GeneticError::OperatorUnset(_))
        ));
    }
}
