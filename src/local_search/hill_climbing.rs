//! Hill climbing: random-ascent and next-ascent variants.
//!
//! Both variants keep a single best entity and, per iteration, mutate
//! one (chromosome, allele) pair of a scratch copy, score it, and adopt
//! the copy only when it strictly beats the current best. Random ascent
//! draws the locus uniformly every iteration; next ascent sweeps the
//! loci deterministically, allele-then-chromosome.

use std::sync::Arc;

use tracing::trace;

use crate::chromosome::{AlleleBounds, ChromosomeShape, Representation};
use crate::error::{GeneticError, Result};
use crate::local_search::IterationHook;
use crate::population::{EntityId, Population};
use crate::rng::RandomNumberGenerator;

/// Mutates exactly one allele of a scratch copy. The child receives a
/// full copy of the parent's chromosomes with the one allele perturbed.
pub trait AlleleMutator<R: Representation>: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn mutate_allele(
        &self,
        repr: &R,
        shape: &ChromosomeShape,
        bounds: &AlleleBounds,
        parent: &[R::Chromosome],
        child: &mut [R::Chromosome],
        chromosome: usize,
        allele: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()>;
}

/// Gaussian perturbation of one real allele, scaled by `sigma`, with
/// out-of-range values wrapped back through the range width. Real-array
/// chromosomes only.
#[derive(Clone, Copy, Debug)]
pub struct GaussianAlleleMutator {
    pub sigma: f64,
}

impl<R: Representation> AlleleMutator<R> for GaussianAlleleMutator {
    fn mutate_allele(
        &self,
        repr: &R,
        _shape: &ChromosomeShape,
        bounds: &AlleleBounds,
        parent: &[R::Chromosome],
        child: &mut [R::Chromosome],
        chromosome: usize,
        allele: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for (src, dst) in parent.iter().zip(child.iter_mut()) {
            repr.replicate(src, dst);
        }
        let slice = repr
            .as_real_slice_mut(&mut child[chromosome])
            .ok_or_else(|| {
                GeneticError::Unsupported(
                    "gaussian allele mutation requires the real-array representation"
                        .to_string(),
                )
            })?;
        let width = bounds.max_real - bounds.min_real;
        let mut value = slice[allele] + rng.random_unit_gaussian() * self.sigma;
        if width > 0.0 {
            while value > bounds.max_real {
                value -= width;
            }
            while value < bounds.min_real {
                value += width;
            }
        } else {
            value = bounds.min_real;
        }
        slice[allele] = value;
        Ok(())
    }
}

/// Representation-native single-step drift of one allele, direction
/// drawn per call. Works with every array representation.
#[derive(Clone, Copy, Debug, Default)]
pub struct DriftAlleleMutator;

impl<R: Representation> AlleleMutator<R> for DriftAlleleMutator {
    fn mutate_allele(
        &self,
        repr: &R,
        _shape: &ChromosomeShape,
        bounds: &AlleleBounds,
        parent: &[R::Chromosome],
        child: &mut [R::Chromosome],
        chromosome: usize,
        allele: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for (src, dst) in parent.iter().zip(child.iter_mut()) {
            repr.replicate(src, dst);
        }
        let direction = if rng.random_boolean() { 1 } else { -1 };
        repr.drift_allele(&mut child[chromosome], allele, direction, bounds, rng)
    }
}

/// Replaces one allele with a fresh random value.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomizeAlleleMutator;

impl<R: Representation> AlleleMutator<R> for RandomizeAlleleMutator {
    fn mutate_allele(
        &self,
        repr: &R,
        _shape: &ChromosomeShape,
        bounds: &AlleleBounds,
        parent: &[R::Chromosome],
        child: &mut [R::Chromosome],
        chromosome: usize,
        allele: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for (src, dst) in parent.iter().zip(child.iter_mut()) {
            repr.replicate(src, dst);
        }
        repr.randomize_allele(&mut child[chromosome], allele, bounds, rng)
    }
}

/// Hill-climbing parameter block, created lazily on the population.
pub struct HillClimbingParams<R: Representation> {
    pub mutate_allele: Arc<dyn AlleleMutator<R>>,
}

impl<R: Representation> Clone for HillClimbingParams<R> {
    fn clone(&self) -> Self {
        Self {
            mutate_allele: Arc::clone(&self.mutate_allele),
        }
    }
}

impl<R: Representation> Population<R> {
    /// Installs the hill-climbing parameter block. Must be called
    /// before either hill-climbing routine.
    pub fn set_hill_climbing_parameters(&mut self, mutate_allele: Arc<dyn AlleleMutator<R>>) {
        self.climbing_params = Some(HillClimbingParams { mutate_allele });
    }
}

/// Random-ascent hill climbing. With no `start` entity, a fresh one is
/// seeded; either way the best solution stays live in the population
/// afterwards. Returns the number of iterations performed.
pub fn random_ascent<R: Representation>(
    pop: &mut Population<R>,
    start: Option<EntityId>,
    max_iterations: usize,
    rng: &mut RandomNumberGenerator,
    hook: Option<IterationHook<'_, R>>,
) -> Result<usize> {
    climb(pop, start, max_iterations, rng, hook, LocusOrder::Random)
}

/// Next-ascent hill climbing: the mutated locus advances
/// deterministically instead of being drawn each iteration. Returns the
/// number of iterations performed.
pub fn next_ascent<R: Representation>(
    pop: &mut Population<R>,
    start: Option<EntityId>,
    max_iterations: usize,
    rng: &mut RandomNumberGenerator,
    hook: Option<IterationHook<'_, R>>,
) -> Result<usize> {
    climb(pop, start, max_iterations, rng, hook, LocusOrder::Sweep)
}

enum LocusOrder {
    Random,
    Sweep,
}

fn climb<R: Representation>(
    pop: &mut Population<R>,
    start: Option<EntityId>,
    max_iterations: usize,
    rng: &mut RandomNumberGenerator,
    mut hook: Option<IterationHook<'_, R>>,
    order: LocusOrder,
) -> Result<usize> {
    let params = pop
        .climbing_params
        .clone()
        .ok_or(GeneticError::OperatorUnset("hill-climbing parameters"))?;
    if pop.evaluator().is_none() {
        return Err(GeneticError::OperatorUnset("evaluator"));
    }

    let shape = pop.shape();
    let putative = pop.acquire();
    let best = match start {
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

    // Sweep cursor; positioned so the first advance lands on (0, 0).
    let mut chromo = shape.num_chromosomes - 1;
    let mut allele = shape.len_chromosomes - 1;

    let mut iteration = 0;
    while iteration < max_iterations {
        if let Some(hook) = hook.as_mut() {
            if !hook(iteration, pop.entity(best)?) {
                break;
            }
        }
        iteration += 1;

        match order {
            LocusOrder::Random => {
                chromo = rng.random_int(shape.num_chromosomes);
                allele = rng.random_int(shape.len_chromosomes);
            }
            LocusOrder::Sweep => {
                allele += 1;
                if allele >= shape.len_chromosomes {
                    allele = 0;
                    chromo += 1;
                    if chromo >= shape.num_chromosomes {
                        chromo = 0;
                    }
                }
            }
        }

        mutate_allele_between(pop, params.mutate_allele.as_ref(), best, putative, chromo, allele, rng)?;
        pop.score_entity(putative)?;

        if pop.entity(putative)?.fitness() > pop.entity(best)?.fitness() {
            pop.blank(best)?;
            pop.copy_entity(best, putative)?;
        }
        trace!(
            iteration,
            fitness = pop.entity(best)?.fitness(),
            "hill climbing step"
        );
    }

    pop.release(putative)?;
    Ok(iteration)
}

fn mutate_allele_between<R: Representation>(
    pop: &mut Population<R>,
    mutator: &dyn AlleleMutator<R>,
    parent: EntityId,
    child: EntityId,
    chromosome: usize,
    allele: usize,
    rng: &mut RandomNumberGenerator,
) -> Result<()> {
    let shape = pop.shape();
    let bounds = *pop.bounds();
    let mut child_entity = pop.take_slot(child)?;
    let outcome = match pop.entity(parent) {
        Ok(parent_entity) => mutator.mutate_allele(
            pop.representation(),
            &shape,
            &bounds,
            parent_entity.chromosomes(),
            child_entity.chromosomes_mut(),
            chromosome,
            allele,
            rng,
        ),
        Err(e) => Err(e),
    };
    if outcome.is_ok() {
        child_entity.blank();
    }
    pop.put_slot(child, child_entity);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::{AlleleBounds, RealArray};
    use crate::evolution::Evaluator;
    use crate::operators::seed::SeedOperator;
    use crate::population::Entity;

    struct NegativeSphere;

    impl Evaluator<RealArray> for NegativeSphere {
        fn evaluate(&self, entity: &Entity<RealArray>) -> Option<f64> {
            Some(-entity.chromosome(0).iter().map(|x| x * x).sum::<f64>())
        }
    }

    fn climbing_pop() -> Population<RealArray> {
        let mut pop = Population::builder(RealArray)
            .stable_size(4)
            .shape(1, 6)
            .bounds(AlleleBounds {
                min_real: -5.0,
                max_real: 5.0,
                ..AlleleBounds::default()
            })
            .evaluator(Arc::new(NegativeSphere))
            .build()
            .unwrap();
        pop.ops_mut().seed = Some(SeedOperator::RandomUniform);
        pop.set_hill_climbing_parameters(Arc::new(GaussianAlleleMutator { sigma: 0.5 }));
        pop
    }

    #[test]
    fn test_random_ascent_improves_monotonically() {
        let mut pop = climbing_pop();
        let mut rng = RandomNumberGenerator::from_seed(41);
        let start = pop.acquire();
        pop.seed_entity(start, &mut rng).unwrap();
        pop.score_entity(start).unwrap();
        let initial = pop.entity(start).unwrap().fitness();

        let mut last = f64::MIN;
        let mut monotone = true;
        let iterations = {
            let mut hook = |_: usize, best: &Entity<RealArray>| {
                if best.fitness() < last {
                    monotone = false;
                }
                last = best.fitness();
                true
            };
            random_ascent(&mut pop, Some(start), 100, &mut rng, Some(&mut hook)).unwrap()
        };

        assert_eq!(iterations, 100);
        assert!(monotone, "best fitness regressed during hill climbing");
        assert!(pop.entity(start).unwrap().fitness() >= initial);
        // The scratch entity was released.
        assert_eq!(pop.size(), 1);
    }

    #[test]
    fn test_next_ascent_runs_and_improves() {
        let mut pop = climbing_pop();
        let mut rng = RandomNumberGenerator::from_seed(42);
        let iterations = next_ascent(&mut pop, None, 60, &mut rng, None).unwrap();
        assert_eq!(iterations, 60);
        let best = pop.best().unwrap();
        assert!(pop.entity(best).unwrap().is_scored());
    }

    #[test]
    fn test_hook_cancels_early() {
        let mut pop = climbing_pop();
        let mut rng = RandomNumberGenerator::from_seed(43);
        let mut hook = |iteration: usize, _: &Entity<RealArray>| iteration < 5;
        let iterations = random_ascent(&mut pop, None, 100, &mut rng, Some(&mut hook)).unwrap();
        assert_eq!(iterations, 5);
    }

    #[test]
    fn test_missing_parameters_is_an_error() {
        let mut pop = Population::builder(RealArray)
            .stable_size(4)
            .shape(1, 6)
            .evaluator(Arc::new(NegativeSphere))
            .build()
            .unwrap();
        pop.ops_mut().seed = Some(SeedOperator::RandomUniform);
        let mut rng = RandomNumberGenerator::from_seed(44);
        assert!(matches!(
            random_ascent(&mut pop, None, 10, &mut rng, None),
            Err(GeneticError::OperatorUnset(_))
        ));
    }
}
