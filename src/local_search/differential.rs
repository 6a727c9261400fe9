//! Differential evolution.
//!
//! The whole population acts as a set of trial vectors: every
//! generation each original member spawns one trial offspring built
//! from weighted differences of other members, the trial keeps its slot
//! only if it ranks at least as well as its parent, and the original
//! generation is culled wholesale at generation end.
//!
//! Operates on chromosome 0 of the real-array representation; further
//! chromosomes, if configured, pass through untouched.

use std::cmp::Ordering;

use tracing::debug;

use crate::chromosome::Representation;
use crate::error::{GeneticError, Result};
use crate::evolution::GenerationHook;
use crate::population::Population;
use crate::rng::RandomNumberGenerator;

/// Which base vector a trial is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeStrategy {
    /// Perturb the current best member.
    Best,
    /// Perturb a random member.
    Rand,
    /// Pull the parent toward the best member.
    RandToBest,
}

/// How donor alleles are mixed into the trial vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeCrossover {
    /// Independent coin flip per allele.
    Binomial,
    /// A contiguous run of alleles of geometrically distributed length.
    Exponential,
}

/// Differential-evolution parameter block, created lazily on the
/// population.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifferentialEvolutionParams {
    pub strategy: DeStrategy,
    pub crossover: DeCrossover,
    /// Number of difference pairs: 1–3 for `Best`/`Rand`, 1–2 for
    /// `RandToBest`.
    pub num_perturbed: usize,
    /// Weighting factor range; equal bounds give a fixed factor,
    /// otherwise one factor per generation is drawn uniformly.
    pub weighting_min: f64,
    pub weighting_max: f64,
    /// Exponential crossover continuation probability, in `[0, 1]`.
    pub crossover_factor: f64,
}

impl Default for DifferentialEvolutionParams {
    fn default() -> Self {
        Self {
            strategy: DeStrategy::Rand,
            crossover: DeCrossover::Binomial,
            num_perturbed: 1,
            weighting_min: 0.5,
            weighting_max: 0.5,
            crossover_factor: 0.9,
        }
    }
}

impl<R: Representation> Population<R> {
    /// Installs the differential-evolution parameter block. Must be
    /// called before [`differential_evolution`].
    pub fn set_differential_evolution_parameters(
        &mut self,
        params: DifferentialEvolutionParams,
    ) {
        self.de_params = Some(params);
    }
}

/// Moves `num` random rank indices (none equal to `avoid`) to the front
/// of the permutation buffer.
fn pick_entities(
    permutation: &mut [usize],
    num: usize,
    size: usize,
    avoid: usize,
    rng: &mut RandomNumberGenerator,
) {
    for j in 0..num {
        let mut pos;
        loop {
            pos = j + rng.random_int(size - j);
            if permutation[pos] != avoid {
                break;
            }
        }
        permutation.swap(j, pos);
    }
}

/// Runs differential evolution for at most `max_generations`
/// generations. Returns the number of generations performed.
pub fn differential_evolution<R: Representation>(
    pop: &mut Population<R>,
    max_generations: usize,
    rng: &mut RandomNumberGenerator,
    mut generation_hook: Option<GenerationHook<'_, R>>,
) -> Result<usize> {
    let params = pop
        .de_params
        .clone()
        .ok_or(GeneticError::OperatorUnset("differential-evolution parameters"))?;
    if pop.evaluator().is_none() {
        return Err(GeneticError::OperatorUnset("evaluator"));
    }
    if pop.stable_size() < 6 {
        return Err(GeneticError::Configuration(
            "differential evolution needs a stable size of at least 6".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&params.crossover_factor) {
        return Err(GeneticError::Configuration(format!(
            "crossover factor must lie in [0, 1], got {}",
            params.crossover_factor
        )));
    }
    let pairs_limit = match params.strategy {
        DeStrategy::Best | DeStrategy::Rand => 3,
        DeStrategy::RandToBest => 2,
    };
    if params.num_perturbed == 0 || params.num_perturbed > pairs_limit {
        return Err(GeneticError::Configuration(format!(
            "{:?} strategy supports 1..={} difference pairs, got {}",
            params.strategy, pairs_limit, params.num_perturbed
        )));
    }
    let picks_needed = match params.strategy {
        DeStrategy::Best | DeStrategy::RandToBest => 2 * params.num_perturbed,
        DeStrategy::Rand => 2 * params.num_perturbed + 1,
    };
    if pop.stable_size() <= picks_needed {
        return Err(GeneticError::Configuration(format!(
            "{:?}/{} needs a population larger than {} to draw distinct donors",
            params.strategy, params.num_perturbed, picks_needed
        )));
    }
    {
        // The trial arithmetic needs a real-vector view of chromosome 0.
        let probe = pop.representation().alloc(1);
        if pop.representation().as_real_slice(&probe).is_none() {
            return Err(GeneticError::Unsupported(
                "differential evolution requires the real-array representation".to_string(),
            ));
        }
    }

    pop.reset_generation();
    if pop.size() < pop.stable_size() {
        pop.fill_and_seed(rng)?;
    }
    pop.ensure_scored()?;

    let len = pop.shape().len_chromosomes;
    let mut generation = 0;
    loop {
        if let Some(hook) = generation_hook.as_mut() {
            if !hook(generation, pop) {
                break;
            }
        }
        if generation >= max_generations {
            break;
        }
        generation += 1;
        pop.begin_generation();
        let orig_size = pop.orig_size();

        let weighting = if params.weighting_min == params.weighting_max {
            params.weighting_min
        } else {
            rng.random_double_range(params.weighting_min, params.weighting_max)
        };

        // Locate the current best by the active ranking function.
        let mut best_rank = 0;
        for rank in 1..orig_size {
            let challenger = pop.id_by_rank(rank)?;
            let incumbent = pop.id_by_rank(best_rank)?;
            if pop.compare(challenger, incumbent)? == Ordering::Greater {
                best_rank = rank;
            }
        }
        debug!(
            generation,
            weighting,
            best = pop.fitness_by_rank(best_rank)?,
            "differential evolution generation"
        );

        let mut permutation: Vec<usize> = (0..orig_size).collect();
        for i in 0..orig_size {
            let parent = pop.id_by_rank(i)?;
            let trial = pop.clone_entity(parent)?;

            pick_entities(&mut permutation, picks_needed, orig_size, i, rng);
            let picks: Vec<usize> = permutation[..picks_needed].to_vec();

            build_trial(
                pop,
                &params,
                trial,
                best_rank,
                &picks,
                weighting,
                len,
                rng,
            )?;

            // A trial survives only if it scores at least as well as
            // its parent; otherwise the parent's values are restored
            // into the trial slot.
            let scored = pop.score_entity(trial)?;
            let keep = scored && pop.compare(trial, parent)? != Ordering::Less;
            if !keep {
                pop.blank(trial)?;
                pop.copy_entity(trial, parent)?;
            }
        }

        // The original generation dies; the trial set remains.
        pop.cull_parents(0);
    }

    pop.sort();
    Ok(generation)
}

/// Writes the donor alleles into the trial entity's chromosome 0
/// according to the configured strategy and crossover style.
#[allow(clippy::too_many_arguments)]
fn build_trial<R: Representation>(
    pop: &mut Population<R>,
    params: &DifferentialEvolutionParams,
    trial: crate::population::EntityId,
    best_rank: usize,
    picks: &[usize],
    weighting: f64,
    len: usize,
    rng: &mut RandomNumberGenerator,
) -> Result<()> {
    let mut trial_entity = pop.take_slot(trial)?;
    let outcome = (|| -> Result<()> {
        let donor = |pop: &Population<R>, n: usize, current: f64| -> Result<f64> {
            let allele = |rank: usize| -> Result<f64> {
                let entity = pop.entity_by_rank(rank)?;
                let slice = pop
                    .representation()
                    .as_real_slice(entity.chromosome(0))
                    .ok_or_else(|| {
                        GeneticError::Unsupported(
                            "differential evolution requires the real-array representation"
                                .to_string(),
                        )
                    })?;
                Ok(slice[n])
            };
            let k = params.num_perturbed;
            match params.strategy {
                DeStrategy::Best => {
                    let mut sum = allele(best_rank)?;
                    for &p in &picks[..k] {
                        sum += weighting * allele(p)?;
                    }
                    for &p in &picks[k..2 * k] {
                        sum -= weighting * allele(p)?;
                    }
                    Ok(sum)
                }
                DeStrategy::Rand => {
                    let mut sum = allele(picks[0])?;
                    for &p in &picks[1..=k] {
                        sum += weighting * allele(p)?;
                    }
                    for &p in &picks[k + 1..=2 * k] {
                        sum -= weighting * allele(p)?;
                    }
                    Ok(sum)
                }
                DeStrategy::RandToBest => {
                    let mut sum = current + weighting * (allele(best_rank)? - current);
                    for &p in &picks[..k] {
                        sum += weighting * allele(p)?;
                    }
                    for &p in &picks[k..2 * k] {
                        sum -= weighting * allele(p)?;
                    }
                    Ok(sum)
                }
            }
        };

        let chromosome = trial_entity.chromosome_mut(0);
        let mut n = rng.random_int(len);
        match params.crossover {
            DeCrossover::Binomial => {
                {
                    let slice = pop
                        .representation()
                        .as_real_slice_mut(chromosome)
                        .expect("validated real representation");
                    let current = slice[n];
                    slice[n] = donor(pop, n, current)?;
                }
                for _ in 1..len {
                    if rng.random_boolean() {
                        let slice = pop
                            .representation()
                            .as_real_slice_mut(chromosome)
                            .expect("validated real representation");
                        let current = slice[n];
                        slice[n] = donor(pop, n, current)?;
                    }
                    n = (n + 1) % len;
                }
            }
            DeCrossover::Exponential => {
                let mut run = 0;
                loop {
                    let slice = pop
                        .representation()
                        .as_real_slice_mut(chromosome)
                        .expect("validated real representation");
                    let current = slice[n];
                    slice[n] = donor(pop, n, current)?;
                    n = (n + 1) % len;
                    run += 1;
                    if !(rng.random_boolean_prob(params.crossover_factor) && run < len) {
                        break;
                    }
                }
            }
        }
        Ok(())
    })();
    pop.put_slot(trial, trial_entity);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::{AlleleBounds, RealArray};
    use crate::evolution::Evaluator;
    use crate::operators::seed::SeedOperator;
    use crate::population::{Entity, MIN_FITNESS};
    use std::sync::Arc;

    struct NegativeSphere;

    impl Evaluator<RealArray> for NegativeSphere {
        fn evaluate(&self, entity: &Entity<RealArray>) -> Option<f64> {
            Some(-entity.chromosome(0).iter().map(|x| x * x).sum::<f64>())
        }
    }

    fn de_pop(stable: usize) -> Population<RealArray> {
        let mut pop = Population::builder(RealArray)
            .stable_size(stable)
            .shape(1, 5)
            .bounds(AlleleBounds {
                min_real: -3.0,
                max_real: 3.0,
                ..AlleleBounds::default()
            })
            .evaluator(Arc::new(NegativeSphere))
            .build()
            .unwrap();
        pop.ops_mut().seed = Some(SeedOperator::RandomUniform);
        pop.set_differential_evolution_parameters(DifferentialEvolutionParams::default());
        pop
    }

    #[test]
    fn test_population_size_is_preserved() {
        let mut pop = de_pop(10);
        let mut rng = RandomNumberGenerator::from_seed(61);
        let generations = differential_evolution(&mut pop, 5, &mut rng, None).unwrap();
        assert_eq!(generations, 5);
        assert_eq!(pop.size(), 10);
        for rank in 0..pop.size() {
            assert_ne!(pop.fitness_by_rank(rank).unwrap(), MIN_FITNESS);
        }
    }

    #[test]
    fn test_best_fitness_never_regresses() {
        let mut pop = de_pop(12);
        let mut rng = RandomNumberGenerator::from_seed(62);
        differential_evolution(&mut pop, 1, &mut rng, None).unwrap();
        let first = (0..pop.size())
            .map(|r| pop.fitness_by_rank(r).unwrap())
            .fold(f64::MIN, f64::max);
        differential_evolution(&mut pop, 10, &mut rng, None).unwrap();
        let last = pop.fitness_by_rank(0).unwrap();
        assert!(last >= first, "best fitness regressed: {} -> {}", first, last);
    }

    #[test]
    fn test_small_population_is_rejected() {
        let mut pop = de_pop(5);
        let mut rng = RandomNumberGenerator::from_seed(63);
        assert!(matches!(
            differential_evolution(&mut pop, 5, &mut rng, None),
            Err(GeneticError::Configuration(_))
        ));
    }

    #[test]
    fn test_bad_crossover_factor_is_rejected() {
        let mut pop = de_pop(10);
        pop.set_differential_evolution_parameters(DifferentialEvolutionParams {
            crossover_factor: 1.5,
            ..DifferentialEvolutionParams::default()
        });
        let mut rng = RandomNumberGenerator::from_seed(64);
        assert!(matches!(
            differential_evolution(&mut pop, 5, &mut rng, None),
            Err(GeneticError::Configuration(_))
        ));
    }

    #[test]
    fn test_rand_to_best_with_three_pairs_is_rejected() {
        let mut pop = de_pop(10);
        pop.set_differential_evolution_parameters(DifferentialEvolutionParams {
            strategy: DeStrategy::RandToBest,
            num_perturbed: 3,
            ..DifferentialEvolutionParams::default()
        });
        let mut rng = RandomNumberGenerator::from_seed(65);
        assert!(matches!(
            differential_evolution(&mut pop, 5, &mut rng, None),
            Err(GeneticError::Configuration(_))
        ));
    }

    #[test]
    fn test_exponential_crossover_runs() {
        let mut pop = de_pop(8);
        pop.set_differential_evolution_parameters(DifferentialEvolutionParams {
            strategy: DeStrategy::Best,
            crossover: DeCrossover::Exponential,
            num_perturbed: 2,
            weighting_min: 0.4,
            weighting_max: 0.9,
            crossover_factor: 0.7,
        });
        let mut rng = RandomNumberGenerator::from_seed(66);
        let generations = differential_evolution(&mut pop, 3, &mut rng, None).unwrap();
        assert_eq!(generations, 3);
        assert_eq!(pop.size(), 8);
    }
}
