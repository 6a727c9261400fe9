//! # Evolutionary Loops
//!
//! The generational loop ([`run`]) and the steady-state loop
//! ([`run_steady_state`]), both driving the operator pipeline over a
//! [`Population`].
//!
//! A generation is: snapshot `orig_size`, run the crossover cycle
//! (two-parent selections until the selector reports done, two
//! offspring per pair), run the mutation cycle (one-parent selections,
//! one offspring each), score everything new, then apply the elitism
//! policy and cull back to the stable size. The steady-state variant
//! replaces the bulk survival step with per-child insertion through the
//! population's replace operator.
//!
//! Both loops are bounded by an explicit generation budget and an
//! optional hook invoked once per generation, which doubles as a
//! cooperative cancellation point: return `false` to stop early.
//!
//! ## Example
//!
//! ```rust
//! use genpool::chromosome::{AlleleBounds, RealArray};
//! use genpool::evolution::{self, Evaluator};
//! use genpool::operators::{
//!     CrossoverOperator, MutationOperator, SeedOperator, SelectOne, SelectTwo,
//! };
//! use genpool::population::{Entity, Population};
//! use genpool::rng::RandomNumberGenerator;
//! use std::sync::Arc;
//!
//! struct SphereMax;
//!
//! impl Evaluator<RealArray> for SphereMax {
//!     fn evaluate(&self, entity: &Entity<RealArray>) -> Option<f64> {
//!         let sum: f64 = entity.chromosome(0).iter().map(|x| x * x).sum();
//!         Some(-sum)
//!     }
//! }
//!
//! let mut pop = Population::builder(RealArray)
//!     .stable_size(30)
//!     .shape(1, 4)
//!     .bounds(AlleleBounds { min_real: -1.0, max_real: 1.0, ..Default::default() })
//!     .evaluator(Arc::new(SphereMax))
//!     .build()
//!     .unwrap();
//! pop.ops_mut().seed = Some(SeedOperator::RandomUniform);
//! pop.ops_mut().select_one = Some(SelectOne::Random);
//! pop.ops_mut().select_two = Some(SelectTwo::BestOfTwo);
//! pop.ops_mut().crossover = Some(CrossoverOperator::SinglePoint);
//! pop.ops_mut().mutate = Some(MutationOperator::Multipoint);
//!
//! let mut rng = RandomNumberGenerator::from_seed(17);
//! let generations = evolution::run(&mut pop, 10, &mut rng, None).unwrap();
//! assert_eq!(generations, 10);
//! ```

use tracing::debug;

use crate::chromosome::Representation;
use crate::error::{GeneticError, Result};
use crate::operators::SelectionState;
use crate::population::{Elitism, Entity, Population, MIN_FITNESS};
use crate::rng::RandomNumberGenerator;

/// The caller-supplied fitness function.
///
/// Returning `Some(fitness)` scores the entity; returning `None` marks
/// the evaluation failed, leaving the entity at the unscored sentinel
/// so the survival step culls it. Evaluators run concurrently across
/// entities, hence the `Send + Sync` bound.
pub trait Evaluator<R: Representation>: Send + Sync {
    fn evaluate(&self, entity: &Entity<R>) -> Option<f64>;
}

/// Per-generation callback. Returning `false` stops the loop before
/// its generation budget is spent.
pub type GenerationHook<'a, R> = &'a mut dyn FnMut(usize, &Population<R>) -> bool;

/// Runs the generational loop for at most `max_generations`
/// generations. Returns the number of generations performed.
pub fn run<R: Representation>(
    pop: &mut Population<R>,
    max_generations: usize,
    rng: &mut RandomNumberGenerator,
    mut generation_hook: Option<GenerationHook<'_, R>>,
) -> Result<usize> {
    require_ops(pop, false)?;

    pop.reset_generation();
    prepare(pop, rng)?;

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
        debug!(
            generation,
            size = pop.size(),
            "generation start"
        );

        crossover_cycle(pop, rng)?;
        mutation_cycle(pop, rng)?;
        pop.ensure_scored()?;
        survival(pop)?;

        debug!(
            generation,
            best = pop.fitness_by_rank(0).unwrap_or(MIN_FITNESS),
            worst = pop
                .fitness_by_rank(pop.size().saturating_sub(1))
                .unwrap_or(MIN_FITNESS),
            "generation complete"
        );
    }

    Ok(generation)
}

/// Runs the steady-state loop: each iteration produces at most one
/// crossover pair and one mutant, scores them immediately and folds
/// them in through the replace operator. Returns the number of
/// iterations performed.
pub fn run_steady_state<R: Representation>(
    pop: &mut Population<R>,
    max_iterations: usize,
    rng: &mut RandomNumberGenerator,
    mut generation_hook: Option<GenerationHook<'_, R>>,
) -> Result<usize> {
    require_ops(pop, true)?;

    pop.reset_generation();
    prepare(pop, rng)?;

    let replace = pop.ops().replace.ok_or(GeneticError::OperatorUnset("replace"))?;
    let select_two = pop
        .ops()
        .select_two
        .ok_or(GeneticError::OperatorUnset("select_two"))?;
    let select_one = pop
        .ops()
        .select_one
        .ok_or(GeneticError::OperatorUnset("select_one"))?;
    let cross = pop
        .ops()
        .crossover
        .ok_or(GeneticError::OperatorUnset("crossover"))?;
    let mutate = pop.ops().mutate.ok_or(GeneticError::OperatorUnset("mutate"))?;

    let mut iteration = 0;
    loop {
        if let Some(hook) = generation_hook.as_mut() {
            if !hook(iteration, pop) {
                break;
            }
        }
        if iteration >= max_iterations {
            break;
        }
        iteration += 1;
        pop.begin_generation();

        let mut children = Vec::with_capacity(3);

        let mut state = SelectionState::new();
        let (pair, _) = select_two.select(pop, &mut state, rng)?;
        if let Some((mother, father)) = pair {
            let son = pop.acquire();
            let daughter = pop.acquire();
            pop.crossover_entities(cross, father, mother, son, daughter, rng)?;
            for child in [son, daughter] {
                if pop.score_entity(child)? {
                    children.push(child);
                } else {
                    pop.release(child)?;
                }
            }
        }

        let mut state = SelectionState::new();
        let (parent, _) = select_one.select(pop, &mut state, rng)?;
        if let Some(parent) = parent {
            let child = pop.acquire();
            pop.mutate_entity(mutate, parent, child, rng)?;
            if pop.score_entity(child)? {
                children.push(child);
            } else {
                pop.release(child)?;
            }
        }

        for child in children {
            replace.apply(pop, child)?;
        }
    }

    Ok(iteration)
}

fn require_ops<R: Representation>(pop: &Population<R>, steady_state: bool) -> Result<()> {
    if pop.evaluator().is_none() {
        return Err(GeneticError::OperatorUnset("evaluator"));
    }
    if pop.ops().select_one.is_none() {
        return Err(GeneticError::OperatorUnset("select_one"));
    }
    if pop.ops().select_two.is_none() {
        return Err(GeneticError::OperatorUnset("select_two"));
    }
    if pop.ops().mutate.is_none() {
        return Err(GeneticError::OperatorUnset("mutate"));
    }
    if pop.ops().crossover.is_none() {
        return Err(GeneticError::OperatorUnset("crossover"));
    }
    if steady_state && pop.ops().replace.is_none() {
        return Err(GeneticError::OperatorUnset("replace"));
    }
    Ok(())
}

/// Fills, scores and sorts the initial population, culling entities
/// whose evaluation failed.
fn prepare<R: Representation>(
    pop: &mut Population<R>,
    rng: &mut RandomNumberGenerator,
) -> Result<()> {
    if pop.size() < pop.stable_size() {
        pop.fill_and_seed(rng)?;
    }
    pop.ensure_scored()?;
    pop.sort();
    pop.cull_below_fitness(MIN_FITNESS);
    if pop.size() == 0 {
        return Err(GeneticError::EmptyPopulation);
    }
    Ok(())
}

fn crossover_cycle<R: Representation>(
    pop: &mut Population<R>,
    rng: &mut RandomNumberGenerator,
) -> Result<()> {
    if pop.crossover_ratio() <= 0.0 {
        return Ok(());
    }
    let select = pop
        .ops()
        .select_two
        .ok_or(GeneticError::OperatorUnset("select_two"))?;
    let cross = pop
        .ops()
        .crossover
        .ok_or(GeneticError::OperatorUnset("crossover"))?;
    let mut state = SelectionState::new();
    loop {
        let (pair, done) = select.select(pop, &mut state, rng)?;
        if done {
            break;
        }
        if let Some((mother, father)) = pair {
            let son = pop.acquire();
            let daughter = pop.acquire();
            pop.crossover_entities(cross, father, mother, son, daughter, rng)?;
        }
    }
    Ok(())
}

fn mutation_cycle<R: Representation>(
    pop: &mut Population<R>,
    rng: &mut RandomNumberGenerator,
) -> Result<()> {
    if pop.mutation_ratio() <= 0.0 {
        return Ok(());
    }
    let select = pop
        .ops()
        .select_one
        .ok_or(GeneticError::OperatorUnset("select_one"))?;
    let mutate = pop.ops().mutate.ok_or(GeneticError::OperatorUnset("mutate"))?;
    let mut state = SelectionState::new();
    loop {
        let (parent, done) = select.select(pop, &mut state, rng)?;
        if done {
            break;
        }
        if let Some(parent) = parent {
            let child = pop.acquire();
            pop.mutate_entity(mutate, parent, child, rng)?;
        }
    }
    Ok(())
}

/// Applies the elitism policy, sorts and culls back to the stable size.
fn survival<R: Representation>(pop: &mut Population<R>) -> Result<()> {
    match pop.elitism() {
        Elitism::ParentsSurvive => {}
        Elitism::ParentsDie => pop.cull_parents(0),
        Elitism::OneParentSurvives => pop.cull_parents(1),
        Elitism::RescoreParents => {
            pop.unscore_parents();
            pop.ensure_scored()?;
        }
    }
    pop.sort();
    pop.cull_to_size(pop.stable_size());
    pop.cull_below_fitness(MIN_FITNESS);
    Ok(())
}
