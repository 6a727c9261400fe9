//! # Population & Entity Store
//!
//! A [`Population`] owns a pool of reusable entity slots, two parallel
//! orderings over the live entities (stable slot identity and current
//! fitness rank), the chromosome geometry and evolutionary parameters,
//! and the operator set the evolutionary loops dispatch through.
//!
//! Entities are never individually heap-allocated and freed during
//! steady-state operation: released slots go on a free list and their
//! chromosome buffers into a spare pool, so the next acquisition reuses
//! both. Handles ([`EntityId`]) make the lifecycle explicit — releasing
//! a handle twice is a reported error, not corruption.
//!
//! ## Example
//!
//! ```rust
//! use genpool::chromosome::RealArray;
//! use genpool::population::Population;
//!
//! let mut pop = Population::new(20, 1, 8, RealArray).unwrap();
//! let id = pop.acquire();
//! assert_eq!(pop.size(), 1);
//! pop.release(id).unwrap();
//! assert_eq!(pop.size(), 0);
//! assert!(pop.release(id).is_err()); // double release is detected
//! ```

pub mod entity;

use std::cmp::Ordering;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::chromosome::{AlleleBounds, ChromosomeShape, Representation};
use crate::error::{GeneticError, Result};
use crate::evolution::Evaluator;
use crate::local_search::differential::DifferentialEvolutionParams;
use crate::local_search::gradient::GradientParams;
use crate::local_search::hill_climbing::HillClimbingParams;
use crate::operators::crossover::{CrossoverOperator, PayloadFlow};
use crate::operators::mutate::MutationOperator;
use crate::operators::OperatorSet;
use crate::rng::RandomNumberGenerator;

pub use entity::{Entity, EntityId, Payload, MIN_FITNESS};

/// Default fraction of the population selected for crossover.
pub const DEFAULT_CROSSOVER_RATIO: f64 = 0.9;
/// Default fraction of the population selected for mutation.
pub const DEFAULT_MUTATION_RATIO: f64 = 0.1;
/// Default fraction considered for migration between islands.
pub const DEFAULT_MIGRATION_RATIO: f64 = 0.1;
/// Default per-allele mutation probability for multi-point mutation.
pub const DEFAULT_ALLELE_MUTATION_PROB: f64 = 0.02;
/// Population sizes below this are scored serially.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1000;

/// Survival policy applied to the parent generation after offspring are
/// scored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Elitism {
    /// Parents compete with offspring on fitness.
    #[default]
    ParentsSurvive,
    /// Only the single best parent competes with the offspring.
    OneParentSurvives,
    /// All parents are culled; only offspring survive.
    ParentsDie,
    /// Parents are re-scored before competing, for noisy fitness
    /// functions.
    RescoreParents,
}

impl Elitism {
    pub fn id(self) -> i32 {
        match self {
            Elitism::ParentsSurvive => 1,
            Elitism::OneParentSurvives => 2,
            Elitism::ParentsDie => 3,
            Elitism::RescoreParents => 4,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Elitism::ParentsSurvive),
            2 => Some(Elitism::OneParentSurvives),
            3 => Some(Elitism::ParentsDie),
            4 => Some(Elitism::RescoreParents),
            _ => None,
        }
    }
}

/// The root aggregate: entity pool, orderings, parameters, operators.
pub struct Population<R: Representation> {
    representation: R,
    shape: ChromosomeShape,
    bounds: AlleleBounds,

    stable_size: usize,
    orig_size: usize,
    generation: usize,

    crossover_ratio: f64,
    mutation_ratio: f64,
    migration_ratio: f64,
    allele_mutation_prob: f64,
    elitism: Elitism,
    parallel_threshold: usize,

    slots: Vec<Option<Entity<R>>>,
    free: Vec<usize>,
    rank: Vec<EntityId>,
    spare_chromosomes: Vec<Vec<R::Chromosome>>,

    ops: OperatorSet<R>,
    evaluator: Option<Arc<dyn Evaluator<R>>>,

    // Lazily created algorithm parameter blocks.
    pub(crate) climbing_params: Option<HillClimbingParams<R>>,
    pub(crate) gradient_params: Option<GradientParams<R>>,
    pub(crate) de_params: Option<DifferentialEvolutionParams>,
}

impl<R: Representation> Population<R> {
    /// Creates a population with default parameters. The pool is sized
    /// to four times the stable size up front.
    pub fn new(
        stable_size: usize,
        num_chromosomes: usize,
        len_chromosomes: usize,
        representation: R,
    ) -> Result<Self> {
        Population::builder(representation)
            .stable_size(stable_size)
            .shape(num_chromosomes, len_chromosomes)
            .build()
    }

    /// Returns a builder for configuring ratios, bounds, elitism,
    /// operators and the evaluator before construction.
    pub fn builder(representation: R) -> PopulationBuilder<R> {
        PopulationBuilder::new(representation)
    }

    // ------------------------------------------------------------------
    // Accessors.
    // ------------------------------------------------------------------

    pub fn representation(&self) -> &R {
        &self.representation
    }

    pub fn shape(&self) -> ChromosomeShape {
        self.shape
    }

    pub fn bounds(&self) -> &AlleleBounds {
        &self.bounds
    }

    /// Live entity count.
    pub fn size(&self) -> usize {
        self.rank.len()
    }

    /// Current pool capacity.
    pub fn max_size(&self) -> usize {
        self.slots.len()
    }

    pub fn stable_size(&self) -> usize {
        self.stable_size
    }

    /// The population size snapshotted at generation start. Selection
    /// reads this instead of [`Population::size`] because offspring are
    /// appended while selection is still running.
    pub fn orig_size(&self) -> usize {
        self.orig_size
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn crossover_ratio(&self) -> f64 {
        self.crossover_ratio
    }

    pub fn mutation_ratio(&self) -> f64 {
        self.mutation_ratio
    }

    pub fn migration_ratio(&self) -> f64 {
        self.migration_ratio
    }

    pub fn allele_mutation_prob(&self) -> f64 {
        self.allele_mutation_prob
    }

    pub fn elitism(&self) -> Elitism {
        self.elitism
    }

    pub fn set_elitism(&mut self, elitism: Elitism) {
        self.elitism = elitism;
    }

    pub fn ops(&self) -> &OperatorSet<R> {
        &self.ops
    }

    pub fn ops_mut(&mut self) -> &mut OperatorSet<R> {
        &mut self.ops
    }

    pub fn evaluator(&self) -> Option<&Arc<dyn Evaluator<R>>> {
        self.evaluator.as_ref()
    }

    pub fn set_evaluator(&mut self, evaluator: Arc<dyn Evaluator<R>>) {
        self.evaluator = Some(evaluator);
    }

    // ------------------------------------------------------------------
    // Pool lifecycle.
    // ------------------------------------------------------------------

    /// Returns a free entity slot, growing the pool if none remains.
    /// The fresh entity is unscored; its chromosome contents are
    /// unspecified until seeded or written.
    pub fn acquire(&mut self) -> EntityId {
        if self.free.is_empty() {
            self.grow();
        }
        let index = self.free.pop().expect("free slot available after growth");
        let chromosomes = self.spare_chromosomes.pop().unwrap_or_else(|| {
            (0..self.shape.num_chromosomes)
                .map(|_| self.representation.alloc(self.shape.len_chromosomes))
                .collect()
        });
        debug_assert!(self.slots[index].is_none());
        self.slots[index] = Some(Entity::new(chromosomes));
        let id = EntityId(index);
        self.rank.push(id);
        id
    }

    fn grow(&mut self) {
        let old_max = self.slots.len();
        let new_max = old_max * 3 / 2 + 1;
        debug!(old_max, new_max, "entity pool exhausted, growing");
        self.slots.resize_with(new_max, || None);
        self.free.extend(old_max..new_max);
    }

    /// Releases a live entity: drops its payload, recycles its
    /// chromosome buffers and closes the gap in the rank ordering.
    /// Releasing an already-free handle is an error.
    pub fn release(&mut self, id: EntityId) -> Result<()> {
        let rank = self.rank_of(id)?;
        self.release_at_rank(rank);
        Ok(())
    }

    /// Releases the entity at the given rank position.
    pub fn release_by_rank(&mut self, rank: usize) -> Result<()> {
        if rank >= self.rank.len() {
            return Err(GeneticError::Configuration(format!(
                "rank {} out of range for population of size {}",
                rank,
                self.rank.len()
            )));
        }
        self.release_at_rank(rank);
        Ok(())
    }

    fn release_at_rank(&mut self, rank: usize) {
        let id = self.rank.remove(rank);
        self.retire(id);
    }

    /// Frees slot storage for an entity already removed from the rank
    /// ordering.
    fn retire(&mut self, id: EntityId) {
        let entity = self.slots[id.0].take().expect("retiring a live entity");
        self.spare_chromosomes.push(entity.into_chromosomes());
        self.free.push(id.0);
    }

    /// Clears an entity's payload and fitness while keeping its slot
    /// and chromosome storage. Cheaper than release-then-acquire.
    pub fn blank(&mut self, id: EntityId) -> Result<()> {
        self.entity_mut(id)?.blank();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entity access.
    // ------------------------------------------------------------------

    pub fn entity(&self, id: EntityId) -> Result<&Entity<R>> {
        self.slots
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .ok_or(GeneticError::StaleHandle(id))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity<R>> {
        self.slots
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .ok_or(GeneticError::StaleHandle(id))
    }

    /// The entity's position in the current rank order.
    pub fn rank_of(&self, id: EntityId) -> Result<usize> {
        self.rank
            .iter()
            .position(|&e| e == id)
            .ok_or(GeneticError::StaleHandle(id))
    }

    pub fn id_by_rank(&self, rank: usize) -> Result<EntityId> {
        self.rank
            .get(rank)
            .copied()
            .ok_or_else(|| {
                GeneticError::Configuration(format!(
                    "rank {} out of range for population of size {}",
                    rank,
                    self.rank.len()
                ))
            })
    }

    pub fn entity_by_rank(&self, rank: usize) -> Result<&Entity<R>> {
        let id = self.id_by_rank(rank)?;
        self.entity(id)
    }

    pub fn fitness_by_rank(&self, rank: usize) -> Result<f64> {
        Ok(self.entity_by_rank(rank)?.fitness())
    }

    /// The best-ranked entity, if any.
    pub fn best(&self) -> Option<EntityId> {
        self.rank.first().copied()
    }

    pub(crate) fn take_slot(&mut self, id: EntityId) -> Result<Entity<R>> {
        self.slots
            .get_mut(id.0)
            .and_then(|slot| slot.take())
            .ok_or(GeneticError::StaleHandle(id))
    }

    pub(crate) fn put_slot(&mut self, id: EntityId, entity: Entity<R>) {
        debug_assert!(self.slots[id.0].is_none());
        self.slots[id.0] = Some(entity);
    }

    // ------------------------------------------------------------------
    // Copying.
    // ------------------------------------------------------------------

    /// Deep-copies chromosomes and fitness from `src` into `dest`. The
    /// payload is copied by reference count, never deep-copied.
    pub fn copy_entity(&mut self, dest: EntityId, src: EntityId) -> Result<()> {
        if dest == src {
            return Err(GeneticError::Configuration(
                "cannot copy an entity onto itself".to_string(),
            ));
        }
        let mut dest_entity = self.take_slot(dest)?;
        let outcome = match self.entity(src) {
            Ok(src_entity) => {
                for (d, s) in dest_entity
                    .chromosomes_mut()
                    .iter_mut()
                    .zip(src_entity.chromosomes())
                {
                    self.representation.replicate(s, d);
                }
                dest_entity.set_fitness(src_entity.fitness());
                dest_entity.set_payload_opt(src_entity.payload_cloned());
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.put_slot(dest, dest_entity);
        outcome
    }

    /// Acquires a fresh entity and deep-copies `src` into it.
    pub fn clone_entity(&mut self, src: EntityId) -> Result<EntityId> {
        self.entity(src)?;
        let id = self.acquire();
        self.copy_entity(id, src)?;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Seeding.
    // ------------------------------------------------------------------

    /// Seeds one entity's chromosomes through the population's seed
    /// operator and resets it to unscored.
    pub fn seed_entity(&mut self, id: EntityId, rng: &mut RandomNumberGenerator) -> Result<()> {
        let seed_op = self
            .ops
            .seed
            .ok_or(GeneticError::OperatorUnset("seed"))?;
        let mut entity = self.take_slot(id)?;
        entity.blank();
        let mut outcome = Ok(());
        for chromosome in entity.chromosomes_mut() {
            if let Err(e) = seed_op.apply(&self.representation, chromosome, &self.bounds, rng) {
                outcome = Err(e);
                break;
            }
        }
        self.put_slot(id, entity);
        outcome
    }

    /// Acquires and seeds entities until the population reaches its
    /// stable size.
    pub fn fill_and_seed(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
        while self.size() < self.stable_size {
            let id = self.acquire();
            self.seed_entity(id, rng)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scoring and ordering.
    // ------------------------------------------------------------------

    /// Scores one entity through the evaluator. Returns `false` when
    /// the evaluator reports failure, in which case the entity is
    /// marked unscored.
    pub fn score_entity(&mut self, id: EntityId) -> Result<bool> {
        let evaluator = self
            .evaluator
            .clone()
            .ok_or(GeneticError::OperatorUnset("evaluator"))?;
        let entity = self.entity_mut(id)?;
        match evaluator.evaluate(entity) {
            Some(fitness) => {
                entity.set_fitness(fitness);
                Ok(true)
            }
            None => {
                entity.set_fitness(MIN_FITNESS);
                Ok(false)
            }
        }
    }

    /// Scores every unscored entity. Runs in parallel once the
    /// population is large enough for the fan-out to pay off; each
    /// entity's chromosome storage is private, so no synchronization is
    /// needed between evaluations.
    pub fn ensure_scored(&mut self) -> Result<()> {
        let evaluator = self
            .evaluator
            .clone()
            .ok_or(GeneticError::OperatorUnset("evaluator"))?;
        if self.size() >= self.parallel_threshold {
            self.slots.par_iter_mut().for_each(|slot| {
                if let Some(entity) = slot.as_mut() {
                    if !entity.is_scored() {
                        let fitness = evaluator.evaluate(entity).unwrap_or(MIN_FITNESS);
                        entity.set_fitness(fitness);
                    }
                }
            });
        } else {
            for slot in self.slots.iter_mut() {
                if let Some(entity) = slot.as_mut() {
                    if !entity.is_scored() {
                        let fitness = evaluator.evaluate(entity).unwrap_or(MIN_FITNESS);
                        entity.set_fitness(fitness);
                    }
                }
            }
        }
        Ok(())
    }

    /// Reorders the rank index by the rank operator, best first. The
    /// sort is not stable with respect to ties.
    pub fn sort(&mut self) {
        let slots = &self.slots;
        let rank_op = &self.ops.rank;
        self.rank.sort_unstable_by(|&a, &b| {
            let ea = slots[a.0].as_ref().expect("ranked entity is live");
            let eb = slots[b.0].as_ref().expect("ranked entity is live");
            rank_op.compare(ea, eb).reverse()
        });
    }

    /// Scores every unscored entity, then sorts the rank order.
    pub fn score_and_sort(&mut self) -> Result<()> {
        self.ensure_scored()?;
        self.sort();
        Ok(())
    }

    /// Compares two live entities with the rank operator.
    pub fn compare(&self, a: EntityId, b: EntityId) -> Result<Ordering> {
        let ea = self.entity(a)?;
        let eb = self.entity(b)?;
        Ok(self.ops.rank.compare(ea, eb))
    }

    // ------------------------------------------------------------------
    // Culling.
    // ------------------------------------------------------------------

    /// Releases lowest-ranked entities until the population holds at
    /// most `target` entities.
    pub fn cull_to_size(&mut self, target: usize) {
        while self.size() > target {
            self.release_at_rank(self.size() - 1);
        }
    }

    /// Releases lowest-ranked entities while their fitness is at or
    /// below the floor. With [`MIN_FITNESS`] this culls every entity
    /// whose evaluation failed.
    pub fn cull_below_fitness(&mut self, floor: f64) {
        while let Some(&worst) = self.rank.last() {
            let fitness = self.slots[worst.0]
                .as_ref()
                .expect("ranked entity is live")
                .fitness();
            if fitness <= floor {
                self.release_at_rank(self.size() - 1);
            } else {
                break;
            }
        }
    }

    // ------------------------------------------------------------------
    // Generation bookkeeping.
    // ------------------------------------------------------------------

    pub(crate) fn begin_generation(&mut self) {
        self.orig_size = self.size();
        self.generation += 1;
    }

    pub(crate) fn reset_generation(&mut self) {
        self.generation = 0;
    }

    /// Releases parents (the entities ranked below `orig_size`) until
    /// at most `keep` of them remain.
    pub(crate) fn cull_parents(&mut self, keep: usize) {
        while self.orig_size > keep {
            self.orig_size -= 1;
            self.release_at_rank(self.orig_size);
        }
    }

    /// Marks every parent unscored so the next scoring pass
    /// re-evaluates them.
    pub(crate) fn unscore_parents(&mut self) {
        for rank in 0..self.orig_size {
            let id = self.rank[rank];
            self.slots[id.0]
                .as_mut()
                .expect("ranked entity is live")
                .set_fitness(MIN_FITNESS);
        }
    }

    // ------------------------------------------------------------------
    // Variation plumbing.
    // ------------------------------------------------------------------

    /// Produces two offspring chromosome sets from two parents via the
    /// given crossover operator. Offspring are reset to unscored and
    /// their payloads follow the operator's payload policy.
    pub fn crossover_entities(
        &mut self,
        op: CrossoverOperator,
        father: EntityId,
        mother: EntityId,
        son: EntityId,
        daughter: EntityId,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        if son == daughter || son == father || son == mother || daughter == father
            || daughter == mother
        {
            return Err(GeneticError::Configuration(
                "crossover offspring must be distinct from each other and from the parents"
                    .to_string(),
            ));
        }
        let mut son_entity = self.take_slot(son)?;
        let mut daughter_entity = match self.take_slot(daughter) {
            Ok(e) => e,
            Err(e) => {
                self.put_slot(son, son_entity);
                return Err(e);
            }
        };

        let outcome = {
            let father_entity = self.entity(father);
            let mother_entity = self.entity(mother);
            match (father_entity, mother_entity) {
                (Ok(fe), Ok(me)) => op
                    .apply(
                        &self.representation,
                        &self.shape,
                        fe.chromosomes(),
                        me.chromosomes(),
                        son_entity.chromosomes_mut(),
                        daughter_entity.chromosomes_mut(),
                        rng,
                    )
                    .map(|flow| (flow, fe.payload_cloned(), me.payload_cloned())),
                (Err(e), _) | (_, Err(e)) => Err(e),
            }
        };

        let outcome = outcome.map(|(flow, father_payload, mother_payload)| {
            match flow {
                PayloadFlow::Rebuild => {
                    son_entity.clear_payload();
                    daughter_entity.clear_payload();
                }
                PayloadFlow::FromParents { son_from_father } => {
                    if son_from_father {
                        son_entity.set_payload_opt(father_payload);
                        daughter_entity.set_payload_opt(mother_payload);
                    } else {
                        son_entity.set_payload_opt(mother_payload);
                        daughter_entity.set_payload_opt(father_payload);
                    }
                }
            }
            son_entity.set_fitness(MIN_FITNESS);
            daughter_entity.set_fitness(MIN_FITNESS);
        });

        self.put_slot(son, son_entity);
        self.put_slot(daughter, daughter_entity);
        outcome
    }

    /// Perturbs a copy of the parent's chromosomes into `child` via the
    /// given mutation operator. The child is reset to unscored with no
    /// payload.
    pub fn mutate_entity(
        &mut self,
        op: MutationOperator,
        parent: EntityId,
        child: EntityId,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        if parent == child {
            return Err(GeneticError::Configuration(
                "mutation child must be distinct from its parent".to_string(),
            ));
        }
        let mut child_entity = self.take_slot(child)?;
        let outcome = match self.entity(parent) {
            Ok(parent_entity) => op.apply(
                &self.representation,
                &self.shape,
                &self.bounds,
                self.allele_mutation_prob,
                parent_entity.chromosomes(),
                child_entity.chromosomes_mut(),
                rng,
            ),
            Err(e) => Err(e),
        };
        if outcome.is_ok() {
            child_entity.blank();
        }
        self.put_slot(child, child_entity);
        outcome
    }

    /// Folds a scored child into the original generation: if the child
    /// ranks at least as well as the worst original it takes a rank
    /// position and the worst original is released, otherwise the child
    /// itself is released. Either way the population returns to its
    /// pre-generation size.
    pub fn replace_by_fitness(&mut self, child: EntityId) -> Result<()> {
        if self.orig_size == 0 {
            return Err(GeneticError::EmptyPopulation);
        }
        let child_rank = self.rank_of(child)?;
        if child_rank < self.orig_size {
            return Err(GeneticError::Configuration(
                "replacement child must be a post-generation entity".to_string(),
            ));
        }
        let worst_rank = self.orig_size - 1;
        let worst = self.rank[worst_rank];
        let keep_child = self.compare(child, worst)? != Ordering::Less;
        if keep_child {
            self.rank.remove(child_rank);
            self.rank.remove(worst_rank);
            // Linear scan for the insertion point; ties place the child
            // below existing entities of equal rank.
            let mut position = worst_rank;
            for i in 0..worst_rank {
                let incumbent = self.rank[i];
                if self.compare(incumbent, child)? == Ordering::Less {
                    position = i;
                    break;
                }
            }
            self.rank.insert(position, child);
            self.retire(worst);
        } else {
            self.release(child)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Convergence probes.
    // ------------------------------------------------------------------

    /// Fraction of entity pairs with identical genomes.
    pub fn convergence_genotypes(&self) -> Result<f64> {
        self.convergence_by(|a, b| self.genomes_equal(a, b))
    }

    /// Fraction of chromosome pairs with identical contents.
    pub fn convergence_chromosomes(&self) -> Result<f64> {
        let mut equal = 0usize;
        let mut total = 0usize;
        for i in 0..self.size() {
            for j in (i + 1)..self.size() {
                let a = self.entity_by_rank(i)?;
                let b = self.entity_by_rank(j)?;
                for c in 0..self.shape.num_chromosomes {
                    total += 1;
                    if self.chromosomes_equal(a, b, c)? {
                        equal += 1;
                    }
                }
            }
        }
        if total == 0 {
            return Err(GeneticError::EmptyPopulation);
        }
        Ok(equal as f64 / total as f64)
    }

    /// Fraction of allele pairs with identical values.
    pub fn convergence_alleles(&self) -> Result<f64> {
        let mut equal = 0usize;
        let mut total = 0usize;
        for i in 0..self.size() {
            for j in (i + 1)..self.size() {
                let a = self.entity_by_rank(i)?;
                let b = self.entity_by_rank(j)?;
                for c in 0..self.shape.num_chromosomes {
                    for allele in 0..self.shape.len_chromosomes {
                        total += 1;
                        if self.representation.alleles_equal(
                            a.chromosome(c),
                            b.chromosome(c),
                            allele,
                        )? {
                            equal += 1;
                        }
                    }
                }
            }
        }
        if total == 0 {
            return Err(GeneticError::EmptyPopulation);
        }
        Ok(equal as f64 / total as f64)
    }

    fn convergence_by(
        &self,
        equal: impl Fn(&Entity<R>, &Entity<R>) -> Result<bool>,
    ) -> Result<f64> {
        let n = self.size();
        if n < 2 {
            return Err(GeneticError::EmptyPopulation);
        }
        let mut matches = 0usize;
        let mut total = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                total += 1;
                if equal(self.entity_by_rank(i)?, self.entity_by_rank(j)?)? {
                    matches += 1;
                }
            }
        }
        Ok(matches as f64 / total as f64)
    }

    fn genomes_equal(&self, a: &Entity<R>, b: &Entity<R>) -> Result<bool> {
        for c in 0..self.shape.num_chromosomes {
            if !self.chromosomes_equal(a, b, c)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn chromosomes_equal(&self, a: &Entity<R>, b: &Entity<R>, chromosome: usize) -> Result<bool> {
        for allele in 0..self.shape.len_chromosomes {
            if !self.representation.alleles_equal(
                a.chromosome(chromosome),
                b.chromosome(chromosome),
                allele,
            )? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Builder for [`Population`].
///
/// Provides a fluent interface for configuring evolutionary parameters
/// before construction; `build` validates them as a unit.
pub struct PopulationBuilder<R: Representation> {
    representation: R,
    stable_size: usize,
    shape: ChromosomeShape,
    bounds: AlleleBounds,
    crossover_ratio: f64,
    mutation_ratio: f64,
    migration_ratio: f64,
    allele_mutation_prob: f64,
    elitism: Elitism,
    parallel_threshold: usize,
    ops: OperatorSet<R>,
    evaluator: Option<Arc<dyn Evaluator<R>>>,
}

impl<R: Representation> PopulationBuilder<R> {
    fn new(representation: R) -> Self {
        Self {
            representation,
            stable_size: 0,
            shape: ChromosomeShape {
                num_chromosomes: 1,
                len_chromosomes: 1,
            },
            bounds: AlleleBounds::default(),
            crossover_ratio: DEFAULT_CROSSOVER_RATIO,
            mutation_ratio: DEFAULT_MUTATION_RATIO,
            migration_ratio: DEFAULT_MIGRATION_RATIO,
            allele_mutation_prob: DEFAULT_ALLELE_MUTATION_PROB,
            elitism: Elitism::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            ops: OperatorSet::default(),
            evaluator: None,
        }
    }

    pub fn stable_size(mut self, value: usize) -> Self {
        self.stable_size = value;
        self
    }

    pub fn shape(mut self, num_chromosomes: usize, len_chromosomes: usize) -> Self {
        self.shape = ChromosomeShape {
            num_chromosomes,
            len_chromosomes,
        };
        self
    }

    pub fn bounds(mut self, bounds: AlleleBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn crossover_ratio(mut self, value: f64) -> Self {
        self.crossover_ratio = value;
        self
    }

    pub fn mutation_ratio(mut self, value: f64) -> Self {
        self.mutation_ratio = value;
        self
    }

    pub fn migration_ratio(mut self, value: f64) -> Self {
        self.migration_ratio = value;
        self
    }

    pub fn allele_mutation_prob(mut self, value: f64) -> Self {
        self.allele_mutation_prob = value;
        self
    }

    pub fn elitism(mut self, value: Elitism) -> Self {
        self.elitism = value;
        self
    }

    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = value;
        self
    }

    pub fn operators(mut self, ops: OperatorSet<R>) -> Self {
        self.ops = ops;
        self
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn Evaluator<R>>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn build(self) -> Result<Population<R>> {
        if self.shape.num_chromosomes == 0 || self.shape.len_chromosomes == 0 {
            return Err(GeneticError::Configuration(
                "chromosome shape must be at least 1x1".to_string(),
            ));
        }
        for (name, value) in [
            ("crossover_ratio", self.crossover_ratio),
            ("mutation_ratio", self.mutation_ratio),
            ("migration_ratio", self.migration_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GeneticError::Configuration(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.allele_mutation_prob) {
            return Err(GeneticError::Configuration(format!(
                "allele_mutation_prob must lie in [0, 1], got {}",
                self.allele_mutation_prob
            )));
        }
        if self.bounds.min_integer > self.bounds.max_integer
            || self.bounds.min_real > self.bounds.max_real
        {
            return Err(GeneticError::Configuration(
                "allele bounds must satisfy min <= max".to_string(),
            ));
        }

        // The +1 keeps the pool non-empty even for a zero stable size.
        let max_size = (self.stable_size + 1) * 4;
        Ok(Population {
            representation: self.representation,
            shape: self.shape,
            bounds: self.bounds,
            stable_size: self.stable_size,
            orig_size: 0,
            generation: 0,
            crossover_ratio: self.crossover_ratio,
            mutation_ratio: self.mutation_ratio,
            migration_ratio: self.migration_ratio,
            allele_mutation_prob: self.allele_mutation_prob,
            elitism: self.elitism,
            parallel_threshold: self.parallel_threshold,
            slots: (0..max_size).map(|_| None).collect(),
            free: (0..max_size).rev().collect(),
            rank: Vec::with_capacity(max_size),
            spare_chromosomes: Vec::new(),
            ops: self.ops,
            evaluator: self.evaluator,
            climbing_params: None,
            gradient_params: None,
            de_params: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::{IntegerArray, RealArray};
    use crate::operators::seed::SeedOperator;

    fn small_pop() -> Population<IntegerArray> {
        let mut pop = Population::new(8, 2, 4, IntegerArray).unwrap();
        pop.ops_mut().seed = Some(SeedOperator::RandomUniform);
        pop
    }

    #[test]
    fn test_acquire_release_tracks_size() {
        let mut pop = small_pop();
        let a = pop.acquire();
        let b = pop.acquire();
        assert_eq!(pop.size(), 2);
        pop.release(a).unwrap();
        assert_eq!(pop.size(), 1);
        pop.release(b).unwrap();
        assert_eq!(pop.size(), 0);
    }

    #[test]
    fn test_double_release_is_detected() {
        let mut pop = small_pop();
        let a = pop.acquire();
        pop.release(a).unwrap();
        assert!(matches!(
            pop.release(a),
            Err(GeneticError::StaleHandle(_))
        ));
    }

    #[test]
    fn test_pool_grows_on_demand() {
        let mut pop = small_pop();
        let initial_max = pop.max_size();
        for _ in 0..initial_max + 5 {
            pop.acquire();
        }
        assert!(pop.max_size() > initial_max);
        assert_eq!(pop.size(), initial_max + 5);
    }

    #[test]
    fn test_fresh_entity_is_unscored() {
        let mut pop = small_pop();
        let a = pop.acquire();
        assert!(!pop.entity(a).unwrap().is_scored());
        assert_eq!(pop.entity(a).unwrap().fitness(), MIN_FITNESS);
    }

    #[test]
    fn test_released_storage_is_reused_without_aliasing() {
        let mut pop = small_pop();
        let mut rng = RandomNumberGenerator::from_seed(9);
        let a = pop.acquire();
        pop.seed_entity(a, &mut rng).unwrap();
        pop.entity_mut(a).unwrap().chromosome_mut(0)[0] = 777;
        pop.release(a).unwrap();

        let b = pop.acquire();
        let c = pop.acquire();
        // b reuses a's buffers; writing through b must not affect c.
        pop.entity_mut(b).unwrap().chromosome_mut(0)[0] = 1;
        pop.entity_mut(c).unwrap().chromosome_mut(0)[0] = 2;
        assert_eq!(pop.entity(b).unwrap().chromosome(0)[0], 1);
        assert_eq!(pop.entity(c).unwrap().chromosome(0)[0], 2);
    }

    #[test]
    fn test_copy_entity_deep_copies_chromosomes() {
        let mut pop = small_pop();
        let src = pop.acquire();
        pop.entity_mut(src).unwrap().chromosome_mut(1)[2] = 42;
        pop.entity_mut(src).unwrap().set_fitness(3.5);
        let dest = pop.clone_entity(src).unwrap();

        assert_eq!(pop.entity(dest).unwrap().chromosome(1)[2], 42);
        assert_eq!(pop.entity(dest).unwrap().fitness(), 3.5);

        pop.entity_mut(src).unwrap().chromosome_mut(1)[2] = 0;
        assert_eq!(pop.entity(dest).unwrap().chromosome(1)[2], 42);
    }

    #[test]
    fn test_payload_is_shared_by_reference() {
        let mut pop = small_pop();
        let src = pop.acquire();
        let payload: Payload = Arc::new(String::from("model"));
        pop.entity_mut(src).unwrap().set_payload(payload.clone());
        let dest = pop.clone_entity(src).unwrap();
        let copied = pop.entity(dest).unwrap().payload().unwrap();
        assert!(Arc::ptr_eq(copied, &payload));
    }

    #[test]
    fn test_sort_orders_by_descending_fitness() {
        let mut pop = small_pop();
        let fits = [0.2, 0.9, 0.5, 0.7];
        for &f in &fits {
            let id = pop.acquire();
            pop.entity_mut(id).unwrap().set_fitness(f);
        }
        pop.sort();
        let ranked: Vec<f64> = (0..4).map(|r| pop.fitness_by_rank(r).unwrap()).collect();
        assert_eq!(ranked, vec![0.9, 0.7, 0.5, 0.2]);
    }

    #[test]
    fn test_cull_to_size_drops_worst() {
        let mut pop = small_pop();
        for f in [0.1, 0.9, 0.4, 0.6] {
            let id = pop.acquire();
            pop.entity_mut(id).unwrap().set_fitness(f);
        }
        pop.sort();
        pop.cull_to_size(2);
        assert_eq!(pop.size(), 2);
        assert_eq!(pop.fitness_by_rank(0).unwrap(), 0.9);
        assert_eq!(pop.fitness_by_rank(1).unwrap(), 0.6);
    }

    #[test]
    fn test_cull_below_fitness_removes_failures() {
        let mut pop = small_pop();
        for f in [0.5, MIN_FITNESS, 0.8, MIN_FITNESS] {
            let id = pop.acquire();
            pop.entity_mut(id).unwrap().set_fitness(f);
        }
        pop.sort();
        pop.cull_below_fitness(MIN_FITNESS);
        assert_eq!(pop.size(), 2);
    }

    #[test]
    fn test_convergence_on_clones_is_total() {
        let mut pop = small_pop();
        let mut rng = RandomNumberGenerator::from_seed(4);
        let a = pop.acquire();
        pop.seed_entity(a, &mut rng).unwrap();
        for _ in 0..3 {
            pop.clone_entity(a).unwrap();
        }
        assert_eq!(pop.convergence_genotypes().unwrap(), 1.0);
        assert_eq!(pop.convergence_chromosomes().unwrap(), 1.0);
        assert_eq!(pop.convergence_alleles().unwrap(), 1.0);
    }

    #[test]
    fn test_builder_rejects_bad_ratio() {
        let result = Population::builder(RealArray)
            .stable_size(10)
            .shape(1, 4)
            .crossover_ratio(1.5)
            .build();
        assert!(matches!(result, Err(GeneticError::Configuration(_))));
    }

    #[test]
    fn test_builder_rejects_empty_shape() {
        let result = Population::builder(RealArray)
            .stable_size(10)
            .shape(0, 4)
            .build();
        assert!(matches!(result, Err(GeneticError::Configuration(_))));
    }
}
