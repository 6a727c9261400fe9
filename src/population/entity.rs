//! Entities: one candidate solution each.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::chromosome::Representation;

/// Fitness value marking an entity that has not been scored yet, or
/// whose evaluation failed. Every comparison orders such entities last.
pub const MIN_FITNESS: f64 = f64::MIN;

/// Stable handle to an entity slot within one population's pool.
///
/// Handles stay valid until the entity is released; using a released
/// handle is detected and reported, never undefined behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    /// The underlying slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// An opaque user payload attached to an entity. Payloads are shared by
/// reference counting when entities are copied and dropped when the
/// owning entity is released.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// One candidate solution: a chromosome set, a fitness score and an
/// optional opaque payload.
pub struct Entity<R: Representation> {
    fitness: f64,
    chromosomes: Vec<R::Chromosome>,
    payload: Option<Payload>,
}

impl<R: Representation> Entity<R> {
    pub(crate) fn new(chromosomes: Vec<R::Chromosome>) -> Self {
        Self {
            fitness: MIN_FITNESS,
            chromosomes,
            payload: None,
        }
    }

    /// The entity's current fitness. [`MIN_FITNESS`] means unscored.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Whether the fitness function has scored this entity.
    pub fn is_scored(&self) -> bool {
        self.fitness != MIN_FITNESS
    }

    pub fn chromosomes(&self) -> &[R::Chromosome] {
        &self.chromosomes
    }

    pub fn chromosomes_mut(&mut self) -> &mut [R::Chromosome] {
        &mut self.chromosomes
    }

    pub fn chromosome(&self, index: usize) -> &R::Chromosome {
        &self.chromosomes[index]
    }

    pub fn chromosome_mut(&mut self, index: usize) -> &mut R::Chromosome {
        &mut self.chromosomes[index]
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn set_payload(&mut self, payload: Payload) {
        self.payload = Some(payload);
    }

    pub fn clear_payload(&mut self) {
        self.payload = None;
    }

    pub(crate) fn payload_cloned(&self) -> Option<Payload> {
        self.payload.clone()
    }

    pub(crate) fn set_payload_opt(&mut self, payload: Option<Payload>) {
        self.payload = payload;
    }

    /// Resets the entity to the unscored, payload-free state without
    /// touching chromosome storage.
    pub(crate) fn blank(&mut self) {
        self.fitness = MIN_FITNESS;
        self.payload = None;
    }

    pub(crate) fn into_chromosomes(self) -> Vec<R::Chromosome> {
        self.chromosomes
    }
}

impl<R: Representation> fmt::Debug for Entity<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("fitness", &self.fitness)
            .field("chromosomes", &self.chromosomes)
            .field("payload", &self.payload.as_ref().map(|_| "<opaque>"))
            .finish()
    }
}
