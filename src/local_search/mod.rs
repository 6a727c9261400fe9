//! # Local Search Algorithms
//!
//! Single-solution optimization strategies that share the population's
//! entity pool and evaluation contract instead of running a full
//! generational loop: hill climbing ([`hill_climbing`]), steepest-ascent
//! gradient search ([`gradient`]), differential evolution
//! ([`differential`]) and plain random search ([`random_search`]).
//!
//! Every routine is bounded by an explicit iteration or generation
//! budget and an optional per-step hook; the hook doubles as a
//! cooperative cancellation point. Running out of budget — or a step
//! size underflowing — is a normal outcome reported through the
//! returned count, not an error.

pub mod differential;
pub mod gradient;
pub mod hill_climbing;
pub mod random_search;

use crate::chromosome::Representation;
use crate::population::Entity;

pub use differential::{
    differential_evolution, DeCrossover, DeStrategy, DifferentialEvolutionParams,
};
pub use gradient::{steepest_ascent, GradientParams, APPROX_ZERO};
pub use hill_climbing::{
    next_ascent, random_ascent, AlleleMutator, DriftAlleleMutator, GaussianAlleleMutator,
    HillClimbingParams, RandomizeAlleleMutator,
};
pub use random_search::random_search;

/// Per-iteration callback for the single-solution searches. Receives
/// the iteration number and the current best entity; returning `false`
/// stops the search before its budget is spent.
pub type IterationHook<'a, R> = &'a mut dyn FnMut(usize, &Entity<R>) -> bool;
