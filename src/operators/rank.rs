//! Ranking operators: how two entities are ordered.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::chromosome::Representation;
use crate::population::Entity;

/// Comparator closure for custom ranking. Returning `Greater` ranks the
/// first entity ahead of the second.
pub type RankFn<R> =
    dyn Fn(&Entity<R>, &Entity<R>) -> Ordering + Send + Sync;

/// Entity ordering used by sorting, replacement and differential
/// evolution acceptance.
pub enum RankOperator<R: Representation> {
    /// Higher fitness ranks first. The default.
    Fitness,
    /// Caller-supplied comparator, e.g. for secondary tie-breaking.
    /// Serializes as an external operator.
    Custom(Arc<RankFn<R>>),
}

impl<R: Representation> RankOperator<R> {
    pub fn id(&self) -> i32 {
        match self {
            RankOperator::Fitness => 1,
            RankOperator::Custom(_) => -1,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(RankOperator::Fitness),
            _ => None,
        }
    }

    /// Compares two entities; `Greater` means `a` ranks ahead of `b`.
    pub fn compare(&self, a: &Entity<R>, b: &Entity<R>) -> Ordering {
        match self {
            RankOperator::Fitness => compare_fitness(a.fitness(), b.fitness()),
            RankOperator::Custom(rank) => rank(a, b),
        }
    }
}

impl<R: Representation> Clone for RankOperator<R> {
    fn clone(&self) -> Self {
        match self {
            RankOperator::Fitness => RankOperator::Fitness,
            RankOperator::Custom(rank) => RankOperator::Custom(Arc::clone(rank)),
        }
    }
}

impl<R: Representation> fmt::Debug for RankOperator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankOperator::Fitness => f.write_str("RankOperator::Fitness"),
            RankOperator::Custom(_) => f.write_str("RankOperator::Custom(..)"),
        }
    }
}

/// Total order over fitness values. NaN sorts below every other value
/// so a degenerate score can never win a rank.
pub fn compare_fitness(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| {
        if a.is_nan() && b.is_nan() {
            Ordering::Equal
        } else if a.is_nan() {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    })
}
