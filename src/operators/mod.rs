//! # Genetic Operator Pipeline
//!
//! Each pipeline stage — seeding, selection, crossover, mutation,
//! replacement, ranking — is a closed set of interchangeable algorithms
//! modelled as an enum. A population holds at most one algorithm per
//! stage in its [`OperatorSet`]; the evolutionary loops dispatch through
//! whatever is installed.
//!
//! Every variant carries a small-integer identity (`id`/`from_id`) used
//! by the disk format: `0` stands for an unset slot and `-1` for an
//! external algorithm the engine cannot name (a custom rank closure).
//! Loading an unrecognized identity degrades that slot to unset with a
//! warning rather than failing the load.

pub mod crossover;
pub mod mutate;
pub mod rank;
pub mod replace;
pub mod seed;
pub mod select;

use crate::chromosome::Representation;

pub use crossover::CrossoverOperator;
pub use mutate::MutationOperator;
pub use rank::RankOperator;
pub use replace::ReplaceOperator;
pub use seed::SeedOperator;
pub use select::{SelectOne, SelectTwo, SelectionState};

/// The per-population table of installed pipeline algorithms. Any slot
/// may be unset; loops requiring a stage report
/// [`crate::error::GeneticError::OperatorUnset`] when it is missing.
pub struct OperatorSet<R: Representation> {
    pub seed: Option<SeedOperator>,
    pub select_one: Option<SelectOne>,
    pub select_two: Option<SelectTwo>,
    pub crossover: Option<CrossoverOperator>,
    pub mutate: Option<MutationOperator>,
    pub replace: Option<ReplaceOperator>,
    pub rank: RankOperator<R>,
}

impl<R: Representation> Default for OperatorSet<R> {
    fn default() -> Self {
        Self {
            seed: None,
            select_one: None,
            select_two: None,
            crossover: None,
            mutate: None,
            replace: None,
            rank: RankOperator::Fitness,
        }
    }
}

impl<R: Representation> Clone for OperatorSet<R> {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            select_one: self.select_one,
            select_two: self.select_two,
            crossover: self.crossover,
            mutate: self.mutate,
            replace: self.replace,
            rank: self.rank.clone(),
        }
    }
}
