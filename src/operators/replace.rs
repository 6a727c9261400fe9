//! Replacement operators: folding a scored child back into the
//! original generation.

use crate::chromosome::Representation;
use crate::error::{GeneticError, Result};
use crate::population::{EntityId, Population};

/// Built-in replacement algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplaceOperator {
    /// The child enters the rank order at its fitness position and the
    /// least-fit original is released; if the child ranks below the
    /// worst original, the child itself is released.
    ByFitness,
    /// Replace the child's own parent when the child is fitter. Not
    /// implemented: the behaviour has never been specified, so this
    /// variant reports `Unsupported` rather than guessing a contract.
    IfParentLessFit,
}

impl ReplaceOperator {
    pub fn id(self) -> i32 {
        match self {
            ReplaceOperator::ByFitness => 1,
            ReplaceOperator::IfParentLessFit => 2,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(ReplaceOperator::ByFitness),
            2 => Some(ReplaceOperator::IfParentLessFit),
            _ => None,
        }
    }

    pub fn apply<R: Representation>(
        self,
        pop: &mut Population<R>,
        child: EntityId,
    ) -> Result<()> {
        match self {
            ReplaceOperator::ByFitness => pop.replace_by_fitness(child),
            ReplaceOperator::IfParentLessFit => Err(GeneticError::Unsupported(
                "replace-parent-if-less-fit has no specified contract".to_string(),
            )),
        }
    }
}
