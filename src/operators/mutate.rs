//! Mutation operators: one parent, one perturbed child.

use crate::chromosome::{AlleleBounds, ChromosomeShape, Representation};
use crate::error::Result;
use crate::rng::RandomNumberGenerator;

/// Built-in mutation algorithms. Every algorithm first copies the
/// parent's chromosomes into the child, then perturbs the copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationOperator {
    /// One uniformly chosen allele drifts a single step (Gaussian for
    /// reals, bit inversion for booleans and bitstrings).
    SinglePointDrift,
    /// One uniformly chosen allele is replaced with a fresh random
    /// value.
    SinglePointRandomize,
    /// Every allele drifts independently, gated by the population's
    /// per-allele mutation probability. One drift direction is drawn
    /// per mutation event.
    Multipoint,
    /// Every allele drifts; discrete kinds step up, down or stay with
    /// equal probability, reals always drift.
    AllPoint,
}

impl MutationOperator {
    pub fn id(self) -> i32 {
        match self {
            MutationOperator::SinglePointDrift => 1,
            MutationOperator::SinglePointRandomize => 2,
            MutationOperator::Multipoint => 3,
            MutationOperator::AllPoint => 4,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(MutationOperator::SinglePointDrift),
            2 => Some(MutationOperator::SinglePointRandomize),
            3 => Some(MutationOperator::Multipoint),
            4 => Some(MutationOperator::AllPoint),
            _ => None,
        }
    }

    /// Copies the parent's chromosomes into the child and applies the
    /// perturbation.
    pub(crate) fn apply<R: Representation>(
        self,
        repr: &R,
        shape: &ChromosomeShape,
        bounds: &AlleleBounds,
        allele_mutation_prob: f64,
        parent: &[R::Chromosome],
        child: &mut [R::Chromosome],
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for (src, dst) in parent.iter().zip(child.iter_mut()) {
            repr.replicate(src, dst);
        }
        match self {
            MutationOperator::SinglePointDrift => {
                let chromo = rng.random_int(shape.num_chromosomes);
                let point = rng.random_int(shape.len_chromosomes);
                let direction = if rng.random_boolean() { 1 } else { -1 };
                repr.drift_allele(&mut child[chromo], point, direction, bounds, rng)
            }
            MutationOperator::SinglePointRandomize => {
                let chromo = rng.random_int(shape.num_chromosomes);
                let point = rng.random_int(shape.len_chromosomes);
                repr.randomize_allele(&mut child[chromo], point, bounds, rng)
            }
            MutationOperator::Multipoint => {
                let direction = if rng.random_boolean() { 1 } else { -1 };
                for chromosome in child.iter_mut() {
                    for point in 0..shape.len_chromosomes {
                        if rng.random_boolean_prob(allele_mutation_prob) {
                            repr.drift_allele(chromosome, point, direction, bounds, rng)?;
                        }
                    }
                }
                Ok(())
            }
            MutationOperator::AllPoint => {
                for chromosome in child.iter_mut() {
                    repr.drift_all_alleles(chromosome, bounds, rng)?;
                }
                Ok(())
            }
        }
    }
}
