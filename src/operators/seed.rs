//! Seeding operators: how a fresh entity's alleles are filled.

use crate::chromosome::{AlleleBounds, Representation};
use crate::error::Result;
use crate::rng::RandomNumberGenerator;

/// Built-in seeding algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeedOperator {
    /// Uniform random alleles within the population's declared bounds.
    RandomUniform,
    /// All-zero alleles (numeric and boolean kinds).
    Zero,
    /// Unit-Gaussian alleles (real kind only).
    RandomGaussian,
}

impl SeedOperator {
    pub fn id(self) -> i32 {
        match self {
            SeedOperator::RandomUniform => 1,
            SeedOperator::Zero => 2,
            SeedOperator::RandomGaussian => 3,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(SeedOperator::RandomUniform),
            2 => Some(SeedOperator::Zero),
            3 => Some(SeedOperator::RandomGaussian),
            _ => None,
        }
    }

    /// Fills one chromosome.
    pub fn apply<R: Representation>(
        self,
        representation: &R,
        chromosome: &mut R::Chromosome,
        bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        match self {
            SeedOperator::RandomUniform => representation.seed_uniform(chromosome, bounds, rng),
            SeedOperator::Zero => representation.seed_zero(chromosome),
            SeedOperator::RandomGaussian => representation.seed_gaussian(chromosome, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::{BooleanArray, RealArray};
    use crate::error::GeneticError;

    #[test]
    fn test_id_round_trip() {
        for op in [
            SeedOperator::RandomUniform,
            SeedOperator::Zero,
            SeedOperator::RandomGaussian,
        ] {
            assert_eq!(SeedOperator::from_id(op.id()), Some(op));
        }
        assert_eq!(SeedOperator::from_id(0), None);
        assert_eq!(SeedOperator::from_id(-1), None);
    }

    #[test]
    fn test_zero_seeding_reals() {
        let repr = RealArray;
        let mut rng = RandomNumberGenerator::from_seed(1);
        let mut c = vec![1.0, 2.0, 3.0];
        SeedOperator::Zero
            .apply(&repr, &mut c, &AlleleBounds::default(), &mut rng)
            .unwrap();
        assert_eq!(c, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_gaussian_seeding_rejected_for_booleans() {
        let repr = BooleanArray;
        let mut rng = RandomNumberGenerator::from_seed(1);
        let mut c = vec![false; 4];
        assert!(matches!(
            SeedOperator::RandomGaussian.apply(&repr, &mut c, &AlleleBounds::default(), &mut rng),
            Err(GeneticError::Unsupported(_))
        ));
    }
}
