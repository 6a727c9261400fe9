//! Boolean array chromosomes.

use crate::chromosome::{check_blob_len, AlleleBounds, Representation, RepresentationKind};
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// Boolean-array chromosome representation. Drift and randomization
/// both reduce to bit flips.
#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanArray;

impl Representation for BooleanArray {
    type Chromosome = Vec<bool>;

    fn kind(&self) -> RepresentationKind {
        RepresentationKind::Boolean
    }

    fn alloc(&self, len: usize) -> Self::Chromosome {
        vec![false; len]
    }

    fn replicate(&self, src: &Self::Chromosome, dst: &mut Self::Chromosome) {
        dst.clone_from(src);
    }

    fn to_bytes(&self, chromosome: &Self::Chromosome) -> Result<Vec<u8>> {
        Ok(chromosome.iter().map(|&b| u8::from(b)).collect())
    }

    fn from_bytes(&self, len: usize, bytes: &[u8]) -> Result<Self::Chromosome> {
        check_blob_len(len, bytes.len())?;
        Ok(bytes.iter().map(|&b| b != 0).collect())
    }

    fn render(&self, chromosome: &Self::Chromosome) -> Result<String> {
        Ok(chromosome
            .iter()
            .map(|&b| if b { '1' } else { '0' })
            .collect())
    }

    fn seed_uniform(
        &self,
        chromosome: &mut Self::Chromosome,
        _bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for allele in chromosome.iter_mut() {
            *allele = rng.random_boolean();
        }
        Ok(())
    }

    fn seed_zero(&self, chromosome: &mut Self::Chromosome) -> Result<()> {
        chromosome.fill(false);
        Ok(())
    }

    fn drift_allele(
        &self,
        chromosome: &mut Self::Chromosome,
        index: usize,
        _direction: i64,
        _bounds: &AlleleBounds,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        chromosome[index] = !chromosome[index];
        Ok(())
    }

    fn randomize_allele(
        &self,
        chromosome: &mut Self::Chromosome,
        index: usize,
        _bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        chromosome[index] = rng.random_boolean();
        Ok(())
    }

    fn copy_alleles(
        &self,
        src: &Self::Chromosome,
        dst: &mut Self::Chromosome,
        start: usize,
        count: usize,
    ) -> Result<()> {
        if start + count > src.len() || start + count > dst.len() {
            return Err(GeneticError::ShapeMismatch(format!(
                "allele range {}..{} out of bounds for chromosome of length {}",
                start,
                start + count,
                src.len().min(dst.len())
            )));
        }
        dst[start..start + count].copy_from_slice(&src[start..start + count]);
        Ok(())
    }

    fn alleles_equal(
        &self,
        a: &Self::Chromosome,
        b: &Self::Chromosome,
        index: usize,
    ) -> Result<bool> {
        Ok(a[index] == b[index])
    }
}
