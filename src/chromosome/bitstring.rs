//! Packed bitstring chromosomes.

use crate::bits::{copy_bits, BitString};
use crate::chromosome::{AlleleBounds, Representation, RepresentationKind};
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// Packed-bitstring chromosome representation. One allele is one bit;
/// all allele arithmetic delegates to [`crate::bits`]. Crossover cut
/// points land on arbitrary bit offsets, not byte boundaries.
#[derive(Clone, Copy, Debug, Default)]
pub struct PackedBitString;

impl Representation for PackedBitString {
    type Chromosome = BitString;

    fn kind(&self) -> RepresentationKind {
        RepresentationKind::BitString
    }

    fn alloc(&self, len: usize) -> Self::Chromosome {
        BitString::new(len)
    }

    fn replicate(&self, src: &Self::Chromosome, dst: &mut Self::Chromosome) {
        dst.clone_from(src);
    }

    fn to_bytes(&self, chromosome: &Self::Chromosome) -> Result<Vec<u8>> {
        Ok(chromosome.as_bytes().to_vec())
    }

    fn from_bytes(&self, len: usize, bytes: &[u8]) -> Result<Self::Chromosome> {
        BitString::from_bytes(len, bytes)
    }

    fn render(&self, chromosome: &Self::Chromosome) -> Result<String> {
        Ok((0..chromosome.len())
            .map(|i| if chromosome.get(i) { '1' } else { '0' })
            .collect())
    }

    fn seed_uniform(
        &self,
        chromosome: &mut Self::Chromosome,
        _bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for i in 0..chromosome.len() {
            chromosome.randomize(i, rng);
        }
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
        chromosome.invert(index);
        Ok(())
    }

    fn randomize_allele(
        &self,
        chromosome: &mut Self::Chromosome,
        index: usize,
        _bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        chromosome.randomize(index, rng);
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
                "bit range {}..{} out of bounds for bitstring of length {}",
                start,
                start + count,
                src.len().min(dst.len())
            )));
        }
        copy_bits(dst, src, start, start, count);
        Ok(())
    }

    fn alleles_equal(
        &self,
        a: &Self::Chromosome,
        b: &Self::Chromosome,
        index: usize,
    ) -> Result<bool> {
        Ok(a.get(index) == b.get(index))
    }
}
