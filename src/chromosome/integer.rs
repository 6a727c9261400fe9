//! Fixed-precision integer array chromosomes.

use crate::chromosome::{check_blob_len, AlleleBounds, Representation, RepresentationKind};
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// Integer-array chromosome representation. Alleles drift by whole
/// steps and wrap to the opposite end of the configured range.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntegerArray;

impl IntegerArray {
    fn wrap(value: i64, bounds: &AlleleBounds) -> i64 {
        if value > bounds.max_integer {
            bounds.min_integer
        } else if value < bounds.min_integer {
            bounds.max_integer
        } else {
            value
        }
    }
}

impl Representation for IntegerArray {
    type Chromosome = Vec<i64>;

    fn kind(&self) -> RepresentationKind {
        RepresentationKind::Integer
    }

    fn alloc(&self, len: usize) -> Self::Chromosome {
        vec![0; len]
    }

    fn replicate(&self, src: &Self::Chromosome, dst: &mut Self::Chromosome) {
        dst.clone_from(src);
    }

    fn to_bytes(&self, chromosome: &Self::Chromosome) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(chromosome.len() * 8);
        for allele in chromosome {
            bytes.extend_from_slice(&allele.to_le_bytes());
        }
        Ok(bytes)
    }

    fn from_bytes(&self, len: usize, bytes: &[u8]) -> Result<Self::Chromosome> {
        check_blob_len(len * 8, bytes.len())?;
        Ok(bytes
            .chunks_exact(8)
            .map(|chunk| i64::from_le_bytes(chunk.try_into().expect("8-byte chunk")))
            .collect())
    }

    fn render(&self, chromosome: &Self::Chromosome) -> Result<String> {
        Ok(chromosome
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(" "))
    }

    fn seed_uniform(
        &self,
        chromosome: &mut Self::Chromosome,
        bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for allele in chromosome.iter_mut() {
            *allele = rng.random_int_range(bounds.min_integer, bounds.max_integer);
        }
        Ok(())
    }

    fn seed_zero(&self, chromosome: &mut Self::Chromosome) -> Result<()> {
        chromosome.fill(0);
        Ok(())
    }

    fn drift_allele(
        &self,
        chromosome: &mut Self::Chromosome,
        index: usize,
        direction: i64,
        bounds: &AlleleBounds,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        chromosome[index] = Self::wrap(chromosome[index] + direction, bounds);
        Ok(())
    }

    fn randomize_allele(
        &self,
        chromosome: &mut Self::Chromosome,
        index: usize,
        bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        chromosome[index] = rng.random_int_range(bounds.min_integer, bounds.max_integer);
        Ok(())
    }

    fn drift_all_alleles(
        &self,
        chromosome: &mut Self::Chromosome,
        bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for allele in chromosome.iter_mut() {
            match rng.random_int(3) {
                1 => *allele = Self::wrap(*allele + 1, bounds),
                2 => *allele = Self::wrap(*allele - 1, bounds),
                _ => {}
            }
        }
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

    fn mean_alleles(
        &self,
        a: &Self::Chromosome,
        b: &Self::Chromosome,
        son: &mut Self::Chromosome,
        daughter: &mut Self::Chromosome,
    ) -> Result<()> {
        // Son rounds toward the range floor, daughter toward the
        // ceiling, so the pair conserves the allele sum.
        for i in 0..a.len() {
            let sum = a[i] + b[i];
            if sum > 0 {
                son[i] = sum / 2;
                daughter[i] = (sum + 1) / 2;
            } else {
                son[i] = (sum - 1) / 2;
                daughter[i] = sum / 2;
            }
        }
        Ok(())
    }
}
