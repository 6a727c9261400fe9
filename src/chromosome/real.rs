//! Double-precision real array chromosomes.

use crate::chromosome::{check_blob_len, AlleleBounds, Representation, RepresentationKind};
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// Real-array chromosome representation.
///
/// Drift perturbs an allele by a unit-Gaussian deviate; values leaving
/// `[min_real, max_real]` are wrapped back by whole multiples of the
/// range width rather than clamped, so drift pressure cannot pile
/// alleles up against a bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealArray;

impl RealArray {
    fn wrap(mut value: f64, bounds: &AlleleBounds) -> f64 {
        let width = bounds.max_real - bounds.min_real;
        if width <= 0.0 {
            return bounds.min_real;
        }
        while value > bounds.max_real {
            value -= width;
        }
        while value < bounds.min_real {
            value += width;
        }
        value
    }
}

impl Representation for RealArray {
    type Chromosome = Vec<f64>;

    fn kind(&self) -> RepresentationKind {
        RepresentationKind::Real
    }

    fn alloc(&self, len: usize) -> Self::Chromosome {
        vec![0.0; len]
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
            .map(|chunk| f64::from_le_bytes(chunk.try_into().expect("8-byte chunk")))
            .collect())
    }

    fn render(&self, chromosome: &Self::Chromosome) -> Result<String> {
        Ok(chromosome
            .iter()
            .map(|a| format!("{:.6}", a))
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
            *allele = rng.random_double_range(bounds.min_real, bounds.max_real);
        }
        Ok(())
    }

    fn seed_zero(&self, chromosome: &mut Self::Chromosome) -> Result<()> {
        chromosome.fill(0.0);
        Ok(())
    }

    fn seed_gaussian(
        &self,
        chromosome: &mut Self::Chromosome,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for allele in chromosome.iter_mut() {
            *allele = rng.random_unit_gaussian();
        }
        Ok(())
    }

    fn drift_allele(
        &self,
        chromosome: &mut Self::Chromosome,
        index: usize,
        _direction: i64,
        bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        chromosome[index] = Self::wrap(chromosome[index] + rng.random_unit_gaussian(), bounds);
        Ok(())
    }

    fn randomize_allele(
        &self,
        chromosome: &mut Self::Chromosome,
        index: usize,
        _bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        chromosome[index] = rng.random_unit_gaussian();
        Ok(())
    }

    fn drift_all_alleles(
        &self,
        chromosome: &mut Self::Chromosome,
        bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for index in 0..chromosome.len() {
            chromosome[index] =
                Self::wrap(chromosome[index] + rng.random_unit_gaussian(), bounds);
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
        // Both children receive the same averaged alleles. Known quirk,
        // kept so existing populations evolve identically.
        for i in 0..a.len() {
            let mean = 0.5 * (a[i] + b[i]);
            son[i] = mean;
            daughter[i] = mean;
        }
        Ok(())
    }

    fn as_real_slice<'a>(&self, chromosome: &'a Self::Chromosome) -> Option<&'a [f64]> {
        Some(chromosome)
    }

    fn as_real_slice_mut<'a>(
        &self,
        chromosome: &'a mut Self::Chromosome,
    ) -> Option<&'a mut [f64]> {
        Some(chromosome)
    }
}
