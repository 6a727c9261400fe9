//! Printable byte array chromosomes.

use crate::chromosome::{check_blob_len, AlleleBounds, Representation, RepresentationKind};
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

const PRINTABLE_MIN: u8 = b' ';
const PRINTABLE_MAX: u8 = b'~';

/// Printable-byte chromosome representation. Alleles cycle within the
/// printable ASCII range on drift.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharArray;

impl CharArray {
    fn cycle(value: i16) -> u8 {
        if value > i16::from(PRINTABLE_MAX) {
            PRINTABLE_MIN
        } else if value < i16::from(PRINTABLE_MIN) {
            PRINTABLE_MAX
        } else {
            value as u8
        }
    }

    fn random_printable(rng: &mut RandomNumberGenerator) -> u8 {
        rng.random_int_range(i64::from(PRINTABLE_MIN), i64::from(PRINTABLE_MAX)) as u8
    }
}

impl Representation for CharArray {
    type Chromosome = Vec<u8>;

    fn kind(&self) -> RepresentationKind {
        RepresentationKind::Char
    }

    fn alloc(&self, len: usize) -> Self::Chromosome {
        vec![PRINTABLE_MIN; len]
    }

    fn replicate(&self, src: &Self::Chromosome, dst: &mut Self::Chromosome) {
        dst.clone_from(src);
    }

    fn to_bytes(&self, chromosome: &Self::Chromosome) -> Result<Vec<u8>> {
        Ok(chromosome.clone())
    }

    fn from_bytes(&self, len: usize, bytes: &[u8]) -> Result<Self::Chromosome> {
        check_blob_len(len, bytes.len())?;
        Ok(bytes.to_vec())
    }

    fn render(&self, chromosome: &Self::Chromosome) -> Result<String> {
        Ok(chromosome.iter().map(|&b| b as char).collect())
    }

    fn seed_uniform(
        &self,
        chromosome: &mut Self::Chromosome,
        _bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for allele in chromosome.iter_mut() {
            *allele = Self::random_printable(rng);
        }
        Ok(())
    }

    fn drift_allele(
        &self,
        chromosome: &mut Self::Chromosome,
        index: usize,
        direction: i64,
        _bounds: &AlleleBounds,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        let step = if direction < 0 { -1 } else { 1 };
        chromosome[index] = Self::cycle(i16::from(chromosome[index]) + step);
        Ok(())
    }

    fn randomize_allele(
        &self,
        chromosome: &mut Self::Chromosome,
        index: usize,
        _bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        chromosome[index] = Self::random_printable(rng);
        Ok(())
    }

    fn drift_all_alleles(
        &self,
        chromosome: &mut Self::Chromosome,
        _bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        for allele in chromosome.iter_mut() {
            match rng.random_int(3) {
                1 => *allele = Self::cycle(i16::from(*allele) + 1),
                2 => *allele = Self::cycle(i16::from(*allele) - 1),
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_round_trip() {
        let repr = CharArray;
        let chromosome = b"hello world".to_vec();
        let bytes = repr.to_bytes(&chromosome).unwrap();
        assert_eq!(repr.from_bytes(11, &bytes).unwrap(), chromosome);
    }

    #[test]
    fn test_drift_cycles_printable_range() {
        let repr = CharArray;
        let mut rng = RandomNumberGenerator::from_seed(1);
        let bounds = AlleleBounds::default();
        let mut c = vec![PRINTABLE_MAX];
        repr.drift_allele(&mut c, 0, 1, &bounds, &mut rng).unwrap();
        assert_eq!(c[0], PRINTABLE_MIN);
        repr.drift_allele(&mut c, 0, -1, &bounds, &mut rng).unwrap();
        assert_eq!(c[0], PRINTABLE_MAX);
    }

    #[test]
    fn test_seed_uniform_is_printable() {
        let repr = CharArray;
        let mut rng = RandomNumberGenerator::from_seed(2);
        let mut c = repr.alloc(64);
        repr.seed_uniform(&mut c, &AlleleBounds::default(), &mut rng)
            .unwrap();
        assert!(c.iter().all(|&b| (PRINTABLE_MIN..=PRINTABLE_MAX).contains(&b)));
    }

    #[test]
    fn test_render() {
        let repr = CharArray;
        assert_eq!(repr.render(&b"abc".to_vec()).unwrap(), "abc");
    }
}
