//! Variable-structure sequence chromosomes.

use std::fmt::Debug;
use std::marker::PhantomData;

use crate::chromosome::{AlleleBounds, Representation, RepresentationKind};
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// A chromosome holding an arbitrary sequence of caller-defined values,
/// for genomes whose structure varies between entities.
///
/// Only allocation, replication and whole-chromosome copying are
/// provided. Serialization, rendering and the allele-level mutation
/// primitives are deliberately unsupported: variable-structure genomes
/// have no representation-defined byte layout or perturbation, so
/// callers supply their own operators and serializers on top.
pub struct GenericSequence<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> GenericSequence<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for GenericSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for GenericSequence<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GenericSequence")
    }
}

impl<T> Representation for GenericSequence<T>
where
    T: Clone + Debug + Send + Sync + 'static,
{
    type Chromosome = Vec<T>;

    fn kind(&self) -> RepresentationKind {
        RepresentationKind::Sequence
    }

    fn alloc(&self, len: usize) -> Self::Chromosome {
        // Sequences start empty regardless of the declared length; the
        // declared length is only an initial capacity hint.
        Vec::with_capacity(len)
    }

    fn replicate(&self, src: &Self::Chromosome, dst: &mut Self::Chromosome) {
        dst.clone_from(src);
    }

    fn to_bytes(&self, _chromosome: &Self::Chromosome) -> Result<Vec<u8>> {
        Err(GeneticError::Unsupported(
            "sequence chromosomes have no built-in serialization".to_string(),
        ))
    }

    fn from_bytes(&self, _len: usize, _bytes: &[u8]) -> Result<Self::Chromosome> {
        Err(GeneticError::Unsupported(
            "sequence chromosomes have no built-in serialization".to_string(),
        ))
    }

    fn render(&self, _chromosome: &Self::Chromosome) -> Result<String> {
        Err(GeneticError::Unsupported(
            "sequence chromosomes have no built-in rendering".to_string(),
        ))
    }

    fn seed_uniform(
        &self,
        _chromosome: &mut Self::Chromosome,
        _bounds: &AlleleBounds,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        Err(GeneticError::Unsupported(
            "sequence chromosomes require a caller-supplied seed operator".to_string(),
        ))
    }

    fn drift_allele(
        &self,
        _chromosome: &mut Self::Chromosome,
        _index: usize,
        _direction: i64,
        _bounds: &AlleleBounds,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        Err(GeneticError::Unsupported(
            "sequence chromosomes require caller-supplied mutation operators".to_string(),
        ))
    }

    fn randomize_allele(
        &self,
        _chromosome: &mut Self::Chromosome,
        _index: usize,
        _bounds: &AlleleBounds,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        Err(GeneticError::Unsupported(
            "sequence chromosomes require caller-supplied mutation operators".to_string(),
        ))
    }

    fn copy_alleles(
        &self,
        src: &Self::Chromosome,
        dst: &mut Self::Chromosome,
        start: usize,
        count: usize,
    ) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if start + count > src.len() {
            return Err(GeneticError::ShapeMismatch(format!(
                "allele range {}..{} out of bounds for sequence of length {}",
                start,
                start + count,
                src.len()
            )));
        }
        if dst.len() < start + count {
            dst.resize_with(start + count, || src[start].clone());
        }
        dst[start..start + count].clone_from_slice(&src[start..start + count]);
        Ok(())
    }

    fn alleles_equal(
        &self,
        _a: &Self::Chromosome,
        _b: &Self::Chromosome,
        _index: usize,
    ) -> Result<bool> {
        Err(GeneticError::Unsupported(
            "sequence chromosomes have no built-in allele equality".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_is_empty() {
        let repr: GenericSequence<String> = GenericSequence::new();
        assert!(repr.alloc(10).is_empty());
    }

    #[test]
    fn test_replicate_deep_copies() {
        let repr: GenericSequence<String> = GenericSequence::new();
        let src = vec!["a".to_string(), "b".to_string()];
        let mut dst = repr.alloc(0);
        repr.replicate(&src, &mut dst);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_serialization_is_unsupported() {
        let repr: GenericSequence<u32> = GenericSequence::new();
        assert!(matches!(
            repr.to_bytes(&vec![1, 2, 3]),
            Err(GeneticError::Unsupported(_))
        ));
        assert!(matches!(
            repr.from_bytes(3, &[]),
            Err(GeneticError::Unsupported(_))
        ));
        assert!(matches!(
            repr.render(&vec![1]),
            Err(GeneticError::Unsupported(_))
        ));
    }
}
