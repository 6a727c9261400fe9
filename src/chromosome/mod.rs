//! # Chromosome Representations
//!
//! One trait, six interchangeable encodings. A population is constructed
//! with a single [`Representation`] value and every entity in it carries
//! chromosomes of that representation's associated type. The operator
//! pipeline never touches allele storage directly; it dispatches through
//! the allele-level primitives defined here, which is what lets the same
//! crossover and mutation operators drive integer arrays, booleans,
//! reals, byte strings and packed bitstrings alike.
//!
//! The built-in representations:
//!
//! - [`IntegerArray`] — fixed-precision integer alleles.
//! - [`BooleanArray`] — boolean alleles.
//! - [`RealArray`] — double-precision real alleles.
//! - [`CharArray`] — printable byte alleles.
//! - [`PackedBitString`] — one bit per allele, packed (see [`crate::bits`]).
//! - [`GenericSequence`] — a variable-structure sequence of caller
//!   values; its serialization operations are deliberately unsupported,
//!   callers needing them must layer their own.

pub mod boolean;
pub mod chars;
pub mod bitstring;
pub mod integer;
pub mod real;
pub mod sequence;

use std::fmt::Debug;

use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

pub use bitstring::PackedBitString;
pub use boolean::BooleanArray;
pub use chars::CharArray;
pub use integer::IntegerArray;
pub use real::RealArray;
pub use sequence::GenericSequence;

/// The chromosome geometry shared by every entity of a population.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChromosomeShape {
    /// Chromosomes per entity.
    pub num_chromosomes: usize,
    /// Alleles per chromosome. For `PackedBitString` this is a length in
    /// bits.
    pub len_chromosomes: usize,
}

/// Allele value ranges used by seeding and bounded mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlleleBounds {
    pub min_integer: i64,
    pub max_integer: i64,
    pub min_real: f64,
    pub max_real: f64,
}

impl Default for AlleleBounds {
    fn default() -> Self {
        Self {
            min_integer: 0,
            max_integer: i64::from(i32::MAX - 1),
            min_real: 0.0,
            max_real: 1.0,
        }
    }
}

/// Serialization tag identifying a built-in representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RepresentationKind {
    Integer,
    Boolean,
    Real,
    Char,
    BitString,
    Sequence,
}

impl RepresentationKind {
    pub fn id(self) -> i32 {
        match self {
            RepresentationKind::Integer => 1,
            RepresentationKind::Boolean => 2,
            RepresentationKind::Real => 3,
            RepresentationKind::Char => 4,
            RepresentationKind::BitString => 5,
            RepresentationKind::Sequence => 6,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(RepresentationKind::Integer),
            2 => Some(RepresentationKind::Boolean),
            3 => Some(RepresentationKind::Real),
            4 => Some(RepresentationKind::Char),
            5 => Some(RepresentationKind::BitString),
            6 => Some(RepresentationKind::Sequence),
            _ => None,
        }
    }
}

/// A chromosome encoding.
///
/// Implementations provide allocation, deep replication, byte-level
/// serialization and a human-readable rendering, plus the allele-level
/// primitives the genetic operators are written against. Methods that a
/// representation cannot meaningfully support return
/// [`GeneticError::Unsupported`]; the defaults below cover the
/// operations that only some encodings provide.
pub trait Representation: Debug + Send + Sync + 'static {
    type Chromosome: Clone + Debug + Send + Sync + 'static;

    /// Serialization tag for this representation.
    fn kind(&self) -> RepresentationKind;

    /// Allocates a chromosome of `len` alleles. Allele values are
    /// unspecified until seeded or written.
    fn alloc(&self, len: usize) -> Self::Chromosome;

    /// Deep-copies `src` into `dst`. The two must never alias; the
    /// borrow rules enforce that here.
    fn replicate(&self, src: &Self::Chromosome, dst: &mut Self::Chromosome);

    /// Serializes a chromosome to a contiguous byte buffer.
    fn to_bytes(&self, chromosome: &Self::Chromosome) -> Result<Vec<u8>>;

    /// Rebuilds a chromosome of `len` alleles from `to_bytes` output.
    fn from_bytes(&self, len: usize, bytes: &[u8]) -> Result<Self::Chromosome>;

    /// Renders a chromosome for human consumption.
    fn render(&self, chromosome: &Self::Chromosome) -> Result<String>;

    /// Fills every allele with a uniform random value within bounds.
    fn seed_uniform(
        &self,
        chromosome: &mut Self::Chromosome,
        bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()>;

    /// Fills every allele with the representation's zero value.
    fn seed_zero(&self, _chromosome: &mut Self::Chromosome) -> Result<()> {
        Err(GeneticError::Unsupported(format!(
            "zero seeding is not defined for {:?} chromosomes",
            self.kind()
        )))
    }

    /// Fills every allele with a unit-Gaussian deviate.
    fn seed_gaussian(
        &self,
        _chromosome: &mut Self::Chromosome,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        Err(GeneticError::Unsupported(format!(
            "gaussian seeding is not defined for {:?} chromosomes",
            self.kind()
        )))
    }

    /// Nudges one allele: `direction` steps for discrete encodings, a
    /// unit-Gaussian perturbation for reals, a bit flip for booleans and
    /// bitstrings. Out-of-range results wrap back into the bounds.
    fn drift_allele(
        &self,
        chromosome: &mut Self::Chromosome,
        index: usize,
        direction: i64,
        bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()>;

    /// Replaces one allele with a fresh random value within bounds.
    fn randomize_allele(
        &self,
        chromosome: &mut Self::Chromosome,
        index: usize,
        bounds: &AlleleBounds,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()>;

    /// Drifts every allele, each with an independent one-in-three
    /// chance of stepping up or down (reals drift unconditionally).
    fn drift_all_alleles(
        &self,
        _chromosome: &mut Self::Chromosome,
        _bounds: &AlleleBounds,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        Err(GeneticError::Unsupported(format!(
            "all-point mutation is not defined for {:?} chromosomes",
            self.kind()
        )))
    }

    /// Copies the allele range `start..start + count` from `src` into
    /// `dst`. For bitstrings the range is measured in bits.
    fn copy_alleles(
        &self,
        src: &Self::Chromosome,
        dst: &mut Self::Chromosome,
        start: usize,
        count: usize,
    ) -> Result<()>;

    /// Copies a single allele from `src` into `dst`.
    fn copy_allele(
        &self,
        src: &Self::Chromosome,
        dst: &mut Self::Chromosome,
        index: usize,
    ) -> Result<()> {
        self.copy_alleles(src, dst, index, 1)
    }

    /// Whether two chromosomes hold the same value at `index`.
    fn alleles_equal(
        &self,
        a: &Self::Chromosome,
        b: &Self::Chromosome,
        index: usize,
    ) -> Result<bool>;

    /// Writes the allele-wise mean of `a` and `b` into two children.
    /// Numeric encodings only.
    fn mean_alleles(
        &self,
        _a: &Self::Chromosome,
        _b: &Self::Chromosome,
        _son: &mut Self::Chromosome,
        _daughter: &mut Self::Chromosome,
    ) -> Result<()> {
        Err(GeneticError::Unsupported(format!(
            "mean crossover is not defined for {:?} chromosomes",
            self.kind()
        )))
    }

    /// A view of the chromosome as a real vector, where the encoding
    /// permits one. Gradient search and differential evolution require
    /// this view.
    fn as_real_slice<'a>(&self, _chromosome: &'a Self::Chromosome) -> Option<&'a [f64]> {
        None
    }

    /// Mutable counterpart of [`Representation::as_real_slice`].
    fn as_real_slice_mut<'a>(
        &self,
        _chromosome: &'a mut Self::Chromosome,
    ) -> Option<&'a mut [f64]> {
        None
    }
}

pub(crate) fn check_blob_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(GeneticError::Format(format!(
            "chromosome blob length mismatch: expected {} bytes, got {}",
            expected, actual
        )));
    }
    Ok(())
}
