//! # RandomNumberGenerator
//!
//! The `RandomNumberGenerator` struct provides the random sampling
//! primitives the engine's operators are built on: uniform integers and
//! reals, biased coin flips, unit-Gaussian deviates and in-place
//! shuffles, all backed by the `rand` crate's `StdRng`.
//!
//! ## Example
//!
//! ```rust
//! use genpool::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::new();
//! let die_roll = rng.random_int(6);
//! assert!(die_roll < 6);
//! ```
//!
//! Seeded construction makes tests and benchmarks reproducible:
//!
//! ```rust
//! use genpool::rng::RandomNumberGenerator;
//!
//! let mut a = RandomNumberGenerator::from_seed(42);
//! let mut b = RandomNumberGenerator::from_seed(42);
//! assert_eq!(a.random_int(1000), b.random_int(1000));
//! ```

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rand_distr::StandardNormal;

/// A wrapper around the `rand` crate's `StdRng` that provides the
/// sampling methods used throughout the engine.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    pub rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// This is useful for reproducible tests and benchmarks.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns a uniformly distributed integer in `0..bound`.
    ///
    /// Returns 0 when `bound` is 0, so callers iterating over possibly
    /// empty index ranges don't need a special case.
    pub fn random_int(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }

    /// Returns a uniformly distributed integer in `low..=high`.
    pub fn random_int_range(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..=high)
    }

    /// Returns a fair coin flip.
    pub fn random_boolean(&mut self) -> bool {
        self.rng.gen()
    }

    /// Returns `true` with the given probability.
    ///
    /// Probabilities outside `[0, 1]` are clamped.
    pub fn random_boolean_prob(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Returns a uniformly distributed real in `[0, upper)`.
    pub fn random_double(&mut self, upper: f64) -> f64 {
        if upper <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(0.0..upper)
    }

    /// Returns a uniformly distributed real in `[low, high)`.
    pub fn random_double_range(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    /// Returns a uniformly distributed real in `[0, 1)`.
    pub fn random_unit_uniform(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Returns a deviate drawn from the unit Gaussian distribution.
    ///
    /// This is the perturbation used by real-valued drift mutation.
    pub fn random_unit_gaussian(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// Shuffles a slice in place.
    pub fn shuffle<T>(&mut self, values: &mut [T]) {
        values.shuffle(&mut self.rng);
    }

    /// Returns a random permutation of `0..n`.
    pub fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        self.shuffle(&mut indices);
        indices
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_int_within_bound() {
        let mut rng = RandomNumberGenerator::new();
        for _ in 0..100 {
            assert!(rng.random_int(7) < 7);
        }
    }

    #[test]
    fn test_random_int_zero_bound() {
        let mut rng = RandomNumberGenerator::new();
        assert_eq!(rng.random_int(0), 0);
    }

    #[test]
    fn test_random_int_range_inclusive() {
        let mut rng = RandomNumberGenerator::new();
        for _ in 0..100 {
            let v = rng.random_int_range(-3, 3);
            assert!((-3..=3).contains(&v));
        }
    }

    #[test]
    fn test_random_double_range() {
        let mut rng = RandomNumberGenerator::new();
        for _ in 0..100 {
            let v = rng.random_double_range(-1.5, 2.5);
            assert!((-1.5..2.5).contains(&v));
        }
    }

    #[test]
    fn test_random_boolean_prob_extremes() {
        let mut rng = RandomNumberGenerator::new();
        assert!(!rng.random_boolean_prob(0.0));
        assert!(rng.random_boolean_prob(1.0));
    }

    #[test]
    fn test_seeded_clone_generates_identical_sequence() {
        let mut rng1 = RandomNumberGenerator::from_seed(42);
        let mut rng2 = rng1.clone();

        let a: Vec<usize> = (0..5).map(|_| rng1.random_int(1000)).collect();
        let b: Vec<usize> = (0..5).map(|_| rng2.random_int(1000)).collect();

        assert_eq!(a, b);
    }

    #[test]
    fn test_permutation_is_a_permutation() {
        let mut rng = RandomNumberGenerator::from_seed(7);
        let mut p = rng.permutation(20);
        p.sort_unstable();
        assert_eq!(p, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_unit_gaussian_is_roughly_centred() {
        let mut rng = RandomNumberGenerator::from_seed(11);
        let mean: f64 =
            (0..2000).map(|_| rng.random_unit_gaussian()).sum::<f64>() / 2000.0;
        assert!(mean.abs() < 0.1);
    }
}
