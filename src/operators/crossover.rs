//! Crossover operators: two parents, two offspring.

use crate::chromosome::{ChromosomeShape, Representation};
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// How offspring payloads relate to their parents' after a crossover.
///
/// Whole-chromosome mixing leaves each child's genome identical to one
/// parent's per chromosome, so a payload can be carried over by
/// reference; every other strategy can change any allele, which forces
/// payloads to be rebuilt by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadFlow {
    /// Offspring payloads are invalid and must be cleared.
    Rebuild,
    /// Offspring payloads can be reference-copied from the parent that
    /// supplied the first chromosome.
    FromParents { son_from_father: bool },
}

/// Built-in crossover algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrossoverOperator {
    /// One cut per chromosome; tails are exchanged. For packed
    /// bitstrings the cut is a bit offset, not a byte offset.
    SinglePoint,
    /// Two distinct cuts per chromosome; the middle segment is
    /// exchanged.
    DoublePoint,
    /// Whole chromosomes are coin-flipped between the children.
    Mixing,
    /// Every allele is coin-flipped between the children.
    AlleleMixing,
    /// Numeric allele-wise averaging.
    Mean,
}

impl CrossoverOperator {
    pub fn id(self) -> i32 {
        match self {
            CrossoverOperator::SinglePoint => 1,
            CrossoverOperator::DoublePoint => 2,
            CrossoverOperator::Mixing => 3,
            CrossoverOperator::AlleleMixing => 4,
            CrossoverOperator::Mean => 5,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(CrossoverOperator::SinglePoint),
            2 => Some(CrossoverOperator::DoublePoint),
            3 => Some(CrossoverOperator::Mixing),
            4 => Some(CrossoverOperator::AlleleMixing),
            5 => Some(CrossoverOperator::Mean),
            _ => None,
        }
    }

    /// Writes two offspring chromosome sets from two parents.
    pub(crate) fn apply<R: Representation>(
        self,
        repr: &R,
        shape: &ChromosomeShape,
        father: &[R::Chromosome],
        mother: &[R::Chromosome],
        son: &mut [R::Chromosome],
        daughter: &mut [R::Chromosome],
        rng: &mut RandomNumberGenerator,
    ) -> Result<PayloadFlow> {
        let len = shape.len_chromosomes;
        match self {
            CrossoverOperator::SinglePoint => {
                for i in 0..shape.num_chromosomes {
                    let cut = rng.random_int(len);
                    repr.copy_alleles(&mother[i], &mut son[i], 0, cut)?;
                    repr.copy_alleles(&father[i], &mut daughter[i], 0, cut)?;
                    repr.copy_alleles(&father[i], &mut son[i], cut, len - cut)?;
                    repr.copy_alleles(&mother[i], &mut daughter[i], cut, len - cut)?;
                }
                Ok(PayloadFlow::Rebuild)
            }
            CrossoverOperator::DoublePoint => {
                if len < 2 {
                    return Err(GeneticError::Configuration(
                        "double-point crossover needs chromosomes of at least 2 alleles"
                            .to_string(),
                    ));
                }
                for i in 0..shape.num_chromosomes {
                    let first = rng.random_int(len);
                    let mut second = first;
                    while second == first {
                        second = rng.random_int(len);
                    }
                    let (low, high) = if first < second {
                        (first, second)
                    } else {
                        (second, first)
                    };
                    repr.copy_alleles(&father[i], &mut son[i], 0, low)?;
                    repr.copy_alleles(&mother[i], &mut daughter[i], 0, low)?;
                    repr.copy_alleles(&mother[i], &mut son[i], low, high - low)?;
                    repr.copy_alleles(&father[i], &mut daughter[i], low, high - low)?;
                    repr.copy_alleles(&father[i], &mut son[i], high, len - high)?;
                    repr.copy_alleles(&mother[i], &mut daughter[i], high, len - high)?;
                }
                Ok(PayloadFlow::Rebuild)
            }
            CrossoverOperator::Mixing => {
                let mut son_from_father = true;
                for i in 0..shape.num_chromosomes {
                    if rng.random_boolean() {
                        repr.replicate(&father[i], &mut son[i]);
                        repr.replicate(&mother[i], &mut daughter[i]);
                        if i == 0 {
                            son_from_father = true;
                        }
                    } else {
                        repr.replicate(&mother[i], &mut son[i]);
                        repr.replicate(&father[i], &mut daughter[i]);
                        if i == 0 {
                            son_from_father = false;
                        }
                    }
                }
                Ok(PayloadFlow::FromParents { son_from_father })
            }
            CrossoverOperator::AlleleMixing => {
                for i in 0..shape.num_chromosomes {
                    for j in 0..len {
                        if rng.random_boolean() {
                            repr.copy_allele(&father[i], &mut son[i], j)?;
                            repr.copy_allele(&mother[i], &mut daughter[i], j)?;
                        } else {
                            repr.copy_allele(&mother[i], &mut son[i], j)?;
                            repr.copy_allele(&father[i], &mut daughter[i], j)?;
                        }
                    }
                }
                Ok(PayloadFlow::Rebuild)
            }
            CrossoverOperator::Mean => {
                for i in 0..shape.num_chromosomes {
                    repr.mean_alleles(&father[i], &mother[i], &mut son[i], &mut daughter[i])?;
                }
                Ok(PayloadFlow::Rebuild)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::{IntegerArray, PackedBitString};

    fn shape(num: usize, len: usize) -> ChromosomeShape {
        ChromosomeShape {
            num_chromosomes: num,
            len_chromosomes: len,
        }
    }

    fn sorted(mut v: Vec<i64>) -> Vec<i64> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_single_point_conserves_alleles() {
        let repr = IntegerArray;
        let mut rng = RandomNumberGenerator::from_seed(21);
        let father = vec![vec![1i64, 2, 3, 4, 5, 6, 7, 8]];
        let mother = vec![vec![11i64, 12, 13, 14, 15, 16, 17, 18]];
        for _ in 0..20 {
            let mut son = vec![vec![0i64; 8]];
            let mut daughter = vec![vec![0i64; 8]];
            CrossoverOperator::SinglePoint
                .apply(
                    &repr,
                    &shape(1, 8),
                    &father,
                    &mother,
                    &mut son,
                    &mut daughter,
                    &mut rng,
                )
                .unwrap();
            let mut children: Vec<i64> = son[0].clone();
            children.extend(&daughter[0]);
            let mut parents: Vec<i64> = father[0].clone();
            parents.extend(&mother[0]);
            assert_eq!(sorted(children), sorted(parents));
        }
    }

    #[test]
    fn test_double_point_conserves_alleles() {
        let repr = IntegerArray;
        let mut rng = RandomNumberGenerator::from_seed(22);
        let father = vec![vec![1i64, 2, 3, 4, 5, 6, 7, 8]];
        let mother = vec![vec![11i64, 12, 13, 14, 15, 16, 17, 18]];
        for _ in 0..20 {
            let mut son = vec![vec![0i64; 8]];
            let mut daughter = vec![vec![0i64; 8]];
            CrossoverOperator::DoublePoint
                .apply(
                    &repr,
                    &shape(1, 8),
                    &father,
                    &mother,
                    &mut son,
                    &mut daughter,
                    &mut rng,
                )
                .unwrap();
            let mut children: Vec<i64> = son[0].clone();
            children.extend(&daughter[0]);
            let mut parents: Vec<i64> = father[0].clone();
            parents.extend(&mother[0]);
            assert_eq!(sorted(children), sorted(parents));
        }
    }

    #[test]
    fn test_mixing_keeps_whole_chromosomes() {
        let repr = IntegerArray;
        let mut rng = RandomNumberGenerator::from_seed(23);
        let father = vec![vec![1i64, 1, 1], vec![2i64, 2, 2]];
        let mother = vec![vec![9i64, 9, 9], vec![8i64, 8, 8]];
        let mut son = vec![vec![0i64; 3], vec![0i64; 3]];
        let mut daughter = vec![vec![0i64; 3], vec![0i64; 3]];
        let flow = CrossoverOperator::Mixing
            .apply(
                &repr,
                &shape(2, 3),
                &father,
                &mother,
                &mut son,
                &mut daughter,
                &mut rng,
            )
            .unwrap();
        assert!(matches!(flow, PayloadFlow::FromParents { .. }));
        for i in 0..2 {
            assert!(son[i] == father[i] || son[i] == mother[i]);
            // The two children split the parents' chromosomes exactly.
            if son[i] == father[i] {
                assert_eq!(daughter[i], mother[i]);
            } else {
                assert_eq!(daughter[i], father[i]);
            }
        }
    }

    #[test]
    fn test_allele_mixing_conserves_each_locus() {
        let repr = IntegerArray;
        let mut rng = RandomNumberGenerator::from_seed(24);
        let father = vec![vec![1i64, 2, 3, 4]];
        let mother = vec![vec![5i64, 6, 7, 8]];
        let mut son = vec![vec![0i64; 4]];
        let mut daughter = vec![vec![0i64; 4]];
        CrossoverOperator::AlleleMixing
            .apply(
                &repr,
                &shape(1, 4),
                &father,
                &mother,
                &mut son,
                &mut daughter,
                &mut rng,
            )
            .unwrap();
        for j in 0..4 {
            let pair = sorted(vec![son[0][j], daughter[0][j]]);
            assert_eq!(pair, sorted(vec![father[0][j], mother[0][j]]));
        }
    }

    #[test]
    fn test_bitstring_single_point_conserves_bit_counts() {
        let repr = PackedBitString;
        let mut rng = RandomNumberGenerator::from_seed(25);
        let mut f = repr.alloc(19);
        let mut m = repr.alloc(19);
        for i in 0..19 {
            if i % 2 == 0 {
                f.set(i);
            }
            if i % 3 == 0 {
                m.set(i);
            }
        }
        let father = vec![f.clone()];
        let mother = vec![m.clone()];
        let mut son = vec![repr.alloc(19)];
        let mut daughter = vec![repr.alloc(19)];
        CrossoverOperator::SinglePoint
            .apply(
                &repr,
                &shape(1, 19),
                &father,
                &mother,
                &mut son,
                &mut daughter,
                &mut rng,
            )
            .unwrap();
        // At every bit position the children's multiset equals the
        // parents' multiset.
        for i in 0..19 {
            let parent_bits = u8::from(f.get(i)) + u8::from(m.get(i));
            let child_bits = u8::from(son[0].get(i)) + u8::from(daughter[0].get(i));
            assert_eq!(parent_bits, child_bits);
        }
    }

    #[test]
    fn test_mean_on_integers() {
        let repr = IntegerArray;
        let mut rng = RandomNumberGenerator::from_seed(26);
        let father = vec![vec![3i64, -3]];
        let mother = vec![vec![4i64, -4]];
        let mut son = vec![vec![0i64; 2]];
        let mut daughter = vec![vec![0i64; 2]];
        CrossoverOperator::Mean
            .apply(
                &repr,
                &shape(1, 2),
                &father,
                &mother,
                &mut son,
                &mut daughter,
                &mut rng,
            )
            .unwrap();
        assert_eq!(son[0], vec![3, -4]);
        assert_eq!(daughter[0], vec![4, -3]);
    }
}
