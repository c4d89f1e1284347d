//! Uniform random permutations.

use num_bigint::BigUint;

use crate::error::{CryptoError, Result};
use crate::random::RandomSource;

/// A bijection of [0, N), stored as its value mapping. Instances are
/// immutable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    value_mapping: Vec<usize>,
}

impl Permutation {
    /// Builds a permutation from an explicit value mapping, which must be a
    /// bijection of [0, len).
    pub fn from_value_mapping(value_mapping: Vec<usize>) -> Result<Self> {
        let n = value_mapping.len();
        let mut seen = vec![false; n];
        for &value in &value_mapping {
            if value >= n || seen[value] {
                return Err(CryptoError::InvalidInput(
                    "The value mapping must be a bijection of [0, N).".into(),
                ));
            }
            seen[value] = true;
        }
        Ok(Permutation { value_mapping })
    }

    /// The image of `i` under the permutation.
    pub fn get(&self, i: usize) -> Result<usize> {
        self.value_mapping.get(i).copied().ok_or_else(|| {
            CryptoError::InvalidInput(format!(
                "The index {i} is out of the permutation's range [0, {}).",
                self.value_mapping.len()
            ))
        })
    }

    pub fn size(&self) -> usize {
        self.value_mapping.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.value_mapping.iter().copied()
    }
}

/// Generates a uniformly distributed permutation of size `n` by an in-place
/// forward Fisher-Yates walk: position i swaps with i + offset, where offset
/// is drawn uniformly from [0, n - i). Exactly one draw is made per
/// position, including the trivial final one.
pub fn gen_permutation(n: usize, random: &mut (impl RandomSource + ?Sized)) -> Result<Permutation> {
    if n == 0 {
        return Err(CryptoError::InvalidInput(
            "The size of the permutation must be strictly positive.".into(),
        ));
    }
    let mut mapping: Vec<usize> = (0..n).collect();
    for i in 0..n {
        let bound = BigUint::from(n - i);
        let offset_digits = random.gen_random_integer(&bound).to_u64_digits();
        let offset = offset_digits.first().copied().unwrap_or(0) as usize;
        mapping.swap(i, i + offset);
    }
    Ok(Permutation {
        value_mapping: mapping,
    })
}
