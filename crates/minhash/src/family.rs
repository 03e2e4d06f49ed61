//! Universal hash family `h(x) = (a·x + b) mod p`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::MinHashError;

/// One member of the universal hash family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashFunction {
    /// Multiplier in `[1, p)`.
    pub a: u32,
    /// Offset in `[0, p)`.
    pub b: u32,
}

impl HashFunction {
    /// Evaluate the function modulo `prime`.
    ///
    /// `a·x + b` is at most `(2^32 - 1)^2 + 2^32 - 1 < 2^64`, so the product
    /// never overflows a `u64`.
    #[inline]
    pub fn apply(&self, x: u32, prime: u32) -> u32 {
        ((self.a as u64 * x as u64 + self.b as u64) % prime as u64) as u32
    }
}

/// Ordered set of distinct hash functions sharing one prime modulus.
///
/// The order of the functions defines signature column order and therefore
/// band membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashFamily {
    prime: u32,
    functions: Vec<HashFunction>,
}

impl HashFamily {
    /// Draw `count` distinct `(a, b)` pairs modulo `prime` from `rng`.
    ///
    /// `a` is drawn from `[1, p)` and `b` from `[0, p)`. A pair equal to one
    /// already accepted is redrawn as a whole.
    pub fn generate<R: Rng + ?Sized>(
        count: usize,
        prime: u32,
        rng: &mut R,
    ) -> Result<Self, MinHashError> {
        if count == 0 {
            return Err(MinHashError::InvalidHashCount { count });
        }
        let available = (prime as u64).saturating_sub(1) * prime as u64;
        if (count as u64) > available {
            return Err(MinHashError::HashFamilyExhausted {
                count,
                prime,
                available,
            });
        }

        let mut functions: Vec<HashFunction> = Vec::with_capacity(count);
        while functions.len() < count {
            let candidate = HashFunction {
                a: rng.random_range(1..prime),
                b: rng.random_range(0..prime),
            };
            if functions.contains(&candidate) {
                trace!(a = candidate.a, b = candidate.b, "hash_pair_redrawn");
                continue;
            }
            functions.push(candidate);
        }

        Ok(Self { prime, functions })
    }

    /// Build a family from explicit parameters.
    pub fn from_parts(prime: u32, functions: Vec<HashFunction>) -> Self {
        Self { prime, functions }
    }

    pub fn prime(&self) -> u32 {
        self.prime
    }

    pub fn functions(&self) -> &[HashFunction] {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Minimum of function `index` over `shingles`, or `None` for an empty set.
    #[inline]
    pub fn min_hash<'a, I>(&self, index: usize, shingles: I) -> Option<u32>
    where
        I: IntoIterator<Item = &'a u32>,
    {
        let f = self.functions[index];
        shingles.into_iter().map(|&s| f.apply(s, self.prime)).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn apply_matches_formula() {
        let f = HashFunction { a: 3, b: 7 };
        assert_eq!(f.apply(10, 11), (3 * 10 + 7) % 11);
    }

    #[test]
    fn apply_does_not_overflow_at_u32_extremes() {
        let f = HashFunction {
            a: u32::MAX - 5,
            b: u32::MAX - 5,
        };
        let p = 4_294_967_291u32;
        let expected = ((u32::MAX - 5) as u128 * u32::MAX as u128 + (u32::MAX - 5) as u128)
            % p as u128;
        assert_eq!(f.apply(u32::MAX, p) as u128, expected);
    }

    #[test]
    fn generated_pairs_are_distinct_and_a_nonzero() {
        let mut rng = StdRng::seed_from_u64(7);
        let family = HashFamily::generate(200, 103, &mut rng).unwrap();
        assert_eq!(family.len(), 200);
        let unique: HashSet<_> = family.functions().iter().collect();
        assert_eq!(unique.len(), 200);
        for f in family.functions() {
            assert!(f.a >= 1 && f.a < 103);
            assert!(f.b < 103);
        }
    }

    #[test]
    fn small_prime_forces_redraws_but_terminates() {
        let mut rng = StdRng::seed_from_u64(1);
        // p = 3 has exactly 2 * 3 = 6 distinct pairs.
        let family = HashFamily::generate(6, 3, &mut rng).unwrap();
        let unique: HashSet<_> = family.functions().iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn too_many_functions_for_prime_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            HashFamily::generate(3, 2, &mut rng),
            Err(MinHashError::HashFamilyExhausted { available: 2, .. })
        ));
    }

    #[test]
    fn zero_functions_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            HashFamily::generate(0, 101, &mut rng),
            Err(MinHashError::InvalidHashCount { count: 0 })
        ));
    }

    #[test]
    fn same_seed_same_family() {
        let a = HashFamily::generate(32, 1009, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = HashFamily::generate(32, 1009, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn min_hash_of_empty_set_is_none() {
        let family = HashFamily::from_parts(11, vec![HashFunction { a: 1, b: 0 }]);
        assert_eq!(family.min_hash(0, &[]), None);
        assert_eq!(family.min_hash(0, &[5, 3, 9]), Some(3));
    }
}
