//! Prime modulus selection for the universal hash family.

use crate::error::MinHashError;

/// Number of candidates inspected above the bound before giving up.
///
/// Prime gaps below 2^32 never exceed a few hundred, so a miss here means the
/// bound sits at the top of the `u32` range.
pub const PRIME_SEARCH_WINDOW: u64 = 1 << 16;

/// Returns the smallest prime `>= bound`.
///
/// `bound` is the size of the shingle universe. The result must fit in a
/// `u32` so that every hash value, and therefore every signature entry, does.
pub fn next_prime(bound: u64) -> Result<u32, MinHashError> {
    if bound == 0 {
        return Err(MinHashError::InvalidUniverse { bound });
    }

    let end = bound.saturating_add(PRIME_SEARCH_WINDOW).min(u32::MAX as u64 + 1);
    (bound.max(2)..end)
        .find(|&n| is_prime(n))
        .map(|p| p as u32)
        .ok_or(MinHashError::PrimeNotFound {
            bound,
            window: PRIME_SEARCH_WINDOW,
        })
}

/// Deterministic trial division over 6k ± 1 candidates.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5u64;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_primes() {
        let primes: Vec<u64> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn bound_that_is_prime_is_returned() {
        assert_eq!(next_prime(103).unwrap(), 103);
        assert_eq!(next_prime(2).unwrap(), 2);
    }

    #[test]
    fn bound_rounds_up_to_next_prime() {
        assert_eq!(next_prime(1).unwrap(), 2);
        assert_eq!(next_prime(100).unwrap(), 101);
        assert_eq!(next_prime(1000).unwrap(), 1009);
        assert_eq!(next_prime(1_000_000).unwrap(), 1_000_003);
    }

    #[test]
    fn zero_bound_is_rejected() {
        assert!(matches!(
            next_prime(0),
            Err(MinHashError::InvalidUniverse { bound: 0 })
        ));
    }

    #[test]
    fn largest_u32_prime_is_reachable() {
        assert_eq!(next_prime(4_294_967_280).unwrap(), 4_294_967_291);
        assert_eq!(next_prime(4_294_967_291).unwrap(), 4_294_967_291);
    }

    #[test]
    fn bound_above_u32_range_fails() {
        assert!(matches!(
            next_prime(4_294_967_292),
            Err(MinHashError::PrimeNotFound { .. })
        ));
    }
}
