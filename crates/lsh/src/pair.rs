//! Result pairs and the deduplicating result set.

use std::collections::hash_map::{Entry, HashMap};
use std::hash::{Hash, Hasher};

use minhash::ExternalId;
use serde::{Deserialize, Serialize};

/// Unordered pair of external document ids with its similarity score.
///
/// Equality and hashing only look at the ids, so `(a, b)` and `(b, a)` are the
/// same pair whatever their scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimilarPair {
    pub id1: ExternalId,
    pub id2: ExternalId,
    pub similarity: f64,
}

impl SimilarPair {
    /// Build a pair with `id1 <= id2`.
    pub fn new(a: ExternalId, b: ExternalId, similarity: f64) -> Self {
        let (id1, id2) = ordered(a, b);
        Self {
            id1,
            id2,
            similarity,
        }
    }

    pub fn key(&self) -> (ExternalId, ExternalId) {
        ordered(self.id1, self.id2)
    }
}

impl PartialEq for SimilarPair {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SimilarPair {}

impl Hash for SimilarPair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

fn ordered(a: ExternalId, b: ExternalId) -> (ExternalId, ExternalId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Set of similar pairs keyed by the unordered id pair.
///
/// Inserting a pair that is already present keeps the first score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairSet {
    pairs: HashMap<(ExternalId, ExternalId), f64>,
}

impl PairSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the pair was not present before.
    pub fn insert(&mut self, pair: SimilarPair) -> bool {
        match self.pairs.entry(pair.key()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(pair.similarity);
                true
            }
        }
    }

    pub fn contains(&self, a: ExternalId, b: ExternalId) -> bool {
        self.pairs.contains_key(&ordered(a, b))
    }

    /// Score recorded for the pair, if any.
    pub fn get(&self, a: ExternalId, b: ExternalId) -> Option<f64> {
        self.pairs.get(&ordered(a, b)).copied()
    }

    /// Move every pair of `other` into `self`.
    pub fn merge(&mut self, other: PairSet) {
        for (key, similarity) in other.pairs {
            self.pairs.entry(key).or_insert(similarity);
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SimilarPair> + '_ {
        self.pairs
            .iter()
            .map(|(&(id1, id2), &similarity)| SimilarPair {
                id1,
                id2,
                similarity,
            })
    }

    /// Pairs ordered by `(id1, id2)`.
    pub fn into_sorted_vec(self) -> Vec<SimilarPair> {
        let mut pairs: Vec<SimilarPair> = self
            .pairs
            .into_iter()
            .map(|((id1, id2), similarity)| SimilarPair {
                id1,
                id2,
                similarity,
            })
            .collect();
        pairs.sort_unstable_by_key(SimilarPair::key);
        pairs
    }
}

impl FromIterator<SimilarPair> for PairSet {
    fn from_iter<I: IntoIterator<Item = SimilarPair>>(iter: I) -> Self {
        let mut set = PairSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<SimilarPair> for PairSet {
    fn extend<I: IntoIterator<Item = SimilarPair>>(&mut self, iter: I) {
        for pair in iter {
            self.insert(pair);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn new_orders_ids() {
        let pair = SimilarPair::new(9, 3, 0.7);
        assert_eq!((pair.id1, pair.id2), (3, 9));
    }

    #[test]
    fn equality_ignores_order_and_score() {
        assert_eq!(SimilarPair::new(1, 2, 0.5), SimilarPair::new(2, 1, 0.9));
        let set: HashSet<SimilarPair> =
            [SimilarPair::new(1, 2, 0.5), SimilarPair::new(2, 1, 0.6)]
                .into_iter()
                .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn insert_keeps_first_score() {
        let mut set = PairSet::new();
        assert!(set.insert(SimilarPair::new(4, 1, 0.4)));
        assert!(!set.insert(SimilarPair::new(1, 4, 0.8)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(4, 1), Some(0.4));
        assert!(set.contains(1, 4));
    }

    #[test]
    fn merge_is_a_union() {
        let mut a: PairSet = [SimilarPair::new(1, 2, 0.5), SimilarPair::new(3, 4, 0.6)]
            .into_iter()
            .collect();
        let b: PairSet = [SimilarPair::new(2, 1, 0.9), SimilarPair::new(5, 6, 0.7)]
            .into_iter()
            .collect();
        a.merge(b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.get(1, 2), Some(0.5));
        assert!(a.contains(6, 5));
    }

    #[test]
    fn sorted_vec_is_ordered_by_ids() {
        let set: PairSet = [
            SimilarPair::new(7, 2, 0.6),
            SimilarPair::new(1, 9, 0.7),
            SimilarPair::new(1, 3, 0.8),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = set.into_sorted_vec().iter().map(SimilarPair::key).collect();
        assert_eq!(keys, vec![(1, 3), (1, 9), (2, 7)]);
    }
}
