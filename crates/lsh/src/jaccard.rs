//! Similarity measures used to verify candidate pairs.

use std::collections::HashSet;
use std::hash::{BuildHasher, Hash};

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`.
///
/// Two empty sets compare as `0.0`.
pub fn jaccard<T, S>(a: &HashSet<T, S>, b: &HashSet<T, S>) -> f64
where
    T: Eq + Hash,
    S: BuildHasher,
{
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|item| large.contains(*item)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Fraction of aligned positions at which two signatures agree.
///
/// Signatures of different widths are compared over the shorter prefix,
/// divided by the longer width. Two empty signatures compare as `0.0`.
pub fn positional_similarity(a: &[u32], b: &[u32]) -> f64 {
    let width = a.len().max(b.len());
    if width == 0 {
        return 0.0;
    }
    let agree = a.iter().zip(b).filter(|(x, y)| x == y).count();
    agree as f64 / width as f64
}
