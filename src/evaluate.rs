//! Scoring a result set against known duplicate pairs.

use std::collections::HashSet;

use lsh::PairSet;
use minhash::ExternalId;
use serde::Serialize;
use tracing::info;

/// Confusion counts and derived scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Compare `results` with `references`.
///
/// A reference pair only counts as missed when both of its documents were
/// among `processed`; pairs involving documents that were never read cannot
/// be found. Undefined ratios are reported as `0.0`.
pub fn evaluate(
    results: &PairSet,
    references: &PairSet,
    processed: &[ExternalId],
) -> Evaluation {
    let processed: HashSet<ExternalId> = processed.iter().copied().collect();

    let true_positives = results
        .iter()
        .filter(|pair| references.contains(pair.id1, pair.id2))
        .count();
    let false_positives = results.len() - true_positives;
    let false_negatives = references
        .iter()
        .filter(|pair| {
            processed.contains(&pair.id1)
                && processed.contains(&pair.id2)
                && !results.contains(pair.id1, pair.id2)
        })
        .count();

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let evaluation = Evaluation {
        true_positives,
        false_positives,
        false_negatives,
        precision: ratio(true_positives, true_positives + false_positives),
        recall: ratio(true_positives, true_positives + false_negatives),
        f1: ratio(
            2 * true_positives,
            2 * true_positives + false_positives + false_negatives,
        ),
    };
    info!(
        tp = evaluation.true_positives,
        fp = evaluation.false_positives,
        fn_ = evaluation.false_negatives,
        precision = evaluation.precision,
        recall = evaluation.recall,
        f1 = evaluation.f1,
        "evaluation_complete"
    );
    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsh::SimilarPair;

    fn set(pairs: &[(u64, u64)]) -> PairSet {
        pairs
            .iter()
            .map(|&(a, b)| SimilarPair::new(a, b, 0.9))
            .collect()
    }

    #[test]
    fn counts_hits_misses_and_noise() {
        let results = set(&[(1, 2), (3, 4), (5, 6)]);
        let references = set(&[(2, 1), (3, 4), (7, 8), (1, 99)]);
        let eval = evaluate(&results, &references, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(eval.true_positives, 2);
        assert_eq!(eval.false_positives, 1);
        // (1, 99) is ignored because 99 was never processed
        assert_eq!(eval.false_negatives, 1);
        assert!((eval.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((eval.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((eval.f1 - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn empty_inputs_score_zero() {
        let eval = evaluate(&PairSet::new(), &PairSet::new(), &[]);
        assert_eq!(eval.true_positives, 0);
        assert_eq!(eval.precision, 0.0);
        assert_eq!(eval.recall, 0.0);
        assert_eq!(eval.f1, 0.0);
    }

    #[test]
    fn perfect_results() {
        let pairs = set(&[(1, 2), (2, 3)]);
        let eval = evaluate(&pairs, &pairs, &[1, 2, 3]);
        assert_eq!(eval.f1, 1.0);
        assert_eq!(eval.precision, 1.0);
        assert_eq!(eval.recall, 1.0);
    }
}
