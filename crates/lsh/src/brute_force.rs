//! Exact all-pairs Jaccard baseline.

use std::time::Instant;

use minhash::{DocumentSource, ExternalId, ShingleSet};
use rayon::prelude::*;
use tracing::{debug, info, Level};

use crate::config::SearchConfig;
use crate::error::LshError;
use crate::jaccard::jaccard;
use crate::pair::{PairSet, SimilarPair};
use crate::searcher::SimilaritySearcher;

const PROGRESS_EVERY: usize = 1_000;

/// Scores every pair of documents on their shingle sets.
///
/// Quadratic in the number of documents and keeps all shingle sets in
/// memory. Useful as ground truth for small corpora.
#[derive(Debug, Clone)]
pub struct BruteForceSearcher {
    threshold: f64,
    max_documents: Option<usize>,
    use_parallel: bool,
    processed: Vec<ExternalId>,
}

impl BruteForceSearcher {
    pub fn new(threshold: f64) -> Result<Self, LshError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(LshError::InvalidConfig(format!(
                "threshold must be within [0, 1] (got {threshold})"
            )));
        }
        Ok(Self {
            threshold,
            max_documents: None,
            use_parallel: false,
            processed: Vec::new(),
        })
    }

    /// Take threshold, document limit and parallelism from `config`.
    pub fn from_config(config: &SearchConfig) -> Result<Self, LshError> {
        config.validate()?;
        Ok(Self::new(config.threshold)?
            .with_max_documents(config.max_documents)
            .with_parallel(config.use_parallel))
    }

    pub fn with_max_documents(mut self, max_documents: Option<usize>) -> Self {
        self.max_documents = max_documents;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    fn read_all(
        &self,
        source: &mut dyn DocumentSource,
    ) -> Result<Vec<(ExternalId, ShingleSet)>, LshError> {
        source.reset()?;
        let mut documents = Vec::new();
        while source.has_next() && self.max_documents.map_or(true, |max| documents.len() < max) {
            let Some(doc) = source.next_document()? else {
                break;
            };
            documents.push((doc.external_id, doc.shingles));
        }
        Ok(documents)
    }

    fn score_row(&self, documents: &[(ExternalId, ShingleSet)], i: usize) -> PairSet {
        let (id_i, set_i) = &documents[i];
        documents[i + 1..]
            .iter()
            .filter_map(|(id_j, set_j)| {
                let similarity = jaccard(set_i, set_j);
                (similarity > self.threshold).then(|| SimilarPair::new(*id_i, *id_j, similarity))
            })
            .collect()
    }
}

impl SimilaritySearcher for BruteForceSearcher {
    fn name(&self) -> &'static str {
        "bf"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn search(&mut self, source: &mut dyn DocumentSource) -> Result<PairSet, LshError> {
        let start = Instant::now();
        let span = tracing::span!(Level::INFO, "lsh.brute_force", threshold = self.threshold);
        let _guard = span.enter();

        let documents = self.read_all(source)?;
        let n = documents.len();

        let pairs = if self.use_parallel {
            (0..n)
                .into_par_iter()
                .map(|i| self.score_row(&documents, i))
                .reduce(PairSet::new, |mut acc, row| {
                    acc.merge(row);
                    acc
                })
        } else {
            let mut acc = PairSet::new();
            for i in 0..n {
                if i > 0 && i % PROGRESS_EVERY == 0 {
                    debug!(rows = i, documents = n, pairs = acc.len(), "brute_force_progress");
                }
                acc.merge(self.score_row(&documents, i));
            }
            acc
        };

        self.processed = documents.into_iter().map(|(id, _)| id).collect();
        info!(
            documents = n,
            comparisons = n * n.saturating_sub(1) / 2,
            pairs = pairs.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "brute_force_complete"
        );
        Ok(pairs)
    }

    fn processed_ids(&self) -> Vec<ExternalId> {
        self.processed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minhash::{Document, InMemorySource};

    fn corpus() -> InMemorySource {
        InMemorySource::new(vec![
            Document::new(10, [1, 2, 3]),
            Document::new(11, [2, 3, 4]),
            Document::new(12, [100, 101, 102]),
            Document::new(13, [1, 2, 3]),
        ])
    }

    #[test]
    fn finds_exact_jaccard_pairs() {
        let mut searcher = BruteForceSearcher::new(0.3).unwrap();
        let pairs = searcher.search(&mut corpus()).unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get(10, 11), Some(0.5));
        assert_eq!(pairs.get(11, 13), Some(0.5));
        assert_eq!(pairs.get(10, 13), Some(1.0));
        assert!(!pairs.contains(10, 12));
    }

    #[test]
    fn threshold_is_strict() {
        let mut searcher = BruteForceSearcher::new(0.5).unwrap();
        let pairs = searcher.search(&mut corpus()).unwrap();
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains(10, 13));
    }

    #[test]
    fn max_documents_limits_the_scan() {
        let mut searcher = BruteForceSearcher::new(0.3)
            .unwrap()
            .with_max_documents(Some(2));
        let pairs = searcher.search(&mut corpus()).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(searcher.processed_ids(), vec![10, 11]);
    }

    #[test]
    fn parallel_matches_sequential() {
        let sets: Vec<Vec<u32>> = (0..60u32).map(|i| (i..i + 15).collect()).collect();
        let seq = BruteForceSearcher::new(0.4)
            .unwrap()
            .search(&mut InMemorySource::from_sets(sets.clone()))
            .unwrap();
        let par = BruteForceSearcher::new(0.4)
            .unwrap()
            .with_parallel(true)
            .search(&mut InMemorySource::from_sets(sets))
            .unwrap();
        assert_eq!(seq, par);
        assert!(!seq.is_empty());
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        assert!(matches!(
            BruteForceSearcher::new(1.2),
            Err(LshError::InvalidConfig(_))
        ));
        assert!(BruteForceSearcher::from_config(&SearchConfig::new().with_threshold(-1.0)).is_err());
    }

    #[test]
    fn empty_documents_never_pair() {
        let mut source = InMemorySource::new(vec![Document::new(1, []), Document::new(2, [])]);
        let mut searcher = BruteForceSearcher::new(0.0).unwrap();
        assert!(searcher.search(&mut source).unwrap().is_empty());
        assert_eq!(searcher.processed_ids(), vec![1, 2]);
    }
}
