//! Similarity search strategies.
//!
//! [`LshSearcher`] hashes every document into a MinHash signature and only
//! scores pairs that share a bucket in at least one band.

use std::collections::HashSet;
use std::time::Instant;

use minhash::{
    next_prime, DocumentSource, ExternalId, HashFamily, SignatureBuilder, SignatureMatrix,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, Level};

use crate::band::{BandHasher, BucketMap};
use crate::config::{SearchConfig, SimilarityMode};
use crate::error::LshError;
use crate::jaccard::{jaccard, positional_similarity};
use crate::pair::{PairSet, SimilarPair};

/// Produces every pair of documents whose similarity is above a threshold.
pub trait SimilaritySearcher {
    /// Short method name used in logs and reports.
    fn name(&self) -> &'static str;

    fn threshold(&self) -> f64;

    /// Read `source` from the start and return the similar pairs found.
    fn search(&mut self, source: &mut dyn DocumentSource) -> Result<PairSet, LshError>;

    /// External ids of every document read by the last search, including
    /// documents that could not be scored.
    fn processed_ids(&self) -> Vec<ExternalId>;
}

/// MinHash + LSH banding searcher.
///
/// The random source is seeded once in [`LshSearcher::new`]: the hash family
/// is drawn first and band seeds are drawn from the same stream on every
/// call to [`LshSearcher::find_pairs`].
#[derive(Debug, Clone)]
pub struct LshSearcher {
    config: SearchConfig,
    family: HashFamily,
    rng: StdRng,
    signatures: Option<SignatureMatrix>,
}

impl LshSearcher {
    /// Validate `config` and draw the hash family.
    pub fn new(config: SearchConfig) -> Result<Self, LshError> {
        let config = config.normalized()?;
        let prime = next_prime(config.num_shingles)?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let family = HashFamily::generate(config.num_hashes, prime, &mut rng)?;
        info!(
            num_hashes = config.num_hashes,
            num_bands = config.num_bands,
            rows_per_band = config.rows_per_band(),
            num_buckets = config.num_buckets,
            prime,
            "lsh_searcher_ready"
        );
        Ok(Self {
            config,
            family,
            rng,
            signatures: None,
        })
    }

    /// Effective configuration after normalization.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn family(&self) -> &HashFamily {
        &self.family
    }

    /// Signature matrix of the last [`SimilaritySearcher::search`] call.
    pub fn signatures(&self) -> Option<&SignatureMatrix> {
        self.signatures.as_ref()
    }

    pub fn take_signatures(&mut self) -> Option<SignatureMatrix> {
        self.signatures.take()
    }

    /// Build the signature matrix of `source` with this searcher's family.
    pub fn build_signatures<S>(&self, source: &mut S) -> Result<SignatureMatrix, LshError>
    where
        S: DocumentSource + ?Sized,
    {
        let matrix = SignatureBuilder::new(&self.family)
            .with_max_documents(self.config.max_documents)
            .with_empty_policy(self.config.empty_documents)
            .with_parallel(self.config.use_parallel)
            .build(source)?;
        Ok(matrix)
    }

    /// Band `matrix` and verify every co-bucketed pair.
    pub fn find_pairs(&mut self, matrix: &SignatureMatrix) -> Result<PairSet, LshError> {
        if matrix.num_hashes() != self.config.num_hashes {
            return Err(LshError::SignatureWidth {
                expected: self.config.num_hashes,
                found: matrix.num_hashes(),
            });
        }

        let start = Instant::now();
        let span = tracing::span!(
            Level::INFO,
            "lsh.find_pairs",
            documents = matrix.len(),
            num_bands = self.config.num_bands
        );
        let _guard = span.enter();

        let seeds: Vec<u64> = (0..self.config.num_bands)
            .map(|_| self.rng.random::<u64>())
            .collect();
        let hasher = BandHasher::new(self.config.rows_per_band(), self.config.num_buckets);
        let verifier = Verifier {
            matrix,
            threshold: self.config.threshold,
            similarity: self.config.similarity,
        };

        let run_band = |(band, &seed): (usize, &u64)| {
            let buckets = hasher.bucket_map(matrix, band, seed);
            verifier.band(&buckets)
        };

        let per_band: Vec<BandOutcome> = if self.config.use_parallel {
            seeds.par_iter().enumerate().map(run_band).collect()
        } else {
            seeds.iter().enumerate().map(run_band).collect()
        };

        let mut pairs = PairSet::new();
        let mut comparisons = 0usize;
        for outcome in per_band {
            comparisons += outcome.comparisons;
            pairs.merge(outcome.pairs);
        }

        info!(
            documents = matrix.len(),
            comparisons,
            pairs = pairs.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "lsh_pairs_found"
        );
        Ok(pairs)
    }
}

impl SimilaritySearcher for LshSearcher {
    fn name(&self) -> &'static str {
        "lsh"
    }

    fn threshold(&self) -> f64 {
        self.config.threshold
    }

    fn search(&mut self, source: &mut dyn DocumentSource) -> Result<PairSet, LshError> {
        let matrix = self.build_signatures(source)?;
        let pairs = self.find_pairs(&matrix)?;
        self.signatures = Some(matrix);
        Ok(pairs)
    }

    fn processed_ids(&self) -> Vec<ExternalId> {
        self.signatures
            .as_ref()
            .map(|m| m.external_ids().iter().chain(m.excluded()).copied().collect())
            .unwrap_or_default()
    }
}

struct BandOutcome {
    pairs: PairSet,
    comparisons: usize,
}

/// Scores candidate pairs of one matrix.
struct Verifier<'a> {
    matrix: &'a SignatureMatrix,
    threshold: f64,
    similarity: SimilarityMode,
}

impl Verifier<'_> {
    fn band(&self, buckets: &BucketMap) -> BandOutcome {
        let mut pairs = PairSet::new();
        let mut comparisons = 0usize;
        for docs in buckets.candidate_buckets() {
            comparisons += self.bucket(docs, &mut pairs);
        }
        debug!(
            band = buckets.band(),
            buckets = buckets.len(),
            comparisons,
            pairs = pairs.len(),
            "band_complete"
        );
        BandOutcome { pairs, comparisons }
    }

    fn bucket(&self, docs: &[usize], pairs: &mut PairSet) -> usize {
        let matrix = self.matrix;
        let sets: Vec<HashSet<u32>> = match self.similarity {
            SimilarityMode::SignatureSet => {
                docs.iter().map(|&doc| matrix.signature_set(doc)).collect()
            }
            SimilarityMode::Positional => Vec::new(),
        };

        let mut comparisons = 0usize;
        for i in 0..docs.len() {
            for j in i + 1..docs.len() {
                comparisons += 1;
                let similarity = match self.similarity {
                    SimilarityMode::SignatureSet => jaccard(&sets[i], &sets[j]),
                    SimilarityMode::Positional => {
                        positional_similarity(matrix.row(docs[i]), matrix.row(docs[j]))
                    }
                };
                if similarity > self.threshold {
                    pairs.insert(SimilarPair::new(
                        matrix.external_id(docs[i]),
                        matrix.external_id(docs[j]),
                        similarity,
                    ));
                }
            }
        }
        comparisons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minhash::{Document, EmptyDocumentPolicy, InMemorySource, MinHashError};

    fn property_config() -> SearchConfig {
        SearchConfig::new()
            .with_num_hashes(10)
            .with_num_bands(5)
            .with_num_shingles(103)
            .with_num_buckets(1 << 20)
            .with_threshold(0.3)
    }

    fn small_corpus() -> InMemorySource {
        InMemorySource::from_sets([vec![1, 2, 3], vec![2, 3, 4], vec![100, 101, 102]])
    }

    /// Ten clusters of a base set plus three perturbed copies each.
    fn clustered_corpus() -> InMemorySource {
        let mut docs = Vec::new();
        for cluster in 0..10u32 {
            let base: Vec<u32> = (cluster * 60..cluster * 60 + 40).collect();
            for variant in 0..4u32 {
                let mut set = base.clone();
                set.truncate(40 - variant as usize * 3);
                set.extend(cluster * 60 + 40..cluster * 60 + 40 + variant * 2);
                docs.push(Document::new((cluster * 4 + variant) as u64, set));
            }
        }
        InMemorySource::new(docs)
    }

    #[test]
    fn overlapping_documents_are_found_and_disjoint_never_paired() {
        let mut found = false;
        for seed in 0..50u64 {
            let mut searcher = LshSearcher::new(property_config().with_seed(seed)).unwrap();
            let pairs = searcher.search(&mut small_corpus()).unwrap();
            found |= pairs.contains(0, 1);
            assert!(!pairs.contains(0, 2), "seed {seed}");
            assert!(!pairs.contains(1, 2), "seed {seed}");
        }
        assert!(found);
    }

    #[test]
    fn more_bands_never_lose_pairs() {
        let base = SearchConfig::new()
            .with_num_hashes(12)
            .with_num_shingles(1009)
            .with_num_buckets(1 << 30)
            .with_threshold(0.2)
            .with_seed(99);

        let mut wide = LshSearcher::new(base.clone().with_num_bands(2)).unwrap();
        let mut narrow = LshSearcher::new(base.with_num_bands(4)).unwrap();
        let few = wide.search(&mut clustered_corpus()).unwrap();
        let many = narrow.search(&mut clustered_corpus()).unwrap();

        assert_eq!(wide.signatures(), narrow.signatures());
        assert!(many.len() >= few.len());
        for pair in few.iter() {
            assert!(many.contains(pair.id1, pair.id2));
        }
    }

    #[test]
    fn identical_documents_always_pair() {
        let mut source = InMemorySource::new(vec![
            Document::new(10, [5, 6, 7, 8]),
            Document::new(20, [5, 6, 7, 8]),
            Document::new(30, [900, 901]),
        ]);
        for seed in 0..10u64 {
            let mut searcher = LshSearcher::new(property_config().with_seed(seed)).unwrap();
            let pairs = searcher.search(&mut source).unwrap();
            assert_eq!(pairs.get(10, 20), Some(1.0));
        }
    }

    #[test]
    fn hash_count_is_rounded_up_to_band_multiple() {
        let searcher =
            LshSearcher::new(property_config().with_num_hashes(11).with_num_bands(5)).unwrap();
        assert_eq!(searcher.config().num_hashes, 15);
        assert_eq!(searcher.family().len(), 15);
    }

    #[test]
    fn invalid_config_fails_before_hashing() {
        assert!(matches!(
            LshSearcher::new(property_config().with_num_buckets(0)),
            Err(LshError::InvalidConfig(_))
        ));
    }

    #[test]
    fn tiny_universe_cannot_supply_the_family() {
        // p = 2 gives only two distinct (a, b) pairs
        let result = LshSearcher::new(
            property_config()
                .with_num_shingles(2)
                .with_num_hashes(10)
                .with_num_bands(5),
        );
        assert!(matches!(
            result,
            Err(LshError::MinHash(MinHashError::HashFamilyExhausted { .. }))
        ));
    }

    #[test]
    fn mismatched_signature_width_is_rejected() {
        let matrix = SignatureMatrix::from_rows(3, vec![1], vec![vec![1, 2, 3]]).unwrap();
        let mut searcher = LshSearcher::new(property_config()).unwrap();
        assert!(matches!(
            searcher.find_pairs(&matrix),
            Err(LshError::SignatureWidth {
                expected: 10,
                found: 3
            })
        ));
    }

    #[test]
    fn parallel_matches_sequential() {
        let config = SearchConfig::new()
            .with_num_hashes(24)
            .with_num_bands(8)
            .with_num_shingles(1009)
            .with_threshold(0.4)
            .with_seed(5);
        let seq = LshSearcher::new(config.clone())
            .unwrap()
            .search(&mut clustered_corpus())
            .unwrap();
        let par = LshSearcher::new(config.with_parallel(true))
            .unwrap()
            .search(&mut clustered_corpus())
            .unwrap();
        assert_eq!(seq, par);
        assert!(!seq.is_empty());
    }

    #[test]
    fn positional_mode_scores_aligned_columns() {
        let mut searcher = LshSearcher::new(
            property_config()
                .with_similarity(SimilarityMode::Positional)
                .with_num_buckets(1),
        )
        .unwrap();
        let pairs = searcher.search(&mut small_corpus()).unwrap();
        let matrix = searcher.signatures().unwrap();
        if let Some(score) = pairs.get(0, 1) {
            assert_eq!(score, positional_similarity(matrix.row(0), matrix.row(1)));
        }
        assert!(!pairs.contains(0, 2));
    }

    #[test]
    fn same_seed_gives_same_pairs() {
        let run = || {
            LshSearcher::new(property_config().with_num_shingles(1009).with_seed(123))
                .unwrap()
                .search(&mut clustered_corpus())
                .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn processed_ids_include_skipped_documents() {
        let mut source = InMemorySource::new(vec![
            Document::new(1, [1, 2]),
            Document::new(2, []),
            Document::new(3, [1, 2]),
        ]);
        let mut searcher = LshSearcher::new(
            property_config().with_empty_documents(EmptyDocumentPolicy::Skip),
        )
        .unwrap();
        let pairs = searcher.search(&mut source).unwrap();
        assert!(pairs.contains(1, 3));
        let mut ids = searcher.processed_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn searcher_is_usable_as_trait_object() {
        let mut searcher: Box<dyn SimilaritySearcher> =
            Box::new(LshSearcher::new(property_config()).unwrap());
        assert_eq!(searcher.name(), "lsh");
        assert_eq!(searcher.threshold(), 0.3);
        let source: &mut dyn DocumentSource = &mut small_corpus();
        assert!(searcher.search(source).is_ok());
    }
}
