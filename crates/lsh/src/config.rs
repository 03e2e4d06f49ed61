//! Configuration for MinHash/LSH similarity search.
//!
//! The config is a plain serde struct so it can be embedded in YAML files or
//! passed across process boundaries. [`SearchConfig::normalized`] must run
//! before any hashing: it validates the values and rounds `num_hashes` up to
//! a multiple of `num_bands`.

use minhash::EmptyDocumentPolicy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::LshError;

/// How a candidate pair is scored once it shares a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMode {
    /// Jaccard similarity of the two signature rows taken as sets of values.
    ///
    /// Column positions are ignored, so a value produced by different hash
    /// functions in the two rows still counts as shared.
    #[default]
    SignatureSet,
    /// Fraction of signature positions holding the same value.
    Positional,
}

/// Tuning knobs for one search run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Number of MinHash functions (signature width).
    #[serde(default = "SearchConfig::default_num_hashes")]
    pub num_hashes: usize,
    /// Number of LSH bands the signature is split into.
    #[serde(default = "SearchConfig::default_num_bands")]
    pub num_bands: usize,
    /// Number of buckets per band.
    #[serde(default = "SearchConfig::default_num_buckets")]
    pub num_buckets: u64,
    /// Pairs are reported when their similarity is strictly above this value.
    #[serde(default = "SearchConfig::default_threshold")]
    pub threshold: f64,
    /// Number of distinct shingle values; the hash modulus is the smallest
    /// prime not below it.
    #[serde(default = "SearchConfig::default_num_shingles")]
    pub num_shingles: u64,
    /// Seed of the random source behind the hash family and band seeds.
    #[serde(default = "SearchConfig::default_seed")]
    pub seed: u64,
    /// Maximum number of documents to read, `None` for the whole source.
    #[serde(default)]
    pub max_documents: Option<usize>,
    /// Run signature columns, bands and brute-force rows on rayon.
    #[serde(default)]
    pub use_parallel: bool,
    #[serde(default)]
    pub similarity: SimilarityMode,
    #[serde(default)]
    pub empty_documents: EmptyDocumentPolicy,
}

impl SearchConfig {
    pub(crate) fn default_num_hashes() -> usize {
        120
    }

    pub(crate) fn default_num_bands() -> usize {
        20
    }

    pub(crate) fn default_num_buckets() -> u64 {
        2000
    }

    pub(crate) fn default_threshold() -> f64 {
        0.5
    }

    pub(crate) fn default_num_shingles() -> u64 {
        1000
    }

    pub(crate) fn default_seed() -> u64 {
        7_825_942
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_hashes(mut self, num_hashes: usize) -> Self {
        self.num_hashes = num_hashes;
        self
    }

    /// More bands raise recall and lower precision.
    pub fn with_num_bands(mut self, num_bands: usize) -> Self {
        self.num_bands = num_bands;
        self
    }

    pub fn with_num_buckets(mut self, num_buckets: u64) -> Self {
        self.num_buckets = num_buckets;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_num_shingles(mut self, num_shingles: u64) -> Self {
        self.num_shingles = num_shingles;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_documents(mut self, max_documents: Option<usize>) -> Self {
        self.max_documents = max_documents;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn with_similarity(mut self, similarity: SimilarityMode) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_empty_documents(mut self, policy: EmptyDocumentPolicy) -> Self {
        self.empty_documents = policy;
        self
    }

    /// Signature rows per band. Only meaningful on a normalized config.
    pub fn rows_per_band(&self) -> usize {
        self.num_hashes / self.num_bands.max(1)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), LshError> {
        if self.num_hashes == 0 {
            return Err(LshError::InvalidConfig(
                "num_hashes must be >= 1".into(),
            ));
        }
        if self.num_bands == 0 {
            return Err(LshError::InvalidConfig("num_bands must be >= 1".into()));
        }
        if self.num_buckets == 0 {
            return Err(LshError::InvalidConfig(
                "num_buckets must be >= 1".into(),
            ));
        }
        if self.num_shingles == 0 {
            return Err(LshError::InvalidConfig(
                "num_shingles must be >= 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(LshError::InvalidConfig(format!(
                "threshold must be within [0, 1] (got {})",
                self.threshold
            )));
        }
        if self.max_documents == Some(0) {
            return Err(LshError::InvalidConfig(
                "max_documents must be >= 1 when set".into(),
            ));
        }
        Ok(())
    }

    /// Validate and round `num_hashes` up to the next multiple of `num_bands`.
    pub fn normalized(mut self) -> Result<Self, LshError> {
        self.validate()?;
        if self.num_hashes % self.num_bands != 0 {
            let effective = (self.num_hashes / self.num_bands + 1)
                .checked_mul(self.num_bands)
                .ok_or_else(|| {
                    LshError::InvalidConfig(format!(
                        "num_hashes overflow rounding {} up to a multiple of {}",
                        self.num_hashes, self.num_bands
                    ))
                })?;
            info!(
                requested = self.num_hashes,
                effective,
                num_bands = self.num_bands,
                "num_hashes_rounded_up"
            );
            self.num_hashes = effective;
        }
        Ok(self)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_hashes: Self::default_num_hashes(),
            num_bands: Self::default_num_bands(),
            num_buckets: Self::default_num_buckets(),
            threshold: Self::default_threshold(),
            num_shingles: Self::default_num_shingles(),
            seed: Self::default_seed(),
            max_documents: None,
            use_parallel: false,
            similarity: SimilarityMode::default(),
            empty_documents: EmptyDocumentPolicy::default(),
        }
    }
}
