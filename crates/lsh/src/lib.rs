//! # nearsim LSH search
//!
//! Locality-sensitive banding over MinHash signatures, plus an exact
//! brute-force baseline. Both strategies implement [`SimilaritySearcher`]
//! and score pairs with the same [`jaccard`] primitive.
//!
//! ## Pipeline
//!
//! 1.  **Normalize**: [`SearchConfig::normalized`] validates the knobs and
//!     rounds `num_hashes` up to a multiple of `num_bands`.
//! 2.  **Sign**: [`LshSearcher`] draws a hash family from the seeded RNG and
//!     builds the signature matrix of the source.
//! 3.  **Band**: for every band a fresh seed is drawn and
//!     [`BandHasher::bucket_map`] groups documents whose sub-rows hash to the
//!     same bucket.
//! 4.  **Verify**: every pair sharing a bucket is scored; pairs strictly above
//!     the threshold go into the [`PairSet`], which keeps one entry per
//!     unordered pair of external ids.
//!
//! ## Example Usage
//!
//! ```
//! use lsh::{LshSearcher, SearchConfig, SimilaritySearcher};
//! use minhash::InMemorySource;
//!
//! let config = SearchConfig::new()
//!     .with_num_hashes(20)
//!     .with_num_bands(10)
//!     .with_threshold(0.3);
//! let mut searcher = LshSearcher::new(config).unwrap();
//!
//! let mut source = InMemorySource::from_sets([
//!     vec![1, 2, 3, 4],
//!     vec![1, 2, 3, 4],
//!     vec![500, 501, 502],
//! ]);
//! let pairs = searcher.search(&mut source).unwrap();
//!
//! assert!(pairs.contains(0, 1));
//! assert!(!pairs.contains(0, 2));
//! ```
pub mod band;
pub mod brute_force;
pub mod config;
pub mod error;
pub mod jaccard;
pub mod pair;
pub mod searcher;

pub use crate::band::{BandHasher, BucketMap};
pub use crate::brute_force::BruteForceSearcher;
pub use crate::config::{SearchConfig, SimilarityMode};
pub use crate::error::LshError;
pub use crate::jaccard::{jaccard, positional_similarity};
pub use crate::pair::{PairSet, SimilarPair};
pub use crate::searcher::{LshSearcher, SimilaritySearcher};
