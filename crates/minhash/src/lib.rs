//! # nearsim MinHash signatures
//!
//! This crate turns a stream of shingled documents into a dense MinHash
//! signature matrix. It is the first half of the nearsim near-duplicate
//! search; the `lsh` crate bands the matrix into candidate pairs.
//!
//! ## Contract
//!
//! - Documents arrive through a [`DocumentSource`] as sets of `u32`
//!   shingle ids. Extracting shingles from raw content happens upstream.
//! - Hash functions are universal: `h(x) = (a·x + b) mod p`, with `p` the
//!   smallest prime not below the shingle universe size.
//! - For the same source, hash family and builder options the matrix is
//!   identical, whether or not the parallel path is enabled.
//!
//! ## Pipeline
//!
//! 1.  **Prime selection**: [`next_prime`] picks the modulus so that hash
//!     outputs cover the shingle universe.
//! 2.  **Hash family**: [`HashFamily::generate`] draws `H` distinct `(a, b)`
//!     pairs from a seeded RNG. Their order fixes the signature columns.
//! 3.  **Signatures**: [`SignatureBuilder::build`] rewinds the source and
//!     appends one row per document holding, for each function, the minimum
//!     hash over the document's shingles.
//!
//! ## Example Usage
//!
//! ```
//! use minhash::{next_prime, HashFamily, InMemorySource, SignatureBuilder};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let prime = next_prime(1_000).unwrap();
//! let mut rng = StdRng::seed_from_u64(7_825_942);
//! let family = HashFamily::generate(16, prime, &mut rng).unwrap();
//!
//! let mut source = InMemorySource::from_sets([vec![1, 2, 3], vec![2, 3, 4]]);
//! let matrix = SignatureBuilder::new(&family).build(&mut source).unwrap();
//!
//! assert_eq!(matrix.len(), 2);
//! assert_eq!(matrix.num_hashes(), 16);
//! assert!(matrix.row(0).iter().all(|&v| v < prime));
//! ```
pub mod error;
pub mod export;
pub mod family;
pub mod prime;
pub mod signature;
pub mod source;

pub use crate::error::{MinHashError, SourceError};
pub use crate::export::{
    load_signature_table, read_signature_table, save_signature_table, write_signature_table,
};
pub use crate::family::{HashFamily, HashFunction};
pub use crate::prime::{is_prime, next_prime, PRIME_SEARCH_WINDOW};
pub use crate::signature::{EmptyDocumentPolicy, SignatureBuilder, SignatureMatrix};
pub use crate::source::{Document, DocumentSource, ExternalId, InMemorySource, ShingleSet};
