use minhash::{MinHashError, SourceError};
use thiserror::Error;

/// Errors returned by the LSH and brute-force searchers.
#[derive(Debug, Error)]
pub enum LshError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("signature matrix has {found} hash columns, searcher expects {expected}")]
    SignatureWidth { expected: usize, found: usize },

    #[error(transparent)]
    MinHash(#[from] MinHashError),

    #[error(transparent)]
    Source(#[from] SourceError),
}
