//! Error types for the MinHash signature engine.

use thiserror::Error;

/// Errors raised by a [`crate::DocumentSource`] while reading documents.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read document source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed document at line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Errors returned while configuring or running the signature engine.
#[derive(Debug, Error)]
pub enum MinHashError {
    #[error("invalid config: shingle universe size must be >= 1 (got {bound})")]
    InvalidUniverse { bound: u64 },

    #[error("no prime found in [{bound}, {bound} + {window}) within u32 range")]
    PrimeNotFound { bound: u64, window: u64 },

    #[error("invalid config: num_hashes must be >= 1 (got {count})")]
    InvalidHashCount { count: usize },

    #[error("cannot draw {count} distinct hash functions modulo {prime} ({available} available)")]
    HashFamilyExhausted {
        count: usize,
        prime: u32,
        available: u64,
    },

    #[error("document {external_id} has an empty shingle set")]
    EmptyShingleSet { external_id: u64 },

    #[error("malformed signature table at line {line}: {message}")]
    MalformedTable { line: usize, message: String },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to write signature table: {0}")]
    Io(#[from] std::io::Error),
}
