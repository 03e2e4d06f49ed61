//! Workspace umbrella crate for nearsim near-duplicate search.
//!
//! This crate wires a text corpus into the MinHash/LSH core so callers can
//! go from a file of documents to a file of similar pairs with one call to
//! [`run`]. The core crates are re-exported for finer-grained use.
//!
//! ```no_run
//! use nearsim::{run, NearsimConfig};
//!
//! let config = NearsimConfig::from_file("nearsim.yaml").unwrap();
//! let report = run(&config).unwrap();
//! println!("{} pairs in {} ms", report.pairs, report.search_millis);
//! ```

pub mod config;
pub mod corpus;
pub mod evaluate;
pub mod export;
pub mod shingles;

pub use crate::config::{
    ConfigLoadError, CorpusYamlConfig, Method, NearsimConfig, OutputYamlConfig,
};
pub use crate::corpus::TextCorpus;
pub use crate::evaluate::{evaluate, Evaluation};
pub use crate::export::{read_pairs, write_pairs, PairFileError, PAIRS_HEADER};
pub use crate::shingles::Shingler;

pub use lsh::{
    jaccard, BruteForceSearcher, LshError, LshSearcher, PairSet, SearchConfig, SimilarPair,
    SimilarityMode, SimilaritySearcher,
};
pub use minhash::{
    save_signature_table, DocumentSource, EmptyDocumentPolicy, MinHashError, SignatureMatrix,
    SourceError,
};

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn, Level};

/// Errors that can occur while running the pipeline end to end.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("corpus error: {0}")]
    Source(#[from] SourceError),

    #[error("search failed: {0}")]
    Search(#[from] LshError),

    #[error("signature export failed: {0}")]
    Signatures(#[from] MinHashError),

    #[error("pair file error: {0}")]
    Pairs(#[from] PairFileError),
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub method: Method,
    /// Hash count after rounding to a band multiple; `None` for brute force.
    pub effective_num_hashes: Option<usize>,
    pub documents: usize,
    pub excluded_documents: usize,
    pub pairs: usize,
    pub search_millis: u128,
    pub evaluation: Option<Evaluation>,
}

/// Run the configured search over the corpus and write the results.
pub fn run(config: &NearsimConfig) -> Result<RunReport, PipelineError> {
    config.validate()?;
    let span = tracing::span!(Level::INFO, "nearsim.run", method = config.method.as_str());
    let _guard = span.enter();

    let num_shingles = u32::try_from(config.search.num_shingles).map_err(|_| {
        ConfigLoadError::Validation("search.num_shingles must fit in 32 bits".to_string())
    })?;
    let shingler = Shingler::new(config.corpus.shingle_length, num_shingles);
    let mut corpus = TextCorpus::open(
        &config.corpus.data_file,
        shingler,
        config.search.max_documents,
    )?;

    info!(
        threshold = config.search.threshold,
        data_file = %config.corpus.data_file.display(),
        "search_started"
    );
    let start = Instant::now();

    let (pairs, processed, effective_num_hashes, excluded) = match config.method {
        Method::Lsh => {
            let mut searcher = LshSearcher::new(config.search.clone())?;
            let pairs = searcher.search(&mut corpus)?;
            let processed = searcher.processed_ids();
            let effective = searcher.config().num_hashes;
            let excluded = searcher.signatures().map_or(0, |m| m.excluded().len());
            if let Some(path) = &config.output.signatures_file {
                if let Some(matrix) = searcher.signatures() {
                    save_signature_table(matrix, path)?;
                }
            }
            (pairs, processed, Some(effective), excluded)
        }
        Method::Bf => {
            if config.output.signatures_file.is_some() {
                warn!("signatures_file_ignored_for_brute_force");
            }
            let mut searcher = BruteForceSearcher::from_config(&config.search)?;
            let pairs = searcher.search(&mut corpus)?;
            (pairs, searcher.processed_ids(), None, 0)
        }
    };
    let search_millis = start.elapsed().as_millis();
    info!(
        pairs = pairs.len(),
        documents = processed.len(),
        elapsed_millis = search_millis,
        "search_complete"
    );

    write_pairs(&config.output.pairs_file, &pairs)?;

    let evaluation = match &config.output.test_file {
        Some(path) => {
            let references = read_pairs(path)?;
            Some(evaluate(&pairs, &references, &processed))
        }
        None => None,
    };

    Ok(RunReport {
        method: config.method,
        effective_num_hashes,
        documents: processed.len() - excluded,
        excluded_documents: excluded,
        pairs: pairs.len(),
        search_millis,
        evaluation,
    })
}
