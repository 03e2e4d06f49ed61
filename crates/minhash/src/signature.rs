//! Signature matrix construction.
//!
//! The builder drains a [`DocumentSource`] once and produces a dense
//! `N × H` matrix of minimum hash values. Row `d` belongs to the document
//! with internal id `d`; column `h` belongs to the `h`-th function of the
//! [`HashFamily`].

use std::collections::HashSet;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Level};

use crate::error::MinHashError;
use crate::family::HashFamily;
use crate::source::{DocumentSource, ExternalId};

/// Progress is logged every this many documents.
const PROGRESS_EVERY: usize = 10_000;

/// What to do with a document whose shingle set is empty.
///
/// An empty set has no minimum, so it can never yield a valid signature row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyDocumentPolicy {
    /// Leave the document out of the matrix and record its external id.
    #[default]
    Skip,
    /// Abort with [`MinHashError::EmptyShingleSet`].
    Reject,
}

/// Dense, immutable table of MinHash signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMatrix {
    num_hashes: usize,
    values: Vec<u32>,
    external_ids: Vec<ExternalId>,
    excluded: Vec<ExternalId>,
}

impl SignatureMatrix {
    /// Assemble a matrix from per-document rows.
    ///
    /// Every row must have exactly `num_hashes` entries.
    pub fn from_rows(
        num_hashes: usize,
        external_ids: Vec<ExternalId>,
        rows: Vec<Vec<u32>>,
    ) -> Result<Self, MinHashError> {
        if external_ids.len() != rows.len() {
            return Err(MinHashError::MalformedTable {
                line: 1,
                message: format!(
                    "{} document ids for {} signature rows",
                    external_ids.len(),
                    rows.len()
                ),
            });
        }
        let mut values = Vec::with_capacity(rows.len() * num_hashes);
        for (doc, row) in rows.into_iter().enumerate() {
            if row.len() != num_hashes {
                return Err(MinHashError::MalformedTable {
                    line: 1,
                    message: format!(
                        "document {doc} has {} values, expected {num_hashes}",
                        row.len()
                    ),
                });
            }
            values.extend(row);
        }
        Ok(Self {
            num_hashes,
            values,
            external_ids,
            excluded: Vec::new(),
        })
    }

    /// Number of documents (rows).
    pub fn len(&self) -> usize {
        self.external_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.external_ids.is_empty()
    }

    /// Number of hash functions (columns).
    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    /// Signature row of internal document `doc`.
    pub fn row(&self, doc: usize) -> &[u32] {
        let start = doc * self.num_hashes;
        &self.values[start..start + self.num_hashes]
    }

    /// Value of hash function `hash` for internal document `doc`.
    pub fn get(&self, doc: usize, hash: usize) -> u32 {
        self.values[doc * self.num_hashes + hash]
    }

    /// Distinct values of a signature row, ignoring column positions.
    pub fn signature_set(&self, doc: usize) -> HashSet<u32> {
        self.row(doc).iter().copied().collect()
    }

    pub fn external_id(&self, doc: usize) -> ExternalId {
        self.external_ids[doc]
    }

    /// External ids in internal-id order.
    pub fn external_ids(&self) -> &[ExternalId] {
        &self.external_ids
    }

    /// External ids of documents left out because their shingle set was empty.
    pub fn excluded(&self) -> &[ExternalId] {
        &self.excluded
    }
}

/// Builds a [`SignatureMatrix`] from a document source.
#[derive(Debug, Clone)]
pub struct SignatureBuilder<'a> {
    family: &'a HashFamily,
    max_documents: Option<usize>,
    empty_policy: EmptyDocumentPolicy,
    use_parallel: bool,
}

impl<'a> SignatureBuilder<'a> {
    pub fn new(family: &'a HashFamily) -> Self {
        Self {
            family,
            max_documents: None,
            empty_policy: EmptyDocumentPolicy::default(),
            use_parallel: false,
        }
    }

    /// Stop after this many documents even if the source has more.
    pub fn with_max_documents(mut self, max_documents: Option<usize>) -> Self {
        self.max_documents = max_documents;
        self
    }

    pub fn with_empty_policy(mut self, policy: EmptyDocumentPolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    /// Compute the hash columns of each row on the rayon pool.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Rewind `source` and turn every document into one signature row.
    pub fn build<S>(&self, source: &mut S) -> Result<SignatureMatrix, MinHashError>
    where
        S: DocumentSource + ?Sized,
    {
        let start = Instant::now();
        let span = tracing::span!(
            Level::INFO,
            "minhash.build_signatures",
            num_hashes = self.family.len(),
            prime = self.family.prime()
        );
        let _guard = span.enter();

        source.reset()?;

        let num_hashes = self.family.len();
        let mut values = Vec::new();
        let mut external_ids = Vec::new();
        let mut excluded = Vec::new();
        let mut row = Vec::with_capacity(num_hashes);
        let mut read = 0usize;

        while source.has_next() && self.max_documents.map_or(true, |max| read < max) {
            let Some(doc) = source.next_document()? else {
                debug!(documents = read, "source_exhausted");
                break;
            };
            read += 1;
            if read % PROGRESS_EVERY == 0 {
                debug!(documents = read, "signature_progress");
            }

            if doc.shingles.is_empty() {
                match self.empty_policy {
                    EmptyDocumentPolicy::Reject => {
                        return Err(MinHashError::EmptyShingleSet {
                            external_id: doc.external_id,
                        });
                    }
                    EmptyDocumentPolicy::Skip => {
                        warn!(external_id = doc.external_id, "empty_shingle_set_skipped");
                        excluded.push(doc.external_id);
                        continue;
                    }
                }
            }

            let shingles: Vec<u32> = doc.shingles.into_iter().collect();
            self.signature_row(&shingles, &mut row);
            values.extend_from_slice(&row);
            external_ids.push(doc.external_id);
        }

        info!(
            documents = external_ids.len(),
            excluded = excluded.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "signatures_built"
        );

        Ok(SignatureMatrix {
            num_hashes,
            values,
            external_ids,
            excluded,
        })
    }

    /// Fill `row` with the signature of a non-empty shingle slice.
    fn signature_row(&self, shingles: &[u32], row: &mut Vec<u32>) {
        let family = self.family;
        let slot = |index: usize| family.min_hash(index, shingles).unwrap_or(u32::MAX);
        if self.use_parallel {
            (0..family.len()).into_par_iter().map(slot).collect_into_vec(row);
        } else {
            row.clear();
            row.extend((0..family.len()).map(slot));
        }
    }
}
