//! Document source contract consumed by the signature builder.

use std::collections::HashSet;

use crate::error::SourceError;

/// External identifier of a document in the source collection.
pub type ExternalId = u64;

/// Shingle token set of one document.
pub type ShingleSet = HashSet<u32>;

/// One document as produced by a [`DocumentSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub external_id: ExternalId,
    pub shingles: ShingleSet,
}

impl Document {
    pub fn new<I>(external_id: ExternalId, shingles: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self {
            external_id,
            shingles: shingles.into_iter().collect(),
        }
    }
}

/// A restartable, finite sequence of shingled documents.
///
/// Implementations assign internal ids densely in read order, starting from
/// zero after every [`DocumentSource::reset`].
pub trait DocumentSource {
    /// Rewind to the first document and forget previously read ids.
    fn reset(&mut self) -> Result<(), SourceError>;

    /// `false` once the configured maximum document count has been read.
    ///
    /// A `true` answer does not promise another document: the underlying
    /// input may still be exhausted, which `next_document` reports as
    /// `Ok(None)`.
    fn has_next(&self) -> bool;

    /// Read the next document, or `Ok(None)` at end of input.
    fn next_document(&mut self) -> Result<Option<Document>, SourceError>;

    /// External id of the document read with internal id `internal`.
    fn external_id(&self, internal: usize) -> Option<ExternalId>;
}

/// In-memory document source, mostly useful for tests and small batches.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: Vec<Document>,
    max_documents: Option<usize>,
    cursor: usize,
    read_ids: Vec<ExternalId>,
}

impl InMemorySource {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    /// Build a source whose external ids are the positions `0..n`.
    pub fn from_sets<I, S>(sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = u32>,
    {
        let documents = sets
            .into_iter()
            .enumerate()
            .map(|(i, set)| Document::new(i as ExternalId, set))
            .collect();
        Self::new(documents)
    }

    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = Some(max_documents);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentSource for InMemorySource {
    fn reset(&mut self) -> Result<(), SourceError> {
        self.cursor = 0;
        self.read_ids.clear();
        Ok(())
    }

    fn has_next(&self) -> bool {
        self.max_documents
            .map_or(true, |max| self.read_ids.len() < max)
    }

    fn next_document(&mut self) -> Result<Option<Document>, SourceError> {
        if !self.has_next() {
            return Ok(None);
        }
        let Some(doc) = self.documents.get(self.cursor).cloned() else {
            return Ok(None);
        };
        self.cursor += 1;
        self.read_ids.push(doc.external_id);
        Ok(Some(doc))
    }

    fn external_id(&self, internal: usize) -> Option<ExternalId> {
        self.read_ids.get(internal).copied()
    }
}
