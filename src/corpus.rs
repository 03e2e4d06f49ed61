//! Line-oriented text corpus as a [`DocumentSource`].
//!
//! Every non-blank line holds one document, either as a JSON object
//! `{"id": 42, "text": "..."}` or as `<id>\t<text>`. A line starting with
//! `{` is parsed as JSON.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use minhash::{Document, DocumentSource, ExternalId, SourceError};
use serde::Deserialize;
use tracing::{debug, info};

use crate::shingles::Shingler;

#[derive(Debug, Deserialize)]
struct JsonLine {
    id: ExternalId,
    #[serde(default)]
    text: String,
}

/// Restartable reader over a corpus file.
#[derive(Debug)]
pub struct TextCorpus {
    path: PathBuf,
    shingler: Shingler,
    max_documents: Option<usize>,
    lines: Lines<BufReader<File>>,
    line_no: usize,
    read_ids: Vec<ExternalId>,
}

impl TextCorpus {
    /// Open `path`; fails if the file cannot be opened.
    pub fn open(
        path: impl AsRef<Path>,
        shingler: Shingler,
        max_documents: Option<usize>,
    ) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let lines = open_lines(&path)?;
        info!(path = %path.display(), k = shingler.k(), "corpus_opened");
        Ok(Self {
            path,
            shingler,
            max_documents,
            lines,
            line_no: 0,
            read_ids: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of documents read since the last reset.
    pub fn documents_read(&self) -> usize {
        self.read_ids.len()
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<(ExternalId, String), SourceError> {
    if line.starts_with('{') {
        let parsed: JsonLine = serde_json::from_str(line).map_err(|err| SourceError::Parse {
            line: line_no,
            message: err.to_string(),
        })?;
        return Ok((parsed.id, parsed.text));
    }

    let (id, text) = line.split_once('\t').unwrap_or((line, ""));
    let id = id.trim().parse::<ExternalId>().map_err(|err| SourceError::Parse {
        line: line_no,
        message: format!("invalid document id {:?}: {err}", id.trim()),
    })?;
    Ok((id, text.to_string()))
}

fn open_lines(path: &Path) -> Result<Lines<BufReader<File>>, SourceError> {
    let file = File::open(path)?;
    Ok(BufReader::new(file).lines())
}

impl DocumentSource for TextCorpus {
    fn reset(&mut self) -> Result<(), SourceError> {
        self.lines = open_lines(&self.path)?;
        self.line_no = 0;
        self.read_ids.clear();
        debug!(path = %self.path.display(), "corpus_reset");
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
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let (external_id, text) = parse_line(line, self.line_no)?;
            self.read_ids.push(external_id);
            return Ok(Some(Document {
                external_id,
                shingles: self.shingler.shingle(&text),
            }));
        }
        Ok(None)
    }

    fn external_id(&self, internal: usize) -> Option<ExternalId> {
        self.read_ids.get(internal).copied()
    }
}
