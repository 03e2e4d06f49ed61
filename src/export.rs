//! Similar-pair CSV files.
//!
//! ```text
//! id1,id2,similarity
//! 3,9,0.812500
//! ```
//!
//! Rows are written sorted by `(id1, id2)` with `id1 <= id2`. The same layout
//! is read back for reference pairs.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use lsh::{PairSet, SimilarPair};
use thiserror::Error;
use tracing::info;

pub const PAIRS_HEADER: &str = "id1,id2,similarity";

#[derive(Debug, Error)]
pub enum PairFileError {
    #[error("pair file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed pair file at line {line}: {message}")]
    Malformed { line: usize, message: String },
}

pub fn write_pairs_to<W: Write>(pairs: &PairSet, mut writer: W) -> Result<(), PairFileError> {
    writeln!(writer, "{PAIRS_HEADER}")?;
    for pair in pairs.clone().into_sorted_vec() {
        writeln!(writer, "{},{},{:.6}", pair.id1, pair.id2, pair.similarity)?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse a pair file. The header line is optional.
pub fn read_pairs_from<R: BufRead>(reader: R) -> Result<PairSet, PairFileError> {
    let mut pairs = PairSet::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || (line_no == 1 && line == PAIRS_HEADER) {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [id1, id2, similarity] = fields.as_slice() else {
            return Err(PairFileError::Malformed {
                line: line_no,
                message: format!("expected 3 fields, found {}", fields.len()),
            });
        };
        let malformed = |what: &str, value: &str| PairFileError::Malformed {
            line: line_no,
            message: format!("invalid {what} {value:?}"),
        };
        let id1 = id1.parse().map_err(|_| malformed("id1", id1))?;
        let id2 = id2.parse().map_err(|_| malformed("id2", id2))?;
        let similarity = similarity
            .parse()
            .map_err(|_| malformed("similarity", similarity))?;
        pairs.insert(SimilarPair::new(id1, id2, similarity));
    }
    Ok(pairs)
}

/// Write `pairs` to `path`, replacing any existing file.
pub fn write_pairs(path: &Path, pairs: &PairSet) -> Result<(), PairFileError> {
    let file = File::create(path)?;
    write_pairs_to(pairs, BufWriter::new(file))?;
    info!(path = %path.display(), pairs = pairs.len(), "pairs_saved");
    Ok(())
}

pub fn read_pairs(path: &Path) -> Result<PairSet, PairFileError> {
    let file = File::open(path)?;
    read_pairs_from(BufReader::new(file))
}
