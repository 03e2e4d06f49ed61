//! Plain-text signature table.
//!
//! Layout:
//!
//! ```text
//! <ext id 0>,<ext id 1>,...,<ext id N-1>
//! <h0(doc 0)>,<h0(doc 1)>,...,<h0(doc N-1)>
//! <h1(doc 0)>,<h1(doc 1)>,...,<h1(doc N-1)>
//! ...
//! ```
//!
//! One line per hash function follows the header, in hash family order, so
//! the table is column-major with respect to [`SignatureMatrix`].

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::error::MinHashError;
use crate::signature::SignatureMatrix;

/// Write `matrix` in signature table layout.
pub fn write_signature_table<W: Write>(
    matrix: &SignatureMatrix,
    mut writer: W,
) -> Result<(), MinHashError> {
    write_joined(&mut writer, matrix.external_ids().iter())?;
    for hash in 0..matrix.num_hashes() {
        write_joined(&mut writer, (0..matrix.len()).map(|doc| matrix.get(doc, hash)))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a table produced by [`write_signature_table`].
pub fn read_signature_table<R: BufRead>(reader: R) -> Result<SignatureMatrix, MinHashError> {
    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(MinHashError::MalformedTable {
                line: 1,
                message: "missing header line".into(),
            })
        }
    };
    let external_ids: Vec<u64> = parse_fields(&header, 1)?;

    let mut rows: Vec<Vec<u32>> = vec![Vec::new(); external_ids.len()];
    let mut num_hashes = 0usize;
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        let line = line?;
        let values: Vec<u32> = parse_fields(&line, line_no)?;
        if values.len() != external_ids.len() {
            return Err(MinHashError::MalformedTable {
                line: line_no,
                message: format!(
                    "expected {} values, found {}",
                    external_ids.len(),
                    values.len()
                ),
            });
        }
        for (row, value) in rows.iter_mut().zip(values) {
            row.push(value);
        }
        num_hashes += 1;
    }

    SignatureMatrix::from_rows(num_hashes, external_ids, rows)
}

/// Write the signature table of `matrix` to `path`.
pub fn save_signature_table(matrix: &SignatureMatrix, path: &Path) -> Result<(), MinHashError> {
    let file = File::create(path)?;
    write_signature_table(matrix, BufWriter::new(file))?;
    info!(
        path = %path.display(),
        documents = matrix.len(),
        num_hashes = matrix.num_hashes(),
        "signature_table_saved"
    );
    Ok(())
}

/// Load a signature table from `path`.
pub fn load_signature_table(path: &Path) -> Result<SignatureMatrix, MinHashError> {
    let file = File::open(path)?;
    read_signature_table(BufReader::new(file))
}

fn write_joined<W, I, T>(writer: &mut W, values: I) -> std::io::Result<()>
where
    W: Write,
    I: Iterator<Item = T>,
    T: std::fmt::Display,
{
    for (i, value) in values.enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        write!(writer, "{value}")?;
    }
    writer.write_all(b"\n")
}

fn parse_fields<T: FromStr>(line: &str, line_no: usize) -> Result<Vec<T>, MinHashError> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() {
        return Ok(Vec::new());
    }
    line.split(',')
        .map(|field| {
            field
                .trim()
                .parse::<T>()
                .map_err(|_| MinHashError::MalformedTable {
                    line: line_no,
                    message: format!("invalid value {field:?}"),
                })
        })
        .collect()
}
