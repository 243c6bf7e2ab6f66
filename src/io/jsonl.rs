//! Row-sets from JSON Lines.
//!
//! Each non-empty line is one JSON object mapping column names to scalars.
//! `null` is an explicit SQL NULL; a key that is absent is a missing column.

use crate::value::Row;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read a JSONL file into rows.
///
/// # Errors
/// Returns an error if the file cannot be read, or if a line is not a JSON
/// object of scalars. Errors name the line number.
pub fn read_rows_jsonl(path: impl AsRef<Path>) -> Result<Vec<Row>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = BufReader::new(f);
    let mut out = Vec::new();
    for (i, line) in rdr.lines().enumerate() {
        let line = line.with_context(|| format!("read line {} in {}", i + 1, path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let json: serde_json::Value = serde_json::from_str(&line)
            .with_context(|| format!("parse JSONL line {} in {}", i + 1, path.display()))?;
        let row = Row::from_json(json)
            .with_context(|| format!("convert JSONL line {} in {}", i + 1, path.display()))?;
        out.push(row);
    }
    Ok(out)
}
