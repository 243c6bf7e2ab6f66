//! Row assembly: per-column encoded cells into one row-major native payload.
//!
//! For row `i` the payload holds column 1's cell `i`, then column 2's cell `i`,
//! and so on in schema order; rows follow in input order. There is no padding
//! and no separator, since every cell carries its own length prefix.
//!
//! # Design notes
//! - Schema validation and column resolution happen before any value is
//!   encoded, so a bad schema or a short row never produces partial output.
//! - The parallel path encodes columns and assembles row chunks on rayon, then
//!   joins chunk buffers in index order. Output is byte-identical to the
//!   sequential path, and so is the reported error.

use crate::config::EncodeOptions;
use crate::descriptor::FormatDescriptor;
use crate::encode::{EncodedColumn, encode_column};
use crate::error::{BcpError, BcpResult};
use crate::schema::{ColumnSpec, TableSchema};
use crate::value::{Row, Value};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

/// A complete native data file body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload {
    bytes: Vec<u8>,
    rows: usize,
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }
}

/// Payload and the format file describing it, built from the same schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeArtifacts {
    pub payload: Payload,
    pub descriptor: FormatDescriptor,
}

fn row_count(columns: &[EncodedColumn]) -> BcpResult<usize> {
    let rows = columns.first().map_or(0, |c| c.fields.len());
    if let Some(c) = columns.iter().find(|c| c.fields.len() != rows) {
        return Err(BcpError::schema(format!(
            "column '{}' has {} encoded rows, expected {}",
            c.name,
            c.fields.len(),
            rows
        )));
    }
    Ok(rows)
}

fn append_rows(columns: &[EncodedColumn], start: usize, end: usize, out: &mut Vec<u8>) {
    for row in start..end {
        for column in columns {
            out.extend_from_slice(column.fields[row].as_bytes());
        }
    }
}

/// Concatenate encoded columns row by row.
///
/// # Errors
/// [`BcpError::Schema`] when the columns do not all have the same row count.
pub fn assemble(columns: &[EncodedColumn]) -> BcpResult<Payload> {
    let rows = row_count(columns)?;
    let mut bytes = Vec::with_capacity(columns.iter().map(EncodedColumn::byte_len).sum());
    append_rows(columns, 0, rows, &mut bytes);
    Ok(Payload { bytes, rows })
}

/// [`assemble`] over row chunks in parallel, joined in chunk order.
///
/// * `shards`: chunk count. If `None`, defaults to `2 * num_cpus()`,
///   clamped to `[1, rows]`.
///
/// # Errors
/// See [`assemble`].
pub fn assemble_par(columns: &[EncodedColumn], shards: Option<usize>) -> BcpResult<Payload> {
    let rows = row_count(columns)?;
    if rows == 0 {
        return Ok(Payload::default());
    }
    let shard_count = shards
        .unwrap_or_else(|| 2 * num_cpus::get().max(2))
        .clamp(1, rows);

    let mut buffers: Vec<(usize, Vec<u8>)> = split_ranges(rows, shard_count)
        .into_par_iter()
        .map(|(idx, start, end)| {
            let mut buf = Vec::new();
            append_rows(columns, start, end, &mut buf);
            (idx, buf)
        })
        .collect();
    buffers.sort_by_key(|(idx, _)| *idx);

    let mut bytes = Vec::with_capacity(buffers.iter().map(|(_, b)| b.len()).sum());
    for (_, buf) in buffers {
        bytes.extend_from_slice(&buf);
    }
    Ok(Payload { bytes, rows })
}

/// Split `[0, len)` into `parts` contiguous ranges as `(chunk_idx, start, end)`.
///
/// Ranges are non-empty, cover the whole domain, and spread the remainder
/// over the first chunks.
fn split_ranges(len: usize, parts: usize) -> Vec<(usize, usize, usize)> {
    let parts = parts.max(1).min(len.max(1));
    let base = len / parts;
    let rem = len % parts;

    let mut out = Vec::with_capacity(parts);
    let mut start = 0usize;
    for idx in 0..parts {
        let extra = if idx < rem { 1 } else { 0 };
        let end = start + base + extra;
        if start < end {
            out.push((idx, start, end));
        }
        start = end;
    }
    out
}

/// Resolve every schema column in every row, column-major.
///
/// # Errors
/// [`BcpError::Schema`] naming the first row (in row order) that lacks a
/// schema column.
pub fn resolve_columns<'a>(
    schema: &TableSchema,
    rows: &'a [Row],
) -> BcpResult<Vec<Vec<Option<&'a Value>>>> {
    let mut columns: Vec<Vec<Option<&Value>>> = schema
        .columns()
        .iter()
        .map(|_| Vec::with_capacity(rows.len()))
        .collect();
    for (i, row) in rows.iter().enumerate() {
        for ((name, _), column) in schema.columns().iter().zip(columns.iter_mut()) {
            let value = row.lookup(name).ok_or_else(|| {
                BcpError::schema(format!("column '{}' from schema not found in row {}", name, i))
            })?;
            column.push(value);
        }
    }
    Ok(columns)
}

/// Column index, schema entry and resolved values of one column.
type ColumnJob<'s, 'r> = (usize, (&'s (String, ColumnSpec), Vec<Option<&'r Value>>));

fn encode_job(
    (idx, ((name, spec), values)): ColumnJob<'_, '_>,
    opts: &EncodeOptions,
) -> Result<EncodedColumn, (usize, BcpError)> {
    encode_column(name, spec, values, opts).map_err(|e| (idx, e))
}

/// Pick the failure a row-major writer would have hit first.
fn first_failure(errors: Vec<(usize, BcpError)>) -> Option<BcpError> {
    errors
        .into_iter()
        .min_by_key(|(col, e)| (e.row().unwrap_or(0), *col))
        .map(|(_, e)| e)
}

/// Validate, encode and assemble a row-set into a native payload.
///
/// # Errors
/// Schema errors before anything is encoded; otherwise the first failing
/// value in row-major order. No partial payload is returned.
pub fn encode_rows(schema: &TableSchema, rows: &[Row], opts: &EncodeOptions) -> BcpResult<Payload> {
    schema.validate()?;
    let resolved = resolve_columns(schema, rows)?;

    let jobs: Vec<ColumnJob<'_, '_>> = schema.columns().iter().zip(resolved).enumerate().collect();
    let results: Vec<Result<EncodedColumn, (usize, BcpError)>> = if opts.parallel {
        jobs.into_par_iter().map(|job| encode_job(job, opts)).collect()
    } else {
        jobs.into_iter().map(|job| encode_job(job, opts)).collect()
    };

    let mut columns = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for r in results {
        match r {
            Ok(c) => columns.push(c),
            Err(e) => errors.push(e),
        }
    }
    if let Some(e) = first_failure(errors) {
        return Err(e);
    }

    let payload = if opts.parallel {
        assemble_par(&columns, opts.shards)?
    } else {
        assemble(&columns)?
    };
    debug!(
        rows = payload.row_count(),
        columns = columns.len(),
        bytes = payload.len(),
        "assembled native payload"
    );
    Ok(payload)
}

/// Build the format file, then the payload, from one schema.
///
/// The descriptor is built first so that schema problems surface before any
/// row is touched.
///
/// # Errors
/// See [`FormatDescriptor::from_schema`] and [`encode_rows`].
pub fn prepare_native(
    schema: &TableSchema,
    rows: &[Row],
    opts: &EncodeOptions,
) -> BcpResult<NativeArtifacts> {
    let descriptor = FormatDescriptor::from_schema(schema, &opts.collation)?;
    let payload = encode_rows(schema, rows, opts)?;
    Ok(NativeArtifacts {
        payload,
        descriptor,
    })
}
