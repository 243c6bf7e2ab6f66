//! Native data file (`.dat`) and XML format file (`.xml`) writers.
//!
//! Both artifacts are built in memory before either file is touched, so a
//! schema or encoding failure leaves nothing half-written on disk.

use crate::assemble::{Payload, prepare_native};
use crate::config::EncodeOptions;
use crate::descriptor::FormatDescriptor;
use crate::io::ensure_parent;
use crate::schema::TableSchema;
use crate::value::Row;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths and sizes of a written native pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeFiles {
    pub data_file: PathBuf,
    pub format_file: PathBuf,
    pub rows: usize,
    pub bytes: usize,
}

/// `<base>.dat` and `<base>.xml`.
///
/// The suffixes are appended rather than substituted, so a base like
/// `out/batch.2024` keeps its dot.
pub fn native_paths(base: impl AsRef<Path>) -> (PathBuf, PathBuf) {
    let with_suffix = |suffix: &str| {
        let mut s = OsString::from(base.as_ref().as_os_str());
        s.push(suffix);
        PathBuf::from(s)
    };
    (with_suffix(".dat"), with_suffix(".xml"))
}

/// Write a payload verbatim.
///
/// # Returns
/// Number of bytes written.
///
/// # Errors
/// Returns an error if the file or its parent directory cannot be created.
pub fn write_payload(path: impl AsRef<Path>, payload: &Payload) -> Result<usize> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    w.write_all(payload.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    w.flush()?;
    Ok(payload.len())
}

/// Render and write a format file.
///
/// # Errors
/// Returns an error if rendering fails or the file cannot be written.
pub fn write_format_file(path: impl AsRef<Path>, descriptor: &FormatDescriptor) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let xml = descriptor.to_xml()?;
    std::fs::write(path, xml).with_context(|| format!("write {}", path.display()))
}

/// Encode `rows` and write `<base>.dat` plus `<base>.xml`.
///
/// # Errors
/// Schema and encoding errors (as [`BcpError`](crate::error::BcpError) inside
/// the `anyhow::Error`), or I/O failures.
pub fn write_native_files(
    base: impl AsRef<Path>,
    schema: &TableSchema,
    rows: &[Row],
    opts: &EncodeOptions,
) -> Result<NativeFiles> {
    let (data_file, format_file) = native_paths(base);
    let artifacts = prepare_native(schema, rows, opts)?;

    info!(path = %format_file.display(), "writing format file");
    write_format_file(&format_file, &artifacts.descriptor)?;

    info!(
        path = %data_file.display(),
        rows = artifacts.payload.row_count(),
        "writing native data file"
    );
    let bytes = write_payload(&data_file, &artifacts.payload)?;

    Ok(NativeFiles {
        data_file,
        format_file,
        rows: artifacts.payload.row_count(),
        bytes,
    })
}
