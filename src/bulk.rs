//! End-to-end bulk loads: encode, write, run `bcp`, clean up.
//!
//! ```no_run
//! use bcpnative::bulk::{BulkOptions, bulk_insert_native};
//! use bcpnative::loader::Auth;
//! use bcpnative::schema::{ColumnSpec, SqlType, TableSchema};
//! use bcpnative::value::Row;
//!
//! # fn main() -> anyhow::Result<()> {
//! let schema = TableSchema::builder()
//!     .column("id", SqlType::Int)
//!     .column("name", ColumnSpec::nvarchar(100))
//!     .build()?;
//! let rows = vec![Row::new().with("id", 1).with("name", "Ada")];
//!
//! let mut opts = BulkOptions::default();
//! opts.loader.server = "localhost,1433".into();
//! opts.loader.auth = Some(Auth::Trusted);
//!
//! let report = bulk_insert_native(&rows, &schema, "Demo.dbo.People", &opts)?;
//! assert_eq!(report.rows, 1);
//! # Ok(())
//! # }
//! ```

use crate::config::EncodeOptions;
use crate::io::native::{native_paths, write_native_files};
use crate::loader::{BcpCommand, DataFormat, LoadOutput, LoaderConfig};
use crate::schema::TableSchema;
use crate::value::Row;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, info_span, warn};

#[cfg(feature = "io-csv")]
use crate::io::text::{TextOptions, write_delimited};

/// Settings for one bulk load.
#[derive(Clone, Debug, Default)]
pub struct BulkOptions {
    pub encode: EncodeOptions,
    pub loader: LoaderConfig,
    #[cfg(feature = "io-csv")]
    pub text: TextOptions,
    /// Base path for the artifacts (`<base>.dat`, `<base>.xml`, `<base>.csv`).
    /// `None` writes into a fresh temporary directory that is always removed.
    pub temp_base: Option<PathBuf>,
    /// Remove artifacts at `temp_base` after the load, whether it succeeded or not.
    /// Off by default so failed loads can be inspected.
    pub cleanup: bool,
    /// Batch number for log context.
    pub batch_num: Option<usize>,
}

/// What a bulk load did.
#[derive(Clone, Debug, Default)]
pub struct BulkReport {
    pub rows: usize,
    /// True when the row-set was empty and nothing ran.
    pub skipped: bool,
    pub output: LoadOutput,
}

/// Artifact location for one load; removes what it owns on drop.
struct Workspace {
    base: PathBuf,
    cleanup: Vec<PathBuf>,
    _tmp: Option<TempDir>,
}

impl Workspace {
    fn new(opts: &BulkOptions) -> Result<Self> {
        match &opts.temp_base {
            Some(base) => Ok(Self {
                base: base.clone(),
                cleanup: Vec::new(),
                _tmp: None,
            }),
            None => {
                let tmp = TempDir::new().context("create temporary directory")?;
                Ok(Self {
                    base: tmp.path().join("bcp_batch"),
                    cleanup: Vec::new(),
                    _tmp: Some(tmp),
                })
            }
        }
    }

    fn track(&mut self, opts: &BulkOptions, path: &Path) {
        if opts.cleanup && opts.temp_base.is_some() {
            self.cleanup.push(path.to_path_buf());
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        for path in &self.cleanup {
            if path.exists()
                && let Err(e) = std::fs::remove_file(path)
            {
                warn!(path = %path.display(), error = %e, "could not clean up temp file");
            }
        }
        if !self.cleanup.is_empty() {
            debug!("cleaned up temp files");
        }
    }
}

/// Load `rows` through a native data file and XML format file.
///
/// An empty row-set logs a warning and returns a skipped report.
///
/// # Errors
/// Schema/encoding errors before anything is written, I/O errors, or the
/// loader's failure (see [`BcpCommand::run`]).
pub fn bulk_insert_native(
    rows: &[Row],
    schema: &TableSchema,
    target_table: &str,
    opts: &BulkOptions,
) -> Result<BulkReport> {
    let span = info_span!("bulk_insert_native", batch = ?opts.batch_num, table = target_table);
    let _enter = span.enter();

    if rows.is_empty() {
        warn!("row-set is empty, skipping");
        return Ok(BulkReport {
            skipped: true,
            ..Default::default()
        });
    }

    let mut ws = Workspace::new(opts)?;
    let (data_file, format_file) = native_paths(&ws.base);
    ws.track(opts, &data_file);
    ws.track(opts, &format_file);

    info!(rows = rows.len(), "converting records to native format");
    let files = write_native_files(&ws.base, schema, rows, &opts.encode)
        .context("create native data and format files")?;

    let cmd = BcpCommand::new(
        target_table,
        files.data_file,
        DataFormat::Native {
            format_file: files.format_file,
        },
        opts.loader.clone(),
    );
    let output = cmd.run()?;
    Ok(BulkReport {
        rows: files.rows,
        skipped: false,
        output,
    })
}

/// Load `rows` through a delimited character-mode file (`bcp -c`).
///
/// # Errors
/// See [`bulk_insert_native`].
#[cfg(feature = "io-csv")]
pub fn bulk_insert_text(
    rows: &[Row],
    schema: &TableSchema,
    target_table: &str,
    opts: &BulkOptions,
) -> Result<BulkReport> {
    let span = info_span!("bulk_insert_text", batch = ?opts.batch_num, table = target_table);
    let _enter = span.enter();

    if rows.is_empty() {
        warn!("row-set is empty, skipping");
        return Ok(BulkReport {
            skipped: true,
            ..Default::default()
        });
    }

    let mut ws = Workspace::new(opts)?;
    let mut data_file = ws.base.clone().into_os_string();
    data_file.push(".csv");
    let data_file = PathBuf::from(data_file);
    ws.track(opts, &data_file);

    info!(rows = rows.len(), path = %data_file.display(), "saving delimited records");
    let written = write_delimited(&data_file, schema, rows, &opts.text)
        .context("create delimited data file")?;

    let cmd = BcpCommand::new(
        target_table,
        &data_file,
        DataFormat::Character {
            separator: opts.text.separator,
            code_page: opts.text.code_page.clone(),
        },
        opts.loader.clone(),
    );
    let output = cmd.run()?;
    Ok(BulkReport {
        rows: written,
        skipped: false,
        output,
    })
}
