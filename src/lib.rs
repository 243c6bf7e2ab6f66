//! # bcpnative
//!
//! Native-format data files and XML format files for SQL Server's `bcp`
//! bulk-copy utility.
//!
//! `bcp` native mode expects every field to describe itself with a
//! little-endian length prefix (or an all-ones null sentinel), and a format
//! file that declares the same prefix widths. This crate produces both from one
//! schema, so they always agree.
//!
//! ## Key Features
//!
//! - **Typed schema** - a closed [`SqlType`] set, validated before any row is touched
//! - **Byte-exact encoders** - integers, BIT, REAL/FLOAT, DATE, DATETIME2(7),
//!   VARCHAR, NVARCHAR and GEOMETRY (WKB)
//! - **Row assembly** - row-major payload, sequential or parallel with identical output
//! - **Format files** - `BCPFORMAT` XML with `NativePrefix`/`CharPrefix`/`NCharPrefix` fields
//! - **Loader plumbing** - `bcp` command building with password redaction, and
//!   end-to-end bulk loads (feature `loader`)
//!
//! ## Quick Start
//!
//! ```
//! use bcpnative::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let schema = TableSchema::builder()
//!     .column("id", SqlType::Int)
//!     .column("name", ColumnSpec::varchar(20))
//!     .build()?;
//!
//! let rows = vec![
//!     Row::new().with("id", 5).with("name", "hi"),
//!     Row::new().with("id", 6).with_null("name"),
//! ];
//!
//! let artifacts = prepare_native(&schema, &rows, &EncodeOptions::default())?;
//! assert_eq!(
//!     artifacts.payload.as_bytes(),
//!     &[
//!         0x04, 0x05, 0x00, 0x00, 0x00, 0x02, 0x00, b'h', b'i',
//!         0x04, 0x06, 0x00, 0x00, 0x00, 0xFF, 0xFF,
//!     ]
//! );
//! let xml = artifacts.descriptor.to_xml()?;
//! assert!(xml.contains(r#"<FIELD ID="2" xsi:type="CharPrefix" PREFIX_LENGTH="2""#));
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `io-csv` - delimited character-mode data files
//! - `io-jsonl` - read row-sets from JSON Lines
//! - `loader` - run `bcp` and orchestrate bulk loads
//!
//! ## Module Overview
//!
//! - [`schema`] - SQL type tags, column specs, table schemas
//! - [`value`] - scalar values and rows
//! - [`layout`] - per-type prefix widths and field kinds
//! - [`encode`] - per-type encoders
//! - [`assemble`] - row-major payload assembly
//! - [`descriptor`] - XML format-file generation
//! - [`io`] - file writers and readers
//! - [`loader`] / [`bulk`] - `bcp` invocation

pub mod assemble;
pub mod config;
pub mod descriptor;
pub mod encode;
pub mod error;
pub mod io;
pub mod layout;
pub mod schema;
pub mod value;

#[cfg_attr(docsrs, doc(cfg(feature = "loader")))]
#[cfg(feature = "loader")]
pub mod bulk;
#[cfg_attr(docsrs, doc(cfg(feature = "loader")))]
#[cfg(feature = "loader")]
pub mod loader;

// General re-exports
pub use assemble::{NativeArtifacts, Payload, assemble, encode_rows, prepare_native};
pub use config::{CodePage, DEFAULT_COLLATION, EncodeOptions};
pub use descriptor::{FormatDescriptor, generate_format_xml};
pub use encode::{EncodedColumn, EncodedField, encode_column, encode_value};
pub use error::{BcpError, BcpResult, ValueError};
pub use layout::{FieldKind, FieldLayout};
pub use schema::{ColumnSpec, SqlType, TableSchema};
pub use value::{Row, Value};
pub use io::native::{NativeFiles, write_native_files};

// Gated re-exports
#[cfg(feature = "io-csv")]
pub use io::text::{TextOptions, write_delimited};

#[cfg(feature = "io-jsonl")]
pub use io::jsonl::read_rows_jsonl;

#[cfg(feature = "loader")]
pub use bulk::{BulkOptions, BulkReport, bulk_insert_native};

#[cfg(all(feature = "loader", feature = "io-csv"))]
pub use bulk::bulk_insert_text;

#[cfg(feature = "loader")]
pub use loader::{Auth, BcpCommand, DataFormat, LoadError, LoaderConfig};
