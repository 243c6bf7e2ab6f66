//! Delimited character-mode data files for `bcp -c`.
//!
//! Rows are written in schema order with no header. `bcp` has no quoting, so
//! fields are never quoted; a value containing the separator or a line break
//! cannot be represented and is rejected instead of being silently split.

use crate::assemble::resolve_columns;
use crate::io::ensure_parent;
use crate::schema::TableSchema;
use crate::value::{Row, Value};
use anyhow::{Context, Result, bail};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Layout of a character-mode data file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    /// Field terminator (`bcp -t`).
    pub separator: u8,
    /// Code page passed to `bcp -C`; the file itself is always UTF-8.
    pub code_page: String,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            separator: b';',
            code_page: "65001".to_string(),
        }
    }
}

/// Character-mode rendering; BIT-friendly `1`/`0` for booleans.
fn render(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::Bool(b)) => String::from(if *b { "1" } else { "0" }),
        Some(v) => v.to_string(),
    }
}

/// Write `rows` as a delimited file.
///
/// Nulls become empty fields.
///
/// # Returns
/// The number of rows written.
///
/// # Errors
/// Schema errors for unresolvable columns, a value that contains the
/// separator or a line break, or I/O failures.
pub fn write_delimited(
    path: impl AsRef<Path>,
    schema: &TableSchema,
    rows: &[Row],
    opts: &TextOptions,
) -> Result<usize> {
    let path = path.as_ref();
    schema.validate()?;
    let columns = resolve_columns(schema, rows)?;

    ensure_parent(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .delimiter(opts.separator)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(f);

    let sep = char::from(opts.separator);
    let mut record: Vec<String> = Vec::with_capacity(schema.len());
    for i in 0..rows.len() {
        record.clear();
        for (column, (name, _)) in columns.iter().zip(schema.columns()) {
            let field = render(column[i]);
            if field.contains(sep) || field.contains(['\n', '\r']) {
                bail!(
                    "row {} column '{}' contains the separator {:?} or a line break",
                    i,
                    name,
                    sep
                );
            }
            record.push(field);
        }
        wtr.write_record(&record)
            .with_context(|| format!("write delimited row #{}", i + 1))?;
    }
    wtr.flush()?;
    Ok(rows.len())
}
