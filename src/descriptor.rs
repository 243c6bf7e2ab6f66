//! XML format-file generation for native-mode `bcp`.
//!
//! The descriptor is derived from the schema alone. Field `i` describes column
//! `i`, and its `xsi:type` and `PREFIX_LENGTH` come from
//! [`SqlType::layout`](crate::schema::SqlType::layout), the same table the
//! encoders frame values with.
//!
//! ```
//! use bcpnative::descriptor::FormatDescriptor;
//! use bcpnative::schema::{ColumnSpec, SqlType, TableSchema};
//!
//! let schema = TableSchema::builder()
//!     .column("id", SqlType::Int)
//!     .column("name", ColumnSpec::varchar(50))
//!     .build()
//!     .unwrap();
//! let xml = FormatDescriptor::from_schema(&schema, "SQL_Latin1_General_CP1_CI_AS")
//!     .unwrap()
//!     .to_xml()
//!     .unwrap();
//! assert!(xml.starts_with("<?xml version=\"1.0\"?>\n<BCPFORMAT "));
//! assert!(xml.contains(r#"<COLUMN SOURCE="2" NAME="name" xsi:type="SQLVARYCHAR" />"#));
//! ```

use crate::error::{BcpError, BcpResult};
use crate::layout::FieldKind;
use crate::schema::{SqlType, TableSchema};
use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

pub const FORMAT_NAMESPACE: &str = "http://schemas.microsoft.com/sqlserver/2004/bulkload/format";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Empty-element close as bcp's own format files write it, `<FIELD ... />`.
const EMPTY_ELEMENT_END: &str = "\" />";

/// Character-field sizing carried by CharPrefix/NCharPrefix fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharSpec {
    pub max_length: u32,
    pub collation: String,
}

/// One `FIELD` element of the `RECORD` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    /// 1-based position.
    pub id: usize,
    pub kind: FieldKind,
    pub prefix_len: usize,
    /// Present exactly for character fields.
    pub char_spec: Option<CharSpec>,
}

/// One `COLUMN` element of the `ROW` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    /// ID of the field this column reads from.
    pub source: usize,
    pub name: String,
    pub sql_type: SqlType,
}

impl ColumnDef {
    /// The COLUMN `xsi:type`, e.g. `SQLINT`.
    pub fn column_type(&self) -> &'static str {
        self.sql_type.layout().column_type
    }
}

/// Field and column lists of a format file, parallel and in schema order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub fields: Vec<FieldDef>,
    pub columns: Vec<ColumnDef>,
}

impl FormatDescriptor {
    /// Derive the descriptor for `schema`.
    ///
    /// Nothing is produced unless every column is describable.
    ///
    /// # Errors
    /// [`BcpError::Schema`] when a character column lacks `max_length` (or the
    /// schema is otherwise invalid), [`BcpError::UnsupportedFeature`] for a
    /// DATETIME2 scale other than 7.
    pub fn from_schema(schema: &TableSchema, collation: &str) -> BcpResult<Self> {
        schema.validate()?;
        let mut fields = Vec::with_capacity(schema.len());
        let mut columns = Vec::with_capacity(schema.len());

        for (idx, (name, spec)) in schema.iter().enumerate() {
            let id = idx + 1;
            let layout = spec.sql_type.layout();
            let char_spec = if layout.kind.is_character() {
                let max_length = spec.max_length.ok_or_else(|| {
                    BcpError::schema(format!(
                        "max_length is required for {} column '{}'",
                        spec.sql_type, name
                    ))
                })?;
                Some(CharSpec {
                    max_length,
                    collation: collation.to_string(),
                })
            } else {
                None
            };
            fields.push(FieldDef {
                id,
                kind: layout.kind,
                prefix_len: layout.prefix_len,
                char_spec,
            });
            columns.push(ColumnDef {
                source: id,
                name: name.to_string(),
                sql_type: spec.sql_type,
            });
        }
        Ok(Self { fields, columns })
    }

    /// Render the `BCPFORMAT` document with two-space indentation.
    ///
    /// # Errors
    /// Only if the XML writer fails, which an in-memory buffer does not.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

        let root = BytesStart::new("BCPFORMAT")
            .with_attributes([("xmlns", FORMAT_NAMESPACE), ("xmlns:xsi", XSI_NAMESPACE)]);
        writer.write_event(Event::Start(root))?;

        writer.write_event(Event::Start(BytesStart::new("RECORD")))?;
        for field in &self.fields {
            let id = field.id.to_string();
            let prefix_len = field.prefix_len.to_string();
            let mut el = BytesStart::new("FIELD").with_attributes([
                ("ID", id.as_str()),
                ("xsi:type", field.kind.xsi_type()),
                ("PREFIX_LENGTH", prefix_len.as_str()),
            ]);
            if let Some(cs) = &field.char_spec {
                let max_length = cs.max_length.to_string();
                el.push_attribute(("MAX_LENGTH", max_length.as_str()));
                el.push_attribute(("COLLATION", cs.collation.as_str()));
            }
            writer.write_event(Event::Empty(el))?;
        }
        writer.write_event(Event::End(BytesEnd::new("RECORD")))?;

        writer.write_event(Event::Start(BytesStart::new("ROW")))?;
        for column in &self.columns {
            let source = column.source.to_string();
            let el = BytesStart::new("COLUMN").with_attributes([
                ("SOURCE", source.as_str()),
                ("NAME", column.name.as_str()),
                ("xsi:type", column.column_type()),
            ]);
            writer.write_event(Event::Empty(el))?;
        }
        writer.write_event(Event::End(BytesEnd::new("ROW")))?;

        writer.write_event(Event::End(BytesEnd::new("BCPFORMAT")))?;
        let xml = String::from_utf8(writer.into_inner()).context("format file is not valid UTF-8")?;
        // Empty elements always end on a quoted attribute, and quotes inside
        // values are escaped, so this only touches element ends.
        Ok(xml.replace("\"/>", EMPTY_ELEMENT_END))
    }
}

/// Build and render the format file for `schema` in one step.
///
/// # Errors
/// See [`FormatDescriptor::from_schema`].
pub fn generate_format_xml(schema: &TableSchema, collation: &str) -> Result<String> {
    FormatDescriptor::from_schema(schema, collation)?.to_xml()
}
