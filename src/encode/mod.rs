//! Per-type native encoders.
//!
//! Each SQL type turns one optional value into one [`EncodedField`]: a
//! little-endian length prefix followed by the payload, or just the null
//! sentinel. Prefix widths come from [`SqlType::layout`], the same table the
//! format-file generator reads.
//!
//! | Type | Prefix | Null | Payload |
//! |------|--------|------|---------|
//! | TINYINT / SMALLINT / INT / BIGINT | 1 | `FF` | 1/2/4/8 bytes |
//! | BIT | 1 | `FF` | 1 byte, 0 or 1 |
//! | REAL / FLOAT | 1 | `FF` | IEEE-754 single/double |
//! | DATE | 1 | `FF` | 3-byte day count since 0001-01-01 |
//! | DATETIME2(7) | 1 | `FF` | 5-byte 100ns ticks + 3-byte date |
//! | VARCHAR | 2 | `FF FF` | code-page bytes |
//! | NVARCHAR | 2 | `FF FF` | UTF-16LE |
//! | GEOMETRY | 4 | `FF FF FF FF` | WKB |
//!
//! ```
//! use bcpnative::config::EncodeOptions;
//! use bcpnative::encode::encode_value;
//! use bcpnative::schema::{ColumnSpec, SqlType};
//! use bcpnative::value::Value;
//!
//! let spec = ColumnSpec::new(SqlType::Int);
//! let field = encode_value(&spec, Some(&Value::Int(5)), &EncodeOptions::default()).unwrap();
//! assert_eq!(field.as_bytes(), &[0x04, 0x05, 0x00, 0x00, 0x00]);
//! ```

mod geometry;
mod numeric;
mod temporal;
mod text;

use crate::config::EncodeOptions;
use crate::error::{BcpResult, ValueError};
use crate::layout::FieldLayout;
use crate::schema::{ColumnSpec, DATETIME2_SCALE, SqlType};
use crate::value::Value;

pub use geometry::parse_wkb_hex;
pub use temporal::{days_since_epoch, ticks_since_midnight};

/// One encoded (row, column) cell: prefix plus payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncodedField(Vec<u8>);

impl EncodedField {
    /// A null cell for the given layout.
    pub fn null(layout: &FieldLayout) -> Self {
        EncodedField(layout.null_sentinel().to_vec())
    }

    /// Frame `payload` with its length prefix.
    ///
    /// # Errors
    /// Fails when the payload is too long for the prefix width.
    pub fn framed(layout: &FieldLayout, payload: &[u8]) -> Result<Self, ValueError> {
        if payload.len() > layout.max_payload_len() {
            return Err(ValueError::coercion(format!(
                "value of {} bytes exceeds the {}-byte prefix limit of {} bytes",
                payload.len(),
                layout.prefix_len,
                layout.max_payload_len()
            )));
        }
        let mut out = Vec::with_capacity(layout.prefix_len + payload.len());
        layout.write_prefix(payload.len(), &mut out);
        out.extend_from_slice(payload);
        Ok(EncodedField(out))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for EncodedField {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A column's encoded cells, one per row, tagged with the column name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedColumn {
    pub name: String,
    pub fields: Vec<EncodedField>,
}

impl EncodedColumn {
    /// Total encoded size of the column.
    pub fn byte_len(&self) -> usize {
        self.fields.iter().map(EncodedField::len).sum()
    }
}

/// Encode one value for a column.
///
/// Null is checked before any coercion and always yields the sentinel.
///
/// # Errors
/// [`ValueError::Coercion`] when the value does not fit the type,
/// [`ValueError::Malformed`] for an unusable GEOMETRY representation and
/// [`ValueError::Unsupported`] for a DATETIME2 scale other than 7.
pub fn encode_value(
    spec: &ColumnSpec,
    value: Option<&Value>,
    opts: &EncodeOptions,
) -> Result<EncodedField, ValueError> {
    let layout = spec.sql_type.layout();
    if spec.sql_type == SqlType::DateTime2
        && let Some(scale) = spec.scale
        && scale != DATETIME2_SCALE
    {
        return Err(ValueError::Unsupported(format!(
            "DATETIME2({}) is not supported, only scale {}",
            scale, DATETIME2_SCALE
        )));
    }
    let Some(value) = value else {
        return Ok(EncodedField::null(&layout));
    };
    match spec.sql_type {
        SqlType::TinyInt => {
            EncodedField::framed(&layout, &numeric::tinyint(value)?.to_le_bytes())
        }
        SqlType::SmallInt => {
            EncodedField::framed(&layout, &numeric::smallint(value)?.to_le_bytes())
        }
        SqlType::Int => EncodedField::framed(&layout, &numeric::int(value)?.to_le_bytes()),
        SqlType::BigInt => EncodedField::framed(&layout, &numeric::bigint(value)?.to_le_bytes()),
        SqlType::Bit => EncodedField::framed(&layout, &[numeric::bit(value)?]),
        SqlType::Real => EncodedField::framed(&layout, &numeric::real(value)?.to_le_bytes()),
        SqlType::Float => EncodedField::framed(&layout, &numeric::float(value)?.to_le_bytes()),
        SqlType::Date => EncodedField::framed(&layout, &temporal::date(value)?),
        SqlType::DateTime2 => EncodedField::framed(&layout, &temporal::datetime2(value)?),
        SqlType::VarChar => EncodedField::framed(&layout, &text::varchar(value, opts.code_page)?),
        SqlType::NVarChar => EncodedField::framed(&layout, &text::nvarchar(value)),
        SqlType::Geometry => EncodedField::framed(&layout, &geometry::wkb(value)?),
    }
}

/// Encode a whole column, one field per value, in input order.
///
/// Stops at the first failing value.
///
/// # Errors
/// The failing value's [`ValueError`] tied to `name` and its row index.
pub fn encode_column<'a, I>(
    name: &str,
    spec: &ColumnSpec,
    values: I,
    opts: &EncodeOptions,
) -> BcpResult<EncodedColumn>
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    let fields = values
        .into_iter()
        .enumerate()
        .map(|(row, v)| encode_value(spec, v, opts).map_err(|e| e.at(name, row)))
        .collect::<BcpResult<Vec<_>>>()?;
    Ok(EncodedColumn {
        name: name.to_string(),
        fields,
    })
}
