//! Wire layout per SQL type: field kind, prefix width and target type.
//!
//! This table is the one place both sides of the format agree on. The encoders
//! frame every value with [`FieldLayout::prefix_len`] bytes, and the format file
//! declares the same width in `PREFIX_LENGTH`, so a field can never be written
//! one way and described another.

use crate::schema::SqlType;

/// How the loader reads a field, i.e. the FIELD element's `xsi:type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Fixed-width native value behind a 1-byte length prefix.
    Native,
    /// Single-byte character data behind a 2-byte length prefix.
    Char,
    /// UTF-16LE character data behind a 2-byte length prefix.
    NChar,
    /// Opaque binary (UDT) behind a 4-byte signed length prefix.
    Binary,
}

impl FieldKind {
    pub fn xsi_type(self) -> &'static str {
        match self {
            FieldKind::Native | FieldKind::Binary => "NativePrefix",
            FieldKind::Char => "CharPrefix",
            FieldKind::NChar => "NCharPrefix",
        }
    }

    pub fn is_character(self) -> bool {
        matches!(self, FieldKind::Char | FieldKind::NChar)
    }
}

/// Wire layout of one SQL type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    pub kind: FieldKind,
    /// Width of the length-or-null prefix in bytes (1, 2 or 4).
    pub prefix_len: usize,
    /// Payload width for fixed-width types.
    pub fixed_width: Option<usize>,
    /// COLUMN `xsi:type` in the format file.
    pub column_type: &'static str,
}

impl FieldLayout {
    const fn native(width: usize, column_type: &'static str) -> Self {
        Self {
            kind: FieldKind::Native,
            prefix_len: 1,
            fixed_width: Some(width),
            column_type,
        }
    }

    /// Prefix bytes that mark a null: all ones at the prefix width.
    pub fn null_sentinel(&self) -> &'static [u8] {
        const ONES: [u8; 4] = [0xFF; 4];
        &ONES[..self.prefix_len]
    }

    /// Largest payload the prefix can frame without colliding with the null sentinel.
    pub fn max_payload_len(&self) -> usize {
        match self.prefix_len {
            1 => 0xFE,
            2 => 0xFFFE,
            _ => i32::MAX as usize,
        }
    }

    /// Write the length prefix for a `len`-byte payload.
    pub(crate) fn write_prefix(&self, len: usize, out: &mut Vec<u8>) {
        let bytes = (len as u32).to_le_bytes();
        out.extend_from_slice(&bytes[..self.prefix_len]);
    }
}

impl SqlType {
    /// The wire layout for this type.
    pub const fn layout(self) -> FieldLayout {
        match self {
            SqlType::TinyInt => FieldLayout::native(1, "SQLTINYINT"),
            SqlType::SmallInt => FieldLayout::native(2, "SQLSMALLINT"),
            SqlType::Int => FieldLayout::native(4, "SQLINT"),
            SqlType::BigInt => FieldLayout::native(8, "SQLBIGINT"),
            SqlType::Bit => FieldLayout::native(1, "SQLBIT"),
            SqlType::Real => FieldLayout::native(4, "SQLFLT4"),
            SqlType::Float => FieldLayout::native(8, "SQLFLT8"),
            SqlType::Date => FieldLayout::native(3, "SQLDATE"),
            SqlType::DateTime2 => FieldLayout::native(8, "SQLDATETIME2"),
            SqlType::VarChar => FieldLayout {
                kind: FieldKind::Char,
                prefix_len: 2,
                fixed_width: None,
                column_type: "SQLVARYCHAR",
            },
            SqlType::NVarChar => FieldLayout {
                kind: FieldKind::NChar,
                prefix_len: 2,
                fixed_width: None,
                column_type: "SQLNVARCHAR",
            },
            SqlType::Geometry => FieldLayout {
                kind: FieldKind::Binary,
                prefix_len: 4,
                fixed_width: None,
                column_type: "SQLUDT",
            },
        }
    }
}
