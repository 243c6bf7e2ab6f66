//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use bcpnative::descriptor::FormatDescriptor;
use bcpnative::schema::{ColumnSpec, SqlType, TableSchema};
use bcpnative::value::Row;
use chrono::NaiveDate;

/// One column of every supported type.
pub fn all_types_schema() -> TableSchema {
    TableSchema::builder()
        .column("tiny", SqlType::TinyInt)
        .column("small", SqlType::SmallInt)
        .column("int", SqlType::Int)
        .column("big", SqlType::BigInt)
        .column("flag", SqlType::Bit)
        .column("real", SqlType::Real)
        .column("float", SqlType::Float)
        .column("day", SqlType::Date)
        .column("stamp", SqlType::DateTime2)
        .column("code", ColumnSpec::varchar(10))
        .column("label", ColumnSpec::nvarchar(20))
        .column("shape", SqlType::Geometry)
        .build()
        .expect("valid schema")
}

/// A fully populated row and a fully null row for [`all_types_schema`].
pub fn all_types_rows() -> Vec<Row> {
    let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let full = Row::new()
        .with("tiny", 255u8)
        .with("small", -2i16)
        .with("int", 5)
        .with("big", i64::MAX)
        .with("flag", true)
        .with("real", 1.5f32)
        .with("float", -2.25)
        .with("day", day)
        .with("stamp", day.and_hms_opt(3, 4, 5).unwrap())
        .with("code", "hi")
        .with("label", "hé")
        .with("shape", "0x01 02 03");
    let empty = all_types_schema()
        .names()
        .fold(Row::new(), |row, name| row.with_null(name));
    vec![full, empty]
}

/// Split a payload into rows of fields using only the descriptor's prefix widths.
pub fn split_fields<'a>(descriptor: &FormatDescriptor, mut bytes: &'a [u8]) -> Vec<Vec<&'a [u8]>> {
    let mut rows = Vec::new();
    while !bytes.is_empty() {
        let mut row = Vec::with_capacity(descriptor.fields.len());
        for field in &descriptor.fields {
            let (prefix, rest) = bytes.split_at(field.prefix_len);
            let payload_len = if prefix.iter().all(|b| *b == 0xFF) {
                0
            } else {
                let mut buf = [0u8; 4];
                buf[..prefix.len()].copy_from_slice(prefix);
                u32::from_le_bytes(buf) as usize
            };
            let total = field.prefix_len + payload_len;
            row.push(&bytes[..total]);
            bytes = &rest[payload_len..];
        }
        rows.push(row);
    }
    rows
}
