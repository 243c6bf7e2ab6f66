//! Tests for format-file generation and its agreement with the encoders.

mod common;

use bcpnative::config::{DEFAULT_COLLATION, EncodeOptions};
use bcpnative::descriptor::{FormatDescriptor, generate_format_xml};
use bcpnative::encode::encode_value;
use bcpnative::error::BcpError;
use bcpnative::layout::FieldKind;
use bcpnative::schema::{ColumnSpec, SqlType, TableSchema};
use bcpnative::value::Value;
use chrono::NaiveDate;

#[test]
fn exact_document_shape() -> anyhow::Result<()> {
    let schema = TableSchema::builder()
        .column("id", SqlType::Int)
        .column("name", ColumnSpec::varchar(100))
        .build()?;
    let xml = generate_format_xml(&schema, DEFAULT_COLLATION)?;
    let expected = concat!(
        "<?xml version=\"1.0\"?>\n",
        "<BCPFORMAT xmlns=\"http://schemas.microsoft.com/sqlserver/2004/bulkload/format\" ",
        "xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\n",
        "  <RECORD>\n",
        "    <FIELD ID=\"1\" xsi:type=\"NativePrefix\" PREFIX_LENGTH=\"1\" />\n",
        "    <FIELD ID=\"2\" xsi:type=\"CharPrefix\" PREFIX_LENGTH=\"2\" MAX_LENGTH=\"100\" ",
        "COLLATION=\"SQL_Latin1_General_CP1_CI_AS\" />\n",
        "  </RECORD>\n",
        "  <ROW>\n",
        "    <COLUMN SOURCE=\"1\" NAME=\"id\" xsi:type=\"SQLINT\" />\n",
        "    <COLUMN SOURCE=\"2\" NAME=\"name\" xsi:type=\"SQLVARYCHAR\" />\n",
        "  </ROW>\n",
        "</BCPFORMAT>"
    );
    assert_eq!(xml, expected);
    Ok(())
}

#[test]
fn ids_follow_schema_order() -> anyhow::Result<()> {
    let schema = common::all_types_schema();
    let d = FormatDescriptor::from_schema(&schema, DEFAULT_COLLATION)?;
    assert_eq!(d.fields.len(), schema.len());
    assert_eq!(d.columns.len(), schema.len());
    for (i, ((field, column), name)) in d.fields.iter().zip(&d.columns).zip(schema.names()).enumerate() {
        assert_eq!(field.id, i + 1);
        assert_eq!(column.source, i + 1);
        assert_eq!(column.name, name);
    }

    let xml = d.to_xml()?;
    assert_eq!(xml.matches("<FIELD ").count(), schema.len());
    assert_eq!(xml.matches("<COLUMN ").count(), schema.len());
    Ok(())
}

#[test]
fn column_types_and_kinds() -> anyhow::Result<()> {
    let d = FormatDescriptor::from_schema(&common::all_types_schema(), DEFAULT_COLLATION)?;
    let types: Vec<&str> = d.columns.iter().map(|c| c.column_type()).collect();
    assert_eq!(
        types,
        vec![
            "SQLTINYINT",
            "SQLSMALLINT",
            "SQLINT",
            "SQLBIGINT",
            "SQLBIT",
            "SQLFLT4",
            "SQLFLT8",
            "SQLDATE",
            "SQLDATETIME2",
            "SQLVARYCHAR",
            "SQLNVARCHAR",
            "SQLUDT",
        ]
    );
    let shape = d.fields.last().unwrap();
    assert_eq!(shape.kind, FieldKind::Binary);
    assert_eq!(shape.kind.xsi_type(), "NativePrefix");
    assert_eq!(shape.prefix_len, 4);
    assert!(shape.char_spec.is_none());

    let label = &d.fields[10];
    assert_eq!(label.kind.xsi_type(), "NCharPrefix");
    assert_eq!(label.char_spec.as_ref().unwrap().max_length, 20);
    Ok(())
}

#[test]
fn regeneration_is_byte_identical() -> anyhow::Result<()> {
    let schema = common::all_types_schema();
    let a = generate_format_xml(&schema, DEFAULT_COLLATION)?;
    let b = generate_format_xml(&schema, DEFAULT_COLLATION)?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn custom_collation_and_escaping() -> anyhow::Result<()> {
    let schema = TableSchema::builder()
        .column("a<b&\"c\"", ColumnSpec::nvarchar(8))
        .build()?;
    let xml = generate_format_xml(&schema, "Latin1_General_100_CI_AS_SC_UTF8")?;
    assert!(xml.contains(r#"COLLATION="Latin1_General_100_CI_AS_SC_UTF8""#));
    assert!(xml.contains(r#"NAME="a&lt;b&amp;&quot;c&quot;""#));
    Ok(())
}

#[test]
fn missing_max_length_fails_before_output() {
    let schema: TableSchema = serde_json::from_str(
        r#"{"id": {"type": "INT"}, "name": {"type": "VARCHAR"}}"#,
    )
    .unwrap();
    let err = FormatDescriptor::from_schema(&schema, DEFAULT_COLLATION).unwrap_err();
    assert!(matches!(err, BcpError::Schema(ref m) if m.contains("'name'")));
    assert!(generate_format_xml(&schema, DEFAULT_COLLATION).is_err());
}

/// Field kind and prefix width declared for every type match what its encoder writes.
#[test]
fn descriptor_agrees_with_encoders_for_every_type() -> anyhow::Result<()> {
    let opts = EncodeOptions::default();
    let day = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
    for t in SqlType::ALL {
        let spec = if t.is_character() {
            ColumnSpec::new(t).with_max_length(30)
        } else {
            ColumnSpec::new(t)
        };
        let schema = TableSchema::builder().column("c", spec.clone()).build()?;
        let field = &FormatDescriptor::from_schema(&schema, DEFAULT_COLLATION)?.fields[0];

        let sample: Value = match t {
            SqlType::Date => day.into(),
            SqlType::DateTime2 => day.and_hms_opt(12, 0, 0).unwrap().into(),
            SqlType::VarChar | SqlType::NVarChar => "sample".into(),
            SqlType::Geometry => vec![1u8, 2, 3].into(),
            SqlType::Real | SqlType::Float => 0.5.into(),
            _ => 1.into(),
        };
        let encoded = encode_value(&spec, Some(&sample), &opts)?;
        let bytes = encoded.as_bytes();
        let mut prefix = [0u8; 4];
        prefix[..field.prefix_len].copy_from_slice(&bytes[..field.prefix_len]);
        assert_eq!(
            u32::from_le_bytes(prefix) as usize,
            bytes.len() - field.prefix_len,
            "prefix of {} must carry the payload length",
            t
        );
        if let Some(width) = t.layout().fixed_width {
            assert_eq!(bytes.len(), 1 + width, "{} payload width", t);
        }

        let null = encode_value(&spec, None, &opts)?;
        assert_eq!(null.len(), field.prefix_len, "{} null is prefix-only", t);
        assert!(null.as_bytes().iter().all(|b| *b == 0xFF));

        let expected_kind = match t {
            SqlType::VarChar => "CharPrefix",
            SqlType::NVarChar => "NCharPrefix",
            _ => "NativePrefix",
        };
        assert_eq!(field.kind.xsi_type(), expected_kind, "{} field kind", t);
    }
    Ok(())
}
