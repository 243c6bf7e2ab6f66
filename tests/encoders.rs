//! Byte-level tests for the per-type encoders.

use bcpnative::config::{CodePage, EncodeOptions};
use bcpnative::encode::{encode_column, encode_value};
use bcpnative::error::{BcpError, ValueError};
use bcpnative::schema::{ColumnSpec, SqlType};
use bcpnative::value::Value;
use chrono::{NaiveDate, NaiveDateTime};

fn enc(spec: &ColumnSpec, value: impl Into<Value>) -> Vec<u8> {
    encode_value(spec, Some(&value.into()), &EncodeOptions::default())
        .unwrap()
        .into_bytes()
}

fn spec_for(t: SqlType) -> ColumnSpec {
    if t.is_character() {
        ColumnSpec::new(t).with_max_length(10)
    } else {
        ColumnSpec::new(t)
    }
}

#[test]
fn null_yields_sentinel_for_every_type() {
    for t in SqlType::ALL {
        let field = encode_value(&spec_for(t), None, &EncodeOptions::default()).unwrap();
        let expected: &[u8] = match t {
            SqlType::VarChar | SqlType::NVarChar => &[0xFF, 0xFF],
            SqlType::Geometry => &[0xFF, 0xFF, 0xFF, 0xFF],
            _ => &[0xFF],
        };
        assert_eq!(field.as_bytes(), expected, "null sentinel for {}", t);
    }
}

#[test]
fn integers() {
    assert_eq!(enc(&ColumnSpec::new(SqlType::Int), 5), vec![0x04, 0x05, 0x00, 0x00, 0x00]);
    assert_eq!(enc(&ColumnSpec::new(SqlType::Int), -1), vec![0x04, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(enc(&ColumnSpec::new(SqlType::TinyInt), 200u8), vec![0x01, 0xC8]);
    assert_eq!(enc(&ColumnSpec::new(SqlType::SmallInt), -2i16), vec![0x02, 0xFE, 0xFF]);
    assert_eq!(
        enc(&ColumnSpec::new(SqlType::BigInt), 1i64 << 40),
        vec![0x08, 0, 0, 0, 0, 0, 0x01, 0, 0]
    );
}

#[test]
fn bit_and_floats() {
    assert_eq!(enc(&ColumnSpec::new(SqlType::Bit), true), vec![0x01, 0x01]);
    assert_eq!(enc(&ColumnSpec::new(SqlType::Bit), 0), vec![0x01, 0x00]);
    assert_eq!(enc(&ColumnSpec::new(SqlType::Real), 1.5), vec![0x04, 0x00, 0x00, 0xC0, 0x3F]);
    assert_eq!(
        enc(&ColumnSpec::new(SqlType::Float), -2.25),
        vec![0x08, 0, 0, 0, 0, 0, 0, 0x02, 0xC0]
    );
}

#[test]
fn date_epoch_and_recent() {
    let spec = ColumnSpec::new(SqlType::Date);
    assert_eq!(enc(&spec, NaiveDate::from_ymd_opt(1, 1, 1).unwrap()), vec![0x03, 0, 0, 0]);
    assert_eq!(
        enc(&spec, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
        vec![0x03, 0x46, 0x46, 0x0B]
    );
    // The time part of a date-time is dropped.
    let dt: NaiveDateTime = "2024-01-02T23:59:59".parse().unwrap();
    assert_eq!(enc(&spec, dt), vec![0x03, 0x46, 0x46, 0x0B]);
    assert_eq!(enc(&spec, "2024-01-02"), vec![0x03, 0x46, 0x46, 0x0B]);
}

#[test]
fn datetime2_time_then_date() {
    let dt: NaiveDateTime = "2024-01-02T03:04:05.1234567".parse().unwrap();
    assert_eq!(
        enc(&ColumnSpec::new(SqlType::DateTime2), dt),
        vec![0x08, 0x07, 0x17, 0x68, 0xB7, 0x19, 0x46, 0x46, 0x0B]
    );
    let midnight = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
    assert_eq!(enc(&ColumnSpec::new(SqlType::DateTime2), midnight), vec![0x08, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn datetime2_rejects_leap_seconds() {
    let leap = NaiveDate::from_ymd_opt(2016, 12, 31)
        .unwrap()
        .and_hms_nano_opt(23, 59, 59, 1_500_000_000)
        .unwrap();
    let err = encode_value(&ColumnSpec::new(SqlType::DateTime2), Some(&leap.into()), &EncodeOptions::default())
        .unwrap_err();
    assert!(matches!(err, ValueError::Coercion(ref m) if m.contains("leap second")));
}

#[test]
fn datetime2_other_scales_are_unsupported() {
    let spec = ColumnSpec::new(SqlType::DateTime2).with_scale(3);
    let err = encode_value(&spec, None, &EncodeOptions::default()).unwrap_err();
    assert!(matches!(err, ValueError::Unsupported(_)));
    let ok = ColumnSpec::new(SqlType::DateTime2).with_scale(7);
    assert!(encode_value(&ok, None, &EncodeOptions::default()).is_ok());
}

#[test]
fn varchar_lengths() {
    let spec = ColumnSpec::varchar(10);
    assert_eq!(enc(&spec, ""), vec![0x00, 0x00]);
    assert_eq!(enc(&spec, "hi"), vec![0x02, 0x00, b'h', b'i']);
    assert_eq!(enc(&spec, "é"), vec![0x01, 0x00, 0xE9]);

    let utf8 = EncodeOptions {
        code_page: CodePage::Utf8,
        ..Default::default()
    };
    let field = encode_value(&spec, Some(&Value::from("é")), &utf8).unwrap();
    assert_eq!(field.as_bytes(), &[0x02, 0x00, 0xC3, 0xA9]);
}

#[test]
fn character_columns_render_non_text_values() {
    let spec = ColumnSpec::varchar(30);
    assert_eq!(enc(&spec, true), vec![0x04, 0x00, b't', b'r', b'u', b'e']);
    assert_eq!(enc(&spec, 5.0), vec![0x01, 0x00, b'5']);
    assert_eq!(enc(&spec, 2.5), vec![0x03, 0x00, b'2', b'.', b'5']);
    assert_eq!(enc(&spec, vec![0xABu8]), vec![0x02, 0x00, b'A', b'B']);
    let mut expected = vec![0x0A, 0x00];
    expected.extend_from_slice(b"2024-01-02");
    assert_eq!(enc(&spec, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()), expected);
}

#[test]
fn nvarchar_is_utf16le() {
    let spec = ColumnSpec::nvarchar(10);
    assert_eq!(enc(&spec, "hi"), vec![0x04, 0x00, b'h', 0x00, b'i', 0x00]);
    assert_eq!(enc(&spec, ""), vec![0x00, 0x00]);
    assert_eq!(enc(&spec, "hé"), vec![0x04, 0x00, 0x68, 0x00, 0xE9, 0x00]);
}

#[test]
fn character_payload_limit() {
    let spec = ColumnSpec::varchar(8000);
    let long = "x".repeat(0xFFFF);
    let err = encode_value(&spec, Some(&Value::from(long)), &EncodeOptions::default()).unwrap_err();
    assert!(matches!(err, ValueError::Coercion(_)));

    let max = "x".repeat(0xFFFE);
    let field = encode_value(&spec, Some(&Value::from(max)), &EncodeOptions::default()).unwrap();
    assert_eq!(&field.as_bytes()[..2], &[0xFE, 0xFF]);
}

#[test]
fn geometry_from_bytes_and_hex() {
    let spec = ColumnSpec::new(SqlType::Geometry);
    assert_eq!(enc(&spec, vec![0xAAu8, 0xBB]), vec![0x02, 0, 0, 0, 0xAA, 0xBB]);
    assert_eq!(enc(&spec, "0XaA bB"), vec![0x02, 0, 0, 0, 0xAA, 0xBB]);
    assert_eq!(enc(&spec, ""), vec![0, 0, 0, 0]);
}

#[test]
fn geometry_rejects_text_formats() {
    let spec = ColumnSpec::new(SqlType::Geometry);
    let values = [Some(Value::from("POINT (1 2)"))];
    let err = encode_column("shape", &spec, values.iter().map(Option::as_ref), &EncodeOptions::default())
        .unwrap_err();
    match err {
        BcpError::MalformedInput { column, row, reason } => {
            assert_eq!(column, "shape");
            assert_eq!(row, 0);
            assert!(reason.contains("POINT (1 2)"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    let geojson = Value::from(r#"{"type":"Point","coordinates":[1,2]}"#);
    assert!(matches!(
        encode_value(&spec, Some(&geojson), &EncodeOptions::default()),
        Err(ValueError::Malformed(_))
    ));
    assert!(matches!(
        encode_value(&spec, Some(&Value::Float(1.0)), &EncodeOptions::default()),
        Err(ValueError::Malformed(_))
    ));
}

#[test]
fn coercion_failures_name_row_and_column() {
    let spec = ColumnSpec::new(SqlType::Int);
    let values = [Some(Value::Int(1)), None, Some(Value::Float(2.5))];
    let err = encode_column("qty", &spec, values.iter().map(Option::as_ref), &EncodeOptions::default())
        .unwrap_err();
    assert_eq!(err.row(), Some(2));
    assert_eq!(err.column(), Some("qty"));
    assert!(matches!(err, BcpError::Encoding { .. }));
}

#[test]
fn out_of_range_values_fail() {
    let opts = EncodeOptions::default();
    for (t, v) in [
        (SqlType::TinyInt, Value::Int(-1)),
        (SqlType::SmallInt, Value::Int(32_768)),
        (SqlType::Int, Value::Int(i64::from(i32::MAX) + 1)),
        (SqlType::BigInt, Value::Text("twelve".into())),
        (SqlType::Date, Value::Int(3)),
        (SqlType::Bit, Value::Bytes(vec![1])),
        (SqlType::Date, Value::Date(NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap())),
        (SqlType::Date, Value::Date(NaiveDate::from_ymd_opt(0, 12, 31).unwrap())),
        (
            SqlType::DateTime2,
            Value::DateTime(NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()),
        ),
    ] {
        assert!(
            matches!(encode_value(&ColumnSpec::new(t), Some(&v), &opts), Err(ValueError::Coercion(_))),
            "{} should reject {:?}",
            t,
            v
        );
    }
}

#[test]
fn encoding_is_deterministic() {
    let spec = ColumnSpec::nvarchar(50);
    let values: Vec<Option<Value>> = vec![Some("a".into()), None, Some("bcd".into())];
    let a = encode_column("c", &spec, values.iter().map(Option::as_ref), &EncodeOptions::default()).unwrap();
    let b = encode_column("c", &spec, values.iter().map(Option::as_ref), &EncodeOptions::default()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.fields.len(), 3);
    assert_eq!(a.byte_len(), 4 + 2 + 8);
}
