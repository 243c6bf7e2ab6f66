//! Tests for delimited character-mode files.

use bcpnative::io::text::{TextOptions, write_delimited};
use bcpnative::schema::{ColumnSpec, SqlType, TableSchema};
use bcpnative::value::Row;
use chrono::NaiveDate;
use std::fs;
use tempfile::TempDir;

fn schema() -> TableSchema {
    TableSchema::builder()
        .column("id", SqlType::Int)
        .column("name", ColumnSpec::nvarchar(20))
        .column("flag", SqlType::Bit)
        .column("day", SqlType::Date)
        .build()
        .unwrap()
}

#[test]
fn writes_rows_in_schema_order_without_header() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("rows.csv");
    let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
    let rows = vec![
        Row::new().with("day", day).with("flag", true).with("name", "Ada").with("id", 1),
        Row::new().with("id", 2).with_null("name").with("flag", false).with_null("day"),
    ];

    let n = write_delimited(&path, &schema(), &rows, &TextOptions::default())?;
    assert_eq!(n, 2);
    assert_eq!(fs::read_to_string(&path)?, "1;Ada;1;2024-05-06\n2;;0;\n");
    Ok(())
}

#[test]
fn custom_separator_and_no_quoting() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("rows.tsv");
    let rows = vec![Row::new().with("id", 1).with("name", "say \"hi\", ok").with("flag", 1).with("day", "2020-01-01")];
    let opts = TextOptions {
        separator: b'\t',
        ..Default::default()
    };
    write_delimited(&path, &schema(), &rows, &opts)?;
    assert_eq!(fs::read_to_string(&path)?, "1\tsay \"hi\", ok\t1\t2020-01-01\n");
    Ok(())
}

#[test]
fn separator_inside_value_is_rejected() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("rows.csv");
    let rows = vec![Row::new().with("id", 1).with("name", "a;b").with("flag", 1).with("day", "2020-01-01")];
    let err = write_delimited(&path, &schema(), &rows, &TextOptions::default()).unwrap_err();
    assert!(err.to_string().contains("column 'name'"));
    Ok(())
}

#[test]
fn missing_column_fails() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let rows = vec![Row::new().with("id", 1)];
    assert!(write_delimited(tmp.path().join("x.csv"), &schema(), &rows, &TextOptions::default()).is_err());
    Ok(())
}
