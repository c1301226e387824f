//! Codec tests
//! Round trips between csv, json and xlsx files, and the places where a
//! format cannot carry a value's type

use cellforge::codec::{read_table, write_table, CsvOptions, Format, ReadOptions, WriteOptions};
use cellforge::error::CellforgeError;
use cellforge::types::{Column, ColumnType, Table};
use cellforge::value::{ErrorKind, Value};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn sample() -> Table {
    Table::new(vec![
        Column::new("name", vec![Value::from("tea"), Value::from("a,b"), Value::from("z")]),
        Column::new(
            "price",
            vec![Value::Number(2.5), Value::Number(10.0), Value::Missing],
        ),
        Column::new(
            "ok",
            vec![Value::Boolean(true), Value::Boolean(false), Value::Boolean(true)],
        ),
    ])
    .unwrap()
}

fn round_trip(table: &Table, file: &str) -> Table {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(file);
    write_table(table, &path, None, &WriteOptions::default()).unwrap();
    read_table(&path, None, &ReadOptions::default()).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// ROUND TRIPS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_csv_round_trip() {
    assert_eq!(round_trip(&sample(), "t.csv"), sample());
}

#[test]
fn test_json_round_trip() {
    assert_eq!(round_trip(&sample(), "t.json"), sample());
}

#[test]
fn test_xlsx_round_trip() {
    assert_eq!(round_trip(&sample(), "t.xlsx"), sample());
}

#[test]
fn test_fixture_through_every_format() {
    let original = read_table(Path::new("test-data/sales.csv"), None, &ReadOptions::default())
        .unwrap();
    let via_json = round_trip(&original, "s.json");
    let via_xlsx = round_trip(&via_json, "s.xlsx");
    let back = round_trip(&via_xlsx, "s.csv");
    assert_eq!(back, original);
}

#[test]
fn test_products_json_types() {
    let table = read_table(Path::new("test-data/products.json"), None, &ReadOptions::default())
        .unwrap();
    assert_eq!(
        table.column_names(),
        vec!["sku", "name", "price", "in_stock", "note"]
    );
    assert_eq!(table.column("price").unwrap().column_type(), ColumnType::Number);
    assert_eq!(table.column("in_stock").unwrap().column_type(), ColumnType::Boolean);
    assert_eq!(table.cell(3, 3), Some(&Value::Missing));
    assert_eq!(table.cell(0, 4), Some(&Value::Missing));
    assert_eq!(table.cell(2, 4), Some(&Value::from("annual")));
}

// ═══════════════════════════════════════════════════════════════════════════
// TYPE LOSS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_csv_reinfers_numeric_text() {
    let table = Table::new(vec![Column::new("code", vec![Value::from("007")])]).unwrap();
    let back = round_trip(&table, "codes.csv");
    assert_eq!(back.cell(0, 0), Some(&Value::Number(7.0)));
}

#[test]
fn test_error_values_survive_csv_but_not_json() {
    let table = Table::new(vec![Column::new(
        "v",
        vec![Value::Error(ErrorKind::DivByZero)],
    )])
    .unwrap();

    assert_eq!(
        round_trip(&table, "e.csv").cell(0, 0),
        Some(&Value::Error(ErrorKind::DivByZero))
    );
    assert_eq!(
        round_trip(&table, "e.json").cell(0, 0),
        Some(&Value::from("#DIV/0!"))
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// DIALECTS AND FAILURES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_tsv_with_options() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.tsv");
    fs::write(&path, "x\t1\ny\t2\n").unwrap();

    let options = ReadOptions {
        csv: CsvOptions {
            delimiter: b'\t',
            has_header: false,
        },
        ..ReadOptions::default()
    };
    let table = read_table(&path, None, &options).unwrap();
    assert_eq!(table.column_names(), vec!["col_1", "col_2"]);
    assert_eq!(table.row_count(), 2);
}

#[test]
fn test_tsv_extension_reads_tabs_by_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prices.tsv");
    fs::write(&path, "name\tprice\ntea, green\t2.5\n").unwrap();

    let table = read_table(&path, None, &ReadOptions::default()).unwrap();
    assert_eq!(table.column_names(), vec!["name", "price"]);
    assert_eq!(table.cell(0, 0), Some(&Value::from("tea, green")));
    assert_eq!(table.cell(0, 1), Some(&Value::Number(2.5)));
}

#[test]
fn test_tsv_extension_writes_tabs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.tsv");
    write_table(&sample(), &path, None, &WriteOptions::default()).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("name\tprice\tok\n"));
    assert_eq!(read_table(&path, None, &ReadOptions::default()).unwrap(), sample());
}

#[test]
fn test_explicit_format_overrides_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.dat");
    write_table(&sample(), &path, Some(Format::Json), &WriteOptions::default()).unwrap();
    let back = read_table(&path, Some(Format::Json), &ReadOptions::default()).unwrap();
    assert_eq!(back, sample());
}

#[test]
fn test_ragged_csv_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ragged.csv");
    fs::write(&path, "a,b\n1,2,3\n").unwrap();
    assert!(matches!(
        read_table(&path, None, &ReadOptions::default()),
        Err(CellforgeError::Codec(_))
    ));
}

#[test]
fn test_nested_json_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested.json");
    fs::write(&path, r#"[{"a": {"b": 1}}]"#).unwrap();
    assert!(matches!(
        read_table(&path, None, &ReadOptions::default()),
        Err(CellforgeError::Codec(_))
    ));
}

#[test]
fn test_markdown_is_output_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("table.md");
    write_table(&sample(), &path, None, &WriteOptions::default()).unwrap();
    assert!(matches!(
        read_table(&path, None, &ReadOptions::default()),
        Err(CellforgeError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_sheet_lists_available() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.xlsx");
    write_table(&sample(), &path, None, &WriteOptions::default()).unwrap();

    let options = ReadOptions {
        sheet: Some("Nope".to_string()),
        ..ReadOptions::default()
    };
    match read_table(&path, None, &options) {
        Err(CellforgeError::Excel(message)) => assert!(message.contains("Sheet1")),
        other => panic!("expected an Excel error, got {:?}", other),
    }
}
