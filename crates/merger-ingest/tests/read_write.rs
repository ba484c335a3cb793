//! Reading and writing table files on disk.

use std::fs;

use chrono::NaiveDate;
use merger_ingest::{IngestError, OutputFormat, read_file, write_table};
use merger_model::{CellValue, Table};
use tempfile::TempDir;

#[test]
fn reads_semicolon_csv_with_bom() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("orders.csv");
    fs::write(&path, "\u{feff}条码;数量;单价\n0690;2;1.5\n0691;;2\n").unwrap();

    let sheets = read_file(&path).unwrap();
    assert_eq!(sheets.len(), 1);
    let sheet = &sheets[0];
    assert_eq!(sheet.name, "orders.csv");
    assert_eq!(sheet.table.column_names(), vec!["条码", "数量", "单价"]);
    assert_eq!(sheet.table.value(0, 0), Some(&CellValue::text("0690")));
    assert_eq!(sheet.table.value(1, 0), Some(&CellValue::Integer(2)));
    assert_eq!(sheet.table.value(1, 1), Some(&CellValue::Missing));
    assert_eq!(sheet.table.value(2, 1), Some(&CellValue::Float(2.0)));
}

#[test]
fn reads_gbk_text_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.txt");
    let (bytes, _, _) = encoding_rs::GBK.encode("品名\t数量\n茶叶\t3\n");
    fs::write(&path, &bytes).unwrap();

    let sheets = read_file(&path).unwrap();
    let table = &sheets[0].table;
    assert_eq!(table.column_names(), vec!["品名", "数量"]);
    assert_eq!(table.value(0, 0), Some(&CellValue::text("茶叶")));
}

#[test]
fn rejects_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.pdf");
    fs::write(&path, "%PDF").unwrap();

    let err = read_file(&path).unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
}

#[test]
fn header_only_csv_is_empty_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "a,b\n").unwrap();

    let sheets = read_file(&path).unwrap();
    assert!(sheets[0].table.is_empty());
    assert_eq!(sheets[0].table.width(), 2);
}

#[test]
fn xlsx_output_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("merged.xlsx");
    let day = NaiveDate::from_ymd_opt(2024, 5, 6)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let table = Table::from_rows(
        "merged",
        vec![
            "来源文件".to_string(),
            "数量".to_string(),
            "单价".to_string(),
            "日期".to_string(),
        ],
        vec![
            vec![
                CellValue::text("north"),
                CellValue::Integer(2),
                CellValue::Float(1.5),
                CellValue::DateTime(day),
            ],
            vec![
                CellValue::text("south"),
                CellValue::Missing,
                CellValue::Float(2.25),
                CellValue::Missing,
            ],
        ],
    )
    .unwrap();

    write_table(&table, &path, OutputFormat::Xlsx).unwrap();
    let sheets = read_file(&path).unwrap();

    assert_eq!(sheets.len(), 1);
    let read = &sheets[0].table;
    assert_eq!(sheets[0].name, "Sheet1");
    assert_eq!(read.column_names(), table.column_names());
    assert_eq!(read.height(), 2);
    assert_eq!(read.value(1, 0), Some(&CellValue::Integer(2)));
    assert_eq!(read.value(1, 1), Some(&CellValue::Missing));
    assert_eq!(read.value(2, 1), Some(&CellValue::Float(2.25)));
    assert_eq!(read.value(3, 0), Some(&CellValue::text("2024-05-06")));
}

#[test]
fn csv_output_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("merged.csv");
    let table = Table::from_rows(
        "merged",
        vec!["商品条码".to_string(), "数量".to_string()],
        vec![
            vec![CellValue::text("690001"), CellValue::Integer(3)],
            vec![CellValue::text("690002"), CellValue::Missing],
        ],
    )
    .unwrap();

    write_table(&table, &path, OutputFormat::Csv).unwrap();
    let read = read_file(&path).unwrap().remove(0).table;

    assert_eq!(read.column_names(), vec!["商品条码", "数量"]);
    assert_eq!(read.value(1, 0), Some(&CellValue::Integer(3)));
    assert_eq!(read.value(1, 1), Some(&CellValue::Missing));
}
