//! End-to-end tests of the merge pipeline over in-memory sources.

use std::collections::BTreeSet;

use merger_core::{
    CoreError, DedupMode, Keep, MergeOptions, MergePipeline, SHEET_COLUMN, SOURCE_FILE_COLUMN,
    SourceTable, run_merge,
};
use merger_map::{AliasRegistry, MatchKind};
use merger_model::{CellValue, Table};

fn source(file: &str, sheet: &str, headers: &[&str], rows: Vec<Vec<CellValue>>) -> SourceTable {
    let table = Table::from_rows(
        sheet,
        headers.iter().map(|h| (*h).to_string()).collect(),
        rows,
    )
    .expect("valid table");
    SourceTable::new(file, sheet, table)
}

fn sample_sources() -> Vec<SourceTable> {
    vec![
        source(
            "north.xlsx",
            "Sheet1",
            &["条码", "品名", "qty"],
            vec![
                vec![CellValue::text("690001"), CellValue::text("茶"), CellValue::Integer(2)],
                vec![CellValue::text("690002"), CellValue::text("水"), CellValue::Integer(5)],
            ],
        ),
        source("north.xlsx", "Empty", &["条码"], vec![]),
        source(
            "south.csv",
            "south.csv",
            &["Barcode", "Product Name", "Quantity", "备注"],
            vec![vec![
                CellValue::text("690001"),
                CellValue::text("茶"),
                CellValue::Integer(2),
                CellValue::text("促销"),
            ]],
        ),
    ]
}

#[test]
fn merges_resolved_sources_with_meta_columns() {
    let outcome = run_merge(
        &AliasRegistry::builtin(),
        MergeOptions::default(),
        sample_sources(),
    )
    .expect("merge");

    assert_eq!(
        outcome.table.column_names(),
        vec![SOURCE_FILE_COLUMN, SHEET_COLUMN, "商品条码", "商品名称", "数量", "备注"]
    );
    assert_eq!(outcome.table.height(), 3);
    assert_eq!(outcome.merged_sources, 2);
    assert_eq!(outcome.skipped, vec!["north.xlsx-Empty"]);
    assert_eq!(outcome.table.value(0, 2), Some(&CellValue::text("south")));
    assert_eq!(outcome.table.value(5, 0), Some(&CellValue::Missing));

    let labels: Vec<&str> = outcome.mappings.iter().map(|m| m.source.as_str()).collect();
    assert_eq!(labels, vec!["north.xlsx-Sheet1", "south.csv-south.csv"]);
    assert_eq!(outcome.mappings[1].report.count(MatchKind::Unmapped), 1);
    assert_eq!(outcome.quality.total_rows, 3);
}

#[test]
fn keyed_dedup_reports_removed_rows() {
    let options = MergeOptions {
        dedup: DedupMode::Keys(vec!["商品条码".to_string()]),
        keep: Keep::First,
        ..MergeOptions::default()
    };
    let outcome = run_merge(&AliasRegistry::builtin(), options, sample_sources()).expect("merge");

    assert_eq!(outcome.removed_duplicates, 1);
    assert_eq!(outcome.table.height(), 2);
    assert_eq!(outcome.quality.duplicate_rows, 0);
}

#[test]
fn full_row_dedup_sees_distinct_meta_columns() {
    let options = MergeOptions {
        dedup: DedupMode::FullRow,
        ..MergeOptions::default()
    };
    let outcome = run_merge(&AliasRegistry::builtin(), options, sample_sources()).expect("merge");
    assert_eq!(outcome.removed_duplicates, 0);
}

#[test]
fn exclusion_never_drops_meta_columns() {
    let options = MergeOptions {
        exclude_columns: BTreeSet::from([
            "备注".to_string(),
            SOURCE_FILE_COLUMN.to_string(),
        ]),
        ..MergeOptions::default()
    };
    let outcome = run_merge(&AliasRegistry::builtin(), options, sample_sources()).expect("merge");
    let names = outcome.table.column_names();
    assert!(names.contains(&SOURCE_FILE_COLUMN));
    assert!(!names.contains(&"备注"));
}

#[test]
fn without_normalization_labels_are_kept() {
    let options = MergeOptions {
        normalize_columns: false,
        tag_sources: false,
        ..MergeOptions::default()
    };
    let outcome = run_merge(&AliasRegistry::builtin(), options, sample_sources()).expect("merge");
    assert!(outcome.mappings.is_empty());
    assert_eq!(outcome.table.column_names()[0], "条码");
    assert!(outcome.table.has_column("Barcode"));
}

#[test]
fn data_column_named_like_meta_is_suffixed() {
    let sources = vec![source(
        "a.csv",
        "a.csv",
        &[SOURCE_FILE_COLUMN],
        vec![vec![CellValue::text("kept")]],
    )];
    let outcome = run_merge(&AliasRegistry::new(), MergeOptions::default(), sources).expect("merge");
    assert_eq!(
        outcome.table.column_names(),
        vec![SOURCE_FILE_COLUMN, SHEET_COLUMN, "来源文件_1"]
    );
    assert_eq!(outcome.table.value(2, 0), Some(&CellValue::text("kept")));
}

#[test]
fn only_empty_sources_is_an_error() {
    let sources = vec![source("a.csv", "a.csv", &["X"], vec![])];
    let err = run_merge(&AliasRegistry::builtin(), MergeOptions::default(), sources).unwrap_err();
    assert!(matches!(err, CoreError::NoTables));
}

#[test]
fn inspect_lists_columns_with_sources() {
    let pipeline = MergePipeline::new(&AliasRegistry::builtin(), MergeOptions::default());
    let report = pipeline.inspect(sample_sources()).expect("inspect");

    let barcode = report
        .columns
        .iter()
        .find(|c| c.name == "商品条码")
        .expect("barcode column");
    assert_eq!(
        barcode.sources,
        vec!["north.xlsx-Empty", "north.xlsx-Sheet1", "south.csv-south.csv"]
    );
    assert!(!barcode.is_meta);
    assert!(report.columns.iter().any(|c| c.name == SHEET_COLUMN && c.is_meta));

    let mut sorted: Vec<&str> = report.columns.iter().map(|c| c.name.as_str()).collect();
    sorted.sort_unstable();
    assert_eq!(
        report.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        sorted
    );
    assert_eq!(report.previews.len(), 3);
    assert_eq!(report.previews[0].rows.height(), 2);
}
