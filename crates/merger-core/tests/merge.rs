//! Tests for concatenation, deduplication and quality reporting.

use merger_core::{
    Keep, concatenate, deduplicate_smart, duplicate_row_count, summary_stats, validate,
};
use merger_model::{CellValue, Table};
use proptest::prelude::*;

fn int(v: i64) -> CellValue {
    CellValue::Integer(v)
}

fn table(name: &str, headers: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
    Table::from_rows(
        name,
        headers.iter().map(|h| (*h).to_string()).collect(),
        rows,
    )
    .expect("valid table")
}

fn rows_of(table: &Table) -> Vec<Vec<CellValue>> {
    (0..table.height())
        .map(|idx| {
            table
                .row(idx)
                .expect("row in range")
                .into_iter()
                .cloned()
                .collect()
        })
        .collect()
}

#[test]
fn concatenate_unions_columns_in_first_seen_order() {
    let first = table("t1", &["X", "Y"], vec![vec![int(1), int(2)]]);
    let second = table("t2", &["Y", "Z"], vec![vec![int(3), int(4)]]);

    let merged = concatenate(vec![first, second]).expect("merge");

    assert_eq!(merged.column_names(), vec!["X", "Y", "Z"]);
    assert_eq!(
        rows_of(&merged),
        vec![
            vec![int(1), int(2), CellValue::Missing],
            vec![CellValue::Missing, int(3), int(4)],
        ]
    );
}

#[test]
fn dedup_on_key_keeps_first() {
    let t = table(
        "t",
        &["X", "Y"],
        vec![
            vec![int(1), int(2)],
            vec![int(1), int(3)],
            vec![int(2), int(4)],
        ],
    );
    let keys = vec!["X".to_string()];

    let out = deduplicate_smart(&t, Some(keys.as_slice()), Keep::First);

    assert_eq!(
        rows_of(&out),
        vec![vec![int(1), int(2)], vec![int(2), int(4)]]
    );
}

#[test]
fn dedup_without_keys_uses_full_rows() {
    let t = table(
        "t",
        &["X", "Y"],
        vec![
            vec![int(1), int(2)],
            vec![int(1), int(2)],
            vec![int(1), int(3)],
        ],
    );
    assert_eq!(deduplicate_smart(&t, None, Keep::First).height(), 2);
    let no_keys: Vec<String> = Vec::new();
    assert_eq!(
        deduplicate_smart(&t, Some(no_keys.as_slice()), Keep::First).height(),
        2
    );
}

#[test]
fn integer_and_integral_float_rows_are_duplicates() {
    let first = table("t1", &["数量"], vec![vec![int(2)]]);
    let second = table(
        "t2",
        &["数量"],
        vec![vec![CellValue::Float(2.0)], vec![CellValue::Float(2.5)]],
    );
    let merged = concatenate(vec![first, second]).expect("merge");

    assert_eq!(validate(&merged).duplicate_rows, 1);
    let out = deduplicate_smart(&merged, None, Keep::First);
    assert_eq!(out.height(), 2);
    assert_eq!(out.value(0, 1), Some(&CellValue::Float(2.5)));
}

#[test]
fn validate_zero_rows_has_zero_null_rate() {
    let t = table("t", &["A", "B"], vec![]);
    let report = validate(&t);

    assert_eq!(report.total_rows, 0);
    assert_eq!(report.total_columns, 2);
    assert_eq!(report.duplicate_rows, 0);
    assert!(report.columns.iter().all(|c| c.null_percent == 0.0));
}

#[test]
fn validate_counts_duplicates_before_dedup() {
    let t = table(
        "t",
        &["X"],
        vec![vec![int(1)], vec![int(1)], vec![int(1)], vec![int(2)]],
    );
    let report = validate(&t);
    assert_eq!(report.duplicate_rows, 2);
    assert_eq!(report.columns[0].column_type.as_str(), "integer");
}

#[test]
fn quality_report_serializes() {
    let t = table("t", &["X"], vec![vec![CellValue::Missing], vec![int(1)]]);
    let json = serde_json::to_value(validate(&t)).expect("serialize report");
    assert_eq!(json["columns"][0]["null_percent"], 50.0);
    assert_eq!(json["columns"][0]["column_type"], "integer");
}

#[test]
fn summary_counts_numeric_columns() {
    let t = table(
        "t",
        &["A", "B"],
        vec![vec![CellValue::Float(1.5), CellValue::text("x")]],
    );
    let stats = summary_stats(&t);
    assert_eq!(stats.numeric_columns, 1);
    assert_eq!(stats.null_rate, 0.0);
}

proptest! {
    #[test]
    fn concatenate_preserves_row_count(heights in prop::collection::vec(0usize..5, 1..5)) {
        let tables: Vec<Table> = heights
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                let header = format!("C{}", i % 2);
                table("t", &[header.as_str()], (0..h).map(|r| vec![int(r as i64)]).collect())
            })
            .collect();
        let merged = concatenate(tables).unwrap();
        prop_assert_eq!(merged.height(), heights.iter().sum::<usize>());
        for column in merged.columns() {
            prop_assert_eq!(column.len(), merged.height());
        }
    }

    #[test]
    fn dedup_leaves_no_duplicates(values in prop::collection::vec(0i64..4, 0..20)) {
        let t = table("t", &["X"], values.iter().map(|&v| vec![int(v)]).collect());
        for keep in [Keep::First, Keep::Last, Keep::None] {
            let out = deduplicate_smart(&t, None, keep);
            prop_assert_eq!(duplicate_row_count(&out), 0);
        }
    }
}
