//! Data-quality statistics and deduplication.

use std::collections::{HashMap, HashSet};
use std::fmt;

use merger_model::{CellValue, ColumnType, Table};
use serde::{Deserialize, Serialize};

/// Which occurrence of a duplicated row survives deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keep {
    #[default]
    First,
    Last,
    /// Drop every row that has a duplicate.
    None,
}

/// Null statistics and inferred type of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnQuality {
    pub name: String,
    pub null_count: usize,
    /// Percentage of missing cells, rounded to two decimals; 0 without rows.
    pub null_percent: f64,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Rows equal to an earlier row across all columns.
    pub duplicate_rows: usize,
    pub columns: Vec<ColumnQuality>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Computes the quality report of `table`.
pub fn validate(table: &Table) -> QualityReport {
    let rows = table.height();
    let columns = table
        .columns()
        .iter()
        .map(|column| {
            let null_count = column.missing_count();
            ColumnQuality {
                name: column.name.clone(),
                null_count,
                null_percent: round2(percent(null_count, rows)),
                column_type: column.column_type(),
            }
        })
        .collect();
    QualityReport {
        total_rows: rows,
        total_columns: table.width(),
        duplicate_rows: duplicate_row_count(table),
        columns,
    }
}

fn row_key<'a>(table: &'a Table, columns: &[usize], row: usize) -> Vec<&'a CellValue> {
    columns
        .iter()
        .filter_map(|&col| table.value(col, row))
        .collect()
}

/// Number of rows that repeat an earlier row exactly.
pub fn duplicate_row_count(table: &Table) -> usize {
    let all: Vec<usize> = (0..table.width()).collect();
    let mut seen = HashSet::with_capacity(table.height());
    (0..table.height())
        .filter(|&row| !seen.insert(row_key(table, &all, row)))
        .count()
}

/// Row indices that survive deduplication on `columns`, in ascending order.
fn surviving_rows(table: &Table, columns: &[usize], keep: Keep) -> Vec<usize> {
    let height = table.height();
    match keep {
        Keep::First => {
            let mut seen = HashSet::with_capacity(height);
            (0..height)
                .filter(|&row| seen.insert(row_key(table, columns, row)))
                .collect()
        }
        Keep::Last => {
            let mut seen = HashSet::with_capacity(height);
            let mut rows: Vec<usize> = (0..height)
                .rev()
                .filter(|&row| seen.insert(row_key(table, columns, row)))
                .collect();
            rows.reverse();
            rows
        }
        Keep::None => {
            let mut counts: HashMap<Vec<&CellValue>, usize> = HashMap::with_capacity(height);
            for row in 0..height {
                *counts.entry(row_key(table, columns, row)).or_insert(0) += 1;
            }
            (0..height)
                .filter(|&row| counts.get(&row_key(table, columns, row)) == Some(&1))
                .collect()
        }
    }
}

/// Drops duplicate rows.
///
/// Key columns missing from the table are ignored. If none of them exist, or
/// no keys are given, whole rows are compared. Retained rows keep their order.
pub fn deduplicate_smart(table: &Table, key_columns: Option<&[String]>, keep: Keep) -> Table {
    let keys: Vec<usize> = key_columns
        .unwrap_or_default()
        .iter()
        .filter_map(|name| {
            let idx = table.column_index(name);
            if idx.is_none() {
                tracing::debug!(column = %name, "Dedup key column not found");
            }
            idx
        })
        .collect();

    let columns = if keys.is_empty() {
        (0..table.width()).collect()
    } else {
        keys
    };
    let rows = surviving_rows(table, &columns, keep);
    tracing::debug!(
        before = table.height(),
        after = rows.len(),
        key_columns = columns.len(),
        "Deduplicated rows"
    );
    table.take_rows(&rows)
}

/// Compact statistics for log output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: usize,
    /// Missing cells over all cells, in percent.
    pub null_rate: f64,
}

pub fn summary_stats(table: &Table) -> SummaryStats {
    let cells = table.height() * table.width();
    let missing: usize = table.columns().iter().map(|c| c.missing_count()).sum();
    SummaryStats {
        rows: table.height(),
        columns: table.width(),
        numeric_columns: table
            .columns()
            .iter()
            .filter(|c| c.column_type().is_numeric())
            .count(),
        null_rate: percent(missing, cells),
    }
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows: {} | columns: {} | numeric columns: {} | null rate: {:.2}%",
            self.rows, self.columns, self.numeric_columns, self.null_rate
        )
    }
}
