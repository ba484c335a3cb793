//! Terminal tables for merge, inspect, and registry output.

use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use merger_core::{
    ColumnInfo, InspectReport, MergeOutcome, QualityReport, SourceMapping, TablePreview,
    summary_stats,
};
use merger_map::{AliasRegistry, MatchKind};

/// Null share at or above which a column is highlighted.
const HIGH_NULL_PERCENT: f64 = 50.0;

pub fn print_merge_summary(outcome: &MergeOutcome, output: &Path) {
    println!("Output: {}", output.display());
    println!(
        "Sources merged: {} | skipped (empty): {} | duplicates removed: {}",
        outcome.merged_sources,
        outcome.skipped.len(),
        outcome.removed_duplicates
    );
    println!("{}", summary_stats(&outcome.table));
    if !outcome.mappings.is_empty() {
        println!("{}", mapping_table(&outcome.mappings));
    }
    println!("{}", quality_table(&outcome.quality));
    for label in &outcome.skipped {
        eprintln!("skipped empty sheet: {label}");
    }
}

pub fn print_inspect(report: &InspectReport) {
    println!("{}", columns_table(&report.columns));
    if !report.mappings.is_empty() {
        println!("{}", mapping_table(&report.mappings));
    }
    for preview in &report.previews {
        println!("{} / {}", preview.file, preview.sheet);
        println!("{}", preview_table(preview));
    }
}

/// Per-column null counts and inferred types of the merged table.
pub fn quality_table(report: &QualityReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Nulls"),
        header_cell("Null %"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for column in &report.columns {
        let percent = format!("{:.2}%", column.null_percent);
        let percent_cell = if column.null_percent >= HIGH_NULL_PERCENT {
            Cell::new(percent).fg(Color::Yellow)
        } else {
            Cell::new(percent)
        };
        table.add_row(vec![
            Cell::new(&column.name),
            dim_cell(column.column_type.as_str()),
            count_cell(column.null_count, Color::Yellow),
            percent_cell,
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell(format!("{} columns", report.total_columns)),
        Cell::new(format!("{} rows", report.total_rows)).add_attribute(Attribute::Bold),
        if report.duplicate_rows > 0 {
            Cell::new(format!("{} duplicate rows", report.duplicate_rows)).fg(Color::Red)
        } else {
            dim_cell("no duplicates")
        },
    ]);
    table
}

/// How each source's labels were resolved.
pub fn mapping_table(mappings: &[SourceMapping]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Original"),
        header_cell("Resolved"),
        header_cell("Match"),
    ]);
    apply_table_style(&mut table);
    for mapping in mappings {
        for entry in mapping.report.iter() {
            table.add_row(vec![
                Cell::new(&mapping.source),
                Cell::new(&entry.original),
                Cell::new(&entry.resolved),
                kind_cell(entry.kind),
            ]);
        }
    }
    table
}

pub fn columns_table(columns: &[ColumnInfo]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Sources"),
        header_cell("Found in"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for column in columns {
        let name = if column.is_meta {
            dim_cell(&column.name)
        } else {
            Cell::new(&column.name)
        };
        table.add_row(vec![
            name,
            Cell::new(column.sources.len()),
            Cell::new(column.sources.join("\n")),
        ]);
    }
    table
}

/// First rows of one source, after resolution.
pub fn preview_table(preview: &TablePreview) -> Table {
    let mut table = Table::new();
    table.set_header(preview.columns.iter().map(|name| header_cell(name)));
    apply_table_style(&mut table);
    for idx in 0..preview.rows.height() {
        if let Some(row) = preview.rows.row(idx) {
            table.add_row(row.into_iter().map(|value| {
                if value.is_missing() {
                    dim_cell("-")
                } else {
                    Cell::new(value)
                }
            }));
        }
    }
    table
}

pub fn registry_table(registry: &AliasRegistry) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Standard name"),
        header_cell("Aliases"),
    ]);
    apply_table_style(&mut table);
    for entry in registry.entries() {
        let aliases = if entry.aliases.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(entry.aliases.join(", "))
        };
        table.add_row(vec![
            Cell::new(&entry.standard).add_attribute(Attribute::Bold),
            aliases,
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn kind_cell(kind: MatchKind) -> Cell {
    match kind {
        MatchKind::Exact => Cell::new(kind).fg(Color::Green),
        MatchKind::Fuzzy => Cell::new(kind).fg(Color::Yellow),
        MatchKind::Unmapped => dim_cell(kind),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
