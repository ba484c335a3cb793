//! Merge pipeline: resolve, tag, filter, concatenate, deduplicate, audit.
//!
//! # Order
//!
//! For every source table:
//! 1. Skip it if it has no rows (merge only)
//! 2. Resolve column labels against the alias index (when normalizing)
//! 3. Insert the source file and sheet meta columns at positions 0 and 1
//! 4. Drop excluded columns (meta columns always stay)
//!
//! Then the prepared tables are concatenated, deduplicated according to
//! [`DedupMode`], and validated.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use merger_map::{AliasRegistry, ColumnResolver, MappingReport, ensure_unique_columns};
use merger_model::{CellValue, Table};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::merge::concatenate;
use crate::quality::{Keep, QualityReport, deduplicate_smart, summary_stats, validate};

/// Meta column holding the source file stem.
pub const SOURCE_FILE_COLUMN: &str = "来源文件";
/// Meta column holding the sheet name.
pub const SHEET_COLUMN: &str = "工作表";
pub const META_COLUMNS: [&str; 2] = [SOURCE_FILE_COLUMN, SHEET_COLUMN];

/// Rows shown per table by [`MergePipeline::inspect`].
pub const PREVIEW_ROWS: usize = 5;

pub fn is_meta_column(name: &str) -> bool {
    META_COLUMNS.contains(&name)
}

/// One sheet of one input file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    /// File name including extension.
    pub file_name: String,
    /// File name without extension.
    pub file_stem: String,
    pub sheet: String,
    pub table: Table,
}

impl SourceTable {
    pub fn new(file_name: impl Into<String>, sheet: impl Into<String>, table: Table) -> Self {
        let file_name = file_name.into();
        let file_stem = Path::new(&file_name)
            .file_stem()
            .map_or_else(|| file_name.clone(), |s| s.to_string_lossy().into_owned());
        Self {
            file_name,
            file_stem,
            sheet: sheet.into(),
            table,
        }
    }

    /// `<file name>-<sheet>`, used to key reports.
    pub fn label(&self) -> String {
        format!("{}-{}", self.file_name, self.sheet)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "keys")]
pub enum DedupMode {
    #[default]
    Off,
    FullRow,
    /// Deduplicate on these columns; falls back to full rows if none exist.
    Keys(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    pub normalize_columns: bool,
    pub fuzzy: bool,
    pub dedup: DedupMode,
    pub keep: Keep,
    pub exclude_columns: BTreeSet<String>,
    pub tag_sources: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            normalize_columns: true,
            fuzzy: false,
            dedup: DedupMode::Off,
            keep: Keep::First,
            exclude_columns: BTreeSet::new(),
            tag_sources: true,
        }
    }
}

/// Mapping report of one source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMapping {
    pub source: String,
    pub report: MappingReport,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub table: Table,
    pub quality: QualityReport,
    /// Per-source reports, in input order; sources without columns are absent.
    pub mappings: Vec<SourceMapping>,
    /// Labels of sources skipped for having no rows.
    pub skipped: Vec<String>,
    pub merged_sources: usize,
    pub removed_duplicates: usize,
}

/// A column across all inspected sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub sources: Vec<String>,
    pub is_meta: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePreview {
    pub file: String,
    pub sheet: String,
    pub columns: Vec<String>,
    pub rows: Table,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectReport {
    /// Sorted by name.
    pub columns: Vec<ColumnInfo>,
    pub previews: Vec<TablePreview>,
    pub mappings: Vec<SourceMapping>,
}

pub struct MergePipeline {
    resolver: ColumnResolver,
    options: MergeOptions,
}

impl MergePipeline {
    pub fn new(registry: &AliasRegistry, options: MergeOptions) -> Self {
        Self {
            resolver: ColumnResolver::new(registry),
            options,
        }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Resolves and tags one source. Returns the mapping report when labels
    /// were resolved and the table had columns.
    fn prepare(
        &self,
        source: SourceTable,
        apply_exclusions: bool,
    ) -> Result<(Table, Option<SourceMapping>)> {
        let label = source.label();
        let mut table = source.table;

        let mapping = if self.options.normalize_columns {
            let resolution = self.resolver.resolve_table(&mut table, self.options.fuzzy)?;
            let report = resolution.report();
            (!report.is_empty()).then(|| SourceMapping {
                source: label.clone(),
                report,
            })
        } else {
            make_unique(&mut table)?;
            None
        };

        if self.options.tag_sources {
            table.insert_constant_column(
                0,
                SOURCE_FILE_COLUMN,
                &CellValue::text(source.file_stem),
            );
            table.insert_constant_column(1, SHEET_COLUMN, &CellValue::text(source.sheet));
            make_unique(&mut table)?;
        }

        if apply_exclusions && !self.options.exclude_columns.is_empty() {
            let before = table.width();
            let exclude = &self.options.exclude_columns;
            table.retain_columns(|c| is_meta_column(&c.name) || !exclude.contains(&c.name));
            if table.width() < before {
                tracing::debug!(
                    source = %label,
                    removed = before - table.width(),
                    "Excluded columns"
                );
            }
        }

        Ok((table.with_name(label), mapping))
    }

    /// Runs the full merge over `sources`, in order.
    pub fn run(&self, sources: Vec<SourceTable>) -> Result<MergeOutcome> {
        let mut prepared = Vec::with_capacity(sources.len());
        let mut mappings = Vec::new();
        let mut skipped = Vec::new();

        for source in sources {
            if source.table.is_empty() {
                tracing::info!(source = %source.label(), "Skip empty sheet");
                skipped.push(source.label());
                continue;
            }
            let (table, mapping) = self.prepare(source, true)?;
            tracing::info!(source = table.name(), "{}", summary_stats(&table));
            mappings.extend(mapping);
            prepared.push(table);
        }

        if prepared.is_empty() {
            return Err(CoreError::NoTables);
        }
        let merged_sources = prepared.len();
        let merged = concatenate(prepared)?;
        tracing::info!(
            sources = merged_sources,
            rows = merged.height(),
            columns = merged.width(),
            "Merged tables"
        );

        let before = merged.height();
        let table = match &self.options.dedup {
            DedupMode::Off => merged,
            DedupMode::FullRow => deduplicate_smart(&merged, None, self.options.keep),
            DedupMode::Keys(keys) => {
                deduplicate_smart(&merged, Some(keys.as_slice()), self.options.keep)
            }
        };
        let removed_duplicates = before - table.height();
        if removed_duplicates > 0 {
            tracing::info!(removed = removed_duplicates, "Dedup removed rows");
        }

        let quality = validate(&table);
        Ok(MergeOutcome {
            table,
            quality,
            mappings,
            skipped,
            merged_sources,
            removed_duplicates,
        })
    }

    /// Column overview and previews of `sources` without merging.
    ///
    /// Empty sources are included and exclusions are not applied.
    pub fn inspect(&self, sources: Vec<SourceTable>) -> Result<InspectReport> {
        let mut columns: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut previews = Vec::with_capacity(sources.len());
        let mut mappings = Vec::new();

        for source in sources {
            let label = source.label();
            let file = source.file_name.clone();
            let sheet = source.sheet.clone();
            let (table, mapping) = self.prepare(source, false)?;

            for name in table.column_names() {
                columns
                    .entry(name.to_string())
                    .or_default()
                    .insert(label.clone());
            }
            mappings.extend(mapping);
            previews.push(TablePreview {
                file,
                sheet,
                columns: table.column_names().into_iter().map(str::to_string).collect(),
                rows: table.head(PREVIEW_ROWS),
            });
        }

        let columns = columns
            .into_iter()
            .map(|(name, sources)| ColumnInfo {
                is_meta: is_meta_column(&name),
                sources: sources.into_iter().collect(),
                name,
            })
            .collect();
        Ok(InspectReport {
            columns,
            previews,
            mappings,
        })
    }
}

fn make_unique(table: &mut Table) -> Result<()> {
    let names = ensure_unique_columns(&table.column_names());
    table.rename_columns(names.into_iter().map(|(name, _)| name).collect())?;
    Ok(())
}

/// Runs [`MergePipeline::run`] with a one-off pipeline.
pub fn run_merge(
    registry: &AliasRegistry,
    options: MergeOptions,
    sources: Vec<SourceTable>,
) -> Result<MergeOutcome> {
    MergePipeline::new(registry, options).run(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_drops_extension() {
        let source = SourceTable::new("sales.2024.xlsx", "Sheet1", Table::new("t"));
        assert_eq!(source.file_stem, "sales.2024");
        assert_eq!(source.label(), "sales.2024.xlsx-Sheet1");
    }

    #[test]
    fn meta_names_are_recognized() {
        assert!(is_meta_column("来源文件"));
        assert!(is_meta_column("工作表"));
        assert!(!is_meta_column("数量"));
    }

    #[test]
    fn dedup_mode_serializes_with_keys() {
        let json = serde_json::to_value(DedupMode::Keys(vec!["X".to_string()])).unwrap();
        assert_eq!(json, serde_json::json!({ "mode": "keys", "keys": ["X"] }));
    }
}
