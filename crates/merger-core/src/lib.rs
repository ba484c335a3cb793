//! Merge engine: concatenation, deduplication, quality auditing, and the
//! pipeline that ties them to column resolution.

pub mod error;
pub mod merge;
pub mod pipeline;
pub mod quality;

pub use error::{CoreError, Result};
pub use merge::{MERGED_TABLE_NAME, concatenate};
pub use pipeline::{
    ColumnInfo, DedupMode, InspectReport, META_COLUMNS, MergeOptions, MergeOutcome,
    MergePipeline, PREVIEW_ROWS, SHEET_COLUMN, SOURCE_FILE_COLUMN, SourceMapping, SourceTable,
    TablePreview, is_meta_column, run_merge,
};
pub use quality::{
    ColumnQuality, Keep, QualityReport, SummaryStats, deduplicate_smart, duplicate_row_count,
    summary_stats, validate,
};
