//! Result writing: CSV (UTF-8 with BOM) and single-sheet XLSX.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use merger_model::{CellValue, Table};
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
/// Name of the single output worksheet.
pub const OUTPUT_SHEET_NAME: &str = "Sheet1";
const XLSX_MAX_ROWS: usize = 1_048_576;
const XLSX_MAX_COLUMNS: usize = 16_384;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    /// Format implied by the extension of `path`, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else if ext.eq_ignore_ascii_case("xlsx") {
            Some(Self::Xlsx)
        } else {
            None
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| IngestError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Writes `table` in `format`, creating the parent directory if needed.
pub fn write_table(table: &Table, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Xlsx => write_xlsx(table, path),
        OutputFormat::Csv => write_csv(table, path),
    }?;
    tracing::info!(
        path = %path.display(),
        format = format.extension(),
        rows = table.height(),
        columns = table.width(),
        "Wrote merged table"
    );
    Ok(())
}

/// Writes a UTF-8 CSV with a byte-order mark. Missing cells are empty fields.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let io_err = |source| IngestError::Write {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source| IngestError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(io_err)?;
    file.write_all(UTF8_BOM).map_err(io_err)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(table.column_names()).map_err(csv_err)?;
    for idx in 0..table.height() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|c| c.values[idx].to_string())
            .collect();
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}

/// Writes a workbook with one sheet: a header row, then one row per table row.
///
/// Numbers and booleans are typed cells; dates are written as text.
pub fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    if table.height() + 1 > XLSX_MAX_ROWS || table.width() > XLSX_MAX_COLUMNS {
        return Err(IngestError::SheetLimits {
            rows: table.height(),
            columns: table.width(),
        });
    }
    ensure_parent(path)?;
    let xlsx_err = |source| IngestError::XlsxWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook
        .add_worksheet()
        .set_name(OUTPUT_SHEET_NAME)
        .map_err(xlsx_err)?;

    for (col_idx, column) in table.columns().iter().enumerate() {
        // bounds checked above
        let col = col_idx as u16;
        worksheet
            .write_string_with_format(0, col, &column.name, &header_format)
            .map_err(xlsx_err)?;
        for (row_idx, value) in column.values.iter().enumerate() {
            let row = row_idx as u32 + 1;
            match value {
                CellValue::Missing => {}
                CellValue::Text(s) => {
                    worksheet.write_string(row, col, s).map_err(xlsx_err)?;
                }
                CellValue::Integer(n) => {
                    worksheet.write_number(row, col, *n as f64).map_err(xlsx_err)?;
                }
                CellValue::Float(n) => {
                    worksheet.write_number(row, col, *n).map_err(xlsx_err)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row, col, *b).map_err(xlsx_err)?;
                }
                CellValue::DateTime(_) => {
                    worksheet
                        .write_string(row, col, value.to_string())
                        .map_err(xlsx_err)?;
                }
            }
        }
    }

    workbook.save(path).map_err(xlsx_err)?;
    Ok(())
}
