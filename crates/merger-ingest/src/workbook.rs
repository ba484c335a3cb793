//! Workbook reading (xlsx, xlsm, xls, xlsb, ods) through calamine.

use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use merger_model::{CellValue, Table};

use crate::delimited::unnamed_label;
use crate::error::{IngestError, Result};

/// Largest magnitude at which an integral float is read as an integer.
const MAX_EXACT_INTEGER: f64 = 1e15;

/// One sheet of a workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSheet {
    pub name: String,
    pub table: Table,
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Converts one calamine cell.
pub fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Missing,
        Data::String(s) if s.is_empty() => CellValue::Missing,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(n) => CellValue::Integer(*n),
        Data::Float(n) => {
            // integral numbers come back from xlsx as floats
            if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER {
                CellValue::Integer(*n as i64)
            } else {
                CellValue::Float(*n)
            }
        }
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(CellValue::Float(dt.as_f64()), CellValue::DateTime),
        Data::DateTimeIso(s) => {
            parse_iso_datetime(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::DateTime)
        }
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn header_label(data: &Data, index: usize) -> String {
    match cell_value(data) {
        CellValue::Missing => unnamed_label(index),
        value => value.to_string(),
    }
}

/// Builds a table from a sheet range; the first row is the header.
pub fn range_to_table(name: &str, range: &Range<Data>) -> merger_model::Result<Table> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::new(name));
    };
    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_label(cell, idx))
        .collect();
    let body: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    Table::from_rows(name, headers, body)
}

/// Reads every sheet of a workbook, in workbook order.
pub fn read_workbook(path: &Path) -> Result<Vec<LoadedSheet>> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|source| IngestError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|source| IngestError::Sheet {
                path: path.to_path_buf(),
                sheet: sheet_name.clone(),
                source,
            })?;
        let table = range_to_table(&sheet_name, &range).map_err(|source| IngestError::Table {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            sheet = %sheet_name,
            rows = table.height(),
            columns = table.width(),
            "Read sheet"
        );
        sheets.push(LoadedSheet {
            name: sheet_name,
            table,
        });
    }
    Ok(sheets)
}
