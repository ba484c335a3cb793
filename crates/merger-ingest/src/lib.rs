//! Table file adapters.
//!
//! - [`discovery`]: expand input paths into supported files
//! - [`delimited`]: CSV/TXT with encoding fallback and delimiter sniffing
//! - [`workbook`]: xlsx/xlsm/xls/xlsb/ods through calamine
//! - [`writer`]: CSV (UTF-8 with BOM) and XLSX output

pub mod delimited;
pub mod discovery;
pub mod error;
pub mod workbook;
pub mod writer;

use std::path::Path;

pub use delimited::{TextEncoding, decode_text, read_delimited, sniff_delimiter};
pub use discovery::{InputKind, collect_inputs, input_kind, list_input_files};
pub use error::{IngestError, Result};
pub use workbook::{LoadedSheet, read_workbook};
pub use writer::{OutputFormat, write_csv, write_table, write_xlsx};

/// Reads every table of `path`.
///
/// Workbooks yield one table per sheet, named after the sheet. Delimited text
/// yields one table named after the file.
pub fn read_file(path: &Path) -> Result<Vec<LoadedSheet>> {
    let sheets = match input_kind(path) {
        Some(InputKind::Workbook) => read_workbook(path)?,
        Some(InputKind::DelimitedText) => {
            let table = read_delimited(path)?;
            vec![LoadedSheet {
                name: table.name().to_string(),
                table,
            }]
        }
        None => {
            return Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };
    tracing::info!(path = %path.display(), sheets = sheets.len(), "Read input file");
    Ok(sheets)
}
