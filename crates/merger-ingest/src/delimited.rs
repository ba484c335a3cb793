//! Delimited text (CSV/TXT) reading.
//!
//! The byte content is decoded with a fallback chain, the delimiter is
//! sniffed from the first lines, the first record is the header, and each
//! column is typed as integer, float, or text.

use std::path::Path;

use encoding_rs::{GBK, WINDOWS_1252};
use merger_model::{CellValue, Column, Table};

use crate::error::{IngestError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Candidate delimiters, in tie-breaking order.
pub const DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

/// Lines inspected by [`sniff_delimiter`].
const SNIFF_LINES: usize = 10;

/// Encoding a text file was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Gbk,
    Windows1252,
}

impl TextEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Gbk => "gbk",
            Self::Windows1252 => "windows-1252",
        }
    }
}

/// Decodes file content: UTF-8 (BOM stripped), then GBK, then Windows-1252.
///
/// The last step accepts any byte sequence, so decoding always succeeds.
pub fn decode_text(bytes: &[u8]) -> (String, TextEncoding) {
    let unmarked = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(unmarked) {
        return (text.to_string(), TextEncoding::Utf8);
    }
    if let Some(text) = GBK.decode_without_bom_handling_and_without_replacement(bytes) {
        return (text.into_owned(), TextEncoding::Gbk);
    }
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    (text.into_owned(), TextEncoding::Windows1252)
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map_or(1, |r| r.len())
}

/// Picks the delimiter giving the most consistent field count over the first
/// lines. A candidate must split the first line into more than one field.
/// Defaults to a comma.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best = b',';
    let mut best_score = 0usize;
    for delimiter in DELIMITERS {
        let counts: Vec<usize> = sample.iter().map(|line| field_count(line, delimiter)).collect();
        let Some(&target) = counts.first() else {
            break;
        };
        if target <= 1 {
            continue;
        }
        // consistent lines weighted by width; more columns wins ties
        let score = counts.iter().filter(|&&c| c == target).count() * target;
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }
    best
}

/// Header label for an empty header cell.
pub fn unnamed_label(index: usize) -> String {
    format!("Unnamed: {index}")
}

fn has_leading_zero(digits: &str) -> bool {
    let digits = digits.trim_start_matches(['+', '-']);
    digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.")
}

fn is_numeric_literal(value: &str) -> bool {
    value.bytes().any(|b| b.is_ascii_digit())
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

/// Types one column of raw fields.
///
/// Empty fields are missing. The column is integer when every other field
/// parses as `i64`, float when every other field parses as `f64`, text
/// otherwise. A field with a leading zero (`007`) keeps the column as text.
/// In numeric columns, blank fields are missing too.
pub fn type_column(raw: Vec<String>) -> Vec<CellValue> {
    let present = || raw.iter().map(|s| s.trim()).filter(|s| !s.is_empty());

    let numeric = present().next().is_some()
        && present().all(|s| is_numeric_literal(s) && !has_leading_zero(s));
    let integer = numeric && present().all(|s| s.parse::<i64>().is_ok());
    let float = numeric && !integer && present().all(|s| s.parse::<f64>().is_ok());

    raw.into_iter()
        .map(|field| {
            let trimmed = field.trim();
            if field.is_empty() || (numeric && trimmed.is_empty()) {
                CellValue::Missing
            } else if integer {
                trimmed.parse().map_or(CellValue::Missing, CellValue::Integer)
            } else if float {
                trimmed.parse().map_or(CellValue::Missing, CellValue::Float)
            } else {
                CellValue::Text(field)
            }
        })
        .collect()
}

/// Parses decoded text into a table named `name`.
pub fn parse_delimited(content: &str, delimiter: u8, name: &str, path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let Some(header) = records.next() else {
        return Ok(Table::new(name));
    };
    let header = header.map_err(|source| IngestError::CsvParse {
        path: path.to_path_buf(),
        source,
    })?;
    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            if label.is_empty() {
                unnamed_label(idx)
            } else {
                label.to_string()
            }
        })
        .collect();
    let width = headers.len();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); width];
    for result in records {
        let record = result.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        if record.len() > width {
            return Err(IngestError::RaggedRow {
                path: path.to_path_buf(),
                line: record.position().map_or(0, |p| p.line() as usize),
                expected: width,
                found: record.len(),
            });
        }
        for (idx, values) in raw.iter_mut().enumerate() {
            values.push(record.get(idx).unwrap_or_default().to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(header, values)| Column::new(header, type_column(values)))
        .collect();
    Table::from_columns(name, columns).map_err(|source| IngestError::Table {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a delimited text file into one table named after the file.
pub fn read_delimited(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let (content, encoding) = decode_text(&bytes);
    let delimiter = sniff_delimiter(&content);
    let name = path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    let table = parse_delimited(&content, delimiter, &name, path)?;
    tracing::debug!(
        path = %path.display(),
        encoding = encoding.as_str(),
        delimiter = %char::from(delimiter).escape_default(),
        rows = table.height(),
        columns = table.width(),
        "Read delimited file"
    );
    Ok(table)
}
