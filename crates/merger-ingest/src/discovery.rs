//! Input file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Extensions read as workbooks (every sheet).
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];
/// Extensions read as delimited text (one table).
pub const TEXT_EXTENSIONS: &[&str] = &["csv", "txt"];

/// How a file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Workbook,
    DelimitedText,
}

/// Classifies `path` by extension (case-insensitive).
pub fn input_kind(path: &Path) -> Option<InputKind> {
    let ext = path.extension()?.to_str()?;
    if WORKBOOK_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
        Some(InputKind::Workbook)
    } else if TEXT_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
        Some(InputKind::DelimitedText)
    } else {
        None
    }
}

/// Lists the supported files directly inside `dir`, sorted by file name.
pub fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && input_kind(&path).is_some() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Expands the given inputs: directories become their supported files,
/// files are kept in the order given.
///
/// A named file must exist, but its type is checked only when read.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = list_input_files(input)?;
            tracing::debug!(dir = %input.display(), files = found.len(), "Scanned input directory");
            files.extend(found);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(IngestError::FileNotFound {
                path: input.clone(),
            });
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in &["b.xlsx", "a.CSV", "notes.md", "c.txt"] {
            std::fs::write(dir.path().join(name), "header\ndata").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();
        dir
    }

    #[test]
    fn test_list_input_files() {
        let dir = create_test_dir();
        let files = list_input_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.xlsx", "c.txt"]);
    }

    #[test]
    fn test_input_kind() {
        assert_eq!(input_kind(Path::new("x.XLS")), Some(InputKind::Workbook));
        assert_eq!(input_kind(Path::new("x.txt")), Some(InputKind::DelimitedText));
        assert_eq!(input_kind(Path::new("x.pdf")), None);
        assert_eq!(input_kind(Path::new("noext")), None);
    }

    #[test]
    fn test_collect_inputs_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = collect_inputs(&[dir.path().join("absent.csv")]).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }

    #[test]
    fn test_collect_inputs_keeps_file_order() {
        let dir = create_test_dir();
        let inputs = vec![dir.path().join("c.txt"), dir.path().join("b.xlsx")];
        assert_eq!(collect_inputs(&inputs).unwrap(), inputs);
    }
}
