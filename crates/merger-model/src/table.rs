#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::cell::{CellValue, ColumnType};
use crate::error::{ModelError, Result};

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_missing()).count()
    }

    pub fn column_type(&self) -> ColumnType {
        ColumnType::infer(&self.values)
    }
}

/// An ordered list of columns over a shared row count.
///
/// Column names are not required to be unique; lookups by name return the
/// first match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableData")]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    height: usize,
}

/// Serialized form of a [`Table`]; the height is recomputed and checked.
#[derive(Deserialize)]
struct TableData {
    name: String,
    columns: Vec<Column>,
}

impl TryFrom<TableData> for Table {
    type Error = ModelError;

    fn try_from(data: TableData) -> Result<Self> {
        Self::from_columns(data.name, data.columns)
    }
}

impl Table {
    /// Creates a table with no columns and no rows.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            height: 0,
        }
    }

    /// Builds a table from columns, which must all have the same length.
    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|column| column.len() != height) {
            return Err(ModelError::RaggedColumn {
                column: bad.name.clone(),
                expected: height,
                found: bad.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            columns,
            height,
        })
    }

    /// Builds a table from a header row and row-major cells.
    pub fn from_rows(
        name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        let width = headers.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|header| Column::new(header, Vec::with_capacity(rows.len())))
            .collect();
        let height = rows.len();
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(ModelError::RowWidth {
                    row: row_idx,
                    expected: width,
                    found: row.len(),
                });
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.values.push(value);
            }
        }
        Ok(Self {
            name: name.into(),
            columns,
            height,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Returns the cells of row `idx`, in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<&CellValue>> {
        if idx >= self.height {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[idx]).collect())
    }

    pub fn value(&self, column: usize, row: usize) -> Option<&CellValue> {
        self.columns.get(column)?.values.get(row)
    }

    /// Replaces every column name, in order.
    pub fn rename_columns(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.columns.len() {
            return Err(ModelError::NameCount {
                expected: self.columns.len(),
                found: names.len(),
            });
        }
        for (column, name) in self.columns.iter_mut().zip(names) {
            column.name = name;
        }
        Ok(())
    }

    /// Inserts a column holding `value` in every row. An index past the end
    /// appends.
    pub fn insert_constant_column(
        &mut self,
        index: usize,
        name: impl Into<String>,
        value: &CellValue,
    ) {
        let column = Column::new(name, vec![value.clone(); self.height]);
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
    }

    /// Appends a column; it must match the table height unless the table has
    /// no columns yet.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.columns.is_empty() {
            self.height = column.len();
        } else if column.len() != self.height {
            let found = column.len();
            return Err(ModelError::RaggedColumn {
                column: column.name,
                expected: self.height,
                found,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Keeps only the columns for which `keep` returns true.
    pub fn retain_columns(&mut self, mut keep: impl FnMut(&Column) -> bool) {
        self.columns.retain(|column| keep(column));
    }

    /// Returns a new table holding the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                Column::new(
                    column.name.clone(),
                    indices.iter().map(|&idx| column.values[idx].clone()).collect(),
                )
            })
            .collect();
        Self {
            name: self.name.clone(),
            columns,
            height: indices.len(),
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        let indices: Vec<usize> = (0..self.height.min(n)).collect();
        self.take_rows(&indices)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
