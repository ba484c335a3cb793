//! Outer concatenation of tables.

use std::collections::HashMap;

use merger_model::{CellValue, Column, Table};

use crate::error::{CoreError, Result};

/// Name given to the concatenated table.
pub const MERGED_TABLE_NAME: &str = "merged";

/// Stacks `tables` vertically over the union of their columns.
///
/// Rows keep their order: all rows of the first table, then the second, and
/// so on. Columns appear in first-seen order. A row gets
/// [`CellValue::Missing`] under every column its table lacks.
///
/// Columns are matched by name. When one table repeats a name, its n-th
/// column of that name lines up with the n-th column of that name elsewhere.
pub fn concatenate(tables: Vec<Table>) -> Result<Table> {
    if tables.is_empty() {
        return Err(CoreError::NoTables);
    }
    let total_rows: usize = tables.iter().map(Table::height).sum();
    let table_count = tables.len();

    let mut names: Vec<String> = Vec::new();
    let mut slots: HashMap<(String, usize), usize> = HashMap::new();
    let mut columns: Vec<Vec<CellValue>> = Vec::new();
    let mut filled = 0usize;

    for table in tables {
        let height = table.height();
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        for column in table.into_columns() {
            let nth = occurrences.entry(column.name.clone()).or_insert(0);
            let key = (column.name, *nth);
            *nth += 1;

            let slot = match slots.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = columns.len();
                    let mut values = Vec::with_capacity(total_rows);
                    values.resize(filled, CellValue::Missing);
                    columns.push(values);
                    names.push(key.0.clone());
                    slots.insert(key, slot);
                    slot
                }
            };
            columns[slot].extend(column.values);
        }
        filled += height;
        for values in &mut columns {
            values.resize(filled, CellValue::Missing);
        }
    }

    tracing::debug!(
        tables = table_count,
        rows = filled,
        columns = names.len(),
        "Concatenated tables"
    );

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Table::from_columns(MERGED_TABLE_NAME, columns)?)
}
