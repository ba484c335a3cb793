use thiserror::Error;

/// Errors raised when a table would violate its shape invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A column does not have the same number of values as the table height.
    #[error("column '{column}' has {found} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A row does not have one value per header.
    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A replacement name list does not cover every column.
    #[error("got {found} column names for a table with {expected} columns")]
    NameCount { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
