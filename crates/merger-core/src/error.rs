use merger_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Concatenation needs at least one table.
    #[error("no tables to merge")]
    NoTables,

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
