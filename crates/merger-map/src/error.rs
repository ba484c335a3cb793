//! Error types for alias registry persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading or writing the alias registry document.
///
/// Loading never surfaces these as failures; they are carried as warnings
/// next to the substituted defaults.
#[derive(Debug, Error)]
pub enum MapError {
    /// The registry document exists but could not be read.
    #[error("failed to read alias registry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry document is not a mapping of string to list-of-strings.
    #[error("malformed alias registry {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The registry document could not be written.
    #[error("failed to write alias registry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry could not be serialized.
    #[error("failed to serialize alias registry: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Result type for registry persistence.
pub type Result<T> = std::result::Result<T, MapError>;
