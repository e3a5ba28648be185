//! Error types for the persistence layer.

use std::path::PathBuf;

use crate::table::{Index, Table};

/// Errors raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A row could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The table has no such secondary index.
    #[error("table {table} has no index on {index}")]
    UnknownIndex {
        /// The queried table.
        table: Table,
        /// The requested index.
        index: Index,
    },

    /// The backing data is not in a format this version understands.
    #[error("unsupported store format: {0}")]
    Corrupt(String),
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
