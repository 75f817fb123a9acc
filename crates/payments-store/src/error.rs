//! Error types for the payments store.

use thiserror::Error;

/// Errors that can occur reading or writing payments.
#[derive(Error, Debug)]
pub enum StoreError {
    /// MySQL connection or query error.
    #[error("MySQL error: {0}")]
    MySQL(#[from] mysql_async::Error),

    /// A stored value could not be converted back.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The store was used after `close`.
    #[error("Payments store is closed")]
    Closed,
}
