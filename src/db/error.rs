use std::io;

use thiserror::Error;

/// Failures the record store can surface to its callers.
///
/// There is deliberately no `NotFound` variant: deleting a missing id is a
/// silent no-op and updating one inserts the record, so neither path produces
/// an error. Callers only ever see storage-level failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite could not be opened, read, or written. Fatal to the requested
    /// operation; never retried by the store.
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),

    /// The application data directory could not be created.
    #[error("failed to create data directory: {0}")]
    DataDir(#[from] io::Error),

    /// The user's home directory could not be located, so there is nowhere
    /// to place the database file.
    #[error("could not locate home directory")]
    HomeDirNotFound,
}
