use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use rusqlite::Connection;

use super::error::StoreError;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bookstore-inventory";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "books.sqlite";

/// Resolve the application data directory inside the user's home. The same
/// directory hosts the database file and the rotated log files.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dirs = BaseDirs::new().ok_or(StoreError::HomeDirNotFound)?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Open the default on-disk database, creating the data directory and schema
/// on first use.
pub(super) fn open_default() -> Result<Connection, StoreError> {
    let dir = data_dir()?;
    fs::create_dir_all(&dir)?;
    open_at(dir.join(DB_FILE_NAME))
}

/// Open (or create) a database at an explicit path and run the lazy schema
/// setup. Open failures surface as [`StoreError::Unavailable`].
pub(super) fn open_at(path: impl AsRef<Path>) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// In-memory database with the same schema. Used by tests.
pub(super) fn open_in_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Single fixed schema: one table keyed by the caller-supplied book id.
fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            price REAL NOT NULL,
            quantity INTEGER NOT NULL
        )",
        [],
    )?;
    Ok(())
}
