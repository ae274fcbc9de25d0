//! Core library surface for the Bookstore Inventory TUI application.
//!
//! The public modules exposed here keep the API intentionally small so the
//! `bin` target as well as the integration tests can reuse the same pieces:
//! the persistent record store with its live query, the snapshot-to-patch
//! list synchronizer, and the interactive application shell.
pub mod db;
pub mod logging;
pub mod models;
pub mod sync;
pub mod ui;

/// Persistence layer: the owned store object, its live-query handle, and the
/// error type callers match on.
pub use db::{BookStore, Snapshot, StoreError, Subscription};

/// The single domain type every layer passes around.
pub use models::Book;

/// Snapshot diffing for list consumers.
pub use sync::{ListEdit, ListSynchronizer};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
