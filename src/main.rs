//! Binary entry point that glues the SQLite-backed record store to the TUI:
//! bring up file logging, open the store, register the live query inside the
//! app state, and drive the Ratatui event loop until the user exits.
use anyhow::Result;
use log::info;

use bookstore_inventory::db::data_dir;
use bookstore_inventory::{logging, run_app, App, BookStore};

/// Initialize logging and persistence, then launch the Ratatui event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// an unwritable data directory) to the terminal instead of crashing
/// silently.
fn main() -> Result<()> {
    let _logger = logging::init_logging(&data_dir()?.join("logs"))?;
    info!("starting bookstore inventory manager");

    let store = BookStore::open_default()?;
    let mut app = App::new(store)?;
    run_app(&mut app)
}
