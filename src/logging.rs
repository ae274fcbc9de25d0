//! File-based logging bootstrap. The TUI owns stdout, so diagnostics go to
//! rotated files under the application data directory instead.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

/// Base name of the rotated log files.
const LOG_FILE_BASENAME: &str = "bookstore-inventory";
/// Rotate once a log file reaches this size.
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
/// Rotated files kept around before cleanup removes the oldest.
const MAX_LOG_FILES: usize = 3;

/// Start rotating file logs under `log_dir` and return the logger handle.
///
/// The handle must stay alive for the lifetime of the process; dropping it
/// flushes buffers and shuts the logger down. The default level is `info`,
/// overridable through `RUST_LOG`.
pub fn init_logging(log_dir: &Path) -> Result<LoggerHandle> {
    fs::create_dir_all(log_dir).context("failed to create log directory")?;

    Logger::try_with_env_or_str("info")
        .context("invalid log specification")?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .context("failed to start logger")
}
