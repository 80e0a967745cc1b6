//! Logging configuration for cypher-mend.
//!
//! Stdout carries the run report, so logs go to stderr by default or to a
//! file when `--log-file` is given.

use std::fs::{self, File};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::error::{MendError, Result};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes logging to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Initializes logging to `path`, truncating it on each run.
pub fn init_file_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            MendError::io(format!("Could not create log directory {}: {e}", parent.display()))
        })?;
    }

    let log_file = File::create(path)
        .map_err(|e| MendError::io(format!("Could not create log file {}: {e}", path.display())))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    Ok(())
}
