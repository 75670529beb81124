//! Tracing setup.
//!
//! Logs go to stdout through a compact formatter filtered by `RUST_LOG`
//! (default `info`). Setting `RAGBRIDGE_LOG_FILE` adds a second, ANSI-free
//! layer appending to that path through a non-blocking writer.

use std::fs::OpenOptions;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Dropping the guard would silently stop the file writer, so it lives for the
// whole process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global tracing subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_target(false).compact();
    let registry = tracing_subscriber::registry().with(filter).with(stdout);

    match file_layer_target() {
        Some((path, file)) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = FILE_GUARD.set(guard);
            registry
                .with(fmt::layer().with_writer(writer).with_ansi(false).compact())
                .init();
            tracing::debug!(path = %path, "File logging enabled");
        }
        None => registry.init(),
    }
}

fn file_layer_target() -> Option<(String, std::fs::File)> {
    let path = std::env::var("RAGBRIDGE_LOG_FILE").ok()?;
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some((path, file)),
        Err(err) => {
            eprintln!("Failed to open log file {path}: {err}");
            None
        }
    }
}
