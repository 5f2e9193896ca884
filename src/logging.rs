//! Log file setup.
//!
//! Log records are appended to a text file as
//! `<timestamp> <LEVEL> <module>: <message>`. The filter defaults to `info`
//! and can be overridden with `RUST_LOG`.

use chrono::Local;
use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Log file used when none is given.
pub const DEFAULT_LOG_PATH: &str = "file_organizer.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Cannot open log file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
}

/// Local wall-clock timestamp in front of every record.
#[derive(Debug, Clone, Copy, Default)]
struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// Active logging for the current run.
///
/// Records go to the log file for as long as the context is alive.
pub struct LogContext {
    path: PathBuf,
    _guard: DefaultGuard,
}

impl LogContext {
    /// Opens `path` for appending and routes log records to it.
    ///
    /// Logging stays active until the returned context is dropped.
    ///
    /// # Arguments
    ///
    /// * `path` - The log file, created if missing
    ///
    /// # Errors
    ///
    /// Returns `LoggingError::Open` if the file cannot be opened for appending.
    pub fn init(path: impl Into<PathBuf>) -> Result<Self, LoggingError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LoggingError::Open {
                path: path.clone(),
                source,
            })?;

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_timer(LocalTimestamp)
            .finish();

        let guard = tracing::subscriber::set_default(subscriber);
        Ok(Self {
            path,
            _guard: guard,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
