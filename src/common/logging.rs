//! Logging and tracing configuration
//!
//! Each run logs to `<run_dir>/test_run.log`. With `--verbose` the same
//! events also stream to stdout. The subscriber is installed as the
//! thread's default for as long as the [`RunLogger`] lives, so nothing is
//! registered globally.

use std::path::{Path, PathBuf};
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

use super::paths;
use super::Result;

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "droid=info,warn";

/// Handle to the per-run log sinks
///
/// Dropping it flushes the file writer and uninstalls the subscriber.
pub struct RunLogger {
    log_path: PathBuf,
    _default: DefaultGuard,
    _file: WorkerGuard,
}

impl RunLogger {
    /// Install file logging (and stdout logging when `verbose`) for a run
    pub fn init(run_dir: &Path, verbose: bool) -> Result<Self> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let log_path = paths::log_path(run_dir);
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        let (writer, file_guard) = tracing_appender::non_blocking(file);

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false);

        let stdout_layer = verbose.then(|| {
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .compact()
                .boxed()
        });

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(stdout_layer);

        let default = tracing::subscriber::set_default(subscriber);

        Ok(Self {
            log_path,
            _default: default,
            _file: file_guard,
        })
    }

    /// Path of the run log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Initialize stderr logging for commands that have no run directory
///
/// Logs are controlled by the `RUST_LOG` environment variable.
pub fn init_cli() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
