use std::path::PathBuf;
use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Where the log file lives. The terminal belongs to the UI, so nothing is
/// written to stdout or stderr.
pub fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("mindmentor")
}

/// Set up the global subscriber. `RUST_LOG` wins over `verbose`.
/// Keep the returned guard alive until exit so buffered lines get flushed.
pub fn init(verbose: bool) -> Result<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(&dir, "mindmentor.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

    Ok(guard)
}
