use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";

/// Routes `tracing` output to a daily log file; the terminal belongs to the UI.
///
/// `RUST_LOG` can raise verbosity (e.g. `RUST_LOG=locate_tui=debug`).
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn initialize_logging() -> WorkerGuard {
    // The subscriber isn't up yet, report this once it is
    let dir_error = std::fs::create_dir_all(LOG_DIR).err();

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, "locate.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    if let Some(e) = dir_error {
        tracing::warn!("Could not create log directory '{}': {}", LOG_DIR, e);
    }
    tracing::info!("Logging initialized successfully.");
    guard
}
