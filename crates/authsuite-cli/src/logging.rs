use std::io;

use authsuite_core::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log file name used when `log_file` points at a directory.
const DEFAULT_LOG_FILE: &str = "authsuite.log";

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the level (e.g. RUST_LOG=authsuite_core=debug).
/// Logs go to stderr unless `log_file` is configured. The returned guard
/// must be kept alive for file output to be flushed.
pub fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match config.log_file.as_deref() {
        Some(path) => {
            let (dir, file_name) = if path.is_dir() {
                (path.to_path_buf(), DEFAULT_LOG_FILE.into())
            } else {
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| ".".into());
                let file_name = path
                    .file_name()
                    .map(|n| n.to_os_string())
                    .unwrap_or_else(|| DEFAULT_LOG_FILE.into());
                (dir, file_name)
            };

            if let Err(e) = std::fs::create_dir_all(&dir) {
                eprintln!("Warning: could not create log directory {}: {}", dir.display(), e);
            }
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}
