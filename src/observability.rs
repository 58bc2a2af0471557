//! Logging and observability helpers.

use std::fs;
use std::path::Path;

use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::config::IclConfig;

const LOG_FILE_PREFIX: &str = "icl.log";

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured debug level. Calling this
/// more than once is harmless; later calls are ignored.
pub fn init_tracing(config: &IclConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    match config.log_dir.as_deref() {
        Some(log_dir) => init_file_tracing(log_dir, env_filter),
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

fn init_file_tracing(log_dir: &Path, env_filter: EnvFilter) {
    let _ = fs::create_dir_all(log_dir);

    let file_appender: RollingFileAppender =
        tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}
