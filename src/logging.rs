//! Tracing setup: console output plus daily-rolling log files.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Keeps the non-blocking appender workers alive. Dropping this before
/// the process exits loses buffered log lines.
pub struct LogGuards {
    _info: WorkerGuard,
    _error: WorkerGuard,
}

/// Install the global subscriber: a console layer honoring `RUST_LOG`,
/// a daily-rolling info file, and a daily-rolling error file.
pub fn init(dir: &Path, verbose: bool) -> Result<LogGuards> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let default_directive = if verbose {
        "kosis_collector=debug,kosis_collect=debug"
    } else {
        "kosis_collector=info,kosis_collect=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let (info_writer, info_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "collect.log"));
    let (error_writer, error_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "collect.error.log"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_writer(info_writer)
                .with_ansi(false)
                .with_filter(LevelFilter::INFO),
        )
        .with(
            fmt::layer()
                .with_writer(error_writer)
                .with_ansi(false)
                .with_filter(LevelFilter::ERROR),
        )
        .init();

    Ok(LogGuards {
        _info: info_guard,
        _error: error_guard,
    })
}
