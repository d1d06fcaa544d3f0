//! Tracing setup: console plus an append-only daily log file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// `backup_<YYYY-MM-DD>.log`
pub fn log_file_name(date: NaiveDate) -> String {
    format!("backup_{}.log", date.format("%Y-%m-%d"))
}

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise `info` (or `debug`
/// with `verbose`). The returned guard flushes the file writer on drop and
/// must be held until the run is over.
pub fn init_logging(log_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(log_file_name(Local::now().date_naive()))
        .build(log_dir)
        .with_context(|| format!("Failed to open log file in {}", log_dir.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
