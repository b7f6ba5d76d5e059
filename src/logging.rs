//! Tracing subscriber setup
//!
//! One rolling log file, JSON or plain text. Text mode also echoes to a
//! colored stdout. `RUST_LOG` overrides the configured level.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::config::AppConfig;

fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// sqlx logs every statement at info
fn directives(level: &str) -> String {
    format!("{},sqlx=warn", level)
}

/// Install the global subscriber. Keep the guard alive for the process
/// lifetime or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> Result<WorkerGuard> {
    let appender = RollingFileAppender::builder()
        .rotation(rotation(&config.rotation))
        .filename_prefix(&config.log_file)
        .build(&config.log_dir)
        .with_context(|| format!("Failed to open log directory {}", config.log_dir))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(&config.log_level)));

    let file_layer = if config.use_json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    };
    let stdout_layer = (!config.use_json).then(|| fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context("Global tracing subscriber already installed")?;

    Ok(guard)
}
