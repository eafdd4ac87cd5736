//! Process-wide tracing setup: console output plus a daily rolling log file.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, InitError, Rotation};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("Invalid log filter '{level}'")]
    InvalidFilter {
        level: String,
        #[source]
        source: ParseError,
    },
    #[error("Failed to create log directory {}", path.display())]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to create log file appender")]
    Appender(#[from] InitError),
    #[error("Logging already initialized")]
    AlreadyInitialized,
    #[error("Failed to install tracing subscriber")]
    Subscriber(#[from] TryInitError),
}

#[derive(Debug, Clone)]
pub struct LogOptions<'a> {
    /// Filter used when `RUST_LOG` is unset, e.g. `"info"` or `"colonies=debug"`.
    pub level: &'a str,
    pub dir: &'a Path,
    /// Files are named `<file_prefix>.<date>.log`.
    pub file_prefix: &'a str,
    /// Rotated files kept on disk.
    pub max_files: usize,
}

impl<'a> LogOptions<'a> {
    pub fn new(level: &'a str, dir: &'a Path, file_prefix: &'a str) -> Self {
        Self {
            level,
            dir,
            file_prefix,
            max_files: 5,
        }
    }
}

/// Install the global subscriber. Warnings and errors go to stderr, the rest
/// to stdout; everything is also written to the rolling file.
pub fn setup_logging(options: &LogOptions) -> Result<(), LogSetupError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            EnvFilter::try_new(options.level).map_err(|source| LogSetupError::InvalidFilter {
                level: options.level.to_string(),
                source,
            })?
        }
    };

    std::fs::create_dir_all(options.dir).map_err(|source| LogSetupError::LogDir {
        path: options.dir.to_path_buf(),
        source,
    })?;

    let file_appender = Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(options.file_prefix)
        .filename_suffix("log")
        .max_log_files(options.max_files)
        .build(options.dir)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD
        .set(guard)
        .map_err(|_| LogSetupError::AlreadyInitialized)?;

    let console_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Initialize tracing for tests.
/// Safe to call multiple times. Respects `RUST_LOG`, defaults to "info".
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
