//! Facade error types.

use loglama_config::ConfigError;
use loglama_sinks::SinkError;
use thiserror::Error;

/// Errors surfaced while configuring loggers or diagnostics.
///
/// Emitting never returns an error; sink failures during emission are
/// counted and reported on the diagnostics channel instead.
#[derive(Debug, Error)]
pub enum LoglamaError {
    /// The logging configuration is invalid or could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A sink could not be opened.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// A diagnostics filter directive could not be parsed.
    #[error("invalid diagnostics directive: {0}")]
    Diagnostics(String),

    /// The diagnostics subscriber could not be installed.
    #[error("Initialization error: {0}")]
    InitError(String),
}

/// Result type for facade operations.
pub type LoglamaResult<T> = Result<T, LoglamaError>;
