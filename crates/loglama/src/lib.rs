//! LogLama - structured, context-aware logging.
//!
//! This crate provides:
//! - Named [`Logger`]s with a level threshold, filters and sinks, shared
//!   through [`get_logger`]
//! - Nested context scopes ([`with_context`], [`run_with_context`],
//!   [`ContextFutureExt::in_context`]) stamped onto every record by the
//!   [`ContextFilter`]
//! - JSON-line file, `SQLite` and console sinks
//! - [`setup_logging`] to wire all of it from a [`LoggingConfig`]
//!
//! # Example
//!
//! ```rust,no_run
//! use loglama::prelude::*;
//! use loglama::fields;
//!
//! # fn main() -> LoglamaResult<()> {
//! let config = LoggingConfig::new("api")
//!     .with_file("/var/log/api/app.log")
//!     .with_db("/var/log/api/logs.db");
//! let logger = setup_logging(&config)?;
//!
//! let _ctx = with_context(fields! { "request_id" => "r-42" });
//! logger.warning_with("slow query", fields! { "query" => "SELECT 1", "ms" => 1200 });
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod diagnostics;
mod error;
mod logger;
mod registry;
mod setup;

pub use diagnostics::{DiagnosticsConfig, DiagnosticsFormat, setup_diagnostics};
pub use error::{LoglamaError, LoglamaResult};
pub use logger::Logger;
pub use registry::{get_logger, logger_names};
pub use setup::{setup_from_file, setup_logging};

pub use loglama_config::{ConfigError, LoggingConfig};
pub use loglama_core::{
    ContextFilter, ContextFutureExt, ContextGuard, ContextSnapshot, CoreError, FieldValue, Fields,
    Filter, Formatter, FrameHandle, JsonFormatter, Level, LevelFloor, LogRecord, PlainFormatter,
    RejectedExit, Sink, SinkWriteError, WithContext, current, enter_scope, exit_scope, fields,
    run_with_context, with_context,
};
pub use loglama_sinks::{
    ConsoleSink, ConsoleStream, FileSink, LogQuery, LogStore, SinkError, SqliteOptions,
    SqliteSink, StoredRecord,
};
