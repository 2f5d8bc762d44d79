//! LogLama Sinks - durable destinations for log records.
//!
//! - [`FileSink`]: one formatted line per record, appended to a file
//! - [`SqliteSink`]: one row per record in a WAL-mode `SQLite` table
//! - [`ConsoleSink`]: human-readable lines on stderr
//!
//! [`LogStore`] reads a `SQLite` log database back, concurrently with
//! writers.
//!
//! # Example
//!
//! ```no_run
//! use loglama_core::{Level, LogRecord, Sink};
//! use loglama_sinks::{LogQuery, LogStore, SqliteSink};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = SqliteSink::open("/var/log/app/logs.db")?;
//! sink.write(&LogRecord::new(Level::Error, "db", "connection lost"))?;
//!
//! let store = LogStore::open("/var/log/app/logs.db")?;
//! let errors = store.query(&LogQuery::new().with_min_level(Level::Error))?;
//! assert_eq!(errors.len(), 1);
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

mod console;
mod error;
mod file;
mod sqlite;
mod store;

pub use console::{ConsoleSink, ConsoleStream};
pub use error::{SinkError, SinkResult};
pub use file::FileSink;
pub use sqlite::{DEFAULT_BUSY_TIMEOUT, DEFAULT_TABLE, SqliteOptions, SqliteSink};
pub use store::{LogQuery, LogStore, StoredRecord};
