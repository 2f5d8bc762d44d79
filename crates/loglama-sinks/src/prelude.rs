//! Prelude module - commonly used types for convenient import.
//!
//! Use `use loglama_sinks::prelude::*;` to import all essential types.

// Errors
pub use crate::{SinkError, SinkResult};

// Sinks
pub use crate::{ConsoleSink, ConsoleStream, FileSink, SqliteOptions, SqliteSink};

// Read side
pub use crate::{LogQuery, LogStore, StoredRecord};
