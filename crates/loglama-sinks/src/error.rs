//! Sink setup and read-back errors.

/// Errors from opening sinks or reading stored records back.
///
/// Per-record write failures are reported as
/// [`SinkWriteError`](loglama_core::SinkWriteError) instead.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The log file or its directory could not be opened.
    #[error("failed to open log file {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The database could not be opened, configured or queried.
    #[error("database error at {path}: {source}")]
    Database {
        /// Database path.
        path: String,
        /// Underlying `SQLite` error.
        #[source]
        source: rusqlite::Error,
    },

    /// The table name cannot be used unquoted in SQL.
    #[error(transparent)]
    InvalidTable(loglama_core::CoreError),

    /// A stored row could not be turned back into a record.
    #[error("stored record {id} is unreadable: {reason}")]
    Decode {
        /// Row id.
        id: i64,
        /// What was wrong with it.
        reason: String,
    },
}

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;
