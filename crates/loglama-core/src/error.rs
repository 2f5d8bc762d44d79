//! Core error types.

use thiserror::Error;

/// Errors raised by the logging core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A context scope was exited out of order, or with nothing to exit.
    #[error("context underflow: cannot exit frame {expected} ({})", describe_top(.found))]
    ContextUnderflow {
        /// Frame the caller tried to exit.
        expected: u64,
        /// Frame actually on top of the stack, if any.
        found: Option<u64>,
    },

    /// A level name could not be parsed.
    #[error("unknown log level: {0}")]
    UnknownLevel(String),

    /// A name cannot be used as an unquoted `SQLite` table name.
    #[error("invalid table name '{name}': {reason}")]
    InvalidTableName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A serialized record could not be parsed back.
    #[error("malformed record: {0}")]
    MalformedRecord(#[from] serde_json::Error),
}

fn describe_top(found: &Option<u64>) -> String {
    match found {
        Some(id) => format!("frame {id} is on top"),
        None => "stack is empty".to_string(),
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
