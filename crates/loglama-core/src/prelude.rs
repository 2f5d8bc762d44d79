//! Prelude module - commonly used types for convenient import.
//!
//! Use `use loglama_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{CoreError, CoreResult, SinkWriteError};

// Records and values
pub use crate::{FieldValue, Fields, Level, LogRecord};

// Context
pub use crate::{
    ContextFutureExt, ContextGuard, ContextSnapshot, run_with_context, with_context,
};

// Pipeline traits and stock implementations
pub use crate::{ContextFilter, Filter, Formatter, JsonFormatter, PlainFormatter, Sink};
