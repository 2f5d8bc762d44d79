//! Prelude module - commonly used types for convenient import.
//!
//! Use `use loglama::prelude::*;` to import all essential types.

// Errors
pub use crate::{LoglamaError, LoglamaResult};

// Loggers and setup
pub use crate::{Level, Logger, LoggingConfig, get_logger, setup_logging};

// Context
pub use crate::{ContextFutureExt, ContextSnapshot, run_with_context, with_context};

// Records
pub use crate::{FieldValue, Fields, LogRecord};
