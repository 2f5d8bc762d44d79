//! LogLama Core - records, context propagation and formatting.
//!
//! This crate provides:
//! - [`Level`] and the [`LogRecord`] every logger emits
//! - [`FieldValue`] / [`Fields`] for structured data, with the [`fields!`] macro
//! - The per-strand [`context`] stack and its [`ContextFilter`]
//! - [`JsonFormatter`] and [`PlainFormatter`]
//! - The [`Sink`] and [`Filter`] traits implemented by destinations and hooks
//!
//! # Example
//!
//! ```
//! use loglama_core::prelude::*;
//! use loglama_core::fields;
//!
//! let _ctx = with_context(fields! { "user_id" => "123" });
//!
//! let mut record = LogRecord::new(Level::Info, "auth", "User logged in");
//! ContextFilter.apply(&mut record);
//!
//! let line = String::from_utf8(JsonFormatter.format(&record)).unwrap();
//! assert!(line.contains("\"user_id\":\"123\""));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod context;
pub mod error;
pub mod filter;
pub mod format;
pub mod level;
pub mod record;
pub mod sink;
pub mod table;
pub mod value;

pub use context::{
    ContextFutureExt, ContextGuard, ContextSnapshot, FrameHandle, RejectedExit, WithContext,
    current, enter_scope, exit_scope, run_with_context, with_context,
};
pub use error::{CoreError, CoreResult};
pub use filter::{ContextFilter, Filter, LevelFloor};
pub use format::{Formatter, JsonFormatter, PlainFormatter};
pub use level::Level;
pub use record::{LogRecord, render_error_chain};
pub use sink::{Sink, SinkWriteError};
pub use table::check_table_name;
pub use value::{FieldValue, Fields, fields_to_json};
