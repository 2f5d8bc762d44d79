//! LogLama Test - shared test utilities for the LogLama crates.
//!
//! Mock sinks and filters plus small fixtures, meant to be pulled in as a
//! dev-dependency.
//!
//! ```toml
//! [dev-dependencies]
//! loglama-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use loglama_test::{MemorySink, sample_record};
//! use loglama_core::{Level, Sink};
//!
//! let sink = MemorySink::new("mem");
//! sink.write(&sample_record(Level::Info, "hello")).unwrap();
//! assert_eq!(sink.messages(), vec!["hello"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
