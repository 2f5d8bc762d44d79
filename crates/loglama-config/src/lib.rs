//! LogLama Config - layered configuration for logger setup.
//!
//! A [`LoggingConfig`] names the logger, its level and which sinks to wire.
//! [`load`] builds one from three layers, highest precedence first:
//!
//! 1. A TOML config file (`[logging]` table)
//! 2. `LOGLAMA_*` environment variables, for fields the file did not set
//! 3. Embedded defaults
//!
//! # Example
//!
//! ```
//! use loglama_config::{LoggingConfig, from_toml_str};
//!
//! let config = from_toml_str(r#"
//!     [logging]
//!     name = "billing"
//!     level = "WARNING"
//!     db_path = "/var/log/billing/logs.db"
//! "#).unwrap();
//!
//! assert_eq!(config.name, "billing");
//! assert!(config.context_filter);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod env;
mod error;
mod loader;
mod merge;
mod types;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{from_toml_str, load, load_with_env};
pub use types::LoggingConfig;
pub use validate::validate;
