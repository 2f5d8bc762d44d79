//! Post-merge configuration validation.

use loglama_core::check_table_name;

use crate::error::{ConfigError, ConfigResult};
use crate::types::LoggingConfig;

/// Upper bound on the `SQLite` busy timeout (10 minutes).
const MAX_BUSY_TIMEOUT_MS: u64 = 600_000;

/// Validate a fully-merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &LoggingConfig) -> ConfigResult<()> {
    validate_name(config)?;
    config.level()?;
    validate_file(config)?;
    validate_db(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: format!("logging.{field}"),
        message: message.into(),
    }
}

fn validate_name(config: &LoggingConfig) -> ConfigResult<()> {
    if config.name.trim().is_empty() {
        return Err(invalid("name", "logger name must not be empty"));
    }
    Ok(())
}

fn validate_file(config: &LoggingConfig) -> ConfigResult<()> {
    match (&config.file_path, config.file) {
        (None, true) => Err(invalid("file_path", "file = true requires file_path")),
        (Some(path), true) if path.as_os_str().is_empty() => {
            Err(invalid("file_path", "must not be empty"))
        },
        _ => Ok(()),
    }
}

fn validate_db(config: &LoggingConfig) -> ConfigResult<()> {
    if config
        .db_path
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        return Err(invalid("db_path", "must not be empty"));
    }

    check_table_name(&config.db_table).map_err(|e| invalid("db_table", e.to_string()))?;

    if config.db_busy_timeout_ms == 0 || config.db_busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
        return Err(invalid(
            "db_busy_timeout_ms",
            format!("must be between 1 and {MAX_BUSY_TIMEOUT_MS}"),
        ));
    }
    Ok(())
}
