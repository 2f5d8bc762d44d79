//! Configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use loglama_core::Level;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Top-level shape of a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ConfigFile {
    pub(crate) logging: LoggingConfig,
}

/// Everything needed to wire up one named logger.
///
/// Field defaults match `defaults.toml`; every field is optional in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logger name.
    pub name: String,
    /// Minimum level, by name (`DEBUG`, `INFO`, `WARNING`, `ERROR`,
    /// `CRITICAL`; `WARN`, `TRACE` and `FATAL` are accepted too).
    pub level: String,
    /// Write records to `file_path`.
    pub file: bool,
    /// Destination of the file sink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// JSON lines when true, plain text otherwise.
    pub json_format: bool,
    /// `fsync` the log file after every record.
    pub fsync: bool,
    /// Attach the ambient context to every record.
    pub context_filter: bool,
    /// Also write plain lines to stderr.
    pub console: bool,
    /// `SQLite` database to insert records into. Unset disables the sink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    /// Table inside `db_path`.
    pub db_table: String,
    /// How long an insert waits on a locked database.
    pub db_busy_timeout_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "loglama".to_string(),
            level: "INFO".to_string(),
            file: false,
            file_path: None,
            json_format: true,
            fsync: false,
            context_filter: true,
            console: false,
            db_path: None,
            db_table: "logs".to_string(),
            db_busy_timeout_ms: 5000,
        }
    }
}

impl LoggingConfig {
    /// Defaults for a logger called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the minimum level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level.as_str().to_string();
        self
    }

    /// Enable the file sink at `path`.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = true;
        self.file_path = Some(path.into());
        self
    }

    /// Choose JSON (true) or plain text (false) for the file sink.
    #[must_use]
    pub fn with_json_format(mut self, json: bool) -> Self {
        self.json_format = json;
        self
    }

    /// Enable or disable the context filter.
    #[must_use]
    pub fn with_context_filter(mut self, enabled: bool) -> Self {
        self.context_filter = enabled;
        self
    }

    /// Enable the `SQLite` sink at `path`.
    #[must_use]
    pub fn with_db(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// Write to `table` instead of `logs`.
    #[must_use]
    pub fn with_db_table(mut self, table: impl Into<String>) -> Self {
        self.db_table = table.into();
        self
    }

    /// Enable or disable the console sink.
    #[must_use]
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Enable or disable per-record `fsync`.
    #[must_use]
    pub fn with_fsync(mut self, enabled: bool) -> Self {
        self.fsync = enabled;
        self
    }

    /// The parsed minimum level.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if `level` names no level.
    pub fn level(&self) -> ConfigResult<Level> {
        self.level
            .parse()
            .map_err(|e: loglama_core::CoreError| ConfigError::ValidationError {
                field: "logging.level".to_string(),
                message: e.to_string(),
            })
    }

    /// File sink path, when the file sink is enabled.
    #[must_use]
    pub fn file_target(&self) -> Option<&Path> {
        self.file_path.as_deref().filter(|_| self.file)
    }

    /// Busy timeout as a [`Duration`].
    #[must_use]
    pub fn db_busy_timeout(&self) -> Duration {
        Duration::from_millis(self.db_busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_embedded_file() {
        let parsed: ConfigFile = toml::from_str(include_str!("defaults.toml")).unwrap();
        assert_eq!(parsed.logging, LoggingConfig::default());
    }

    #[test]
    fn builder_enables_sinks() {
        let config = LoggingConfig::new("svc")
            .with_level(Level::Warning)
            .with_file("/tmp/svc.log")
            .with_db("/tmp/svc.db");
        assert_eq!(config.level().unwrap(), Level::Warning);
        assert_eq!(config.file_target(), Some(Path::new("/tmp/svc.log")));
        assert!(config.db_path.is_some());
    }

    #[test]
    fn file_path_without_flag_is_inactive() {
        let config = LoggingConfig {
            file_path: Some("/tmp/x.log".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(config.file_target(), None);
    }

    #[test]
    fn level_aliases_parse() {
        let mut config = LoggingConfig::default();
        config.level = "warn".to_string();
        assert_eq!(config.level().unwrap(), Level::Warning);
        config.level = "loud".to_string();
        assert!(config.level().is_err());
    }
}
