//! Wiring a [`LoggingConfig`] into a registered logger.

use std::path::Path;
use std::sync::Arc;

use loglama_config::LoggingConfig;
use loglama_core::{ContextFilter, Filter, JsonFormatter, PlainFormatter, Sink};
use loglama_sinks::{ConsoleSink, FileSink, SqliteOptions, SqliteSink};
use tracing::info;

use crate::error::LoglamaResult;
use crate::logger::{Attachments, Logger};
use crate::registry::get_logger;

/// Configure the logger named by `config` and return it.
///
/// All sinks are opened before the logger is touched, so a failure leaves
/// any previous configuration in place. On success the logger's level,
/// filters and sinks are replaced in one step; calling this again for the
/// same name reconfigures rather than duplicating sinks.
///
/// # Errors
///
/// Returns [`LoglamaError::Config`](crate::LoglamaError::Config) for an
/// invalid configuration and
/// [`LoglamaError::Sink`](crate::LoglamaError::Sink) if a file or database
/// cannot be opened.
pub fn setup_logging(config: &LoggingConfig) -> LoglamaResult<Arc<Logger>> {
    loglama_config::validate(config)?;
    let level = config.level()?;

    let mut filters: Vec<Arc<dyn Filter>> = Vec::new();
    if config.context_filter {
        filters.push(Arc::new(ContextFilter));
    }

    let mut sinks: Vec<Arc<dyn Sink>> = Vec::new();
    if let Some(path) = config.file_target() {
        let sink = if config.json_format {
            FileSink::with_formatter(path, JsonFormatter)?
        } else {
            FileSink::with_formatter(path, PlainFormatter::new())?
        };
        sinks.push(Arc::new(sink.sync_each_write(config.fsync)));
    }
    if let Some(path) = &config.db_path {
        let options = SqliteOptions::default()
            .with_table(config.db_table.as_str())
            .with_busy_timeout(config.db_busy_timeout());
        sinks.push(Arc::new(SqliteSink::open_with(path, options)?));
    }
    if config.console {
        sinks.push(Arc::new(ConsoleSink::new()));
    }

    let logger = get_logger(&config.name);
    logger.set_level(level);
    logger.replace(Attachments { filters, sinks });

    info!(
        logger = %config.name,
        level = %level,
        sinks = ?logger.sink_names(),
        context_filter = config.context_filter,
        "configured logger"
    );
    Ok(logger)
}

/// Load configuration from `path` and the `LOGLAMA_*` environment, then
/// [`setup_logging`] with it.
///
/// # Errors
///
/// Returns an error if loading fails or [`setup_logging`] does.
pub fn setup_from_file(path: Option<&Path>) -> LoglamaResult<Arc<Logger>> {
    let config = loglama_config::load(path)?;
    setup_logging(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoglamaError;
    use loglama_core::Level;
    use loglama_test::{TestLogDir, read_json_lines, unique_logger_name};

    #[test]
    fn wires_file_sink_with_context_filter() {
        let dir = TestLogDir::new();
        let name = unique_logger_name("setup");
        let logger = setup_logging(&LoggingConfig::new(&name).with_file(dir.log_path())).unwrap();

        assert_eq!(logger.sink_names(), vec!["file"]);
        logger.info("ready");

        let lines = read_json_lines(&dir.log_path());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["logger"], name.as_str());
    }

    #[test]
    fn reconfiguring_replaces_sinks() {
        let dir = TestLogDir::new();
        let name = unique_logger_name("setup");
        let config = LoggingConfig::new(&name)
            .with_file(dir.log_path())
            .with_db(dir.db_path());

        setup_logging(&config).unwrap();
        let logger = setup_logging(&config.with_level(Level::Error)).unwrap();

        assert_eq!(logger.sink_names(), vec!["file", "sqlite"]);
        assert_eq!(logger.level(), Level::Error);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = LoggingConfig {
            file: true,
            ..LoggingConfig::new(unique_logger_name("setup"))
        };
        assert!(matches!(
            setup_logging(&config),
            Err(LoglamaError::Config(_))
        ));
    }

    #[test]
    fn unopenable_file_leaves_logger_untouched() {
        let dir = TestLogDir::new();
        let name = unique_logger_name("setup");
        let good = setup_logging(&LoggingConfig::new(&name).with_file(dir.log_path())).unwrap();

        // A directory cannot be opened as a log file.
        let bad = LoggingConfig::new(&name).with_file(dir.path());
        assert!(matches!(setup_logging(&bad), Err(LoglamaError::Sink(_))));
        assert_eq!(good.sink_names(), vec!["file"]);
    }
}
