//! Shared test harness for integration tests.

use std::sync::Arc;

use loglama::{Logger, LoggingConfig, setup_logging};
use loglama_test::{TestLogDir, init_test_tracing, read_json_lines, unique_logger_name};

/// A configured logger writing JSON lines and `SQLite` rows into a
/// temporary directory, removed when the harness is dropped.
#[allow(dead_code)]
pub struct LoggerHarness {
    /// The configured logger.
    pub logger: Arc<Logger>,
    /// The configuration it was built from.
    pub config: LoggingConfig,
    /// Scratch directory (held to prevent cleanup).
    pub dir: TestLogDir,
}

#[allow(dead_code)]
impl LoggerHarness {
    /// File sink only.
    pub fn file_only(prefix: &str) -> Self {
        Self::build(prefix, false)
    }

    /// File sink plus `SQLite` sink.
    pub fn file_and_db(prefix: &str) -> Self {
        Self::build(prefix, true)
    }

    fn build(prefix: &str, with_db: bool) -> Self {
        init_test_tracing();
        let dir = TestLogDir::new();
        let mut config = LoggingConfig::new(unique_logger_name(prefix)).with_file(dir.log_path());
        if with_db {
            config = config.with_db(dir.db_path());
        }
        let logger = setup_logging(&config).expect("logger setup failed");
        Self {
            logger,
            config,
            dir,
        }
    }

    /// Every JSON line written so far.
    pub fn lines(&self) -> Vec<serde_json::Value> {
        read_json_lines(&self.dir.log_path())
    }
}
