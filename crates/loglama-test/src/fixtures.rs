//! Test fixtures for records, names and temporary log locations.

use std::path::{Path, PathBuf};
use std::sync::Once;

use loglama_core::{Level, LogRecord};
use tempfile::TempDir;
use uuid::Uuid;

/// A record from the `test` logger.
#[must_use]
pub fn sample_record(level: Level, message: &str) -> LogRecord {
    LogRecord::new(level, "test", message)
}

/// A logger name no other test will use.
///
/// The logger registry is process-global, so tests that configure a logger
/// should not share names.
#[must_use]
pub fn unique_logger_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Parse every line of a JSON-lines file.
///
/// # Panics
///
/// Panics if the file cannot be read or a line is not valid JSON.
#[must_use]
pub fn read_json_lines(path: &Path) -> Vec<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    text.lines()
        .map(|line| {
            serde_json::from_str(line)
                .unwrap_or_else(|e| panic!("not a JSON line ({e}): {line}"))
        })
        .collect()
}

/// Install a test-writer tracing subscriber once per process.
///
/// Honors `RUST_LOG`; otherwise only warnings and above are shown.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// A temporary directory holding a test's log file and database.
#[derive(Debug)]
pub struct TestLogDir {
    dir: TempDir,
}

impl TestLogDir {
    /// Create a fresh directory.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}")),
        }
    }

    /// The directory itself.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `<dir>/app.log`
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("app.log")
    }

    /// `<dir>/logs.db`
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("logs.db")
    }
}

impl Default for TestLogDir {
    fn default() -> Self {
        Self::new()
    }
}
