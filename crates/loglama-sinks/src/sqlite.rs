//! `SQLite` sink.
//!
//! Each sink owns one connection guarded by a mutex. The database runs in
//! WAL mode so [`LogStore`](crate::LogStore) readers on other connections can
//! query while records are being inserted.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use loglama_core::{LogRecord, Sink, SinkWriteError, check_table_name, fields_to_json};
use rusqlite::{Connection, params};
use tracing::debug;

use crate::error::{SinkError, SinkResult};

/// Table used when none is configured.
pub const DEFAULT_TABLE: &str = "logs";

/// How long a writer waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Options for [`SqliteSink::open_with`].
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    /// Table to write into.
    pub table: String,
    /// Lock wait before an insert fails.
    pub busy_timeout: Duration,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl SqliteOptions {
    /// Use `table` instead of [`DEFAULT_TABLE`].
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the busy timeout.
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

/// Inserts one row per record into a `SQLite` table.
///
/// Context and extra fields are stored as JSON text in separate columns.
pub struct SqliteSink {
    name: String,
    path: PathBuf,
    table: String,
    insert_sql: String,
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSink")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl SqliteSink {
    /// Open (or create) the database at `path` with default options.
    ///
    /// # Errors
    ///
    /// See [`SqliteSink::open_with`].
    pub fn open(path: impl AsRef<Path>) -> SinkResult<Self> {
        Self::open_with(path, SqliteOptions::default())
    }

    /// Open (or create) the database at `path`, switch it to WAL mode and
    /// make sure the log table exists.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::InvalidTable`] for a bad table name,
    /// [`SinkError::Open`] if the parent directory cannot be created and
    /// [`SinkError::Database`] if `SQLite` rejects the open or the schema.
    pub fn open_with(path: impl AsRef<Path>, options: SqliteOptions) -> SinkResult<Self> {
        let path = path.as_ref().to_path_buf();
        validate_table_name(&options.table)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SinkError::Open {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let db_err = |source| SinkError::Database {
            path: path.display().to_string(),
            source,
        };
        let conn = Connection::open(&path).map_err(db_err)?;
        conn.busy_timeout(options.busy_timeout).map_err(db_err)?;
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(db_err)?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(db_err)?;
        conn.execute_batch(&schema_sql(&options.table))
            .map_err(db_err)?;

        debug!(
            path = %path.display(),
            table = %options.table,
            journal_mode = %mode,
            "opened sqlite sink"
        );

        Ok(Self {
            name: "sqlite".to_string(),
            insert_sql: insert_sql(&options.table),
            table: options.table,
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Rename the sink (the default is `sqlite`).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Database path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Table records are written to.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Sink for SqliteSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkWriteError> {
        let context = fields_to_json(&record.context).to_string();
        let extra = fields_to_json(&record.extra).to_string();
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        let mut stmt = conn
            .prepare_cached(&self.insert_sql)
            .map_err(|e| SinkWriteError::new(&self.name, e))?;
        stmt.execute(params![
            record.timestamp_string(),
            record.level.as_str(),
            record.level.number(),
            record.logger,
            record.message,
            record.thread,
            record.exception,
            context,
            extra,
        ])
        .map_err(|e| SinkWriteError::new(&self.name, e))?;
        Ok(())
    }
}

pub(crate) fn validate_table_name(table: &str) -> SinkResult<()> {
    check_table_name(table).map_err(SinkError::InvalidTable)
}

fn schema_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            level TEXT NOT NULL,
            level_number INTEGER NOT NULL,
            logger_name TEXT NOT NULL,
            message TEXT NOT NULL,
            thread_name TEXT,
            exception TEXT,
            context TEXT NOT NULL DEFAULT '{{}}',
            extra TEXT NOT NULL DEFAULT '{{}}'
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_timestamp ON {table}(timestamp);
        CREATE INDEX IF NOT EXISTS idx_{table}_level ON {table}(level_number);
        CREATE INDEX IF NOT EXISTS idx_{table}_logger ON {table}(logger_name);"
    )
}

fn insert_sql(table: &str) -> String {
    format!(
        "INSERT INTO {table} (timestamp, level, level_number, logger_name, message, \
         thread_name, exception, context, extra) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
    )
}
