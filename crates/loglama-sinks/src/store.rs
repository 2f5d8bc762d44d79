//! Read-side access to a `SQLite` log database.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use loglama_core::{Fields, Level, LogRecord};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, Row, params_from_iter};

use crate::error::{SinkError, SinkResult};
use crate::sqlite::{DEFAULT_BUSY_TIMEOUT, DEFAULT_TABLE, validate_table_name};

/// A record read back from the database, with its row id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    /// Auto-increment row id (insertion order).
    pub id: i64,
    /// The decoded record.
    pub record: LogRecord,
}

/// Row selection for [`LogStore::query`]. The default selects everything,
/// oldest first.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    min_level: Option<Level>,
    logger: Option<String>,
    contains: Option<String>,
    limit: Option<usize>,
    newest_first: bool,
}

impl LogQuery {
    /// Select every row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only rows at `level` or above.
    #[must_use]
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = Some(level);
        self
    }

    /// Only rows from the named logger.
    #[must_use]
    pub fn with_logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    /// Only rows whose message contains `text`.
    #[must_use]
    pub fn with_message_containing(mut self, text: impl Into<String>) -> Self {
        self.contains = Some(text.into());
        self
    }

    /// At most `limit` rows.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Return the most recent rows first.
    #[must_use]
    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    fn to_sql(&self, table: &str) -> (String, Vec<Value>) {
        let mut sql = format!(
            "SELECT id, timestamp, level, logger_name, message, thread_name, exception, \
             context, extra FROM {table} WHERE 1 = 1"
        );
        let mut args = Vec::new();

        if let Some(level) = self.min_level {
            sql.push_str(" AND level_number >= ?");
            args.push(Value::Integer(i64::from(level.number())));
        }
        if let Some(logger) = &self.logger {
            sql.push_str(" AND logger_name = ?");
            args.push(Value::Text(logger.clone()));
        }
        if let Some(text) = &self.contains {
            sql.push_str(" AND instr(message, ?) > 0");
            args.push(Value::Text(text.clone()));
        }
        sql.push_str(if self.newest_first {
            " ORDER BY id DESC"
        } else {
            " ORDER BY id ASC"
        });
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            args.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }
        (sql, args)
    }
}

/// Read-only view of a log database written by a
/// [`SqliteSink`](crate::SqliteSink).
///
/// Opens its own connection, so it can be used from another thread or
/// process while writers are active.
pub struct LogStore {
    path: PathBuf,
    table: String,
    conn: Connection,
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("path", &self.path)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl LogStore {
    /// Open the default table of the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Database`] if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> SinkResult<Self> {
        Self::open_table(path, DEFAULT_TABLE)
    }

    /// Open a specific table of the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::InvalidTable`] for a bad table name and
    /// [`SinkError::Database`] if the database cannot be opened.
    pub fn open_table(path: impl AsRef<Path>, table: &str) -> SinkResult<Self> {
        validate_table_name(table)?;
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| SinkError::Database {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self {
            path,
            table: table.to_string(),
            conn,
        };
        store
            .conn
            .busy_timeout(DEFAULT_BUSY_TIMEOUT)
            .map_err(|e| store.db_err(e))?;
        Ok(store)
    }

    /// Records matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Database`] if the query fails and
    /// [`SinkError::Decode`] if a row holds malformed data.
    pub fn query(&self, query: &LogQuery) -> SinkResult<Vec<StoredRecord>> {
        let (sql, args) = query.to_sql(&self.table);
        let mut stmt = self.conn.prepare(&sql).map_err(|e| self.db_err(e))?;
        let rows = stmt
            .query_map(params_from_iter(args), RawRow::read)
            .map_err(|e| self.db_err(e))?;

        rows.map(|row| row.map_err(|e| self.db_err(e))?.decode())
            .collect()
    }

    /// Every record, oldest first.
    ///
    /// # Errors
    ///
    /// See [`LogStore::query`].
    pub fn all(&self) -> SinkResult<Vec<StoredRecord>> {
        self.query(&LogQuery::new())
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Database`] if the count fails.
    pub fn count(&self) -> SinkResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let n: i64 = self
            .conn
            .query_row(&sql, [], |r| r.get(0))
            .map_err(|e| self.db_err(e))?;
        Ok(u64::try_from(n).unwrap_or_default())
    }

    /// Distinct logger names, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Database`] if the query fails.
    pub fn loggers(&self) -> SinkResult<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT logger_name FROM {} ORDER BY logger_name",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql).map_err(|e| self.db_err(e))?;
        let names = stmt
            .query_map([], |r| r.get(0))
            .map_err(|e| self.db_err(e))?
            .collect::<Result<Vec<String>, _>>()
            .map_err(|e| self.db_err(e))?;
        Ok(names)
    }

    fn db_err(&self, source: rusqlite::Error) -> SinkError {
        SinkError::Database {
            path: self.path.display().to_string(),
            source,
        }
    }
}

struct RawRow {
    id: i64,
    timestamp: String,
    level: String,
    logger: String,
    message: String,
    thread: Option<String>,
    exception: Option<String>,
    context: String,
    extra: String,
}

impl RawRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            level: row.get(2)?,
            logger: row.get(3)?,
            message: row.get(4)?,
            thread: row.get(5)?,
            exception: row.get(6)?,
            context: row.get(7)?,
            extra: row.get(8)?,
        })
    }

    fn decode(self) -> SinkResult<StoredRecord> {
        let id = self.id;
        let bad = |reason: String| SinkError::Decode { id, reason };

        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| bad(format!("timestamp: {e}")))?
            .with_timezone(&Utc);
        let level: Level = self.level.parse().map_err(|e| bad(format!("{e}")))?;
        let context: Fields =
            serde_json::from_str(&self.context).map_err(|e| bad(format!("context: {e}")))?;
        let extra: Fields =
            serde_json::from_str(&self.extra).map_err(|e| bad(format!("extra: {e}")))?;

        Ok(StoredRecord {
            id,
            record: LogRecord {
                timestamp,
                level,
                logger: self.logger,
                message: self.message,
                context,
                extra,
                thread: self.thread,
                exception: self.exception,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteSink;
    use loglama_core::{FieldValue, Sink, fields};
    use loglama_test::sample_record;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn seeded(dir: &tempfile::TempDir) -> (SqliteSink, LogStore) {
        let sink = SqliteSink::open(dir.path().join("logs.db")).unwrap();
        let mut api = sample_record(Level::Info, "request served");
        api.logger = "api".to_string();
        let mut db = sample_record(Level::Error, "connection lost")
            .with_field("attempt", 3)
            .with_context(fields! { "request_id" => "r-9" });
        db.logger = "db".to_string();
        let mut debug = sample_record(Level::Debug, "pool stats");
        debug.logger = "db".to_string();

        for record in [&api, &db, &debug] {
            sink.write(record).unwrap();
        }
        let store = LogStore::open(sink.path()).unwrap();
        (sink, store)
    }

    #[test]
    fn reads_back_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let (_sink, store) = seeded(&dir);

        let all = store.all().unwrap();
        assert_eq!(all.len(), 3);
        let lost = &all[1].record;
        assert_eq!(lost.level, Level::Error);
        assert_eq!(lost.extra["attempt"], FieldValue::Int(3));
        assert_eq!(lost.context["request_id"], FieldValue::from("r-9"));
        assert!(all[0].id < all[1].id);
    }

    #[test]
    fn filters_combine() {
        let dir = tempfile::tempdir().unwrap();
        let (_sink, store) = seeded(&dir);

        let db = store.query(&LogQuery::new().with_logger("db")).unwrap();
        assert_eq!(db.len(), 2);

        let serious = store
            .query(&LogQuery::new().with_min_level(Level::Warning))
            .unwrap();
        assert_eq!(serious.len(), 1);
        assert_eq!(serious[0].record.message, "connection lost");

        let served = store
            .query(&LogQuery::new().with_message_containing("served"))
            .unwrap();
        assert_eq!(served.len(), 1);
    }

    #[test]
    fn newest_first_with_limit() {
        let dir = tempfile::tempdir().unwrap();
        let (_sink, store) = seeded(&dir);

        let latest = store
            .query(&LogQuery::new().newest_first().with_limit(1))
            .unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].record.message, "pool stats");
    }

    #[test]
    fn count_and_loggers() {
        let dir = tempfile::tempdir().unwrap();
        let (_sink, store) = seeded(&dir);
        assert_eq!(store.count().unwrap(), 3);
        assert_eq!(store.loggers().unwrap(), vec!["api", "db"]);
    }

    #[test]
    fn missing_database_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LogStore::open(dir.path().join("absent.db")).unwrap_err();
        assert!(matches!(err, SinkError::Database { .. }));
    }

    #[test]
    fn reader_sees_rows_while_a_writer_is_active() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(SqliteSink::open(dir.path().join("logs.db")).unwrap());
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let sink = Arc::clone(&sink);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                for i in 0..200 {
                    sink.write(&sample_record(Level::Info, &format!("row {i}")))
                        .unwrap();
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let store = LogStore::open(sink.path()).unwrap();
        let mut last = 0;
        while !done.load(Ordering::SeqCst) {
            let seen = store.count().unwrap();
            assert!(seen >= last, "row count went backwards");
            last = seen;
        }
        writer.join().unwrap();
        assert_eq!(store.count().unwrap(), 200);
    }
}
