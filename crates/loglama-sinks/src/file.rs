//! Append-only file sink.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use loglama_core::{Formatter, JsonFormatter, LogRecord, Sink, SinkWriteError};
use tracing::debug;

use crate::error::{SinkError, SinkResult};

/// Appends one formatted record per line to a file.
///
/// The file is opened once, in append mode, when the sink is built and kept
/// open for the sink's lifetime. Every record is written with a single
/// `write_all` under the sink's lock and flushed before `write` returns, so
/// readers tailing the file only ever see whole lines.
#[derive(Debug)]
pub struct FileSink {
    name: String,
    path: PathBuf,
    formatter: Box<dyn Formatter>,
    file: Mutex<File>,
    sync_data: bool,
}

impl FileSink {
    /// Open `path` for JSON-line output, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the directory or file cannot be created.
    pub fn open(path: impl AsRef<Path>) -> SinkResult<Self> {
        Self::with_formatter(path, JsonFormatter)
    }

    /// Open `path` with a custom formatter.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the directory or file cannot be created.
    pub fn with_formatter(
        path: impl AsRef<Path>,
        formatter: impl Formatter + 'static,
    ) -> SinkResult<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| SinkError::Open {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(open_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_err)?;

        debug!(path = %path.display(), "opened file sink");

        Ok(Self {
            name: "file".to_string(),
            path,
            formatter: Box::new(formatter),
            file: Mutex::new(file),
            sync_data: false,
        })
    }

    /// Rename the sink (the default is `file`).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Also `fsync` file data after every record.
    #[must_use]
    pub fn sync_each_write(mut self, enabled: bool) -> Self {
        self.sync_data = enabled;
        self
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkWriteError> {
        let line = self.formatter.format(record);
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);

        file.write_all(&line)
            .and_then(|()| file.flush())
            .map_err(|e| SinkWriteError::new(&self.name, e))?;
        if self.sync_data {
            file.sync_data()
                .map_err(|e| SinkWriteError::new(&self.name, e))?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkWriteError> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sync_data()
            .map_err(|e| SinkWriteError::new(&self.name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loglama_core::{Level, PlainFormatter, fields};
    use loglama_test::{read_json_lines, sample_record};
    use std::sync::Arc;

    #[test]
    fn writes_one_json_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let sink = FileSink::open(&path).unwrap();

        sink.write(&sample_record(Level::Info, "first")).unwrap();
        sink.write(&sample_record(Level::Warning, "second")).unwrap();

        let lines = read_json_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["message"], "first");
        assert_eq!(lines[1]["level"], "WARNING");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("app.log");
        let sink = FileSink::open(&path).unwrap();
        sink.write(&sample_record(Level::Info, "hello")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn appends_to_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "{\"preexisting\":true}\n").unwrap();

        let sink = FileSink::open(&path).unwrap().sync_each_write(true);
        sink.write(&sample_record(Level::Info, "appended")).unwrap();

        let lines = read_json_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["preexisting"], true);
    }

    #[test]
    fn open_fails_for_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSink::open(dir.path()).unwrap_err();
        assert!(matches!(err, SinkError::Open { .. }));
    }

    #[test]
    fn plain_formatter_writes_text_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.txt");
        let sink =
            FileSink::with_formatter(&path, PlainFormatter::new().without_timestamps()).unwrap();

        let record = sample_record(Level::Error, "failed").with_context(fields! { "job" => 7 });
        sink.write(&record).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "ERROR    [test] failed context.job=7\n");
    }

    #[test]
    fn concurrent_writers_never_interleave_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let sink = Arc::new(FileSink::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let record = sample_record(Level::Info, &format!("t{t}-{i}"))
                            .with_field("payload", "x".repeat(512));
                        sink.write(&record).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let lines = read_json_lines(&path);
        assert_eq!(lines.len(), 400);
    }
}
