//! Mock sinks and filters for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use loglama_core::{Filter, LogRecord, Sink, SinkWriteError};

/// Sink that keeps every record in memory.
///
/// Clones share storage, so a test can keep one handle and give the other
/// to a logger.
#[derive(Debug, Clone)]
pub struct MemorySink {
    name: String,
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every record written so far.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages of every record written so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    /// Number of records written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkWriteError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

/// Sink whose writes always fail.
#[derive(Debug, Clone)]
pub struct FailingSink {
    name: String,
    attempts: Arc<AtomicUsize>,
}

impl FailingSink {
    /// Create a failing sink.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many writes were attempted.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Sink for FailingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, _record: &LogRecord) -> Result<(), SinkWriteError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkWriteError::new(
            &self.name,
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "destination went away"),
        ))
    }
}

/// Sink whose writes panic instead of returning an error.
#[derive(Debug, Clone)]
pub struct PanickingSink {
    name: String,
}

impl PanickingSink {
    /// Create a panicking sink.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Sink for PanickingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkWriteError> {
        panic!("{} refused record: {}", self.name, record.message);
    }
}

/// Filter that panics on every record.
#[derive(Debug, Clone)]
pub struct PanickingFilter {
    name: String,
}

impl PanickingFilter {
    /// Create a panicking filter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Filter for PanickingFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, _record: &mut LogRecord) -> bool {
        panic!("{} blew up", self.name);
    }
}

/// Filter that remembers the records it saw and optionally drops them.
#[derive(Debug, Clone)]
pub struct RecordingFilter {
    name: String,
    keep: bool,
    seen: Arc<Mutex<Vec<LogRecord>>>,
}

impl RecordingFilter {
    /// A filter that passes records through.
    #[must_use]
    pub fn passing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keep: true,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A filter that drops every record.
    #[must_use]
    pub fn dropping(name: impl Into<String>) -> Self {
        Self {
            keep: false,
            ..Self::passing(name)
        }
    }

    /// Records the filter was applied to, as they looked on arrival.
    #[must_use]
    pub fn seen(&self) -> Vec<LogRecord> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Filter for RecordingFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut LogRecord) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        self.keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_record;
    use loglama_core::Level;

    #[test]
    fn memory_sink_clones_share_storage() {
        let sink = MemorySink::new("mem");
        let handle = sink.clone();
        sink.write(&sample_record(Level::Info, "one")).unwrap();
        assert_eq!(handle.messages(), vec!["one"]);
        assert!(!handle.is_empty());
    }

    #[test]
    fn failing_sink_counts_attempts() {
        let sink = FailingSink::new("broken");
        assert!(sink.write(&sample_record(Level::Info, "x")).is_err());
        assert!(sink.write(&sample_record(Level::Info, "y")).is_err());
        assert_eq!(sink.attempts(), 2);
    }

    #[test]
    fn recording_filter_can_drop() {
        let filter = RecordingFilter::dropping("drop-all");
        let mut record = sample_record(Level::Info, "x");
        assert!(!filter.apply(&mut record));
        assert_eq!(filter.seen().len(), 1);
    }

    #[test]
    fn panicking_sink_panics() {
        let sink = PanickingSink::new("bomb");
        let result = std::panic::catch_unwind(|| sink.write(&sample_record(Level::Info, "x")));
        assert!(result.is_err());
    }
}
