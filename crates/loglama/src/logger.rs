//! The named logger facade.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use loglama_core::{Fields, Filter, Level, LogRecord, Sink};
use tracing::{trace, warn};

/// Filters and sinks attached to a logger.
///
/// Replaced whole on every change so emitters holding the previous `Arc`
/// keep a consistent view.
#[derive(Clone, Default)]
pub(crate) struct Attachments {
    pub(crate) filters: Vec<Arc<dyn Filter>>,
    pub(crate) sinks: Vec<Arc<dyn Sink>>,
}

/// A named entry point with a level threshold, ordered filters and ordered
/// sinks.
///
/// Loggers are shared: obtain them with [`get_logger`](crate::get_logger)
/// and call them from any thread. Emitting never fails or unwinds into the
/// caller. A sink that errors or panics is skipped for that record, counted
/// in [`Logger::failed_writes`] and reported through `tracing`; a panicking
/// filter is skipped and the record continues.
pub struct Logger {
    name: String,
    level: AtomicU8,
    attachments: RwLock<Arc<Attachments>>,
    failed_writes: AtomicU64,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let attachments = self.attachments();
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("filters", &attachments.filters.len())
            .field("sinks", &self.sink_names())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Create an unregistered logger at `INFO` with nothing attached.
    ///
    /// Most code wants [`get_logger`](crate::get_logger) instead.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: AtomicU8::new(Level::Info.number()),
            attachments: RwLock::new(Arc::new(Attachments::default())),
            failed_writes: AtomicU64::new(0),
        }
    }

    /// The logger's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current threshold.
    #[must_use]
    pub fn level(&self) -> Level {
        Level::from_number(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Change the threshold.
    pub fn set_level(&self, level: Level) {
        self.level.store(level.number(), Ordering::Relaxed);
    }

    /// Whether a record at `level` would be processed.
    #[must_use]
    pub fn is_enabled_for(&self, level: Level) -> bool {
        level.number() >= self.level.load(Ordering::Relaxed)
    }

    /// Append a filter; filters run in the order they were added.
    pub fn add_filter(&self, filter: impl Filter + 'static) {
        self.update(|a| a.filters.push(Arc::new(filter)));
    }

    /// Remove every filter.
    pub fn clear_filters(&self) {
        self.update(|a| a.filters.clear());
    }

    /// Append a sink; sinks receive records in the order they were added.
    pub fn add_sink(&self, sink: impl Sink + 'static) {
        self.update(|a| a.sinks.push(Arc::new(sink)));
    }

    /// Detach every sink called `name`. Returns how many were removed.
    pub fn remove_sink(&self, name: &str) -> usize {
        let mut removed = 0;
        self.update(|a| {
            let before = a.sinks.len();
            a.sinks.retain(|s| s.name() != name);
            removed = before.saturating_sub(a.sinks.len());
        });
        removed
    }

    /// Detach every sink.
    pub fn clear_sinks(&self) {
        self.update(|a| a.sinks.clear());
    }

    /// Names of the attached sinks, in delivery order.
    #[must_use]
    pub fn sink_names(&self) -> Vec<String> {
        self.attachments()
            .sinks
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Number of sink writes that failed since the logger was created.
    #[must_use]
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes.load(Ordering::Relaxed)
    }

    /// Flush every attached sink, reporting failures like write failures.
    pub fn flush(&self) {
        for sink in &self.attachments().sinks {
            if let Err(e) = sink.flush() {
                self.failed_writes.fetch_add(1, Ordering::Relaxed);
                warn!(logger = %self.name, sink = %e.sink, error = %e, "sink flush failed");
            }
        }
    }

    /// Emit `message` at `level` with per-call `extra` fields.
    pub fn emit(&self, level: Level, message: impl Into<String>, extra: Fields) {
        if !self.is_enabled_for(level) {
            return;
        }
        self.dispatch(LogRecord::new(level, self.name.as_str(), message).with_extra(extra));
    }

    /// Emit a record built by the caller.
    ///
    /// The logger name is overwritten with this logger's. Context entries
    /// already on the record take precedence over the ambient context.
    pub fn log_record(&self, mut record: LogRecord) {
        if !self.is_enabled_for(record.level) {
            return;
        }
        record.logger.clone_from(&self.name);
        self.dispatch(record);
    }

    /// Emit at `DEBUG`.
    pub fn debug(&self, message: impl Into<String>) {
        self.emit(Level::Debug, message, Fields::new());
    }

    /// Emit at `INFO`.
    pub fn info(&self, message: impl Into<String>) {
        self.emit(Level::Info, message, Fields::new());
    }

    /// Emit at `WARNING`.
    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Level::Warning, message, Fields::new());
    }

    /// Emit at `ERROR`.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Level::Error, message, Fields::new());
    }

    /// Emit at `CRITICAL`.
    pub fn critical(&self, message: impl Into<String>) {
        self.emit(Level::Critical, message, Fields::new());
    }

    /// Emit at `DEBUG` with extra fields.
    pub fn debug_with(&self, message: impl Into<String>, extra: Fields) {
        self.emit(Level::Debug, message, extra);
    }

    /// Emit at `INFO` with extra fields.
    pub fn info_with(&self, message: impl Into<String>, extra: Fields) {
        self.emit(Level::Info, message, extra);
    }

    /// Emit at `WARNING` with extra fields.
    pub fn warning_with(&self, message: impl Into<String>, extra: Fields) {
        self.emit(Level::Warning, message, extra);
    }

    /// Emit at `ERROR` with extra fields.
    pub fn error_with(&self, message: impl Into<String>, extra: Fields) {
        self.emit(Level::Error, message, extra);
    }

    /// Emit at `CRITICAL` with extra fields.
    pub fn critical_with(&self, message: impl Into<String>, extra: Fields) {
        self.emit(Level::Critical, message, extra);
    }

    /// Emit at `ERROR` with the rendered chain of `error` attached.
    pub fn exception(&self, message: impl Into<String>, error: &(dyn std::error::Error + 'static)) {
        if !self.is_enabled_for(Level::Error) {
            return;
        }
        self.dispatch(LogRecord::new(Level::Error, self.name.as_str(), message).with_error(error));
    }

    /// Swap in a new attachment set in one step.
    pub(crate) fn replace(&self, attachments: Attachments) {
        *self
            .attachments
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(attachments);
    }

    fn attachments(&self) -> Arc<Attachments> {
        Arc::clone(
            &self
                .attachments
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    fn update(&self, change: impl FnOnce(&mut Attachments)) {
        let mut slot = self
            .attachments
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut next = Attachments::clone(&slot);
        change(&mut next);
        *slot = Arc::new(next);
    }

    fn dispatch(&self, mut record: LogRecord) {
        let attachments = self.attachments();

        for filter in &attachments.filters {
            match catch_unwind(AssertUnwindSafe(|| filter.apply(&mut record))) {
                Ok(true) => {},
                Ok(false) => {
                    trace!(logger = %self.name, filter = filter.name(), "record dropped by filter");
                    return;
                },
                Err(payload) => {
                    warn!(
                        logger = %self.name,
                        filter = filter.name(),
                        panic = panic_message(payload.as_ref()),
                        "filter panicked, skipping it"
                    );
                },
            }
        }

        for sink in &attachments.sinks {
            match catch_unwind(AssertUnwindSafe(|| sink.write(&record))) {
                Ok(Ok(())) => {},
                Ok(Err(e)) => {
                    self.failed_writes.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        logger = %self.name,
                        sink = %e.sink,
                        error = %e,
                        "dropped record for failing sink"
                    );
                },
                Err(payload) => {
                    self.failed_writes.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        logger = %self.name,
                        sink = sink.name(),
                        panic = panic_message(payload.as_ref()),
                        "sink panicked while writing"
                    );
                },
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
