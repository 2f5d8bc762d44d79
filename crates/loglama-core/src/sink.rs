//! The destination side of a logger.

use thiserror::Error;

use crate::record::LogRecord;

/// A failed write to one sink.
///
/// Loggers contain these: the record is dropped for that sink only and the
/// failure is reported on the diagnostics channel.
#[derive(Debug, Error)]
#[error("sink '{sink}' failed to write: {source}")]
pub struct SinkWriteError {
    /// Name of the sink that failed.
    pub sink: String,
    /// Underlying failure.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl SinkWriteError {
    /// Wrap `source` as a write failure of `sink`.
    pub fn new(
        sink: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            sink: sink.into(),
            source: source.into(),
        }
    }
}

/// A durable (or at least external) destination for finished records.
///
/// Implementations must be safe to call from many threads at once and must
/// keep already-written data intact when a write fails.
pub trait Sink: Send + Sync + std::fmt::Debug {
    /// Name used for diagnostics and for detaching the sink from a logger.
    fn name(&self) -> &str;

    /// Persist one record.
    ///
    /// # Errors
    ///
    /// Returns [`SinkWriteError`] if the underlying target rejects the write.
    fn write(&self, record: &LogRecord) -> Result<(), SinkWriteError>;

    /// Push buffered data to the target. Sinks that write through have
    /// nothing to do.
    ///
    /// # Errors
    ///
    /// Returns [`SinkWriteError`] if the flush fails.
    fn flush(&self) -> Result<(), SinkWriteError> {
        Ok(())
    }
}
