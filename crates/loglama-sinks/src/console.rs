//! Console sink.

use std::io::Write;

use loglama_core::{Formatter, LogRecord, PlainFormatter, Sink, SinkWriteError};

/// Which standard stream a [`ConsoleSink`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleStream {
    /// Standard error.
    #[default]
    Stderr,
    /// Standard output.
    Stdout,
}

/// Writes formatted records to stderr (or stdout).
///
/// Each record goes out with a single locked `write_all`, so lines from
/// concurrent loggers do not interleave.
#[derive(Debug)]
pub struct ConsoleSink {
    name: String,
    stream: ConsoleStream,
    formatter: Box<dyn Formatter>,
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSink {
    /// Plain text on stderr.
    #[must_use]
    pub fn new() -> Self {
        Self::with_formatter(PlainFormatter::new())
    }

    /// Custom formatter on stderr.
    #[must_use]
    pub fn with_formatter(formatter: impl Formatter + 'static) -> Self {
        Self {
            name: "console".to_string(),
            stream: ConsoleStream::Stderr,
            formatter: Box::new(formatter),
        }
    }

    /// Write to `stream` instead.
    #[must_use]
    pub fn on(mut self, stream: ConsoleStream) -> Self {
        self.stream = stream;
        self
    }

    /// Rename the sink (the default is `console`).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The stream this sink writes to.
    #[must_use]
    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkWriteError> {
        let line = self.formatter.format(record);
        let result = match self.stream {
            ConsoleStream::Stderr => std::io::stderr().lock().write_all(&line),
            ConsoleStream::Stdout => std::io::stdout().lock().write_all(&line),
        };
        result.map_err(|e| SinkWriteError::new(&self.name, e))
    }

    fn flush(&self) -> Result<(), SinkWriteError> {
        let result = match self.stream {
            ConsoleStream::Stderr => std::io::stderr().flush(),
            ConsoleStream::Stdout => std::io::stdout().flush(),
        };
        result.map_err(|e| SinkWriteError::new(&self.name, e))
    }
}
