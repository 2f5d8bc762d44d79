//! The log record shared by filters, formatters and sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::level::Level;
use crate::value::{FieldValue, Fields};

/// A single emitted log event.
///
/// Built once per emission, augmented by the filter stage (which fills
/// [`LogRecord::context`]) and read-only from then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// When the record was created.
    #[serde(with = "timestamp_millis")]
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: Level,
    /// Name of the logger that emitted the record.
    pub logger: String,
    /// Human-readable message.
    pub message: String,
    /// Context snapshot attached by the context filter.
    #[serde(default)]
    pub context: Fields,
    /// Per-call structured fields.
    #[serde(default)]
    pub extra: Fields,
    /// Name of the emitting thread, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
    /// Rendered error chain for records emitted with an error attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

impl LogRecord {
    /// Create a record stamped with the current time and thread.
    #[must_use]
    pub fn new(level: Level, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            logger: logger.into(),
            message: message.into(),
            context: Fields::new(),
            extra: Fields::new(),
            thread: std::thread::current().name().map(ToOwned::to_owned),
            exception: None,
        }
    }

    /// Replace the extra fields.
    #[must_use]
    pub fn with_extra(mut self, extra: Fields) -> Self {
        self.extra = extra;
        self
    }

    /// Add one extra field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Set context entries explicitly for this record. These take precedence
    /// over ambient context with the same key when the context filter runs.
    #[must_use]
    pub fn with_context(mut self, context: Fields) -> Self {
        self.context = context;
        self
    }

    /// Attach the rendered chain of an error and its sources.
    #[must_use]
    pub fn with_error(mut self, error: &(dyn std::error::Error + 'static)) -> Self {
        self.exception = Some(render_error_chain(error));
        self
    }

    /// Fix the timestamp (tests and replays).
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Timestamp as written by every sink: RFC 3339, millisecond precision, UTC.
    #[must_use]
    pub fn timestamp_string(&self) -> String {
        timestamp_millis::render(&self.timestamp)
    }
}

/// Render `error: cause: cause` for an error and its `source()` chain.
#[must_use]
pub fn render_error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

mod timestamp_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn render(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub(super) fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&render(ts))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
