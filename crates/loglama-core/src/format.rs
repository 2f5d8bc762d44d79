//! Record formatters.
//!
//! Formatting never fails and never mutates the record. Values JSON cannot
//! hold are rendered as strings instead.

use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::error::CoreResult;
use crate::record::LogRecord;
use crate::value::{FieldValue, Fields, fields_to_json};

/// Turns a record into the bytes a sink writes, including the trailing
/// newline.
pub trait Formatter: Send + Sync + std::fmt::Debug {
    /// Render one record.
    fn format(&self, record: &LogRecord) -> Vec<u8>;
}

/// One self-contained JSON object per line.
///
/// ```json
/// {"timestamp":"2026-03-01T12:30:05.123Z","level":"INFO","logger":"auth",
///  "message":"User logged in","context":{"user_id":"123"},"extra":{}}
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create the formatter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build the JSON object for a record without serializing it.
    #[must_use]
    pub fn to_value(record: &LogRecord) -> Value {
        let mut obj = Map::new();
        obj.insert("timestamp".into(), Value::String(record.timestamp_string()));
        obj.insert("level".into(), Value::String(record.level.as_str().into()));
        obj.insert("logger".into(), Value::String(record.logger.clone()));
        obj.insert("message".into(), Value::String(record.message.clone()));
        obj.insert("context".into(), fields_to_json(&record.context));
        obj.insert("extra".into(), fields_to_json(&record.extra));
        if let Some(thread) = &record.thread {
            obj.insert("thread".into(), Value::String(thread.clone()));
        }
        if let Some(exception) = &record.exception {
            obj.insert("exception".into(), Value::String(exception.clone()));
        }
        Value::Object(obj)
    }

    /// Parse one line written by this formatter.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedRecord`](crate::CoreError::MalformedRecord)
    /// if the line is not a record object.
    pub fn parse(line: &str) -> CoreResult<LogRecord> {
        Ok(serde_json::from_str(line.trim_end())?)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> Vec<u8> {
        // A `Value` built from strings and coerced fields always serializes.
        let mut line = serde_json::to_vec(&Self::to_value(record)).unwrap_or_default();
        line.push(b'\n');
        line
    }
}

/// Human-readable single line:
/// `<timestamp> <LEVEL> [<logger>] <message> k=v .. context.k=v ..`.
///
/// Extra fields and context entries are each sorted by key, so output is
/// reproducible. Context keys are prefixed with `context.` to keep them
/// apart from extra fields of the same name.
#[derive(Debug, Clone, Copy)]
pub struct PlainFormatter {
    timestamps: bool,
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self { timestamps: true }
    }
}

impl PlainFormatter {
    /// Create the formatter with timestamps enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Omit the leading timestamp.
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    /// Render without the trailing newline.
    #[must_use]
    pub fn render(&self, record: &LogRecord) -> String {
        let mut line = String::with_capacity(96);
        if self.timestamps {
            line.push_str(&record.timestamp_string());
            line.push(' ');
        }
        let _ = write!(
            line,
            "{:<8} [{}] {}",
            record.level.as_str(),
            record.logger,
            record.message
        );
        append_pairs(&mut line, "", &record.extra);
        append_pairs(&mut line, "context.", &record.context);
        if let Some(exception) = &record.exception {
            let _ = write!(line, " exception={}", quote_if_needed(exception));
        }
        line
    }
}

impl Formatter for PlainFormatter {
    fn format(&self, record: &LogRecord) -> Vec<u8> {
        let mut line = self.render(record).into_bytes();
        line.push(b'\n');
        line
    }
}

fn append_pairs(line: &mut String, prefix: &str, fields: &Fields) {
    for (key, value) in fields {
        let _ = write!(line, " {prefix}{key}={}", render_value(value));
    }
}

fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Str(s) => quote_if_needed(s),
        other => other.to_string(),
    }
}

fn quote_if_needed(s: &str) -> String {
    if s.is_empty() || s.contains(|c: char| c.is_whitespace() || c == '"' || c == '=') {
        format!("{s:?}")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use crate::level::Level;
    use chrono::{TimeZone, Utc};

    fn sample() -> LogRecord {
        LogRecord::new(Level::Warning, "search", "Search results limited")
            .at(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
            .with_extra(fields! { "query" => "python logging", "limit" => 10 })
            .with_context(fields! { "user_id" => "456", "action" => "search" })
    }

    #[test]
    fn json_line_round_trips() {
        let record = sample();
        let bytes = JsonFormatter.format(&record);
        assert_eq!(bytes.last(), Some(&b'\n'));

        let line = String::from_utf8(bytes).unwrap();
        let parsed = JsonFormatter::parse(&line).unwrap();
        assert_eq!(parsed.logger, record.logger);
        assert_eq!(parsed.level, record.level);
        assert_eq!(parsed.message, record.message);
        assert_eq!(parsed.context, record.context);
        assert_eq!(parsed.extra, record.extra);
        assert_eq!(parsed.timestamp, record.timestamp);
    }

    #[test]
    fn json_line_is_a_single_line() {
        let record = LogRecord::new(Level::Info, "x", "multi\nline\nmessage");
        let line = String::from_utf8(JsonFormatter.format(&record)).unwrap();
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn json_uses_documented_field_names() {
        let value = JsonFormatter::to_value(&sample());
        assert_eq!(value["level"], "WARNING");
        assert_eq!(value["logger"], "search");
        assert_eq!(value["extra"]["query"], "python logging");
        assert_eq!(value["context"]["user_id"], "456");
        assert_eq!(value["timestamp"], "2026-03-01T12:00:00.000Z");
    }

    #[test]
    fn json_coerces_non_finite_numbers() {
        let record = LogRecord::new(Level::Info, "m", "ratio").with_field("ratio", f64::NAN);
        let line = String::from_utf8(JsonFormatter.format(&record)).unwrap();
        let parsed = JsonFormatter::parse(&line).unwrap();
        assert_eq!(parsed.extra["ratio"], FieldValue::from("NaN"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(JsonFormatter::parse("not json").is_err());
        assert!(JsonFormatter::parse("{\"level\":\"INFO\"}").is_err());
    }

    #[test]
    fn plain_sorts_and_namespaces_context() {
        let line = PlainFormatter::new().without_timestamps().render(&sample());
        assert_eq!(
            line,
            "WARNING  [search] Search results limited limit=10 query=\"python logging\" \
             context.action=search context.user_id=456"
        );
    }

    #[test]
    fn plain_omits_empty_context() {
        let record = LogRecord::new(Level::Info, "sys", "System check");
        let line = PlainFormatter::new().without_timestamps().render(&record);
        assert_eq!(line, "INFO     [sys] System check");
    }

    #[test]
    fn plain_includes_timestamp_by_default() {
        let line = PlainFormatter::new().render(&sample());
        assert!(line.starts_with("2026-03-01T12:00:00.000Z WARNING"));
    }

    #[test]
    fn formatting_does_not_mutate() {
        let record = sample();
        let before = record.clone();
        let _ = JsonFormatter.format(&record);
        let _ = PlainFormatter::new().format(&record);
        assert_eq!(record, before);
    }
}
