//! Record filters run by a logger before delivery.

use crate::context;
use crate::level::Level;
use crate::record::LogRecord;

/// A hook that sees every record passing a logger's level threshold.
///
/// Filters run in attachment order. Each may augment the record; returning
/// `false` drops the record for every sink of that logger.
pub trait Filter: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Inspect or augment `record`. Return whether it should be delivered.
    fn apply(&self, record: &mut LogRecord) -> bool;
}

/// Attaches the calling strand's context to each record.
///
/// Entries already present in [`LogRecord::context`] were set explicitly for
/// this call and win over ambient entries with the same key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextFilter;

impl ContextFilter {
    /// Create the filter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Filter for ContextFilter {
    fn name(&self) -> &'static str {
        "context"
    }

    fn apply(&self, record: &mut LogRecord) -> bool {
        let mut merged = context::current();
        if merged.is_empty() {
            return true;
        }
        merged.extend(std::mem::take(&mut record.context));
        record.context = merged;
        true
    }
}

/// Drops records below a minimum level.
///
/// Useful when one logger's threshold is low but a particular filter chain
/// should only pass severe records.
#[derive(Debug, Clone, Copy)]
pub struct LevelFloor {
    min: Level,
}

impl LevelFloor {
    /// Pass only records at `min` or above.
    #[must_use]
    pub fn new(min: Level) -> Self {
        Self { min }
    }
}

impl Filter for LevelFloor {
    fn name(&self) -> &'static str {
        "level_floor"
    }

    fn apply(&self, record: &mut LogRecord) -> bool {
        record.level >= self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::with_context;
    use crate::fields;
    use crate::value::FieldValue;

    #[test]
    fn context_filter_attaches_current_context() {
        let _g = with_context(fields! { "user_id" => "123", "action" => "login" });
        let mut record = LogRecord::new(Level::Info, "auth", "User logged in");

        assert!(ContextFilter.apply(&mut record));
        assert_eq!(
            record.context,
            fields! { "user_id" => "123", "action" => "login" }
        );
    }

    #[test]
    fn explicit_context_entries_win() {
        let _g = with_context(fields! { "user_id" => "ambient", "tenant" => "acme" });
        let mut record = LogRecord::new(Level::Info, "auth", "override")
            .with_context(fields! { "user_id" => "explicit" });

        ContextFilter.apply(&mut record);
        assert_eq!(record.context["user_id"], FieldValue::from("explicit"));
        assert_eq!(record.context["tenant"], FieldValue::from("acme"));
    }

    #[test]
    fn no_context_leaves_record_untouched() {
        let mut record = LogRecord::new(Level::Info, "sys", "System check");
        ContextFilter.apply(&mut record);
        assert!(record.context.is_empty());
    }

    #[test]
    fn context_does_not_touch_extra_fields() {
        let _g = with_context(fields! { "query" => "ambient" });
        let mut record = LogRecord::new(Level::Info, "search", "run").with_field("query", "explicit");

        ContextFilter.apply(&mut record);
        assert_eq!(record.extra["query"], FieldValue::from("explicit"));
        assert_eq!(record.context["query"], FieldValue::from("ambient"));
    }

    #[test]
    fn level_floor_drops_lower_records() {
        let floor = LevelFloor::new(Level::Error);
        assert!(!floor.apply(&mut LogRecord::new(Level::Warning, "x", "m")));
        assert!(floor.apply(&mut LogRecord::new(Level::Critical, "x", "m")));
    }
}
