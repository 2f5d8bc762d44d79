//! Table name checks shared by configuration and the `SQLite` sinks.
//!
//! Table names end up interpolated into SQL text, so only plain identifiers
//! that `SQLite` accepts unquoted are allowed.

use crate::error::{CoreError, CoreResult};

/// Words `SQLite` reserves; none of them may name a table unquoted.
const SQLITE_KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ALWAYS", "ANALYZE", "AND", "AS", "ASC",
    "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST",
    "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS",
    "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT",
    "DEFERRABLE", "DEFERRED", "DELETE", "DESC", "DETACH", "DISTINCT", "DO", "DROP", "EACH",
    "ELSE", "END", "ESCAPE", "EXCEPT", "EXCLUDE", "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL",
    "FILTER", "FIRST", "FOLLOWING", "FOR", "FOREIGN", "FROM", "FULL", "GENERATED", "GLOB",
    "GROUP", "GROUPS", "HAVING", "IF", "IGNORE", "IMMEDIATE", "IN", "INDEX", "INDEXED",
    "INITIALLY", "INNER", "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN", "KEY",
    "LAST", "LEFT", "LIKE", "LIMIT", "MATCH", "MATERIALIZED", "NATURAL", "NO", "NOT", "NOTHING",
    "NOTNULL", "NULL", "NULLS", "OF", "OFFSET", "ON", "OR", "ORDER", "OTHERS", "OUTER", "OVER",
    "PARTITION", "PLAN", "PRAGMA", "PRECEDING", "PRIMARY", "QUERY", "RAISE", "RANGE",
    "RECURSIVE", "REFERENCES", "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE", "RESTRICT",
    "RETURNING", "RIGHT", "ROLLBACK", "ROW", "ROWS", "SAVEPOINT", "SELECT", "SET", "TABLE",
    "TEMP", "TEMPORARY", "THEN", "TIES", "TO", "TRANSACTION", "TRIGGER", "UNBOUNDED", "UNION",
    "UNIQUE", "UPDATE", "USING", "VACUUM", "VALUES", "VIEW", "VIRTUAL", "WHEN", "WHERE",
    "WINDOW", "WITH", "WITHOUT",
];

/// Check that `name` can be used as a table name without quoting.
///
/// # Errors
///
/// Returns [`CoreError::InvalidTableName`] if `name` is empty, contains
/// anything but ASCII letters, digits and underscores, starts with a digit,
/// is an `SQLite` keyword or uses the reserved `sqlite_` prefix.
pub fn check_table_name(name: &str) -> CoreResult<()> {
    let invalid = |reason: &'static str| CoreError::InvalidTableName {
        name: name.to_string(),
        reason,
    };

    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !plain {
        return Err(invalid(
            "use letters, digits and underscores, not starting with a digit",
        ));
    }
    if SQLITE_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name)) {
        return Err(invalid("it is an SQL keyword"));
    }
    if name
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("sqlite_"))
    {
        return Err(invalid("the sqlite_ prefix is reserved"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_pass() {
        for good in ["logs", "_logs_2", "App_Logs", "selected", "tables"] {
            assert!(check_table_name(good).is_ok(), "{good}");
        }
    }

    #[test]
    fn punctuation_and_leading_digits_fail() {
        for bad in ["", "1logs", "logs; DROP TABLE x", "my-logs", "lo gs", "lögs"] {
            assert!(check_table_name(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn keywords_fail_in_any_case() {
        for bad in ["table", "SELECT", "Order", "index", "values"] {
            assert!(matches!(
                check_table_name(bad),
                Err(CoreError::InvalidTableName { reason, .. }) if reason.contains("keyword")
            ));
        }
    }

    #[test]
    fn reserved_prefix_fails() {
        assert!(check_table_name("sqlite_master").is_err());
        assert!(check_table_name("SQLITE_logs").is_err());
        assert!(check_table_name("sqlite").is_ok());
    }
}
