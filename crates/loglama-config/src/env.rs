//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only fill fields that no
//! config file set.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{SetFields, set_path};

#[derive(Clone, Copy)]
enum Kind {
    Str,
    Bool,
    Int,
}

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: Kind,
}

/// All supported `LOGLAMA_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "LOGLAMA_NAME",
        field_path: "logging.name",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "LOGLAMA_LEVEL",
        field_path: "logging.level",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "LOGLAMA_FILE",
        field_path: "logging.file",
        kind: Kind::Bool,
    },
    EnvMapping {
        var_name: "LOGLAMA_FILE_PATH",
        field_path: "logging.file_path",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "LOGLAMA_JSON_FORMAT",
        field_path: "logging.json_format",
        kind: Kind::Bool,
    },
    EnvMapping {
        var_name: "LOGLAMA_FSYNC",
        field_path: "logging.fsync",
        kind: Kind::Bool,
    },
    EnvMapping {
        var_name: "LOGLAMA_CONTEXT_FILTER",
        field_path: "logging.context_filter",
        kind: Kind::Bool,
    },
    EnvMapping {
        var_name: "LOGLAMA_CONSOLE",
        field_path: "logging.console",
        kind: Kind::Bool,
    },
    EnvMapping {
        var_name: "LOGLAMA_DB_PATH",
        field_path: "logging.db_path",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "LOGLAMA_DB_TABLE",
        field_path: "logging.db_table",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "LOGLAMA_DB_BUSY_TIMEOUT_MS",
        field_path: "logging.db_busy_timeout_ms",
        kind: Kind::Int,
    },
];

/// Apply environment variable fallbacks to fields that were **not** set by
/// a config file.
///
/// Returns the number of env vars applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a boolean or integer variable does
/// not parse.
pub(crate) fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    set: &mut SetFields,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if set.contains(mapping.field_path) {
            continue;
        }
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        let value = coerce(mapping, raw)?;
        set_path(merged, mapping.field_path, value);
        set.insert(mapping.field_path.to_owned());
        count = count.saturating_add(1);
    }

    Ok(count)
}

fn coerce(mapping: &EnvMapping, raw: &str) -> ConfigResult<toml::Value> {
    let invalid = |expected: &str| ConfigError::EnvError {
        var_name: mapping.var_name.to_owned(),
        message: format!("expected {expected}, got '{raw}'"),
    };

    match mapping.kind {
        Kind::Str => Ok(toml::Value::String(raw.to_owned())),
        Kind::Bool => parse_bool(raw)
            .map(toml::Value::Boolean)
            .ok_or_else(|| invalid("a boolean")),
        Kind::Int => raw
            .trim()
            .parse::<i64>()
            .map(toml::Value::Integer)
            .map_err(|_| invalid("an integer")),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Collect all current environment variables into a map.
#[must_use]
pub(crate) fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn empty() -> toml::Value {
        toml::Value::Table(toml::map::Map::new())
    }

    #[test]
    fn fills_unset_fields_with_typed_values() {
        let mut merged = empty();
        let mut set = SetFields::new();
        let env = make_env(&[
            ("LOGLAMA_LEVEL", "DEBUG"),
            ("LOGLAMA_FILE", "yes"),
            ("LOGLAMA_DB_BUSY_TIMEOUT_MS", "250"),
        ]);

        let applied = apply_env_fallbacks(&mut merged, &mut set, &env).unwrap();

        assert_eq!(applied, 3);
        assert_eq!(merged["logging"]["level"].as_str(), Some("DEBUG"));
        assert_eq!(merged["logging"]["file"].as_bool(), Some(true));
        assert_eq!(
            merged["logging"]["db_busy_timeout_ms"].as_integer(),
            Some(250)
        );
    }

    #[test]
    fn file_values_win_over_env() {
        let mut merged = empty();
        set_path(&mut merged, "logging.level", toml::Value::String("ERROR".into()));
        let mut set = SetFields::from(["logging.level".to_string()]);
        let env = make_env(&[("LOGLAMA_LEVEL", "DEBUG")]);

        let applied = apply_env_fallbacks(&mut merged, &mut set, &env).unwrap();

        assert_eq!(applied, 0);
        assert_eq!(merged["logging"]["level"].as_str(), Some("ERROR"));
    }

    #[test]
    fn bad_boolean_is_reported() {
        let mut merged = empty();
        let mut set = SetFields::new();
        let env = make_env(&[("LOGLAMA_CONSOLE", "maybe")]);

        let err = apply_env_fallbacks(&mut merged, &mut set, &env).unwrap_err();
        assert!(matches!(err, ConfigError::EnvError { ref var_name, .. } if var_name == "LOGLAMA_CONSOLE"));
    }

    #[test]
    fn unrelated_vars_are_ignored() {
        let mut merged = empty();
        let mut set = SetFields::new();
        let env = make_env(&[("PATH", "/usr/bin"), ("LOGLAMA_UNKNOWN", "x")]);
        assert_eq!(
            apply_env_fallbacks(&mut merged, &mut set, &env).unwrap(),
            0
        );
    }
}
