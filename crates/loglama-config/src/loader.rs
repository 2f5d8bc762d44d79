//! Layered loading.
//!
//! 1. Parse the embedded `defaults.toml`
//! 2. Merge the config file, if any, tracking which fields it set
//! 3. Fill unset fields from `LOGLAMA_*` environment variables
//! 4. Deserialize and validate

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{SetFields, deep_merge_tracking};
use crate::types::{ConfigFile, LoggingConfig};
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Load configuration from `path` (if given) and the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed, an
/// environment variable is malformed, or the result fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<LoggingConfig> {
    load_with_env(path, &collect_env_vars())
}

/// Like [`load`], with an explicit environment.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env<S: ::std::hash::BuildHasher>(
    path: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<LoggingConfig> {
    let overlay = match path {
        Some(path) => Some((read_file(path)?, path.display().to_string())),
        None => None,
    };
    build(overlay, env_vars)
}

/// Parse configuration from a TOML string layered over the defaults.
/// The environment is not consulted.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the text does not parse or validate.
pub fn from_toml_str(text: &str) -> ConfigResult<LoggingConfig> {
    let overlay = parse(text, "<string>")?;
    build(Some((overlay, "<string>".to_owned())), &HashMap::new())
}

fn build<S: ::std::hash::BuildHasher>(
    overlay: Option<(toml::Value, String)>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<LoggingConfig> {
    let mut merged = parse(DEFAULTS_TOML, "<embedded defaults>")?;
    let mut set = SetFields::new();

    if let Some((overlay, origin)) = overlay {
        deep_merge_tracking(&mut merged, &overlay, "", &mut set);
        info!(path = %origin, fields = set.len(), "loaded logging config");
    }

    let applied = apply_env_fallbacks(&mut merged, &mut set, env_vars)?;
    if applied > 0 {
        debug!(count = applied, "applied env var fallbacks");
    }

    let file = merged
        .try_into::<ConfigFile>()
        .map_err(|e| ConfigError::ParseError {
            path: "<merged config>".to_owned(),
            source: e,
        })?;
    validate::validate(&file.logging)?;
    Ok(file.logging)
}

fn read_file(path: &Path) -> ConfigResult<toml::Value> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&text, &path.display().to_string())
}

fn parse(text: &str, origin: &str) -> ConfigResult<toml::Value> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: origin.to_owned(),
        source: e,
    })
}
