//! Process-wide logger registry.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tracing::debug;

use crate::logger::Logger;

static REGISTRY: LazyLock<RwLock<HashMap<String, Arc<Logger>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// The logger called `name`, created on first use.
///
/// Every call with the same name returns the same logger for the life of
/// the process.
#[must_use]
pub fn get_logger(name: &str) -> Arc<Logger> {
    if let Some(logger) = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
    {
        return Arc::clone(logger);
    }

    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(registry.entry(name.to_string()).or_insert_with(|| {
        debug!(logger = name, "created logger");
        Arc::new(Logger::new(name))
    }))
}

/// Names of every logger created so far, sorted.
#[must_use]
pub fn logger_names() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use loglama_core::Level;
    use loglama_test::unique_logger_name;

    #[test]
    fn same_name_same_logger() {
        let name = unique_logger_name("registry");
        let a = get_logger(&name);
        let b = get_logger(&name);
        assert!(Arc::ptr_eq(&a, &b));

        a.set_level(Level::Error);
        assert_eq!(b.level(), Level::Error);
        assert!(logger_names().contains(&name));
    }

    #[test]
    fn concurrent_first_lookup_creates_one_logger() {
        let name = unique_logger_name("race");
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let name = name.clone();
                std::thread::spawn(move || get_logger(&name))
            })
            .collect();
        let loggers: Vec<Arc<Logger>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(loggers.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
