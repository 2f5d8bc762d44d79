//! The library's own diagnostics channel.
//!
//! LogLama reports sink failures and configuration decisions through
//! `tracing`. Applications that already install a subscriber get those
//! events for free; [`setup_diagnostics`] installs a stderr subscriber for
//! those that don't.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::error::{LoglamaError, LoglamaResult};

/// Helper to convert init errors to our error type.
fn init_err<E: std::fmt::Display>(e: E) -> LoglamaError {
    LoglamaError::InitError(e.to_string())
}

/// Diagnostics output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticsFormat {
    /// Compact single-line format (default).
    #[default]
    Compact,
    /// Multi-line human-readable format.
    Pretty,
    /// JSON, one event per line.
    Json,
}

/// Diagnostics subscriber configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Base filter (e.g., "warn", "loglama=debug").
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: DiagnosticsFormat,
    /// Whether to use ANSI colors.
    #[serde(default)]
    pub ansi: bool,
    /// Whether to include thread names.
    #[serde(default)]
    pub thread_names: bool,
    /// Extra filter directives (e.g., `loglama_sinks=trace`).
    #[serde(default)]
    pub directives: Vec<String>,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: DiagnosticsFormat::default(),
            ansi: false,
            thread_names: false,
            directives: Vec::new(),
        }
    }
}

impl DiagnosticsConfig {
    /// Create a config with the given base filter.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: DiagnosticsFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a directive override.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Enable ANSI colors.
    #[must_use]
    pub fn with_ansi(mut self) -> Self {
        self.ansi = true;
        self
    }

    /// Include thread names.
    #[must_use]
    pub fn with_thread_names(mut self) -> Self {
        self.thread_names = true;
        self
    }

    /// Build the env filter from config.
    fn build_filter(&self) -> LoglamaResult<EnvFilter> {
        let mut filter = EnvFilter::try_new(&self.level)
            .map_err(|e| LoglamaError::Diagnostics(e.to_string()))?;

        for directive in &self.directives {
            filter = filter.add_directive(directive.parse().map_err(
                |e: tracing_subscriber::filter::ParseError| {
                    LoglamaError::Diagnostics(e.to_string())
                },
            )?);
        }

        Ok(filter)
    }

    fn build_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_names(self.thread_names);
        match self.format {
            DiagnosticsFormat::Compact => layer.compact().with_ansi(self.ansi).boxed(),
            DiagnosticsFormat::Pretty => layer.pretty().with_ansi(self.ansi).boxed(),
            DiagnosticsFormat::Json => layer.json().with_ansi(false).boxed(),
        }
    }
}

/// Install a global stderr subscriber for LogLama's diagnostics.
///
/// # Errors
///
/// Returns an error if a directive is invalid or a global subscriber is
/// already installed.
pub fn setup_diagnostics(config: &DiagnosticsConfig) -> LoglamaResult<()> {
    let filter = config.build_filter()?;
    tracing_subscriber::registry()
        .with(config.build_layer())
        .with(filter)
        .try_init()
        .map_err(init_err)
}
