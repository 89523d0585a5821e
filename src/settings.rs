//! Layered settings for the `metricsbus` binary.
//!
//! Sources are applied in order, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. environment variables prefixed with `METRICSBUS_`, using `__` to reach
//!    nested keys
//!
//! ```toml
//! sink_address = "metrics.sink.default"
//! log_level = "info"
//!
//! [[sinks]]
//! type = "log"
//!
//! [[sinks]]
//! type = "file"
//! path = "events.ndjson"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use metricsbus_sdk::{ConfigurationError, FileSink, LogSink, Sink, DEFAULT_SINK_ADDRESS};
use serde::Deserialize;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "METRICSBUS";

/// Settings for relaying events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bus address the sink service subscribes to.
    pub sink_address: String,
    /// Default log filter, used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Sinks every relayed event is recorded to, in order.
    pub sinks: Vec<SinkSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sink_address: DEFAULT_SINK_ADDRESS.to_string(),
            log_level: "info".to_string(),
            sinks: vec![SinkSettings::Log],
        }
    }
}

/// One configured sink.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkSettings {
    /// Log a summary of each event.
    Log,
    /// Append each event to a newline-delimited JSON file.
    File {
        /// File to append to.
        path: PathBuf,
    },
}

impl SinkSettings {
    /// Create the sink.
    pub fn build(&self) -> Result<Arc<dyn Sink>> {
        match self {
            SinkSettings::Log => Ok(Arc::new(LogSink::new())),
            SinkSettings::File { path } => {
                let sink = FileSink::open(path)
                    .with_context(|| format!("Failed to open sink file {}", path.display()))?;
                Ok(Arc::new(sink))
            }
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    /// Load settings using `env` as the environment source.
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("sink_address", DEFAULT_SINK_ADDRESS)?
            .set_default("log_level", "info")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(env)
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check settings that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.sink_address.is_empty() {
            return Err(ConfigurationError::EmptyAddress);
        }
        Ok(())
    }

    /// Create every configured sink, in order.
    pub fn build_sinks(&self) -> Result<Vec<Arc<dyn Sink>>> {
        self.sinks.iter().map(SinkSettings::build).collect()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}
