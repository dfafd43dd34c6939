//! Configuration loading and typed config structures.
//!
//! The configuration lives in `pulse-config.yaml` in the working directory.
//! Every field has a default, so a missing file section (or an empty file)
//! yields a runnable setup: generator on `my-topic` every 5 seconds, NATS on
//! localhost, observer API on port 3000.

use std::path::Path;

use serde::Deserialize;

use crate::command::DEFAULT_INTERVAL_MS;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PulseConfig {
    /// Generator defaults.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Broker connection.
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Observer HTTP server.
    #[serde(default)]
    pub server: HttpConfig,

    /// Observer delivery tuning.
    #[serde(default)]
    pub observers: ObserversConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PulseConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `NATS_URL` overrides `broker.nats_url`
    /// - `PULSE_PORT` overrides `server.port`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying env overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.broker.apply_env_overrides();
        config.server.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string exactly as written.
    pub fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reads an empty document as null rather than an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Generator defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratorConfig {
    /// Interval for the initial state and for starts without one.
    #[serde(default = "default_interval_ms")]
    pub default_interval_ms: u64,

    /// Broker topic messages are published to.
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Fixed RNG seed for reproducible payloads.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_interval_ms: default_interval_ms(),
            topic: default_topic(),
            seed: None,
        }
    }
}

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrokerConfig {
    /// NATS server URL.
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Whether to subscribe to the generator topic and log what arrives.
    #[serde(default = "default_true")]
    pub consume: bool,
}

impl BrokerConfig {
    /// Override fields from environment variables.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NATS_URL") {
            self.nats_url = val;
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            nats_url: default_nats_url(),
            consume: true,
        }
    }
}

/// Observer HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS. Empty allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl HttpConfig {
    /// Override fields from environment variables.
    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = std::env::var("PULSE_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.port = port;
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Observer delivery settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserversConfig {
    /// Per-observer queue length; events beyond it are dropped for that
    /// observer.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for ObserversConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_topic() -> String {
    "my-topic".to_owned()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_owned()
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    3000
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "http://localhost:3001",
        "http://localhost:5173",
        "http://localhost:8080",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

const fn default_queue_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PulseConfig::default();
        assert_eq!(config.generator.default_interval_ms, 5000);
        assert_eq!(config.generator.topic, "my-topic");
        assert!(config.generator.seed.is_none());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.allowed_origins.len(), 4);
        assert_eq!(config.observers.queue_capacity, 256);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
generator:
  default_interval_ms: 2000
  topic: "events"
  seed: 9

broker:
  nats_url: "nats://broker:4222"
  consume: false

server:
  host: "127.0.0.1"
  port: 9090
  allowed_origins: []

observers:
  queue_capacity: 16

logging:
  level: "debug"
  format: json
"#;
        let config = PulseConfig::parse_without_env(yaml);
        assert!(config.is_ok(), "parse failed: {config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.generator.default_interval_ms, 2000);
        assert_eq!(config.generator.topic, "events");
        assert_eq!(config.generator.seed, Some(9));
        assert_eq!(config.broker.nats_url, "nats://broker:4222");
        assert!(!config.broker.consume);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert!(config.server.allowed_origins.is_empty());
        assert_eq!(config.observers.queue_capacity, 16);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "generator:\n  topic: other\n";
        let config = PulseConfig::parse_without_env(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.generator.topic, "other");
        assert_eq!(config.generator.default_interval_ms, 5000);
        assert!(config.broker.consume);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = PulseConfig::parse_without_env("");
        assert_eq!(config.ok(), Some(PulseConfig::default()));
    }

    #[test]
    fn rejects_unknown_log_format() {
        let config = PulseConfig::parse_without_env("logging:\n  format: xml\n");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("pulse-config.yaml");
        if path.exists() {
            let config = PulseConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
