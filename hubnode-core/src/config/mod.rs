//! Configuration management for hubnode
//!
//! Configuration comes from defaults, a TOML file, or `HUBNODE_*`
//! environment variables layered over the defaults, and is validated before
//! use.

use crate::core_message::validation::DEFAULT_MAX_FUTURE_SECS;
use crate::core_message::Network;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

mod error;

pub use error::ConfigError;

/// Main node configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    pub engine: EngineConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Network messages must target (mainnet, testnet, devnet)
    pub network: String,

    /// How far ahead of the local clock a message timestamp may be, seconds
    pub max_future_secs: u32,

    /// Buffered store events per subscriber
    pub event_channel_capacity: usize,

    /// Audit records kept in memory
    pub audit_capacity: usize,
}

/// Which KV engine holds node state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KvBackend {
    Memory,
    Log,
}

impl FromStr for KvBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(KvBackend::Memory),
            "log" => Ok(KvBackend::Log),
            other => Err(ConfigError::InvalidValue(format!("Unknown KV backend: {}", other))),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub kv_backend: KvBackend,

    /// Directory holding the KV log (log backend only)
    pub data_dir: PathBuf,
}

impl StoreConfig {
    pub fn kv_log_path(&self) -> PathBuf {
        self.data_dir.join("node_state.log")
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    pub json_format: bool,

    pub with_timestamp: bool,

    pub with_target: bool,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Register metric descriptions on engine start
    pub enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet.as_str().to_string(),
            max_future_secs: DEFAULT_MAX_FUTURE_SECS,
            event_channel_capacity: 1024,
            audit_capacity: 4096,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { kv_backend: KvBackend::Memory, data_dir: PathBuf::from("./data") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json_format: false, with_timestamp: true, with_target: true }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e| ConfigError::InvalidValue(format!("Invalid {}: {}", name, e)))
}

impl HubConfig {
    /// Load configuration from environment variables
    ///
    /// Variables follow the pattern HUBNODE_<SECTION>_<KEY>, e.g.
    /// HUBNODE_ENGINE_NETWORK=devnet
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Layer overrides from `lookup` over the current values
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Engine
        if let Some(network) = lookup("HUBNODE_ENGINE_NETWORK") {
            self.engine.network = network;
        }
        if let Some(secs) = lookup("HUBNODE_ENGINE_MAX_FUTURE_SECS") {
            self.engine.max_future_secs = parse_var("max future secs", &secs)?;
        }
        if let Some(capacity) = lookup("HUBNODE_ENGINE_EVENT_CHANNEL_CAPACITY") {
            self.engine.event_channel_capacity = parse_var("event channel capacity", &capacity)?;
        }
        if let Some(capacity) = lookup("HUBNODE_ENGINE_AUDIT_CAPACITY") {
            self.engine.audit_capacity = parse_var("audit capacity", &capacity)?;
        }

        // Store
        if let Some(backend) = lookup("HUBNODE_STORE_KV_BACKEND") {
            self.store.kv_backend = backend.parse()?;
        }
        if let Some(data_dir) = lookup("HUBNODE_STORE_DATA_DIR") {
            self.store.data_dir = PathBuf::from(data_dir);
        }

        // Logging
        if let Some(level) = lookup("HUBNODE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("HUBNODE_LOG_JSON") {
            self.logging.json_format = parse_var("JSON flag", &json)?;
        }

        // Metrics
        if let Some(enabled) = lookup("HUBNODE_METRICS_ENABLED") {
            self.metrics.enabled = parse_var("metrics flag", &enabled)?;
        }

        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Network named by the engine section
    pub fn network(&self) -> Result<Network, ConfigError> {
        Network::parse(&self.engine.network)
            .ok_or_else(|| ConfigError::ValidationFailed(format!("Unknown network: {}", self.engine.network)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.network()?;

        if self.engine.event_channel_capacity == 0 {
            return Err(ConfigError::ValidationFailed(
                "event_channel_capacity must be greater than 0".to_string(),
            ));
        }
        if self.engine.audit_capacity == 0 {
            return Err(ConfigError::ValidationFailed("audit_capacity must be greater than 0".to_string()));
        }

        if self.store.kv_backend == KvBackend::Log && self.store.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed("log backend needs a data_dir".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!("Invalid log level: {}", self.logging.level)));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWriteError(e.to_string()))?;

        Ok(())
    }
}
