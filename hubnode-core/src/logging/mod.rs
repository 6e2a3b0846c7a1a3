//! Logging subsystem for hubnode
//!
//! Installs a global `tracing` subscriber. Audit records are emitted at
//! target `hubnode::audit`, so `RUST_LOG=hubnode::audit=info` isolates them.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod level;

pub use error::LoggingError;
pub use level::LogLevel;

/// Configuration for the logging subsystem
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub with_timestamp: bool,
    pub with_target: bool,
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: LogLevel::Info, with_timestamp: true, with_target: true, json_format: false }
    }
}

impl LogConfig {
    pub fn new(level: LogLevel) -> Self {
        Self { level, ..Default::default() }
    }

    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.with_timestamp = enabled;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }
}

impl TryFrom<&LoggingConfig> for LogConfig {
    type Error = LoggingError;

    fn try_from(config: &LoggingConfig) -> Result<Self, Self::Error> {
        Ok(LogConfig::new(config.level.parse()?)
            .with_timestamp(config.with_timestamp)
            .with_target(config.with_target)
            .json_format(config.json_format))
    }
}

/// Initialize logging with the default configuration
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with_config(LogConfig::default())
}

/// Initialize logging; `RUST_LOG` overrides the configured level
pub fn init_logging_with_config(config: LogConfig) -> Result<(), LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
    let registry = tracing_subscriber::registry().with(env_filter);
    let target = config.with_target;

    let result = match (config.json_format, config.with_timestamp) {
        (true, true) => registry.with(fmt::layer().json().with_target(target)).try_init(),
        (true, false) => registry.with(fmt::layer().json().without_time().with_target(target)).try_init(),
        (false, true) => registry.with(fmt::layer().with_target(target)).try_init(),
        (false, false) => registry.with(fmt::layer().without_time().with_target(target)).try_init(),
    };

    result.map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}
