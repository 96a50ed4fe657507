//! Server configuration
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. `drowsiness.toml` in the working directory (optional), or the file
//!    named by `DROWSINESS_CONFIG` (required when set)
//! 3. Environment variables: `DROWSINESS_<SECTION>__<KEY>`

use config::{Config, Environment, File};
use dms::DmsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ServerError;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "DROWSINESS_CONFIG";

/// Config file looked up in the working directory (extension optional)
pub const DEFAULT_CONFIG_FILE: &str = "drowsiness";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DROWSINESS";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub dms: DmsConfig,
}

/// Network and per-connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,
    /// Pending frames per connection before the oldest is dropped
    pub frame_queue_depth: usize,
    /// Maximum Socket.IO payload size (bytes)
    pub max_frame_bytes: usize,
    /// Allow any origin (browser clients are served from another port)
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            frame_queue_depth: ring_buffer::DEFAULT_DEPTH,
            max_frame_bytes: 4 * 1024 * 1024,
            cors_permissive: true,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load from the default sources
    pub fn load() -> Result<Self, ServerError> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::load_from(path.as_deref().map(Path::new))
    }

    /// Load with an explicit config file (required) or the default lookup
    pub fn load_from(path: Option<&Path>) -> Result<Self, ServerError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ServerError> {
        self.dms.validate()?;
        if self.server.frame_queue_depth == 0 {
            return Err(ServerError::InvalidConfig(
                "server.frame_queue_depth must be at least 1".into(),
            ));
        }
        if self.server.max_frame_bytes == 0 {
            return Err(ServerError::InvalidConfig(
                "server.max_frame_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}
