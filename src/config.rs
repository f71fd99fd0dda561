//! Configuration System
//!
//! Static configuration for the context subsystem: the instance/node
//! identity stamped into correlation ids, plus logging settings. Loaded from
//! an optional `weft.toml` with `WEFT_*` environment overrides and validated
//! before use.

use crate::error::ContextError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeftConfig {
    /// Identity of this process within the deployment
    #[serde(default)]
    pub instance: InstanceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Static instance identity, consumed (not owned) by this subsystem.
///
/// Both tags end up verbatim inside generated ids; they are trimmed there,
/// so surrounding whitespace in configuration is tolerated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Instance name, e.g. "svc-orders"
    #[serde(default)]
    pub instance_id: String,

    /// Node number within the instance, e.g. "01"
    #[serde(default)]
    pub node_id: String,
}

impl WeftConfig {
    /// Load configuration.
    ///
    /// Priority order (highest to lowest):
    /// 1. Environment variables (`WEFT_INSTANCE__INSTANCE_ID`, `WEFT_INSTANCE__NODE_ID`, ...)
    /// 2. Configuration file (`weft.toml` in the working directory, or an explicit path)
    /// 3. Defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ContextError> {
        let mut builder = Config::builder();

        builder = match path {
            Some(explicit) => builder.add_source(File::from(explicit.to_path_buf()).required(true)),
            None => builder.add_source(File::with_name("weft").required(false)),
        };

        builder = builder.add_source(Environment::with_prefix("WEFT").separator("__"));

        let config: WeftConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default sources, falling back to defaults when nothing is
    /// configured or the sources fail to parse.
    pub fn load_or_default() -> Self {
        Self::load(None).unwrap_or_default()
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ContextError> {
        self.instance.validate()
    }
}

impl InstanceConfig {
    /// Validate the instance identity.
    ///
    /// Tags may be empty (ids then carry only timestamp and sequence), but
    /// embedded whitespace would corrupt the fixed-width id layout.
    pub fn validate(&self) -> Result<(), ContextError> {
        for (field, value) in [
            ("instance_id", &self.instance_id),
            ("node_id", &self.node_id),
        ] {
            if value.trim().chars().any(char::is_whitespace) {
                return Err(ContextError::Config(format!(
                    "{} must not contain embedded whitespace: {:?}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}
