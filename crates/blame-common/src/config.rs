//! Engine configuration.
//!
//! The engine reads a handful of presentation settings that a host may
//! supply once, typically from a `blame.toml` file next to its own
//! configuration. Every field has a default, so an empty document is a
//! valid configuration.

use std::sync::OnceLock;

use serde::Deserialize;

static CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Presentation settings for labels and blame messages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Prefix for auto-generated label ids (`label0`, `label1`, ...).
    pub label_prefix: String,
    /// Longest string value shown verbatim in a message.
    pub preview_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            label_prefix: "label".to_string(),
            preview_limit: 32,
        }
    }
}

/// Error returned when a configuration document cannot be read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("invalid engine configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("preview_limit must be at least 1")]
    ZeroPreviewLimit,
}

impl EngineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigLoadError> {
        let config: EngineConfig = toml::from_str(src)?;
        if config.preview_limit == 0 {
            return Err(ConfigLoadError::ZeroPreviewLimit);
        }
        Ok(config)
    }
}

/// Install the process-wide configuration.
///
/// Only the first call takes effect; later calls hand their argument back.
pub fn install(config: EngineConfig) -> Result<(), EngineConfig> {
    CONFIG.set(config)
}

/// The installed configuration, or the defaults if none was installed.
pub fn current() -> &'static EngineConfig {
    CONFIG.get_or_init(EngineConfig::default)
}
