//! Configuration loading for the social layer

use crate::error::{LayerError, Result};
use serde::Deserialize;
use std::path::Path;

/// Social layer settings
#[derive(Clone, Debug, Deserialize)]
pub struct LayerConfig {
    /// When false, the refresh path is a no-op and the grid is left
    /// untouched for this layer (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Non-drifting frame capture poses are recorded in, and the anchor for
    /// drift-corrected lookups (default: "map")
    #[serde(default = "default_fixed_frame")]
    pub fixed_frame: String,

    /// Bounded wait for the drift transform in milliseconds (default: 10).
    /// The refresh path must never stall the control loop for long.
    #[serde(default = "default_transform_timeout")]
    pub transform_timeout_ms: u64,

    /// Name of the inbound social map stream (default: "social_map")
    #[serde(default = "default_social_map_topic")]
    pub social_map_topic: String,
}

// Default value functions
fn default_enabled() -> bool {
    true
}
fn default_fixed_frame() -> String {
    "map".to_string()
}
fn default_transform_timeout() -> u64 {
    10
}
fn default_social_map_topic() -> String {
    "social_map".to_string()
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            fixed_frame: default_fixed_frame(),
            transform_timeout_ms: default_transform_timeout(),
            social_map_topic: default_social_map_topic(),
        }
    }
}

impl LayerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LayerError::Config(format!("Failed to read config file: {}", e)))?;
        let config: LayerConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
