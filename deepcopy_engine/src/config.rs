//! Copy options.
//!
//! Options only tune how channel forwarders are spawned. The copy semantics
//! themselves are fixed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Settings for the background thread that drains a copied channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ForwarderOptions {
    /// Name given to every forwarder thread.
    pub thread_name: String,
    /// Stack size in bytes; platform default when unset.
    pub stack_size: Option<usize>,
}

impl Default for ForwarderOptions {
    fn default() -> Self {
        Self {
            thread_name: "deepcopy-forwarder".to_string(),
            stack_size: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CopyOptions {
    pub forwarder: ForwarderOptions,
}

impl CopyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON. Missing fields take their defaults,
    /// unknown fields are rejected.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "invalid copy options: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
