//! Client configuration: base URL, default model, timeouts, and resource
//! limits, loadable from a TOML file with graceful fallback to built-in
//! defaults.
//!
//! Grounded on the teacher's `config::load_config`/`OpenRouterConfig::default`
//! (`include_str!`'d default TOML, `toml` crate, fall back to defaults when
//! the file is absent, error out when it's present but malformed). The
//! teacher's model-preset-group feature (`programming`/`reasoning`/`free`
//! named groups, `src/config/model.rs`) has no counterpart in spec.md and
//! is dropped here — only the TOML-loading mechanism is kept.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Limits, Timeouts};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub default_model: String,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub overall_timeout_ms: Option<u64>,
    #[serde(default)]
    pub max_response_bytes: Option<usize>,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        let default_config = include_str!("default_config.toml");
        toml::from_str(default_config).unwrap_or(Self {
            base_url: default_base_url(),
            default_model: String::new(),
            connect_timeout_ms: None,
            overall_timeout_ms: None,
            max_response_bytes: None,
        })
    }
}

impl ClientConfig {
    pub fn timeouts(&self) -> Timeouts {
        let defaults = Timeouts::default();
        Timeouts {
            connect_ms: self.connect_timeout_ms.unwrap_or(defaults.connect_ms),
            overall_ms: self.overall_timeout_ms.unwrap_or(defaults.overall_ms),
        }
    }

    pub fn limits(&self) -> Limits {
        let defaults = Limits::default();
        Limits {
            max_response_bytes: self.max_response_bytes.unwrap_or(defaults.max_response_bytes),
            ..defaults
        }
    }
}

/// Loads configuration from a TOML file, falling back to
/// [`ClientConfig::default`] when the file doesn't exist. A file that
/// exists but fails to parse is a hard error.
pub fn load_config(config_path: impl AsRef<Path>) -> Result<ClientConfig, ConfigError> {
    let config_path = config_path.as_ref();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "config file absent, using defaults");
        return Ok(ClientConfig::default());
    }

    let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source: e,
    })
}
