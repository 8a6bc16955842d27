//! Loader configuration.
//!
//! Parsed from TOML text the host has already read. Missing keys take their
//! defaults.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Loader policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Document field naming the recipe kind or container
    pub kind_field: String,
    /// Drop recipes whose validation verdict is INVALID
    pub reject_invalid: bool,
    /// Drop recipes whose validation verdict is PENDING
    pub reject_pending: bool,
    /// Let a later document replace a loaded recipe with the same key
    pub allow_replace: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            kind_field: "type".to_string(),
            reject_invalid: true,
            reject_pending: false,
            allow_replace: false,
        }
    }
}

impl LoaderConfig {
    /// Parses configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Parses configuration text, falling back to defaults if it is invalid.
    #[must_use]
    pub fn from_toml_str_or_default(text: &str) -> Self {
        match Self::from_toml_str(text) {
            Ok(config) => {
                info!(kind_field = %config.kind_field, "Loaded loader config");
                config
            }
            Err(e) => {
                warn!("Failed to parse loader config: {e}");
                Self::default()
            }
        }
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
