// Daybook Configuration
//
// Settings for the optional LLM classification path and the temporal
// pattern extractor. Hosts usually build these from their own settings
// layer; `DaybookConfig::from_file` is provided for standalone use.

use crate::error::ConfigError;
use crate::patterns::cooccurrence::MAX_WINDOW_MINUTES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaybookConfig {
    /// LLM-assisted classification settings
    pub classification: ClassificationConfig,

    /// Temporal pattern extraction settings
    pub patterns: PatternConfig,
}

/// Controls the optional LLM classification path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Use the LLM path at all (rules are always available)
    pub enabled: bool,

    /// Generate endpoint (Ollama-compatible)
    pub endpoint: String,

    /// Model name sent with every request
    pub model: String,

    /// Events per LLM call
    pub batch_size: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "llama3.2".to_string(),
            batch_size: 8,
            timeout_secs: 30,
        }
    }
}

impl ClassificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "classification.batch_size must be at least 1".to_string(),
            ));
        }

        if self.enabled {
            if self.endpoint.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "classification.endpoint is required when enabled".to_string(),
                ));
            }
            if self.model.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "classification.model is required when enabled".to_string(),
                ));
            }
            if self.timeout_secs == 0 {
                return Err(ConfigError::ValidationError(
                    "classification.timeout_secs must be at least 1".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Controls the temporal pattern extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Run the extractor; when false an empty analysis is returned
    pub enabled: bool,

    /// Maximum span of a co-occurrence window, measured from its first event
    pub cooccurrence_window_minutes: i64,

    /// Minimum events a temporal cluster needs to be reported
    pub min_cluster_size: usize,

    /// Compute recurrence signals and the knowledge delta
    pub track_recurrence: bool,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cooccurrence_window_minutes: 30,
            min_cluster_size: 3,
            track_recurrence: true,
        }
    }
}

impl PatternConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cooccurrence_window_minutes < 1 {
            return Err(ConfigError::ValidationError(
                "patterns.cooccurrence_window_minutes must be at least 1".to_string(),
            ));
        }
        if self.cooccurrence_window_minutes > MAX_WINDOW_MINUTES {
            return Err(ConfigError::ValidationError(format!(
                "patterns.cooccurrence_window_minutes must be at most {}",
                MAX_WINDOW_MINUTES
            )));
        }
        if self.min_cluster_size == 0 {
            return Err(ConfigError::ValidationError(
                "patterns.min_cluster_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl DaybookConfig {
    /// Load configuration from a TOML file and validate it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DaybookConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.classification.validate()?;
        self.patterns.validate()
    }
}
