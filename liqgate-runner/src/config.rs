//! Pipeline configuration — TOML file with scoring weights and audit settings.
//!
//! Weights have no built-in defaults: every deployment states them explicitly
//! so the numbers that produced a score are always on record.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use liqgate_core::{ConfluenceFactor, ConfluenceWeights};

use crate::fingerprint::{content_hash, ContentHash};

/// Errors from loading or validating a pipeline config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("weight for {factor:?} must be finite, got {value}")]
    NonFiniteWeight { factor: ConfluenceFactor, value: f64 },
}

/// Where evaluated records are appended, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    pub path: PathBuf,
}

/// Top-level runner configuration.
///
/// ```toml
/// [weights]
/// order_block = 20.0
/// fair_value_gap = 15.0
/// breaker_block = 25.0
/// discount_premium = 15.0
/// buy_sell_liquidity = 25.0
/// news_risk = -20.0
///
/// [audit]
/// path = "audit/decisions.jsonl"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub weights: ConfluenceWeights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditConfig>,
}

impl PipelineConfig {
    pub fn new(weights: ConfluenceWeights) -> Self {
        Self { weights, audit: None }
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject weights that would poison every score.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for factor in ConfluenceFactor::ALL {
            let value = self.weights.weight(factor);
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteWeight { factor, value });
            }
        }
        Ok(())
    }

    /// Path of the audit log, when one is configured.
    pub fn audit_path(&self) -> Option<&Path> {
        self.audit.as_ref().map(|a| a.path.as_path())
    }

    /// Content hash of the weights.
    ///
    /// The audit location is excluded: moving the log does not change any
    /// decision, so it must not change the hash either.
    pub fn config_hash(&self) -> Result<ContentHash, serde_json::Error> {
        content_hash(&self.weights)
    }
}
