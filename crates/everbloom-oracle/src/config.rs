//! Oracle client configuration.
//!
//! Loaded once at startup from the environment or a TOML file; the API key
//! is required, everything else has sensible defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OracleError, OracleResult};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 1024;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

/// Connection settings for the HTTP oracle client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// API key used to authenticate.
    pub api_key: String,
    /// Base URL of the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl OracleConfig {
    /// Configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }

    /// Override the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the base URL (e.g. a local proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Load from `EVERBLOOM_API_KEY`, `EVERBLOOM_MODEL`,
    /// `EVERBLOOM_BASE_URL`, and `EVERBLOOM_MAX_TOKENS`.
    pub fn from_env() -> OracleResult<Self> {
        let api_key = std::env::var("EVERBLOOM_API_KEY").map_err(|_| OracleError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("EVERBLOOM_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var("EVERBLOOM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(max_tokens) = std::env::var("EVERBLOOM_MAX_TOKENS") {
            config.max_tokens = max_tokens
                .parse()
                .map_err(|e| OracleError::InvalidConfig {
                    reason: format!("EVERBLOOM_MAX_TOKENS is not a number: {e}"),
                })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> OracleResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            OracleError::InvalidConfig {
                reason: format!("failed to read config file: {e}"),
            }
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| OracleError::InvalidConfig {
            reason: format!("failed to parse config file: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> OracleResult<()> {
        if self.api_key.is_empty() {
            return Err(OracleError::MissingApiKey);
        }
        if self.max_tokens == 0 {
            return Err(OracleError::InvalidConfig {
                reason: "max_tokens must be positive".into(),
            });
        }
        Ok(())
    }
}

// ── tests ────────────────────────────────────────────────────────────
