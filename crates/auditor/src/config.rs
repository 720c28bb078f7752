//! Process-wide configuration for the audit pipeline.
//!
//! Env-first with an optional YAML file. The AI API key is startup
//! configuration: its absence is detectable before any request is sent.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AuditError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// AI service credential. Checked at provider construction; never
    /// retried per request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Low by default, to bias toward consistent, reproducible audits.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Transport attempts per AI request. 1 means no automatic retry,
    /// which is the default; raising it is an explicit opt-in.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default)]
    pub explorer: ExplorerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_explorer_url")]
    pub base_url: String,

    /// Optional; the explorer's public tier answers without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_retry_attempts() -> u32 {
    1
}
fn default_explorer_url() -> String {
    "https://api.etherscan.io/v2/api".to_string()
}
fn default_chain_id() -> u64 {
    1
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: default_explorer_url(),
            api_key: None,
            chain_id: default_chain_id(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            retry_attempts: default_retry_attempts(),
            explorer: ExplorerConfig::default(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AuditConfig {
    /// Builds configuration from environment variables, falling back to
    /// defaults. `AEGIS_API_KEY` wins over `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.api_key = non_empty(std::env::var("AEGIS_API_KEY").ok())
            .or_else(|| non_empty(std::env::var("GEMINI_API_KEY").ok()));

        if let Some(model) = non_empty(std::env::var("AEGIS_MODEL").ok()) {
            config.model = model;
        }

        if let Ok(temp) = std::env::var("AEGIS_TEMPERATURE") {
            if let Ok(t) = temp.parse::<f32>() {
                config.temperature = t;
            }
        }

        if let Some(url) = non_empty(std::env::var("AEGIS_EXPLORER_URL").ok()) {
            config.explorer.base_url = url;
        }

        config.explorer.api_key = non_empty(std::env::var("AEGIS_EXPLORER_API_KEY").ok());

        if let Ok(chain) = std::env::var("AEGIS_CHAIN_ID") {
            if let Ok(id) = chain.parse::<u64>() {
                config.explorer.chain_id = id;
            }
        }

        config
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| AuditError::Configuration(format!("Invalid config file: {}", e)))?;
        Ok(config)
    }

    /// Overrides the credential, treating empty strings as absent.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = non_empty(api_key) {
            self.api_key = Some(key);
        }
        self
    }
}
