//! Configuration resolution for scribe-ai
//!
//! Everything comes from the module TOML file except secrets, which resolve
//! ENV → TOML.

use scribe_common::config::{resolve_secret, TomlConfig, AI_API_KEY_ENV, SERVICE_KEY_ENV};
use tracing::warn;

use crate::gateway::GatewayConfig;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5741;

/// Module name used for the TOML file (`scribe-ai.toml`)
pub const MODULE_NAME: &str = "scribe-ai";

/// Per-function model settings
#[derive(Debug, Clone)]
pub struct FunctionSettings {
    /// Model for analyze-text and analyze-document
    pub model: String,
    /// Model for generate-abstract
    pub abstract_model: String,
    pub abstract_max_words: usize,
}

impl FunctionSettings {
    pub fn from_toml(toml: &TomlConfig) -> Self {
        Self {
            model: toml.ai.model.clone(),
            abstract_model: toml.ai.abstract_model.clone(),
            abstract_max_words: toml.ai.abstract_max_words,
        }
    }
}

impl Default for FunctionSettings {
    fn default() -> Self {
        Self::from_toml(&TomlConfig::default())
    }
}

/// Gateway settings with the API key resolved
pub fn gateway_config(toml: &TomlConfig, url_override: Option<String>) -> GatewayConfig {
    let api_key = resolve_secret("Gateway API key", AI_API_KEY_ENV, toml.ai.api_key.as_deref());
    if api_key.is_none() {
        warn!(
            "Gateway API key not configured; set {} or [ai] api_key in {}.toml. AI functions will fail until it is set.",
            AI_API_KEY_ENV, MODULE_NAME
        );
    }

    GatewayConfig {
        url: url_override.unwrap_or_else(|| toml.ai.gateway_url.clone()),
        api_key,
        requests_per_second: toml.ai.requests_per_second,
    }
}

/// Inter-service key expected from callers
pub fn service_key(toml: &TomlConfig) -> Option<String> {
    resolve_secret(
        "Service key",
        SERVICE_KEY_ENV,
        toml.ai_service.service_key.as_deref(),
    )
}
