//! Configuration resolution for scribe-pm

use scribe_common::config::{resolve_secret, TomlConfig, SERVICE_KEY_ENV};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5740;

/// Module name used for the TOML file (`scribe-pm.toml`)
pub const MODULE_NAME: &str = "scribe-pm";

/// SSE broadcast buffer
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Where and how to reach scribe-ai
#[derive(Debug, Clone)]
pub struct AiServiceSettings {
    pub url: String,
    /// Bearer key presented to scribe-ai; `None` sends no header
    pub service_key: Option<String>,
}

impl AiServiceSettings {
    pub fn from_toml(toml: &TomlConfig, url_override: Option<String>) -> Self {
        Self {
            url: url_override.unwrap_or_else(|| toml.ai_service.url.clone()),
            service_key: resolve_secret(
                "Service key",
                SERVICE_KEY_ENV,
                toml.ai_service.service_key.as_deref(),
            ),
        }
    }
}
