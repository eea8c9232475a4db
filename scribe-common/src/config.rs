//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from a per-module TOML file; runtime settings
//! (thresholds, autosave delay) live in the database `settings` table.
//!
//! Root folder priority:
//! 1. Command-line argument (highest priority)
//! 2. `SCRIBE_ROOT_FOLDER` environment variable
//! 3. `root_folder` in the module TOML file
//! 4. OS-dependent default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "SCRIBE_ROOT_FOLDER";

/// Environment variable holding the chat gateway API key
pub const AI_API_KEY_ENV: &str = "SCRIBE_AI_API_KEY";

/// Environment variable holding the inter-service key
pub const SERVICE_KEY_ENV: &str = "SCRIBE_SERVICE_KEY";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "scribe.db";

/// Bootstrap configuration loaded from `<module>.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP port; each binary supplies its own default
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub ai_service: AiServiceConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Chat-completion gateway settings (scribe-ai)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Model for suggestions and document tips
    #[serde(default = "default_model")]
    pub model: String,

    /// Model for abstract generation
    #[serde(default = "default_abstract_model")]
    pub abstract_model: String,

    /// Gateway API key (prefer `SCRIBE_AI_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Outgoing requests per second
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Abstract length above which a warning is attached
    #[serde(default = "default_abstract_max_words")]
    pub abstract_max_words: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            model: default_model(),
            abstract_model: default_abstract_model(),
            api_key: None,
            requests_per_second: default_requests_per_second(),
            abstract_max_words: default_abstract_max_words(),
        }
    }
}

fn default_gateway_url() -> String {
    "https://ai.gateway.lovable.dev/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "google/gemini-2.5-flash".to_string()
}

fn default_abstract_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_requests_per_second() -> u32 {
    5
}

fn default_abstract_max_words() -> usize {
    500
}

/// Where scribe-pm reaches scribe-ai
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiServiceConfig {
    #[serde(default = "default_ai_service_url")]
    pub url: String,

    /// Shared service key (prefer `SCRIBE_SERVICE_KEY`)
    #[serde(default)]
    pub service_key: Option<String>,
}

impl Default for AiServiceConfig {
    fn default() -> Self {
        Self {
            url: default_ai_service_url(),
            service_key: None,
        }
    }
}

fn default_ai_service_url() -> String {
    "http://127.0.0.1:5741".to_string()
}

/// Resolves the root folder for one module
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
        }
    }

    /// Command-line override (highest priority)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("Root folder from {}: {}", ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        match load_toml_config(&self.module_name) {
            Ok(config) => {
                if let Some(path) = config.root_folder {
                    info!("Root folder from TOML config: {}", path.display());
                    return path;
                }
            }
            Err(e) => warn!("Ignoring TOML config for {}: {}", self.module_name, e),
        }

        let path = default_root_folder();
        info!("Root folder (default): {}", path.display());
        path
    }
}

/// Creates the root folder and locates files inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }
}

/// Candidate TOML paths for a module, user config first
pub fn config_file_candidates(module_name: &str) -> Vec<PathBuf> {
    let file_name = format!("{}.toml", module_name);
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("scribe").join(&file_name));
    }
    if cfg!(unix) {
        candidates.push(PathBuf::from("/etc/scribe").join(&file_name));
    }
    candidates
}

/// Load a module's TOML config, or defaults when no file exists
pub fn load_toml_config(module_name: &str) -> Result<TomlConfig> {
    match config_file_candidates(module_name)
        .into_iter()
        .find(|path| path.exists())
    {
        Some(path) => load_toml_config_from(&path),
        None => Ok(TomlConfig::default()),
    }
}

/// Load and parse a TOML config file
pub fn load_toml_config_from(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Resolve a secret: environment variable first, then TOML
///
/// Blank values count as unset. Returns `None` when neither source has one.
pub fn resolve_secret(name: &str, env_var: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var)
        .ok()
        .filter(|v| !v.trim().is_empty());
    let toml_value = toml_value.filter(|v| !v.trim().is_empty());

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both {} and TOML config. Using environment (highest priority).",
            name, env_var
        );
    }

    if let Some(value) = env_value {
        info!("{} loaded from environment variable", name);
        return Some(value);
    }
    if let Some(value) = toml_value {
        info!("{} loaded from TOML config", name);
        return Some(value.to_string());
    }
    None
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("scribe"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/scribe"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("scribe"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/scribe"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("scribe"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\scribe"))
    } else {
        PathBuf::from("./scribe_data")
    }
}
