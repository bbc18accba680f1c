//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.llmfactory/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::retry::DEFAULT_MAX_ATTEMPTS;
use crate::inference::ClientParams;
use crate::inference::providers::anthropic::DEFAULT_ANTHROPIC_BASE_URL;
use crate::inference::providers::ollama::DEFAULT_OLLAMA_BASE_URL;
use crate::inference::providers::openai::DEFAULT_OPENAI_BASE_URL;
use crate::inference::providers::{ANTHROPIC, OLLAMA, OPENAI};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FactoryConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_provider: Option<String>,
    pub default_model: Option<String>,
    pub embedding_model: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OllamaConfig {
    pub base_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_PROVIDER: &str = OLLAMA;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. \
    Answer the question directly and do not make up facts.";

/// Chat model used when neither config nor env nor CLI names one.
pub fn default_model(provider: &str) -> &'static str {
    match provider {
        OPENAI => "gpt-4o-mini",
        ANTHROPIC => "claude-3-haiku-20240307",
        _ => "llama3",
    }
}

/// Embedding model used when none is configured.
pub fn default_embedding_model(provider: &str) -> &'static str {
    match provider {
        OPENAI => "text-embedding-3-small",
        _ => "nomic-embed-text",
    }
}

// ============================================================================
// Resolved Config (concrete values where a default exists)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub provider: String,
    pub model_name: String,
    pub embedding_model: String,
    pub system_prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub max_attempts: u32,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub ollama_base_url: String,
}

impl ResolvedConfig {
    /// Construction params for one of the built-in providers.
    ///
    /// Names this config knows nothing about get empty params; the registry
    /// decides whether such a name exists.
    pub fn client_params(&self, provider: &str) -> ClientParams {
        match provider {
            OPENAI => ClientParams {
                api_key: self.openai_api_key.clone(),
                base_url: Some(self.openai_base_url.clone()),
                ..Default::default()
            },
            ANTHROPIC => ClientParams {
                api_key: self.anthropic_api_key.clone(),
                base_url: Some(self.anthropic_base_url.clone()),
                ..Default::default()
            },
            OLLAMA => ClientParams::new().base_url(self.ollama_base_url.clone()),
            _ => ClientParams::default(),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.llmfactory/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".llmfactory").join("config.toml"))
}

/// Load config from `~/.llmfactory/config.toml`.
pub fn load_config() -> Result<FactoryConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(FactoryConfig::default())
        }
    }
}

/// Load config from an explicit path.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `FactoryConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<FactoryConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(FactoryConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: FactoryConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!(
        "Config: provider={:?}, model={:?}",
        config.general.default_provider, config.general.default_model
    );
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# llmfactory configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# default_provider = "ollama"        # "openai", "anthropic" or "ollama"
# default_model = "llama3"           # Or set MODEL env var
# embedding_model = "nomic-embed-text"  # Or set EMBEDDING_MODEL env var
# system_prompt = "You are a helpful assistant."
# temperature = 0.8
# max_tokens = 1024
# max_attempts = 3                   # Total calls per prompt, including the first

# [openai]
# api_key = "sk-..."                 # Or set OPENAI_API_KEY env var
# base_url = "https://api.openai.com/v1"   # Or OPENAI_API_BASE

# [anthropic]
# api_key = "sk-ant-..."             # Or set ANTHROPIC_API_KEY env var
# base_url = "https://api.anthropic.com"

# [ollama]
# base_url = "http://localhost:11434"      # Or OLLAMA_HOST (host:port is accepted)
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// CLI overrides. `None` means the flag was not given.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides<'a> {
    pub provider: Option<&'a str>,
    pub model: Option<&'a str>,
    pub system_prompt: Option<&'a str>,
    pub temperature: Option<f32>,
    pub max_attempts: Option<u32>,
}

/// `OLLAMA_HOST` is conventionally `host:port` with no scheme.
fn ollama_host_url(raw: String) -> String {
    if raw.contains("://") {
        raw
    } else {
        format!("http://{}", raw.trim())
    }
}

/// Resolve the final config from the process environment.
pub fn resolve(config: &FactoryConfig, cli: &CliOverrides<'_>) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve_with_env<E>(config: &FactoryConfig, cli: &CliOverrides<'_>, env: E) -> ResolvedConfig
where
    E: Fn(&str) -> Option<String>,
{
    // Provider: CLI → env → config → default
    let provider = cli
        .provider
        .map(str::to_string)
        .or_else(|| env("LLMFACTORY_PROVIDER"))
        .or_else(|| config.general.default_provider.clone())
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

    // Model: CLI → env → config → per-provider default
    let model_name = cli
        .model
        .map(str::to_string)
        .or_else(|| env("MODEL"))
        .or_else(|| config.general.default_model.clone())
        .unwrap_or_else(|| default_model(&provider).to_string());

    let embedding_model = env("EMBEDDING_MODEL")
        .or_else(|| config.general.embedding_model.clone())
        .unwrap_or_else(|| default_embedding_model(&provider).to_string());

    let system_prompt = cli
        .system_prompt
        .map(str::to_string)
        .or_else(|| config.general.system_prompt.clone())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    let openai_api_key = env("OPENAI_API_KEY").or_else(|| config.openai.api_key.clone());
    let openai_base_url = env("OPENAI_API_BASE")
        .or_else(|| config.openai.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

    let anthropic_api_key = env("ANTHROPIC_API_KEY").or_else(|| config.anthropic.api_key.clone());
    let anthropic_base_url = env("ANTHROPIC_BASE_URL")
        .or_else(|| config.anthropic.base_url.clone())
        .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string());

    let ollama_base_url = env("OLLAMA_HOST")
        .map(ollama_host_url)
        .or_else(|| config.ollama.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string());

    ResolvedConfig {
        provider,
        model_name,
        embedding_model,
        system_prompt,
        temperature: cli.temperature.or(config.general.temperature),
        max_tokens: config.general.max_tokens,
        max_attempts: cli
            .max_attempts
            .or(config.general.max_attempts)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS),
        openai_api_key,
        openai_base_url,
        anthropic_api_key,
        anthropic_base_url,
        ollama_base_url,
    }
}
