//! Configuration management for Animagen
//!
//! Provides the service-level configuration loaded from `animagen.toml`:
//! LLM backend settings, render tool invocation, storage endpoints, and the
//! HTTP server bind address.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// Service-level Animagen configuration
///
/// Loaded from `animagen.toml` in the working directory, or defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimagenConfig {
    /// Code generation backend
    #[serde(default)]
    pub llm: LlmConfig,

    /// Render tool invocation
    #[serde(default)]
    pub render: RenderConfig,

    /// Artifact storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Code generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat completions endpoint
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Max tokens for code generation responses
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

/// Render tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Renderer binary name or path
    #[serde(default = "default_render_binary")]
    pub binary: String,

    /// Stable directory rendered artifacts are copied into
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: String,

    /// Subprocess timeout in seconds
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,
}

/// Artifact storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Upload endpoint base URL
    #[serde(default = "default_upload_base")]
    pub upload_base: String,

    /// Public address base URL
    #[serde(default = "default_public_base")]
    pub public_base: String,

    /// Bucket name
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Environment variable containing the storage auth token
    #[serde(default = "default_storage_key_env")]
    pub api_key_env: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

// Default value providers
fn default_llm_base_url() -> String {
    "https://models.github.ai/inference".to_string()
}

fn default_llm_model() -> String {
    "openai/gpt-4.1".to_string()
}

fn default_api_key_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_max_tokens() -> usize {
    2000
}

fn default_render_binary() -> String {
    "manim".to_string()
}

fn default_artifact_dir() -> String {
    "/tmp/animagen".to_string()
}

fn default_render_timeout_secs() -> u64 {
    600
}

fn default_upload_base() -> String {
    "http://localhost:8000/storage/v1/object".to_string()
}

fn default_public_base() -> String {
    "http://localhost:8000/storage/v1/object/public".to_string()
}

fn default_bucket() -> String {
    "videosbucket".to_string()
}

fn default_storage_key_env() -> String {
    "STORAGE_SERVICE_KEY".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl AnimagenConfig {
    /// Load configuration from `animagen.toml` under `dir`, or use defaults
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let config_path = dir.join("animagen.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content).map_err(|e| {
                crate::AnimagenError::Other(format!("Failed to parse config file: {}", e))
            })?)
        } else {
            Ok(Self::default())
        }
    }

    /// Write default configuration to `animagen.toml` under `dir`
    pub fn write_default(dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let config_path = dir.join("animagen.toml");
        let config = Self::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| crate::AnimagenError::Other(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            binary: default_render_binary(),
            artifact_dir: default_artifact_dir(),
            timeout_secs: default_render_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_base: default_upload_base(),
            public_base: default_public_base(),
            bucket: default_bucket(),
            api_key_env: default_storage_key_env(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}
