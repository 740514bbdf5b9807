//! API key resolution for the code generation backend
//!
//! The key lives in an environment variable named by configuration
//! (`llm.api_key_env`, default `GITHUB_TOKEN`). The client holds the
//! resolved key explicitly — no process-wide client or hidden global.

use animagen_core::{AnimagenError, Result};
use std::env;

/// Resolve the backend API key from the configured environment variable
pub fn get_api_key(env_var: &str) -> Result<String> {
    match env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(AnimagenError::Generation(format!(
            "No API key found. Set the {} environment variable.",
            env_var
        ))),
    }
}
