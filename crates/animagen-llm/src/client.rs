//! HTTP client for the OpenAI-compatible code generation backend
//!
//! Deliberately performs no transport-level retries: every retry decision
//! belongs to the orchestrator's attempt loop, so a backend failure here is
//! reported as-is.

use crate::auth;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};
use animagen_core::{AnimagenError, LlmConfig, Result};

/// Client handle for the code generation backend
///
/// Constructed once at process start and injected into the orchestrator.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl LlmClient {
    /// Create a client from configuration, resolving the API key
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = auth::get_api_key(&config.api_key_env)?;
        Ok(Self::new(&config.base_url, &config.model, api_key))
    }

    pub fn new(base_url: &str, model: &str, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.into(),
        }
    }

    /// One chat completion exchange; returns the assistant's text
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: Option<usize>,
        temperature: f32,
    ) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            max_tokens,
            temperature: Some(temperature),
        };

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!("Sending completion request to {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnimagenError::Generation(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(AnimagenError::Generation(format!(
                "Backend error {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnimagenError::Generation(format!("Failed to parse response: {}", e)))?;

        let content = chat_response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| AnimagenError::Generation("No choices in response".to_string()))?;

        if let Some(usage) = &chat_response.usage {
            tracing::info!(
                "Completion received ({} chars, {} prompt tokens, {} completion tokens)",
                content.len(),
                usage.prompt_tokens,
                usage.completion_tokens
            );
        } else {
            tracing::info!("Completion received ({} chars)", content.len());
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = LlmClient::new("https://example.test/v1/", "gpt-x", "key");
        assert_eq!(client.base_url, "https://example.test/v1");
    }

    #[test]
    fn test_from_config_without_key() {
        let config = LlmConfig {
            api_key_env: "ANIMAGEN_DEFINITELY_UNSET_KEY".to_string(),
            ..LlmConfig::default()
        };
        assert!(LlmClient::from_config(&config).is_err());
    }
}
