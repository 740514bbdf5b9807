//! Code generation operations: fresh generation and error-driven fixing
//!
//! `Generate` runs a two-stage exchange (prompt enhancement, then script
//! generation); `Fix` sends the previous script with formatted error context.
//! Both guarantee a normalized script containing the canonical scene class.

use crate::client::LlmClient;
use crate::normalize::{ensure_canonical_scene, strip_code_fences};
use crate::parser::extract_tag;
use crate::prompts;
use crate::types::GenerationResult;
use animagen_core::Result;
use async_trait::async_trait;
use tracing::{info, warn};

const ENHANCEMENT_MAX_TOKENS: usize = 800;
const ENHANCEMENT_TEMPERATURE: f32 = 0.7;
const GENERATION_TEMPERATURE: f32 = 0.3;
const FIX_TEMPERATURE: f32 = 0.1;

/// Producer of candidate scripts (seam for testing the retry loop)
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Fresh generation from a prompt
    ///
    /// A transport/backend failure surfaces as `Err`; the orchestrator
    /// converts it to the templated fallback script.
    async fn generate(&self, prompt: &str) -> Result<GenerationResult>;

    /// Corrected script from the previous script plus error context
    ///
    /// Degrades to returning the unchanged script when the backend fails,
    /// so the loop can still retry against possibly-transient render
    /// failures.
    async fn fix(
        &self,
        previous_script: &str,
        error_context: &str,
        attempt: u32,
    ) -> Result<GenerationResult>;
}

/// Code generation client backed by an LLM chat endpoint
#[derive(Debug, Clone)]
pub struct CodegenClient {
    llm: LlmClient,
    max_tokens: usize,
}

impl CodegenClient {
    pub fn new(llm: LlmClient, max_tokens: usize) -> Self {
        Self { llm, max_tokens }
    }

    /// Stage one: elaborate the user prompt for better scripts
    async fn enhance_prompt(&self, prompt: &str) -> Result<String> {
        let response = self
            .llm
            .complete(
                &prompts::enhancement_system(),
                &format!(
                    "Enhance this prompt for creating an educational animation: {}",
                    prompt
                ),
                Some(ENHANCEMENT_MAX_TOKENS),
                ENHANCEMENT_TEMPERATURE,
            )
            .await?;

        // Malformed response: proceed with the caller's prompt verbatim
        Ok(extract_tag(&response, "enhanced_prompt").unwrap_or_else(|| prompt.to_string()))
    }
}

#[async_trait]
impl ScriptGenerator for CodegenClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let enhanced = self.enhance_prompt(prompt).await?;
        info!("Enhanced prompt: {}", enhanced);

        let response = self
            .llm
            .complete(
                &prompts::code_generation_system(),
                &format!("Create a Manim animation for: {}", enhanced),
                None,
                GENERATION_TEMPERATURE,
            )
            .await?;

        let script = match extract_tag(&response, "manim_code") {
            Some(tagged) => strip_code_fences(&tagged),
            // No closed tag: treat the whole response as the script
            None => strip_code_fences(&response),
        };
        let explanation =
            extract_tag(&response, "explanation").unwrap_or_else(|| "Animation generated".to_string());

        Ok(GenerationResult {
            script: ensure_canonical_scene(&script),
            explanation,
        })
    }

    async fn fix(
        &self,
        previous_script: &str,
        error_context: &str,
        attempt: u32,
    ) -> Result<GenerationResult> {
        let context = prompts::fix_context(previous_script, error_context, attempt);

        let response = match self
            .llm
            .complete(
                &prompts::error_fixing_system(),
                &context,
                Some(self.max_tokens),
                FIX_TEMPERATURE,
            )
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // Degrade to a no-op fix: retry the unchanged script
                warn!("Fix request failed, retrying unchanged script: {}", e);
                return Ok(GenerationResult {
                    script: previous_script.to_string(),
                    explanation: format!("Unable to fix error: {}", e),
                });
            }
        };

        let script = match extract_tag(&response, "fixed_code") {
            Some(tagged) => strip_code_fences(&tagged),
            None => strip_code_fences(&response),
        };
        let explanation =
            extract_tag(&response, "fix_explanation").unwrap_or_else(|| "Code fixed".to_string());

        Ok(GenerationResult {
            script: ensure_canonical_scene(&script),
            explanation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::SCENE_CLASS;

    // Extraction and normalization used by generate/fix, exercised the way
    // the client composes them.

    #[test]
    fn test_tagged_response_extraction_pipeline() {
        let response = "Here you go:\n<manim_code>\n```python\nclass GeneratedScene(Scene):\n    def construct(self):\n        self.add(Dot())\n```\n</manim_code>\n<explanation>\nA dot.\n</explanation>";
        let script = strip_code_fences(&extract_tag(response, "manim_code").unwrap());
        assert!(script.starts_with("class GeneratedScene"));
        assert_eq!(extract_tag(response, "explanation").unwrap(), "A dot.");
    }

    #[test]
    fn test_untagged_response_falls_back_to_whole_body() {
        let response = "```python\ncircle = Circle()\n```";
        assert_eq!(extract_tag(response, "manim_code"), None);
        let script = ensure_canonical_scene(&strip_code_fences(response));
        assert_eq!(script.matches(SCENE_CLASS).count(), 1);
    }
}
