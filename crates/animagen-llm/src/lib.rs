//! # animagen-llm
//!
//! Code generation client and script tooling for Animagen.
//!
//! This crate owns everything between the retry loop and the LLM backend:
//! - The OpenAI-compatible chat client (no transport retries — retry
//!   semantics live exclusively in the orchestrator)
//! - Tagged-section extraction from untrusted backend responses
//! - Script normalization and the canonical `GeneratedScene` guarantee
//! - Advisory structural validation
//! - The `Generate`/`Fix` operations behind the [`ScriptGenerator`] seam

mod auth;
mod client;
mod codegen;
pub mod normalize;
pub mod parser;
pub mod prompts;
mod types;
pub mod validate;

pub use auth::get_api_key;
pub use client::LlmClient;
pub use codegen::{CodegenClient, ScriptGenerator};
pub use normalize::{
    ensure_canonical_scene, scene_class_name, strip_code_fences, wrap_in_scene, SCENE_CLASS,
    SCENE_METHOD,
};
pub use parser::extract_tag;
pub use prompts::fallback_script;
pub use types::*;
pub use validate::{validate_script, ValidationReport};
