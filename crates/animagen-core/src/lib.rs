//! # animagen-core
//!
//! Core types for the Animagen animation rendering service.
//!
//! Animagen turns a natural-language prompt into a rendered animation by
//! driving an LLM backend and the `manim` CLI inside a retry/self-correction
//! loop. This crate holds what every other crate shares:
//!
//! - The persisted job record and its lifecycle (`queued → processing →
//!   completed | failed`)
//! - The unified error taxonomy the retry loop classifies failures with
//! - Service configuration
//! - The best-effort wrapper for non-fatal persistence writes

pub mod best_effort;
mod config;
mod error;
mod types;

pub use best_effort::best_effort;
pub use config::{AnimagenConfig, LlmConfig, RenderConfig, ServerConfig, StorageConfig};
pub use error::{AnimagenError, Result};
pub use types::*;
