//! # animagen-render
//!
//! Render subprocess executor for Animagen.
//!
//! Runs the external render tool (`manim`) against a disposable per-attempt
//! workspace with a fixed fast-preview configuration, captured streams, and
//! guaranteed workspace teardown. Failure is communicated via exit code and
//! stderr only — there is no structured error channel from the tool.

mod executor;

pub use executor::{RenderExecutor, Renderer};
