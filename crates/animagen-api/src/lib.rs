//! # animagen-api
//!
//! HTTP surface for Animagen: job submission, status polling, and the
//! detail/debug view, served with axum over the core retry engine.

mod server;

pub use server::{
    serve, AppState, DetailResponse, JobOrchestrator, SharedState, StatusResponse, SubmitResponse,
};
