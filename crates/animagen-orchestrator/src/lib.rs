//! # animagen-orchestrator
//!
//! Retry/self-correction engine for Animagen jobs.
//!
//! One orchestrator run owns one job: it generates (or fixes) a script,
//! renders it, publishes the artifact, and persists progress after every
//! attempt, until the first success or the attempt budget is exhausted.
//! Attempts are strictly sequential; no lower layer retries anything.

mod error_format;
mod orchestrator;

pub use error_format::format_failure_for_backend;
pub use orchestrator::RetryOrchestrator;
