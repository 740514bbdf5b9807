//! Best-effort execution for non-fatal side-channel failures
//!
//! The retry loop persists progress after every attempt, but a failed status
//! write must never abort the loop: the job self-corrects its persisted
//! state on the next successful write. Wrap those writes in [`best_effort`]
//! so the contract is explicit rather than buried in error handling.
//!
//! Do NOT use this for rendering, generation, or publishing — those failures
//! are attempt outcomes, not side channels.

use std::future::Future;
use tracing::warn;

use crate::Result;

/// Run an operation whose failure is logged and swallowed
///
/// Returns `Some(value)` on success, `None` on failure.
pub async fn best_effort<F, Fut, T>(operation_name: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match f().await {
        Ok(val) => Some(val),
        Err(e) => {
            warn!("{} failed (best-effort, continuing): {}", operation_name, e);
            None
        }
    }
}
