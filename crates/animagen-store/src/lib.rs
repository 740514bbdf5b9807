//! # animagen-store
//!
//! Job record and artifact storage backends for Animagen.
//!
//! Both stores are traits at the seam: the job store stands in for an
//! external database that serializes writes per record, the artifact store
//! for a key-addressed blob bucket with public addresses.

mod artifact_store;
mod job_store;
mod publisher;

pub use artifact_store::{ArtifactStore, HttpBucketStore};
pub use job_store::{JobStore, MemoryJobStore};
pub use publisher::ArtifactPublisher;
