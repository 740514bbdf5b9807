//! Core type definitions for Animagen jobs

use crate::error::AnimagenError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum accepted prompt length (characters, after trimming)
pub const MIN_PROMPT_LEN: usize = 5;

/// Hard ceiling on the per-job attempt budget
pub const MAX_ATTEMPT_LIMIT: u32 = 10;

/// Default attempt budget when the caller does not supply one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Opaque job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| format!("Invalid job id: {}", s))
    }
}

/// Requested render quality tier
///
/// Affects execution-time expectations only; the retry loop always renders
/// with the fast preview configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Low,
    Medium,
    High,
}

impl Quality {
    /// Human-readable completion-time estimate shown at submission
    pub fn estimated_time(&self) -> &'static str {
        match self {
            Self::Low => "1-3 minutes",
            Self::Medium => "3-7 minutes",
            Self::High => "5-15 minutes",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Invalid quality: {}", s)),
        }
    }
}

/// Job lifecycle status
///
/// `Completed` and `Failed` are terminal; `Processing` is re-entered after
/// each failed attempt that still has budget remaining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Progress message surfaced by the status endpoint
    pub fn progress_message(&self) -> &'static str {
        match self {
            Self::Queued => "Job queued for processing",
            Self::Processing => "Generating animation code and rendering video",
            Self::Completed => "Video generation completed successfully",
            Self::Failed => "Video generation failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(Self::Queued),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

/// A video generation job submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub prompt: String,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl JobRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            quality: Quality::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Validate submission constraints: non-trivial prompt, bounded budget
    pub fn validate(&self) -> Result<(), AnimagenError> {
        if self.prompt.trim().len() < MIN_PROMPT_LEN {
            return Err(AnimagenError::InvalidRequest(format!(
                "Prompt must be at least {} characters long",
                MIN_PROMPT_LEN
            )));
        }
        if self.max_attempts < 1 || self.max_attempts > MAX_ATTEMPT_LIMIT {
            return Err(AnimagenError::InvalidRequest(format!(
                "max_attempts must be between 1 and {}",
                MAX_ATTEMPT_LIMIT
            )));
        }
        Ok(())
    }
}

/// Persisted record for a single job
///
/// Exclusively mutated by the retry orchestrator that owns the job. The
/// transition helpers keep the record's invariants: `artifact_url` is set
/// iff the status is `Completed`, `attempts_used` never exceeds
/// `max_attempts`, and the error message is cleared on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub prompt: String,
    pub status: JobStatus,
    pub quality: Quality,
    pub max_attempts: u32,
    pub attempts_used: u32,
    pub artifact_url: Option<String>,
    pub error_message: Option<String>,
    pub final_script: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a new queued record from a validated request
    pub fn new(id: JobId, request: &JobRequest) -> Self {
        let now = Utc::now();
        Self {
            id,
            prompt: request.prompt.clone(),
            status: JobStatus::Queued,
            quality: request.quality,
            max_attempts: request.max_attempts,
            attempts_used: 0,
            artifact_url: None,
            error_message: None,
            final_script: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Enter processing: reset attempt counter, clear prior error/artifact
    pub fn mark_processing(&mut self) {
        self.status = JobStatus::Processing;
        self.attempts_used = 0;
        self.artifact_url = None;
        self.error_message = None;
        self.touch();
    }

    /// Record a failed attempt; the job stays in processing
    pub fn record_attempt_failure(&mut self, attempt: u32, message: impl Into<String>) {
        self.status = JobStatus::Processing;
        self.attempts_used = attempt.min(self.max_attempts);
        self.error_message = Some(message.into());
        self.touch();
    }

    /// Terminal success transition
    pub fn complete(&mut self, attempt: u32, artifact_url: impl Into<String>, script: impl Into<String>) {
        self.status = JobStatus::Completed;
        self.attempts_used = attempt.min(self.max_attempts);
        self.artifact_url = Some(artifact_url.into());
        self.final_script = Some(script.into());
        self.error_message = None;
        self.touch();
    }

    /// Terminal failure transition after the budget is exhausted
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.artifact_url = None;
        self.error_message = Some(message.into());
        self.touch();
    }

    /// Check the artifact/status invariant
    pub fn invariants_hold(&self) -> bool {
        let artifact_ok = self.artifact_url.is_some() == (self.status == JobStatus::Completed);
        let attempts_ok = self.attempts_used <= self.max_attempts;
        let error_ok = self.status != JobStatus::Completed || self.error_message.is_none();
        artifact_ok && attempts_ok && error_ok
    }
}
