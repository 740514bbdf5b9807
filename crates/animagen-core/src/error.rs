//! Unified error types for Animagen

use thiserror::Error;

/// Unified error type for all Animagen operations
#[derive(Error, Debug)]
pub enum AnimagenError {
    // Code generation backend errors
    #[error("Generation backend error: {0}")]
    Generation(String),

    // Render subprocess errors
    #[error("Render subprocess failed with exit code {exit_code:?}: {stderr}")]
    RenderFailed {
        /// Exit code, if the process terminated normally
        exit_code: Option<i32>,
        /// The command line that was invoked
        command: String,
        stderr: String,
        stdout: String,
    },

    #[error("Rendered artifact not found: {0}")]
    ArtifactMissing(String),

    #[error("Render workspace error: {0}")]
    Workspace(String),

    // Storage errors
    #[error("Artifact upload failed: {0}")]
    Upload(String),

    #[error("Job store error: {0}")]
    Store(String),

    // Request validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl AnimagenError {
    /// Short category name used when reporting failures to the backend
    pub fn category(&self) -> &'static str {
        match self {
            Self::Generation(_) => "generation",
            Self::RenderFailed { .. } => "render_subprocess",
            Self::ArtifactMissing(_) => "artifact_missing",
            Self::Workspace(_) => "workspace",
            Self::Upload(_) => "upload",
            Self::Store(_) => "store",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }
}

/// Result type alias using AnimagenError
pub type Result<T> = std::result::Result<T, AnimagenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_failed_display() {
        let err = AnimagenError::RenderFailed {
            exit_code: Some(1),
            command: "manim -pql scene.py GeneratedScene".to_string(),
            stderr: "NameError: name 'Circel' is not defined".to_string(),
            stdout: String::new(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit code Some(1)"));
        assert!(msg.contains("Circel"));
        assert_eq!(err.category(), "render_subprocess");
    }

    #[test]
    fn test_category_names() {
        assert_eq!(
            AnimagenError::Upload("bucket rejected".into()).category(),
            "upload"
        );
        assert_eq!(
            AnimagenError::ArtifactMissing("no mp4".into()).category(),
            "artifact_missing"
        );
    }
}
