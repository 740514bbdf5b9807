//! Render tool invocation against a disposable workspace
//!
//! Each render attempt gets its own scratch directory: the script is
//! materialized there, the render tool runs as a subprocess with both
//! streams captured, and the directory is torn down when the attempt ends
//! regardless of outcome. A zero exit code alone does not guarantee the
//! artifact is discoverable, so the executor searches a small ordered list
//! of conventional output paths and fails distinctly when none exist.

use animagen_core::{AnimagenError, JobId, RenderConfig, Result};
use animagen_llm::scene_class_name;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

// Fast preview rendering; the tool writes 480p15 output under media/
const PREVIEW_FLAG: &str = "-pql";
const PREVIEW_QUALITY_DIR: &str = "480p15";

/// Seam for rendering a script into a local artifact
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `script` for `job_id`, returning a stable local artifact path
    async fn render(&self, script: &str, job_id: &JobId) -> Result<PathBuf>;
}

/// Invokes the external render tool as an isolated subprocess
#[derive(Debug, Clone)]
pub struct RenderExecutor {
    config: RenderConfig,
}

impl RenderExecutor {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Ordered output-path candidates: the tool's own naming scheme first,
    /// then job-id and scene-name fallbacks at the workspace root
    fn candidate_paths(workspace: &Path, job: &str, scene: &str) -> Vec<PathBuf> {
        let quality_dir = workspace
            .join("media")
            .join("videos")
            .join(job)
            .join(PREVIEW_QUALITY_DIR);
        vec![
            quality_dir.join(format!("{}.mp4", scene)),
            quality_dir.join(format!("{}.mp4", job)),
            workspace.join(format!("{}.mp4", job)),
            workspace.join(format!("{}.mp4", scene)),
        ]
    }
}

#[async_trait]
impl Renderer for RenderExecutor {
    async fn render(&self, script: &str, job_id: &JobId) -> Result<PathBuf> {
        // Disposable workspace, torn down on every exit path via Drop
        let workspace = tempfile::tempdir()
            .map_err(|e| AnimagenError::Workspace(format!("Failed to create workspace: {}", e)))?;

        let job = job_id.to_string();
        let script_path = workspace.path().join(format!("{}.py", job));
        tokio::fs::write(&script_path, script).await?;

        let scene = scene_class_name(script);
        info!("Rendering job {} with scene {}", job, scene);

        let script_arg = script_path.to_str().ok_or_else(|| {
            AnimagenError::Workspace("workspace path contains non-UTF-8 characters".into())
        })?;

        let args = [
            PREVIEW_FLAG,
            "--output_file",
            job.as_str(),
            script_arg,
            scene.as_str(),
        ];
        let command_line = format!("{} {}", self.config.binary, args.join(" "));
        debug!("Running command: {}", command_line);

        let output_future = Command::new(&self.config.binary)
            .args(args)
            .current_dir(workspace.path())
            // Cancellation must not leak a renderer process
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            output_future,
        )
        .await
        {
            Ok(result) => result.map_err(|e| {
                AnimagenError::Workspace(format!("Failed to spawn render tool: {}", e))
            })?,
            Err(_) => {
                warn!("Render for job {} timed out, killing subprocess", job);
                return Err(AnimagenError::RenderFailed {
                    exit_code: None,
                    command: command_line,
                    stderr: format!(
                        "Render timed out after {} seconds",
                        self.config.timeout_secs
                    ),
                    stdout: String::new(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(AnimagenError::RenderFailed {
                exit_code: output.status.code(),
                command: command_line,
                stderr,
                stdout,
            });
        }

        debug!("Render stdout: {}", stdout);
        if !stderr.is_empty() {
            warn!("Render stderr: {}", stderr);
        }

        let candidates = Self::candidate_paths(workspace.path(), &job, &scene);
        let artifact = match candidates.iter().find(|p| p.exists()) {
            Some(path) => {
                info!("Found artifact at {:?}", path);
                path.clone()
            }
            None => {
                error!("Artifact not found; workspace contents:");
                log_tree(workspace.path());
                return Err(AnimagenError::ArtifactMissing(format!(
                    "Rendered artifact not found. Expected at one of: {:?}",
                    candidates
                )));
            }
        };

        // Copy out of the disposable workspace before it is torn down
        tokio::fs::create_dir_all(&self.config.artifact_dir).await?;
        let stable_path = Path::new(&self.config.artifact_dir).join(format!("{}.mp4", job));
        tokio::fs::copy(&artifact, &stable_path).await?;

        Ok(stable_path)
    }
}

/// Debug-log the workspace tree when artifact discovery fails
fn log_tree(dir: &Path) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            error!("  {:?}", path);
            if path.is_dir() {
                log_tree(&path);
            }
        }
    }
}
