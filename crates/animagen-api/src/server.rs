//! Axum HTTP surface for job submission and status polling
//!
//! Submission returns a job id immediately; the retry loop runs as one
//! spawned background task per job. Status reads go straight to the job
//! store and never block on a running loop. An unknown id is 404 — never
//! conflated with a failed job.

use animagen_core::{AnimagenConfig, JobId, JobRecord, JobRequest, JobStatus, Quality};
use animagen_llm::{CodegenClient, LlmClient};
use animagen_orchestrator::RetryOrchestrator;
use animagen_render::RenderExecutor;
use animagen_store::{ArtifactPublisher, HttpBucketStore, JobStore, MemoryJobStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

/// Concrete orchestrator wiring used by the server
pub type JobOrchestrator = RetryOrchestrator<CodegenClient, RenderExecutor>;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub orchestrator: Arc<JobOrchestrator>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire up the full service from configuration
    pub fn from_config(config: &AnimagenConfig) -> anyhow::Result<SharedState> {
        let llm = LlmClient::from_config(&config.llm)?;
        let generator = CodegenClient::new(llm, config.llm.max_tokens);
        let renderer = RenderExecutor::new(config.render.clone());

        let storage_key = std::env::var(&config.storage.api_key_env).unwrap_or_else(|_| {
            warn!(
                "{} not set; uploading without credentials",
                config.storage.api_key_env
            );
            String::new()
        });
        let bucket = HttpBucketStore::new(&config.storage, storage_key);
        let publisher = ArtifactPublisher::new(Arc::new(bucket));

        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
        let orchestrator = Arc::new(RetryOrchestrator::new(
            generator,
            renderer,
            publisher,
            store.clone(),
        ));

        Ok(Arc::new(AppState {
            store,
            orchestrator,
        }))
    }
}

/// Serve the API on `addr`
pub async fn serve(state: SharedState, addr: &str) -> anyhow::Result<()> {
    let app = router(state);

    info!("Animagen listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/generate-video", post(submit))
        .route("/video-status/:id", get(status))
        .route("/video-info/:id", get(detail))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,
    pub task_id: JobId,
    pub estimated_time: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub task_id: JobId,
    pub status: JobStatus,
    pub video_url: Option<String>,
    pub error_message: Option<String>,
    pub attempts: u32,
    pub progress: String,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub task_id: JobId,
    pub prompt: String,
    pub status: JobStatus,
    pub video_url: Option<String>,
    pub quality: Quality,
    pub attempts: u32,
    pub max_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error_message: Option<String>,
    /// The script itself is never exposed
    pub has_final_script: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

/// GET / - Service index
async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Animagen video generator",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "generate": "/generate-video",
            "status": "/video-status/{task_id}",
            "health": "/health"
        }
    }))
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "animagen"
    }))
}

/// POST /generate-video - Submit a prompt, get a job id immediately
async fn submit(
    State(state): State<SharedState>,
    Json(request): Json<JobRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    if let Err(reason) = request.validate() {
        return Err(api_error(StatusCode::BAD_REQUEST, reason.to_string()));
    }

    let record = JobRecord::new(JobId::new(), &request);
    let task_id = record.id;
    info!(
        "Starting video generation for job {} with prompt: {:.100}",
        task_id, record.prompt
    );

    state
        .store
        .upsert(&record)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    // One background unit of work per job; failures are logged by the loop
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.run(record).await {
            error!("Job {} ended in failure: {}", task_id, e);
        }
    });

    Ok(Json(SubmitResponse {
        message: "Video generation started successfully".to_string(),
        task_id,
        estimated_time: request.quality.estimated_time().to_string(),
    }))
}

/// GET /video-status/{id}
async fn status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let record = lookup(&state, &id).await?;

    Ok(Json(StatusResponse {
        task_id: record.id,
        status: record.status,
        video_url: record.artifact_url,
        error_message: record.error_message,
        attempts: record.attempts_used,
        progress: record.status.progress_message().to_string(),
    }))
}

/// GET /video-info/{id} - Detailed view for debugging
async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DetailResponse>, ApiError> {
    let record = lookup(&state, &id).await?;

    Ok(Json(DetailResponse {
        task_id: record.id,
        prompt: record.prompt,
        status: record.status,
        video_url: record.artifact_url,
        quality: record.quality,
        attempts: record.attempts_used,
        max_attempts: record.max_attempts,
        created_at: record.created_at,
        updated_at: record.updated_at,
        error_message: record.error_message,
        has_final_script: record.final_script.is_some(),
    }))
}

async fn lookup(state: &AppState, id: &str) -> Result<JobRecord, ApiError> {
    let job_id: JobId = id
        .parse()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid task_id format"))?;

    match state.store.fetch(&job_id).await {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(api_error(StatusCode::NOT_FOUND, "Task not found")),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}
