//! The retry/self-correction state machine
//!
//! Owns one job end to end: `queued → processing → {completed | failed}`,
//! with `processing` re-entered after each failed attempt that has budget
//! remaining. Attempts are strictly sequential — the Nth attempt's input is
//! the (N-1)th's failure — and progress is persisted synchronously after
//! every attempt, so a poller sees monotonically non-decreasing
//! `attempts_used` and a status consistent with the last completed step.
//! Persistence writes are best-effort: the loop's own consistency outranks
//! any single status write.

use crate::error_format::format_failure_for_backend;
use animagen_core::{best_effort, AnimagenError, JobId, JobRecord, Result};
use animagen_llm::{fallback_script, validate_script, GenerationResult, ScriptGenerator};
use animagen_render::Renderer;
use animagen_store::{ArtifactPublisher, JobStore};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Drives the generate → render → publish loop for a single job
pub struct RetryOrchestrator<G, R> {
    generator: G,
    renderer: R,
    publisher: ArtifactPublisher,
    store: Arc<dyn JobStore>,
}

impl<G: ScriptGenerator, R: Renderer> RetryOrchestrator<G, R> {
    pub fn new(
        generator: G,
        renderer: R,
        publisher: ArtifactPublisher,
        store: Arc<dyn JobStore>,
    ) -> Self {
        Self {
            generator,
            renderer,
            publisher,
            store,
        }
    }

    /// Run the job to a terminal state, returning the public artifact URL
    ///
    /// Exits on the first successful attempt. When the budget is exhausted
    /// the job is persisted as failed and the last failure is returned.
    pub async fn run(&self, mut record: JobRecord) -> Result<String> {
        let job_id = record.id;

        record.mark_processing();
        best_effort("initial status write", || self.store.upsert(&record)).await;

        let mut script = String::new();
        let mut last_failure: Option<AnimagenError> = None;

        for attempt in 1..=record.max_attempts {
            info!(
                "Attempt {}/{} for job {}",
                attempt, record.max_attempts, job_id
            );

            // Generate fresh on the first attempt, fix thereafter
            let generation = match &last_failure {
                None => match self.generator.generate(&record.prompt).await {
                    Ok(generation) => generation,
                    Err(e) => {
                        // Degrade to the templated script so the job still
                        // reaches a render attempt
                        warn!("Generation failed for job {}: {}", job_id, e);
                        GenerationResult {
                            script: fallback_script(&record.prompt),
                            explanation: "Fallback animation due to generation error".to_string(),
                        }
                    }
                },
                Some(failure) => {
                    let error_context = format_failure_for_backend(failure);
                    match self
                        .generator
                        .fix(&script, &error_context, attempt)
                        .await
                    {
                        Ok(generation) => generation,
                        Err(e) => {
                            warn!("Fix failed for job {}: {}", job_id, e);
                            GenerationResult {
                                script: script.clone(),
                                explanation: format!("Unable to fix error: {}", e),
                            }
                        }
                    }
                }
            };
            script = generation.script;
            info!("Generation explanation: {}", generation.explanation);

            // Advisory only; the render step is the authoritative judge
            let report = validate_script(&script);
            if !report.passed {
                warn!("Script validation failed: {}", report.summary());
            }

            match self.render_and_publish(&script, &job_id).await {
                Ok(url) => {
                    record.complete(attempt, &url, &script);
                    best_effort("completion status write", || self.store.upsert(&record)).await;
                    info!("Job {} completed on attempt {}: {}", job_id, attempt, url);
                    return Ok(url);
                }
                Err(failure) => {
                    error!("Attempt {} for job {} failed: {}", attempt, job_id, failure);
                    record.record_attempt_failure(attempt, failure.to_string());
                    best_effort("attempt status write", || self.store.upsert(&record)).await;
                    last_failure = Some(failure);
                }
            }
        }

        let last_message = last_failure
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown failure".to_string());
        let message = format!(
            "Failed to render job {} after {} attempts. Last error: {}",
            job_id, record.max_attempts, last_message
        );
        error!("{}", message);

        record.fail(&message);
        best_effort("failure status write", || self.store.upsert(&record)).await;

        Err(AnimagenError::Other(message))
    }

    /// One attempt's render-then-publish step
    ///
    /// A publish failure is this attempt's failure: a rendered but
    /// unpublishable artifact is not a completed job, and a later attempt
    /// may succeed end to end.
    async fn render_and_publish(&self, script: &str, job_id: &JobId) -> Result<String> {
        let artifact = self.renderer.render(script, job_id).await?;
        self.publisher.publish(&artifact, job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use animagen_core::{JobRequest, JobStatus};
    use animagen_store::{ArtifactStore, MemoryJobStore};
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct ScriptedGenerator {
        generate_calls: AtomicU32,
        fix_calls: AtomicU32,
        fix_attempts_seen: Mutex<Vec<u32>>,
        fail_generate: bool,
    }

    impl ScriptedGenerator {
        fn new() -> Self {
            Self {
                generate_calls: AtomicU32::new(0),
                fix_calls: AtomicU32::new(0),
                fix_attempts_seen: Mutex::new(Vec::new()),
                fail_generate: false,
            }
        }

        fn failing_generate() -> Self {
            Self {
                fail_generate: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl ScriptGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_generate {
                return Err(AnimagenError::Generation("backend down".to_string()));
            }
            Ok(GenerationResult {
                script: format!(
                    "from manim import *\n\nclass GeneratedScene(Scene):\n    def construct(self):\n        # {}\n        self.add(Dot())",
                    prompt
                ),
                explanation: "initial".to_string(),
            })
        }

        async fn fix(
            &self,
            previous_script: &str,
            error_context: &str,
            attempt: u32,
        ) -> Result<GenerationResult> {
            self.fix_calls.fetch_add(1, Ordering::SeqCst);
            self.fix_attempts_seen.lock().unwrap().push(attempt);
            assert!(error_context.contains("ERROR") || !error_context.is_empty());
            Ok(GenerationResult {
                script: format!("{}\n# fix {}", previous_script, attempt),
                explanation: format!("fixed on attempt {}", attempt),
            })
        }
    }

    /// Renderer that fails the first `failures` calls, then succeeds
    struct FlakyRenderer {
        calls: AtomicU32,
        failures: u32,
        scripts_seen: Mutex<Vec<String>>,
    }

    impl FlakyRenderer {
        fn failing_first(failures: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures,
                scripts_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Renderer for FlakyRenderer {
        async fn render(&self, script: &str, job_id: &JobId) -> Result<PathBuf> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.scripts_seen.lock().unwrap().push(script.to_string());
            if call <= self.failures {
                Err(AnimagenError::RenderFailed {
                    exit_code: Some(1),
                    command: "manim -pql job.py GeneratedScene".to_string(),
                    stderr: format!("boom on call {}", call),
                    stdout: String::new(),
                })
            } else {
                Ok(PathBuf::from(format!("/nonexistent/{}.mp4", job_id)))
            }
        }
    }

    struct FlakyStore {
        calls: AtomicU32,
        failures: u32,
    }

    #[async_trait]
    impl ArtifactStore for FlakyStore {
        async fn upload(&self, key: &str, _path: &Path) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(AnimagenError::Upload("bucket unavailable".to_string()))
            } else {
                Ok(format!("https://cdn.test/{}", key))
            }
        }
    }

    /// Job store that snapshots every write so tests can check ordering
    struct ProbeStore {
        inner: MemoryJobStore,
        writes: Mutex<Vec<JobRecord>>,
    }

    impl ProbeStore {
        fn new() -> Self {
            Self {
                inner: MemoryJobStore::new(),
                writes: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl JobStore for ProbeStore {
        async fn upsert(&self, record: &JobRecord) -> Result<()> {
            self.writes.lock().unwrap().push(record.clone());
            self.inner.upsert(record).await
        }

        async fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>> {
            self.inner.fetch(id).await
        }
    }

    /// Job store whose first `failures` writes are refused; reads and later
    /// writes pass through to the inner map
    struct RefusingStore {
        inner: MemoryJobStore,
        calls: AtomicU32,
        failures: u32,
    }

    impl RefusingStore {
        fn refusing_first(failures: u32) -> Self {
            Self {
                inner: MemoryJobStore::new(),
                calls: AtomicU32::new(0),
                failures,
            }
        }
    }

    #[async_trait]
    impl JobStore for RefusingStore {
        async fn upsert(&self, record: &JobRecord) -> Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(AnimagenError::Store("status backend unavailable".to_string()))
            } else {
                self.inner.upsert(record).await
            }
        }

        async fn fetch(&self, id: &JobId) -> Result<Option<JobRecord>> {
            self.inner.fetch(id).await
        }
    }

    fn make_record(max_attempts: u32) -> JobRecord {
        let request = JobRequest::new("animate the unit circle").with_max_attempts(max_attempts);
        JobRecord::new(JobId::new(), &request)
    }

    fn orchestrator<S: JobStore + 'static>(
        generator: ScriptedGenerator,
        renderer: FlakyRenderer,
        publish_failures: u32,
        store: Arc<S>,
    ) -> RetryOrchestrator<ScriptedGenerator, FlakyRenderer> {
        let publisher = ArtifactPublisher::new(Arc::new(FlakyStore {
            calls: AtomicU32::new(0),
            failures: publish_failures,
        }));
        RetryOrchestrator::new(generator, renderer, publisher, store)
    }

    #[tokio::test]
    async fn test_exhausted_budget_fails_after_exactly_n_attempts() {
        let store = Arc::new(ProbeStore::new());
        let orch = orchestrator(
            ScriptedGenerator::new(),
            FlakyRenderer::failing_first(u32::MAX),
            0,
            store.clone(),
        );
        let record = make_record(3);
        let id = record.id;

        let result = orch.run(record).await;
        assert!(result.is_err());

        let final_record = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(final_record.status, JobStatus::Failed);
        assert_eq!(final_record.attempts_used, 3);
        assert!(final_record.artifact_url.is_none());
        assert!(final_record
            .error_message
            .as_deref()
            .unwrap()
            .contains("after 3 attempts"));

        assert_eq!(orch.generator.generate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(orch.generator.fix_calls.load(Ordering::SeqCst), 2);
        assert_eq!(*orch.generator.fix_attempts_seen.lock().unwrap(), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_success_on_attempt_k_exits_immediately() {
        let store = Arc::new(ProbeStore::new());
        let orch = orchestrator(
            ScriptedGenerator::new(),
            FlakyRenderer::failing_first(1),
            0,
            store.clone(),
        );
        let record = make_record(5);
        let id = record.id;

        let url = orch.run(record).await.unwrap();
        assert!(url.ends_with(".mp4"));

        let final_record = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(final_record.status, JobStatus::Completed);
        assert_eq!(final_record.attempts_used, 2);
        assert!(final_record.error_message.is_none());
        assert_eq!(final_record.artifact_url.as_deref(), Some(url.as_str()));
        assert!(final_record.final_script.as_deref().unwrap().contains("fix 2"));

        // Attempts 3..5 never execute
        assert_eq!(orch.renderer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_every_persisted_write_holds_invariants_and_monotonic_attempts() {
        let store = Arc::new(ProbeStore::new());
        let orch = orchestrator(
            ScriptedGenerator::new(),
            FlakyRenderer::failing_first(2),
            0,
            store.clone(),
        );

        orch.run(make_record(4)).await.unwrap();

        let writes = store.writes.lock().unwrap();
        assert!(!writes.is_empty());
        let mut previous_attempts = 0;
        for record in writes.iter() {
            assert!(record.invariants_hold(), "invariant broke: {:?}", record);
            assert!(record.attempts_used >= previous_attempts);
            previous_attempts = record.attempts_used;
        }
        assert_eq!(writes.last().unwrap().status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_publish_failure_is_the_attempts_failure() {
        let store = Arc::new(ProbeStore::new());
        let orch = orchestrator(
            ScriptedGenerator::new(),
            FlakyRenderer::failing_first(0),
            u32::MAX,
            store.clone(),
        );
        let record = make_record(1);
        let id = record.id;

        assert!(orch.run(record).await.is_err());

        let final_record = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(final_record.status, JobStatus::Failed);
        let message = final_record.error_message.unwrap();
        assert!(message.contains("upload"), "got: {}", message);
        assert!(!message.contains("subprocess"));
    }

    #[tokio::test]
    async fn test_publish_failure_consumes_attempt_then_retry_succeeds() {
        let store = Arc::new(ProbeStore::new());
        let orch = orchestrator(
            ScriptedGenerator::new(),
            FlakyRenderer::failing_first(0),
            1,
            store.clone(),
        );
        let record = make_record(2);
        let id = record.id;

        orch.run(record).await.unwrap();

        let final_record = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(final_record.status, JobStatus::Completed);
        assert_eq!(final_record.attempts_used, 2);
        // Publish failure triggered a full re-render
        assert_eq!(orch.renderer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_degrades_to_fallback_script() {
        let store = Arc::new(ProbeStore::new());
        let orch = orchestrator(
            ScriptedGenerator::failing_generate(),
            FlakyRenderer::failing_first(0),
            0,
            store.clone(),
        );
        let record = make_record(1);
        let id = record.id;

        orch.run(record).await.unwrap();

        let scripts = orch.renderer.scripts_seen.lock().unwrap();
        assert!(scripts[0].contains("GeneratedScene"));
        assert!(scripts[0].contains("animate the unit circle"));

        let final_record = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(final_record.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_loop_survives_a_store_that_refuses_every_write() {
        let store = Arc::new(RefusingStore::refusing_first(u32::MAX));
        let orch = orchestrator(
            ScriptedGenerator::new(),
            FlakyRenderer::failing_first(1),
            0,
            store.clone(),
        );

        let url = orch.run(make_record(3)).await.unwrap();
        assert!(url.ends_with(".mp4"));

        // Retry sequence ran in full despite zero writes landing
        assert_eq!(orch.generator.generate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(orch.generator.fix_calls.load(Ordering::SeqCst), 1);
        assert_eq!(orch.renderer.calls.load(Ordering::SeqCst), 2);
        assert!(store.calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_later_write_self_corrects_after_initial_write_failure() {
        // Only the initial processing write is refused
        let store = Arc::new(RefusingStore::refusing_first(1));
        let orch = orchestrator(
            ScriptedGenerator::new(),
            FlakyRenderer::failing_first(1),
            0,
            store.clone(),
        );
        let record = make_record(3);
        let id = record.id;

        orch.run(record).await.unwrap();

        let final_record = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(final_record.status, JobStatus::Completed);
        assert_eq!(final_record.attempts_used, 2);
        assert!(final_record.invariants_hold());
    }

    #[tokio::test]
    async fn test_intermediate_writes_stay_processing() {
        let store = Arc::new(ProbeStore::new());
        let orch = orchestrator(
            ScriptedGenerator::new(),
            FlakyRenderer::failing_first(u32::MAX),
            0,
            store.clone(),
        );

        let _ = orch.run(make_record(2)).await;

        let writes = store.writes.lock().unwrap();
        // initial + 2 attempt failures + terminal
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[0].status, JobStatus::Processing);
        assert_eq!(writes[0].attempts_used, 0);
        assert_eq!(writes[1].status, JobStatus::Processing);
        assert_eq!(writes[1].attempts_used, 1);
        assert!(writes[1].error_message.is_some());
        assert_eq!(writes[3].status, JobStatus::Failed);
    }
}
