//! Pipeline state-machine scenarios with mock collaborators.
//!
//! These cover the orchestrator's failure policy: OCR and Braille failures
//! are fatal, Audio failures are not, and a document can be processed at
//! most once at a time.

use async_trait::async_trait;
use dotscribe::pipeline::{process_batch, InMemoryStore, OcrEngine, SpeechSynthesizer};
use dotscribe::{
    BrailleGrade, BrailleTranscoder, DocumentJob, JobStatus, OcrError, Orchestrator,
    PipelineConfig, PipelineError, PipelineObserver, ProcessingStage, SourceKind, TranscodeError,
    TtsError,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── Mock collaborators ───────────────────────────────────────────────────────

/// Returns fixed text, optionally after a delay (to force overlap in
/// concurrency tests) and optionally tripping a cancel flag mid-stage.
struct StaticOcr {
    text: String,
    delay: Duration,
    trip_cancel: Option<Arc<AtomicBool>>,
}

impl StaticOcr {
    fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            delay: Duration::ZERO,
            trip_cancel: None,
        }
    }
}

#[async_trait]
impl OcrEngine for StaticOcr {
    async fn extract(
        &self,
        _source_ref: &str,
        _kind: SourceKind,
        _language: &str,
    ) -> Result<String, OcrError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(flag) = &self.trip_cancel {
            flag.store(true, Ordering::SeqCst);
        }
        Ok(self.text.clone())
    }
}

struct FailingOcr;

#[async_trait]
impl OcrEngine for FailingOcr {
    async fn extract(
        &self,
        _source_ref: &str,
        _kind: SourceKind,
        _language: &str,
    ) -> Result<String, OcrError> {
        Err(OcrError::Corrupt {
            detail: "truncated image data".into(),
        })
    }
}

struct StaticTts;

#[async_trait]
impl SpeechSynthesizer for StaticTts {
    async fn synthesize(
        &self,
        _text: &str,
        _language: &str,
        rate: u32,
    ) -> Result<String, TtsError> {
        Ok(format!("audio/{rate}.wav"))
    }
}

struct FailingTts;

#[async_trait]
impl SpeechSynthesizer for FailingTts {
    async fn synthesize(
        &self,
        _text: &str,
        _language: &str,
        _rate: u32,
    ) -> Result<String, TtsError> {
        Err(TtsError::Timeout { secs: 30 })
    }
}

struct FailingTranscoder;

impl BrailleTranscoder for FailingTranscoder {
    fn transcode(
        &self,
        _text: &str,
        _grade: BrailleGrade,
        _language: &str,
    ) -> Result<String, TranscodeError> {
        Err(TranscodeError::UnsupportedGrade {
            grade: "grade9".into(),
        })
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn job() -> DocumentJob {
    DocumentJob::new("uploads/scan.png", SourceKind::Image, "en", BrailleGrade::Grade2)
}

fn orchestrator_with(
    ocr: Arc<dyn OcrEngine>,
    tts: Arc<dyn SpeechSynthesizer>,
    config: PipelineConfig,
) -> (Arc<Orchestrator>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = Arc::new(Orchestrator::new(ocr, tts, store.clone(), config));
    (orchestrator, store)
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_pipeline_completes_all_stages() {
    let (orchestrator, store) = orchestrator_with(
        Arc::new(StaticOcr::with_text("the quick brown fox")),
        Arc::new(StaticTts),
        PipelineConfig::default(),
    );

    let done = orchestrator.start_pipeline(job()).await.unwrap();

    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.extracted_text, "the quick brown fox");
    assert!(done.braille_text.starts_with('⠮'), "Grade 2 should contract 'the'");
    assert_eq!(done.audio_ref.as_deref(), Some("audio/150.wav"));
    for stage in ProcessingStage::ALL {
        assert!(done.outcomes.get(stage).completed, "{stage} should be complete");
        assert!(done.outcomes.get(stage).completed_at.is_some());
    }

    let meta = done.metadata.expect("completed job carries metadata");
    assert_eq!(meta.word_count, 4);
    assert_eq!(meta.character_count, 19);

    // The final persisted snapshot matches what the caller got back.
    assert_eq!(store.get(done.id).await.unwrap(), done);
}

#[tokio::test]
async fn store_sees_a_save_after_every_transition() {
    let (orchestrator, store) = orchestrator_with(
        Arc::new(StaticOcr::with_text("hello")),
        Arc::new(StaticTts),
        PipelineConfig::default(),
    );

    orchestrator.start_pipeline(job()).await.unwrap();

    // Processing + OCR + Braille + Audio + Completed.
    assert_eq!(store.save_count().await, 5);
}

#[tokio::test]
async fn audio_disabled_skips_the_stage_entirely() {
    let config = PipelineConfig::builder().audio_enabled(false).build().unwrap();
    let (orchestrator, _store) = orchestrator_with(
        Arc::new(StaticOcr::with_text("hello")),
        // Would fail if ever invoked.
        Arc::new(FailingTts),
        config,
    );

    let done = orchestrator.start_pipeline(job()).await.unwrap();

    assert_eq!(done.status, JobStatus::Completed);
    assert!(done.outcomes.audio.is_pending(), "audio must not be attempted");
    assert!(done.audio_ref.is_none());
}

// ── Failure policy ───────────────────────────────────────────────────────────

#[tokio::test]
async fn audio_failure_is_not_fatal() {
    let (orchestrator, _store) = orchestrator_with(
        Arc::new(StaticOcr::with_text("hello world")),
        Arc::new(FailingTts),
        PipelineConfig::default(),
    );

    let done = orchestrator.start_pipeline(job()).await.unwrap();

    assert_eq!(done.status, JobStatus::Completed);
    assert!(done.outcomes.ocr.completed);
    assert!(done.outcomes.braille.completed);
    assert!(!done.outcomes.audio.completed);
    let audio_err = done.outcomes.audio.error.as_deref().unwrap();
    assert!(audio_err.contains("timed out"), "got: {audio_err}");
    assert!(done.audio_ref.is_none());
}

#[tokio::test]
async fn ocr_failure_fails_job_and_skips_downstream() {
    let (orchestrator, store) = orchestrator_with(
        Arc::new(FailingOcr),
        Arc::new(StaticTts),
        PipelineConfig::default(),
    );

    let j = job();
    let id = j.id;
    let err = orchestrator.start_pipeline(j).await.unwrap_err();
    assert!(matches!(err, PipelineError::OcrFailed { .. }));

    let saved = store.get(id).await.unwrap();
    assert_eq!(saved.status, JobStatus::Failed);
    assert!(saved.extracted_text.is_empty());
    assert!(saved.outcomes.ocr.error.as_deref().unwrap().contains("truncated"));
    // Downstream stages were never touched.
    assert!(saved.outcomes.braille.is_pending());
    assert!(saved.outcomes.audio.is_pending());
}

#[tokio::test]
async fn braille_failure_fails_job() {
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = Orchestrator::with_transcoder(
        Arc::new(StaticOcr::with_text("hello")),
        Arc::new(StaticTts),
        store.clone(),
        Arc::new(FailingTranscoder),
        PipelineConfig::default(),
    );

    let j = job();
    let id = j.id;
    let err = orchestrator.start_pipeline(j).await.unwrap_err();
    assert!(matches!(err, PipelineError::BrailleFailed { .. }));

    let saved = store.get(id).await.unwrap();
    assert_eq!(saved.status, JobStatus::Failed);
    assert!(saved.outcomes.ocr.completed, "OCR ran before the failure");
    assert!(saved.outcomes.braille.error.is_some());
    assert!(saved.outcomes.audio.is_pending());
    assert!(saved.braille_text.is_empty());
}

// ── Processing right ─────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_start_grants_exactly_one_processing_right() {
    let slow_ocr = StaticOcr {
        text: "hello".into(),
        delay: Duration::from_millis(200),
        trip_cancel: None,
    };
    let (orchestrator, _store) = orchestrator_with(
        Arc::new(slow_ocr),
        Arc::new(StaticTts),
        PipelineConfig::default(),
    );

    let j = job();
    let first = tokio::spawn({
        let orchestrator = orchestrator.clone();
        let j = j.clone();
        async move { orchestrator.start_pipeline(j).await }
    });
    // Give the first task a moment to claim the slot.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = orchestrator.start_pipeline(j).await;

    assert!(matches!(second, Err(PipelineError::AlreadyProcessing { .. })));
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status, JobStatus::Completed);
}

#[tokio::test]
async fn completed_job_cannot_be_restarted() {
    let (orchestrator, _store) = orchestrator_with(
        Arc::new(StaticOcr::with_text("hello")),
        Arc::new(StaticTts),
        PipelineConfig::default(),
    );

    let done = orchestrator.start_pipeline(job()).await.unwrap();
    let err = orchestrator.start_pipeline(done).await.unwrap_err();
    assert!(matches!(err, PipelineError::AlreadyProcessing { .. }));
}

// ── Cancellation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn pre_set_cancel_flag_stops_before_ocr() {
    let flag = Arc::new(AtomicBool::new(true));
    let config = PipelineConfig::builder().cancel_flag(flag).build().unwrap();
    let (orchestrator, store) = orchestrator_with(
        Arc::new(StaticOcr::with_text("hello")),
        Arc::new(StaticTts),
        config,
    );

    let j = job();
    let id = j.id;
    let err = orchestrator.start_pipeline(j).await.unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled { .. }));

    let saved = store.get(id).await.unwrap();
    assert_eq!(saved.status, JobStatus::Failed);
    assert!(saved.outcomes.ocr.error.as_deref().unwrap().contains("cancelled"));
    assert!(saved.extracted_text.is_empty());
}

#[tokio::test]
async fn cancellation_is_observed_between_stages_only() {
    let flag = Arc::new(AtomicBool::new(false));
    let ocr = StaticOcr {
        text: "hello".into(),
        delay: Duration::ZERO,
        trip_cancel: Some(flag.clone()),
    };
    let config = PipelineConfig::builder().cancel_flag(flag).build().unwrap();
    let (orchestrator, store) = orchestrator_with(Arc::new(ocr), Arc::new(StaticTts), config);

    let j = job();
    let id = j.id;
    let err = orchestrator.start_pipeline(j).await.unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled { .. }));

    let saved = store.get(id).await.unwrap();
    // The in-flight OCR stage ran to completion; the Braille stage never
    // started. Nothing is partially complete.
    assert!(saved.outcomes.ocr.completed);
    assert_eq!(saved.extracted_text, "hello");
    assert!(saved.outcomes.braille.error.as_deref().unwrap().contains("cancelled"));
    assert!(saved.braille_text.is_empty());
    assert_eq!(saved.status, JobStatus::Failed);
}

// ── Batch ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_runs_independent_pipelines() {
    let (orchestrator, _store) = orchestrator_with(
        Arc::new(StaticOcr::with_text("hello")),
        Arc::new(StaticTts),
        PipelineConfig::builder().concurrency(2).build().unwrap(),
    );

    let jobs: Vec<DocumentJob> = (0..3).map(|_| job()).collect();
    let ids: Vec<_> = jobs.iter().map(|j| j.id).collect();
    let results = process_batch(&orchestrator, jobs).await;

    assert_eq!(results.len(), 3);
    for (result, id) in results.iter().zip(ids) {
        let done = result.as_ref().unwrap();
        assert_eq!(done.id, id, "results keep submission order");
        assert_eq!(done.status, JobStatus::Completed);
    }
}

#[tokio::test]
async fn batch_isolates_failures_per_document() {
    // One orchestrator whose OCR fails: every job fails independently,
    // none panics or poisons the others.
    let (failing, _) = orchestrator_with(
        Arc::new(FailingOcr),
        Arc::new(StaticTts),
        PipelineConfig::default(),
    );
    let results = process_batch(&failing, (0..2).map(|_| job()).collect()).await;
    assert!(results
        .iter()
        .all(|r| matches!(r, Err(PipelineError::OcrFailed { .. }))));
}

// ── Observer ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct CountingObserver {
    stage_starts: AtomicUsize,
    stage_completes: AtomicUsize,
    stage_errors: AtomicUsize,
    pipeline_completes: AtomicUsize,
}

impl PipelineObserver for CountingObserver {
    fn on_stage_start(&self, _job_id: uuid::Uuid, _stage: ProcessingStage) {
        self.stage_starts.fetch_add(1, Ordering::SeqCst);
    }
    fn on_stage_complete(&self, _job_id: uuid::Uuid, _stage: ProcessingStage) {
        self.stage_completes.fetch_add(1, Ordering::SeqCst);
    }
    fn on_stage_error(&self, _job_id: uuid::Uuid, _stage: ProcessingStage, _error: &str) {
        self.stage_errors.fetch_add(1, Ordering::SeqCst);
    }
    fn on_pipeline_complete(&self, _job_id: uuid::Uuid, _completed_stages: usize) {
        self.pipeline_completes.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn observer_receives_stage_events() {
    let observer = Arc::new(CountingObserver::default());
    let config = PipelineConfig::builder()
        .observer(observer.clone())
        .build()
        .unwrap();
    let (orchestrator, _store) = orchestrator_with(
        Arc::new(StaticOcr::with_text("hello")),
        Arc::new(FailingTts),
        config,
    );

    orchestrator.start_pipeline(job()).await.unwrap();

    assert_eq!(observer.stage_starts.load(Ordering::SeqCst), 3);
    assert_eq!(observer.stage_completes.load(Ordering::SeqCst), 2);
    assert_eq!(observer.stage_errors.load(Ordering::SeqCst), 1);
    assert_eq!(observer.pipeline_completes.load(Ordering::SeqCst), 1);
}

// ── Ad-hoc transcoding ───────────────────────────────────────────────────────

#[tokio::test]
async fn adhoc_transcode_outside_the_pipeline() {
    let (orchestrator, _store) = orchestrator_with(
        Arc::new(StaticOcr::with_text("unused")),
        Arc::new(StaticTts),
        PipelineConfig::default(),
    );

    let cells = orchestrator.transcode_adhoc("hello", "grade1", "en").unwrap();
    assert_eq!(cells, "⠓⠑⠇⠇⠕");

    let err = orchestrator.transcode_adhoc("hello", "grade7", "en").unwrap_err();
    assert!(matches!(err, TranscodeError::UnsupportedGrade { .. }));
}
