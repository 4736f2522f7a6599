//! The pipeline orchestrator: drives a document through OCR → Braille →
//! Audio and persists per-stage progress.
//!
//! ## Failure policy
//!
//! OCR and Braille failures are fatal — without text there is nothing to
//! transcode, and Braille is the product's primary deliverable. An Audio
//! failure is recorded on the Audio outcome and the job still completes:
//! the pipeline never holds text and Braille hostage to speech-synthesis
//! reliability.
//!
//! ## Processing right
//!
//! `start_pipeline` performs an atomic check-and-set: the job must be
//! exactly `Uploaded` and its id must not already be in flight. At most one
//! pipeline runs per document; stage outcomes are only ever mutated by the
//! task holding that document's processing right. Cancellation is observed
//! between stages only — a cancelled job is marked `Failed` with a
//! cancellation note on the stage that never ran, never left partially
//! `Completed`.

use crate::braille::{BrailleTranscoder, Transcoder};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::job::{DocumentJob, JobMetadata, JobStatus, ProcessingStage};
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::store::JobStore;
use crate::pipeline::tts::SpeechSynthesizer;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Sequences the three stages for any number of independent documents.
///
/// Collaborators are shared handles; the orchestrator itself holds no
/// per-document state beyond the in-flight id registry backing the
/// at-most-one-pipeline-per-document guarantee.
pub struct Orchestrator {
    ocr: Arc<dyn OcrEngine>,
    tts: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn JobStore>,
    transcoder: Arc<dyn BrailleTranscoder>,
    config: PipelineConfig,
    in_flight: Mutex<HashSet<Uuid>>,
}

impl Orchestrator {
    /// An orchestrator using the built-in [`Transcoder`].
    pub fn new(
        ocr: Arc<dyn OcrEngine>,
        tts: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn JobStore>,
        config: PipelineConfig,
    ) -> Self {
        Self::with_transcoder(ocr, tts, store, Arc::new(Transcoder::new()), config)
    }

    /// An orchestrator with a custom transcoding implementation.
    pub fn with_transcoder(
        ocr: Arc<dyn OcrEngine>,
        tts: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn JobStore>,
        transcoder: Arc<dyn BrailleTranscoder>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            ocr,
            tts,
            store,
            transcoder,
            config,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline for one uploaded document.
    ///
    /// # Returns
    /// The updated job: `Completed` when OCR and Braille both succeeded
    /// (regardless of the Audio outcome).
    ///
    /// # Errors
    /// - [`PipelineError::AlreadyProcessing`] — the job is not `Uploaded`,
    ///   or another task holds its processing right
    /// - [`PipelineError::OcrFailed`] / [`PipelineError::BrailleFailed`] —
    ///   fatal stage failures, also recorded on the job
    /// - [`PipelineError::Cancelled`] — cancellation observed between stages
    pub async fn start_pipeline(
        &self,
        mut job: DocumentJob,
    ) -> Result<DocumentJob, PipelineError> {
        let total_start = Instant::now();

        // ── Claim the processing right ───────────────────────────────────
        let _guard = self.claim(job.id)?;
        job.begin_processing()?;
        info!(job_id = %job.id, kind = ?job.source_kind, grade = %job.target_grade, "pipeline started");
        if let Some(obs) = &self.config.observer {
            obs.on_pipeline_start(job.id);
        }
        self.store.save(&job).await?;

        // ── Stage 1: OCR (fatal on failure) ──────────────────────────────
        self.check_cancelled(&mut job, ProcessingStage::Ocr).await?;
        let stage_start = Instant::now();
        self.notify_stage_start(&job, ProcessingStage::Ocr);
        match self
            .ocr
            .extract(&job.source_ref, job.source_kind, &job.language_hint)
            .await
        {
            Ok(text) => {
                debug!(
                    job_id = %job.id,
                    chars = text.chars().count(),
                    elapsed_ms = stage_start.elapsed().as_millis() as u64,
                    "OCR stage complete"
                );
                job.extracted_text = text;
                self.complete_stage(&mut job, ProcessingStage::Ocr).await?;
            }
            Err(e) => {
                let detail = e.to_string();
                self.fail_job(&mut job, ProcessingStage::Ocr, &detail).await?;
                return Err(PipelineError::OcrFailed { detail });
            }
        }

        // ── Stage 2: Braille (fatal on failure) ──────────────────────────
        self.check_cancelled(&mut job, ProcessingStage::Braille).await?;
        self.notify_stage_start(&job, ProcessingStage::Braille);
        match self
            .transcoder
            .transcode(&job.extracted_text, job.target_grade, &job.language_hint)
        {
            Ok(cells) => {
                debug!(job_id = %job.id, cells = cells.chars().count(), "Braille stage complete");
                job.braille_text = cells;
                self.complete_stage(&mut job, ProcessingStage::Braille).await?;
            }
            Err(e) => {
                let detail = e.to_string();
                self.fail_job(&mut job, ProcessingStage::Braille, &detail).await?;
                return Err(PipelineError::BrailleFailed { detail });
            }
        }

        // ── Stage 3: Audio (best-effort) ─────────────────────────────────
        if self.config.audio_enabled {
            self.check_cancelled(&mut job, ProcessingStage::Audio).await?;
            self.notify_stage_start(&job, ProcessingStage::Audio);
            match self
                .tts
                .synthesize(&job.extracted_text, &job.language_hint, self.config.speech_rate)
                .await
            {
                Ok(audio_ref) => {
                    debug!(job_id = %job.id, %audio_ref, "Audio stage complete");
                    job.audio_ref = Some(audio_ref);
                    self.complete_stage(&mut job, ProcessingStage::Audio).await?;
                }
                Err(e) => {
                    // Non-fatal: record and move on.
                    let detail = e.to_string();
                    warn!(job_id = %job.id, error = %detail, "Audio stage failed; continuing");
                    job.outcomes
                        .get_mut(ProcessingStage::Audio)
                        .mark_failed(detail.as_str());
                    job.touch();
                    if let Some(obs) = &self.config.observer {
                        obs.on_stage_error(job.id, ProcessingStage::Audio, &detail);
                    }
                    self.store.save(&job).await?;
                }
            }
        } else {
            debug!(job_id = %job.id, "Audio stage disabled by caller preference");
        }

        // ── Finish ───────────────────────────────────────────────────────
        job.metadata = Some(JobMetadata {
            word_count: job.extracted_text.split_whitespace().count(),
            character_count: job.extracted_text.chars().count(),
            processing_ms: total_start.elapsed().as_millis() as u64,
        });
        job.status = JobStatus::Completed;
        job.touch();
        self.store.save(&job).await?;

        info!(
            job_id = %job.id,
            stages = job.outcomes.completed_count(),
            elapsed_ms = total_start.elapsed().as_millis() as u64,
            "pipeline complete"
        );
        if let Some(obs) = &self.config.observer {
            obs.on_pipeline_complete(job.id, job.outcomes.completed_count());
        }
        Ok(job)
    }

    /// Transcode text outside any pipeline, for ad-hoc translation requests.
    ///
    /// The grade arrives in its stored-string form; an unrecognised value is
    /// the one transcoding error.
    pub fn transcode_adhoc(
        &self,
        text: &str,
        grade: &str,
        language: &str,
    ) -> Result<String, crate::error::TranscodeError> {
        let grade = grade.parse()?;
        self.transcoder.transcode(text, grade, language)
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    /// Reserve the in-flight slot for `id`, or report the document as
    /// already processing. The returned guard releases the slot on drop.
    fn claim(&self, id: Uuid) -> Result<InFlightGuard<'_>, PipelineError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(id) {
            return Err(PipelineError::AlreadyProcessing { id });
        }
        Ok(InFlightGuard {
            registry: &self.in_flight,
            id,
        })
    }

    fn notify_stage_start(&self, job: &DocumentJob, stage: ProcessingStage) {
        if let Some(obs) = &self.config.observer {
            obs.on_stage_start(job.id, stage);
        }
    }

    /// Mark `stage` completed and persist.
    async fn complete_stage(
        &self,
        job: &mut DocumentJob,
        stage: ProcessingStage,
    ) -> Result<(), PipelineError> {
        job.outcomes.get_mut(stage).mark_completed();
        job.touch();
        if let Some(obs) = &self.config.observer {
            obs.on_stage_complete(job.id, stage);
        }
        self.store.save(job).await?;
        Ok(())
    }

    /// Record a fatal stage failure, move the job to `Failed`, persist.
    async fn fail_job(
        &self,
        job: &mut DocumentJob,
        stage: ProcessingStage,
        detail: &str,
    ) -> Result<(), PipelineError> {
        warn!(job_id = %job.id, %stage, error = %detail, "fatal stage failure");
        job.outcomes.get_mut(stage).mark_failed(detail);
        job.status = JobStatus::Failed;
        job.touch();
        if let Some(obs) = &self.config.observer {
            obs.on_stage_error(job.id, stage, detail);
            obs.on_pipeline_complete(job.id, job.outcomes.completed_count());
        }
        self.store.save(job).await?;
        Ok(())
    }

    /// Between-stages cancellation point. A cancelled job is failed with a
    /// note on the stage that was about to run.
    async fn check_cancelled(
        &self,
        job: &mut DocumentJob,
        upcoming: ProcessingStage,
    ) -> Result<(), PipelineError> {
        let cancelled = self
            .config
            .cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false);
        if !cancelled {
            return Ok(());
        }
        let detail = format!("cancelled before {upcoming} stage");
        self.fail_job(job, upcoming, &detail).await?;
        Err(PipelineError::Cancelled { id: job.id })
    }
}

/// Releases a job's in-flight slot when the pipeline run ends, however it
/// ends.
struct InFlightGuard<'a> {
    registry: &'a Mutex<HashSet<Uuid>>,
    id: Uuid,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
