//! The document job record: the unit the pipeline operates on.
//!
//! Per-stage progress lives in a fixed struct of three [`StageOutcome`]s
//! indexed by [`ProcessingStage`] — not an open map — so every stage's
//! fields are statically known and the state machine's invariants hold at
//! compile time. The record is created at upload (`Uploaded`), exclusively
//! owned and mutated by the orchestrator while `Processing`, and terminal
//! once `Completed` or `Failed`.

use crate::braille::BrailleGrade;
use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Format of the uploaded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Image,
    Pdf,
}

/// Lifecycle states of a document job.
///
/// ```text
/// Uploaded ──start──▶ Processing ──▶ Completed
///                          │
///                          └──▶ Failed
/// ```
///
/// `Completed` and `Failed` are terminal; no stage runs afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether the job can never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// The three pipeline stages, always attempted in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStage {
    Ocr,
    Braille,
    Audio,
}

impl ProcessingStage {
    /// All stages in execution order.
    pub const ALL: [ProcessingStage; 3] = [
        ProcessingStage::Ocr,
        ProcessingStage::Braille,
        ProcessingStage::Audio,
    ];
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStage::Ocr => f.write_str("ocr"),
            ProcessingStage::Braille => f.write_str("braille"),
            ProcessingStage::Audio => f.write_str("audio"),
        }
    }
}

/// Completion or failure of one stage for one document. Never deleted;
/// mutated in place as the pipeline advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: ProcessingStage,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl StageOutcome {
    /// A not-yet-attempted outcome.
    pub fn pending(stage: ProcessingStage) -> Self {
        Self {
            stage,
            completed: false,
            completed_at: None,
            error: None,
        }
    }

    /// Whether the stage has neither completed nor recorded an error.
    pub fn is_pending(&self) -> bool {
        !self.completed && self.error.is_none()
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
        self.completed_at = Some(Utc::now());
        self.error = None;
    }

    pub(crate) fn mark_failed(&mut self, detail: impl Into<String>) {
        self.completed = false;
        self.error = Some(detail.into());
    }
}

/// One outcome per stage, statically indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcomes {
    pub ocr: StageOutcome,
    pub braille: StageOutcome,
    pub audio: StageOutcome,
}

impl Default for StageOutcomes {
    fn default() -> Self {
        Self {
            ocr: StageOutcome::pending(ProcessingStage::Ocr),
            braille: StageOutcome::pending(ProcessingStage::Braille),
            audio: StageOutcome::pending(ProcessingStage::Audio),
        }
    }
}

impl StageOutcomes {
    pub fn get(&self, stage: ProcessingStage) -> &StageOutcome {
        match stage {
            ProcessingStage::Ocr => &self.ocr,
            ProcessingStage::Braille => &self.braille,
            ProcessingStage::Audio => &self.audio,
        }
    }

    pub fn get_mut(&mut self, stage: ProcessingStage) -> &mut StageOutcome {
        match stage {
            ProcessingStage::Ocr => &mut self.ocr,
            ProcessingStage::Braille => &mut self.braille,
            ProcessingStage::Audio => &mut self.audio,
        }
    }

    /// Stages marked completed so far.
    pub fn completed_count(&self) -> usize {
        ProcessingStage::ALL
            .iter()
            .filter(|s| self.get(**s).completed)
            .count()
    }
}

/// Summary figures computed when a job completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub word_count: usize,
    pub character_count: usize,
    pub processing_ms: u64,
}

/// A document moving through the OCR → Braille → Audio pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentJob {
    pub id: Uuid,
    /// Opaque handle to the stored upload; the pipeline never reads the
    /// bytes itself.
    pub source_ref: String,
    pub source_kind: SourceKind,
    pub language_hint: String,
    pub target_grade: BrailleGrade,
    pub status: JobStatus,
    pub extracted_text: String,
    pub braille_text: String,
    /// Opaque handle to the synthesized audio, when the Audio stage ran and
    /// succeeded.
    pub audio_ref: Option<String>,
    pub outcomes: StageOutcomes,
    pub metadata: Option<JobMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentJob {
    /// A freshly accepted upload, ready for [`crate::pipeline::Orchestrator::start_pipeline`].
    pub fn new(
        source_ref: impl Into<String>,
        source_kind: SourceKind,
        language_hint: impl Into<String>,
        target_grade: BrailleGrade,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            source_ref: source_ref.into(),
            source_kind,
            language_hint: language_hint.into(),
            target_grade,
            status: JobStatus::Uploaded,
            extracted_text: String::new(),
            braille_text: String::new(),
            audio_ref: None,
            outcomes: StageOutcomes::default(),
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check-and-set into `Processing`.
    ///
    /// Succeeds only from exactly `Uploaded`; any other state means the job
    /// is already being (or has been) processed.
    pub(crate) fn begin_processing(&mut self) -> Result<(), PipelineError> {
        if self.status != JobStatus::Uploaded {
            return Err(PipelineError::AlreadyProcessing { id: self.id });
        }
        self.status = JobStatus::Processing;
        self.touch();
        Ok(())
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
