//! Error types for the dotscribe library.
//!
//! Two distinct groups reflect two distinct failure modes:
//!
//! * [`PipelineError`] — **Fatal**: the document pipeline cannot produce its
//!   primary deliverable (text + Braille). Returned as `Err(PipelineError)`
//!   from [`crate::pipeline::Orchestrator::start_pipeline`].
//!
//! * Collaborator errors ([`OcrError`], [`TtsError`], [`StoreError`]) —
//!   stage-local failures caught at the orchestrator boundary and written
//!   into the matching [`crate::job::StageOutcome`]. Only OCR and Braille
//!   failures escalate to a job-level `Failed` status; a speech-synthesis
//!   failure is recorded on the Audio outcome and the job still completes.
//!
//! The asymmetry is deliberate: the document's primary value must not be
//! held hostage to speech-synthesis reliability.

use thiserror::Error;
use uuid::Uuid;

/// Fatal errors returned by the document pipeline.
///
/// Audio-stage failures never appear here — they are recorded on the job's
/// Audio [`crate::job::StageOutcome`] instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The job was not in the `Uploaded` state, or another task already
    /// holds its processing right.
    #[error("Job {id} is already processing or was processed before")]
    AlreadyProcessing { id: Uuid },

    /// Text extraction failed. Nothing downstream can run without text.
    #[error("OCR stage failed: {detail}")]
    OcrFailed { detail: String },

    /// Braille transcoding failed. Braille is the primary deliverable.
    #[error("Braille stage failed: {detail}")]
    BrailleFailed { detail: String },

    /// The pipeline observed a cancellation request between stages.
    #[error("Pipeline for job {id} was cancelled")]
    Cancelled { id: Uuid },

    /// The persistence collaborator rejected a save.
    #[error("Failed to persist job record: {0}")]
    Store(#[from] StoreError),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors from the Braille transcoding engine's outward entry point.
///
/// The Code Table, Normalizer, and both transcoders never fail on their own;
/// the single failure mode is an unrecognised grade at dispatch.
#[derive(Debug, Clone, Error)]
pub enum TranscodeError {
    /// The requested grade string is not `"grade1"` or `"grade2"`.
    #[error("Unsupported Braille grade: '{grade}' (expected 'grade1' or 'grade2')")]
    UnsupportedGrade { grade: String },
}

/// Construction-time errors for a [`crate::braille::CodeTable`].
///
/// Lookups never fail; these guard the table's invariants at insert time.
///
/// `Display` and `Error` are implemented by hand because the `source` field
/// holds a source *character*, which `thiserror` would otherwise treat as an
/// error source.
#[derive(Debug, Clone)]
pub enum TableError {
    /// A `(source char, language)` pair was inserted twice.
    DuplicateSource { source: char, language: String },

    /// Two source characters in one language would map to the same cell
    /// sequence, breaking reverse lookup.
    CellCollision {
        source: char,
        cells: String,
        language: String,
    },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::DuplicateSource { source, language } => write!(
                f,
                "Duplicate code table entry for '{source}' in language '{language}'"
            ),
            TableError::CellCollision {
                source,
                cells,
                language,
            } => write!(
                f,
                "Cell sequence '{cells}' for '{source}' collides with an existing entry in language '{language}'"
            ),
        }
    }
}

impl std::error::Error for TableError {}

/// Construction-time errors for a [`crate::braille::RuleSet`].
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    /// A contraction pattern must contain at least one character.
    #[error("Contraction rule pattern must not be empty")]
    EmptyPattern,

    /// Two rules with identical pattern and scope may not coexist.
    #[error("Duplicate contraction rule for pattern '{pattern}' with identical scope")]
    DuplicateRule { pattern: String },
}

/// Errors an OCR collaborator may return.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// The payload's format or language is not handled by the engine.
    #[error("Unsupported document: {detail}")]
    Unsupported { detail: String },

    /// The payload bytes could not be decoded.
    #[error("Corrupt document: {detail}")]
    Corrupt { detail: String },

    /// The engine did not respond in time.
    #[error("OCR timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Errors a speech-synthesis collaborator may return.
#[derive(Debug, Clone, Error)]
pub enum TtsError {
    /// The requested language or voice is not available.
    #[error("Unsupported synthesis request: {detail}")]
    Unsupported { detail: String },

    /// The engine did not respond in time.
    #[error("Speech synthesis timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Errors a persistence collaborator may return.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium rejected the write.
    #[error("Failed to write job record: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// The job record could not be serialised.
    #[error("Failed to serialise job record: {0}")]
    Serialize(String),
}
