//! # dotscribe
//!
//! Braille transcoding engine and accessible-document processing pipeline.
//!
//! ## Why this crate?
//!
//! Turning a scanned page into something a blind reader can use takes three
//! steps — extract the text, transcode it into Braille cells, synthesize
//! audio — and the failure economics of those steps differ: without text or
//! Braille there is no product, while audio is a nice-to-have. dotscribe
//! implements the transcoding engine (code table, normalizer, Grade 1
//! substitution, Grade 2 contraction rules) and the pipeline state machine
//! that sequences the stages, records per-stage outcomes on a durable job
//! record, and enforces that asymmetric failure policy.
//!
//! OCR, speech synthesis, and persistence are collaborator traits — the
//! host wires in real engines; this crate owns sequencing and transcoding.
//!
//! ## Pipeline Overview
//!
//! ```text
//! DocumentJob (Uploaded)
//!  │
//!  ├─ 1. OCR      extract text via the OcrEngine collaborator    [fatal]
//!  ├─ 2. Braille  normalize → contract (Grade 2) → cell lookup   [fatal]
//!  ├─ 3. Audio    synthesize via SpeechSynthesizer, if enabled   [best-effort]
//!  └─ Completed / Failed, with one StageOutcome per stage
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use dotscribe::{BrailleGrade, Transcoder};
//!
//! let transcoder = Transcoder::new();
//! let cells = transcoder
//!     .transcode_str("The quick brown fox", "grade2", "en")
//!     .unwrap();
//! assert!(cells.starts_with('⠮')); // "the" contracts to one cell
//!
//! let report = transcoder.report("hello world", BrailleGrade::Grade1, "en");
//! assert_eq!(report.unmapped, 0);
//! ```
//!
//! Running the full pipeline:
//!
//! ```rust,no_run
//! use dotscribe::{
//!     BrailleGrade, DocumentJob, Orchestrator, PipelineConfig, SourceKind,
//! };
//! use dotscribe::pipeline::JsonFileStore;
//! use std::sync::Arc;
//!
//! # async fn run(ocr: Arc<dyn dotscribe::pipeline::OcrEngine>,
//! #              tts: Arc<dyn dotscribe::pipeline::SpeechSynthesizer>)
//! #     -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(JsonFileStore::new("jobs"));
//! let orchestrator = Orchestrator::new(ocr, tts, store, PipelineConfig::default());
//!
//! let job = DocumentJob::new("uploads/scan.png", SourceKind::Image, "en", BrailleGrade::Grade2);
//! let done = orchestrator.start_pipeline(job).await?;
//! println!("{}", done.braille_text);
//! # Ok(())
//! # }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod braille;
pub mod config;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use braille::{
    BrailleGrade, BrailleTranscoder, CodeTable, ContractionRule, Normalizer, RuleScope, RuleSet,
    TranscodeReport, Transcoder,
};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{
    OcrError, PipelineError, RuleError, StoreError, TableError, TranscodeError, TtsError,
};
pub use job::{
    DocumentJob, JobMetadata, JobStatus, ProcessingStage, SourceKind, StageOutcome, StageOutcomes,
};
pub use pipeline::{process_batch, Orchestrator};
pub use progress::{NoopObserver, PipelineObserver};
