//! The document processing pipeline.
//!
//! Each submodule owns exactly one concern. Collaborator seams are traits
//! so the host decides which OCR engine, synthesis backend, and persistence
//! layer to wire in; the orchestrator only owns sequencing, the failure
//! policy, and the per-stage record keeping.
//!
//! ## Data Flow
//!
//! ```text
//! DocumentJob ──▶ ocr ──▶ braille ──▶ audio ──▶ Completed
//! (Uploaded)    (trait)  (in-proc)   (trait)
//!                  │         │          │
//!                  ▼         ▼          ▼
//!                save      save       save        (JobStore, after every
//!                  │         │                     stage transition)
//!               Failed    Failed    best-effort
//! ```
//!
//! 1. [`ocr`]          — text extraction seam; failure is fatal
//! 2. [`orchestrator`] — the state machine and failure policy
//! 3. [`tts`]          — speech-synthesis seam; failure is non-fatal
//! 4. [`store`]        — persistence seam plus file/memory stores
//! 5. [`batch`]        — concurrent processing of independent documents

pub mod batch;
pub mod ocr;
pub mod orchestrator;
pub mod store;
pub mod tts;

pub use batch::process_batch;
pub use ocr::OcrEngine;
pub use orchestrator::Orchestrator;
pub use store::{InMemoryStore, JobStore, JsonFileStore};
pub use tts::SpeechSynthesizer;
