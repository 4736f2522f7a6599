//! The speech-synthesis collaborator seam.
//!
//! Synthesis is stateless from the pipeline's point of view: language and
//! rate travel with every call, and the returned value is an opaque handle
//! to wherever the implementation stored the audio. No engine instance with
//! mutable voice configuration is shared anywhere.

use crate::error::TtsError;
use async_trait::async_trait;

/// Synthesizes speech for extracted text.
///
/// Failures here are non-fatal by design: the orchestrator records them on
/// the Audio outcome and still completes the job, so the text and Braille
/// deliverables are never lost to a flaky synthesis backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and return an opaque handle to the stored audio.
    ///
    /// `rate` is words per minute, passed explicitly on every call.
    async fn synthesize(&self, text: &str, language: &str, rate: u32)
        -> Result<String, TtsError>;
}
