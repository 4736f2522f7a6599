//! The OCR collaborator seam.
//!
//! The pipeline never reads payload bytes itself; it hands the opaque
//! `source_ref` to whatever engine the host wires in (Tesseract behind a
//! subprocess, a cloud vision API, a PDF text extractor) and consumes the
//! returned text. Engine internals — rasterisation, layout analysis,
//! per-page assembly — stay entirely on the other side of this trait.

use crate::error::OcrError;
use crate::job::SourceKind;
use async_trait::async_trait;

/// Extracts raw text from a stored payload.
///
/// Implementations must be `Send + Sync`: batches run many documents'
/// pipelines concurrently against one shared engine handle.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extract text from the payload behind `source_ref`.
    ///
    /// `language` is a hint (e.g. `"en"`); engines that ignore it should
    /// still extract. Errors are stage-local: the orchestrator records them
    /// on the OCR outcome and fails the job, since nothing downstream can
    /// run without text.
    async fn extract(
        &self,
        source_ref: &str,
        kind: SourceKind,
        language: &str,
    ) -> Result<String, OcrError>;
}
