//! Batch processing: run many documents' pipelines concurrently.
//!
//! Each document's pipeline is fully independent — no shared mutable state
//! beyond its own persisted record — so a batch is just `buffer_unordered`
//! over [`Orchestrator::start_pipeline`] calls, capped by the configured
//! concurrency to avoid flooding the OCR/TTS collaborators.

use crate::error::PipelineError;
use crate::job::DocumentJob;
use crate::pipeline::orchestrator::Orchestrator;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::info;

/// Process a batch of uploaded jobs, at most `config.concurrency` at a time.
///
/// Results come back in submission order; each entry is that job's own
/// pipeline outcome, so one document's fatal failure never affects the
/// others.
pub async fn process_batch(
    orchestrator: &Arc<Orchestrator>,
    jobs: Vec<DocumentJob>,
) -> Vec<Result<DocumentJob, PipelineError>> {
    let total = jobs.len();
    let concurrency = orchestrator.config().concurrency;
    info!(total, concurrency, "batch started");

    let mut indexed: Vec<(usize, Result<DocumentJob, PipelineError>)> =
        stream::iter(jobs.into_iter().enumerate().map(|(idx, job)| {
            let orchestrator = Arc::clone(orchestrator);
            async move { (idx, orchestrator.start_pipeline(job).await) }
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

    indexed.sort_by_key(|(idx, _)| *idx);

    let completed = indexed.iter().filter(|(_, r)| r.is_ok()).count();
    info!(total, completed, "batch finished");

    indexed.into_iter().map(|(_, result)| result).collect()
}
