//! Progress-observer trait for per-stage pipeline events.
//!
//! Inject an `Arc<dyn PipelineObserver>` via
//! [`crate::config::PipelineConfigBuilder::observer`] to receive events as
//! each document moves through its stages. Callbacks are the least-invasive
//! integration point: hosts can forward events to a broadcast channel, a
//! WebSocket, or a database row without the library knowing how they
//! communicate. The trait is `Send + Sync` because batches process
//! documents concurrently.

use crate::job::ProcessingStage;
use std::sync::Arc;
use uuid::Uuid;

/// Called by the orchestrator as a document's pipeline advances.
///
/// All methods have default no-op implementations so implementors only
/// override what they care about. With concurrent batches, methods may be
/// called from different tasks at once; guard shared mutable state
/// accordingly.
pub trait PipelineObserver: Send + Sync {
    /// Called once when a job's status becomes `Processing`.
    fn on_pipeline_start(&self, job_id: Uuid) {
        let _ = job_id;
    }

    /// Called just before a stage's collaborator is invoked.
    fn on_stage_start(&self, job_id: Uuid, stage: ProcessingStage) {
        let _ = (job_id, stage);
    }

    /// Called when a stage completes successfully.
    fn on_stage_complete(&self, job_id: Uuid, stage: ProcessingStage) {
        let _ = (job_id, stage);
    }

    /// Called when a stage fails — fatal or not.
    fn on_stage_error(&self, job_id: Uuid, stage: ProcessingStage, error: &str) {
        let _ = (job_id, stage, error);
    }

    /// Called once when the job reaches a terminal status.
    ///
    /// `completed_stages` counts the stages that finished successfully.
    fn on_pipeline_complete(&self, job_id: Uuid, completed_stages: usize) {
        let _ = (job_id, completed_stages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type Observer = Arc<dyn PipelineObserver>;
