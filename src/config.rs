//! Configuration for pipeline runs.
//!
//! Every knob lives in one [`PipelineConfig`] built via its builder, so a
//! config can be shared across worker tasks, logged, and diffed between
//! runs. Job-specific inputs (language hint, target grade) live on the
//! [`crate::job::DocumentJob`] itself; the config carries caller
//! preferences that apply to every job the orchestrator runs.
//!
//! The speech rate is an explicit per-call parameter handed to the
//! synthesizer collaborator — there is no shared mutable voice state
//! anywhere in the crate.

use crate::error::PipelineError;
use crate::progress::{Observer, PipelineObserver};
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Caller preferences for document processing.
///
/// # Example
/// ```rust
/// use dotscribe::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .audio_enabled(false)
///     .concurrency(8)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Whether to attempt the Audio stage at all. Default: true.
    ///
    /// The Audio stage is best-effort either way; disabling it skips the
    /// synthesis call entirely rather than recording a failure.
    pub audio_enabled: bool,

    /// Words per minute passed to the speech synthesizer. Range: 50–400.
    /// Default: 150.
    pub speech_rate: u32,

    /// Concurrent pipelines in [`crate::pipeline::process_batch`].
    /// Default: 4.
    ///
    /// Each document's pipeline is independent, so batches parallelise
    /// freely; the cap mostly protects the OCR/TTS collaborators from being
    /// flooded.
    pub concurrency: usize,

    /// Receives per-stage events. Default: none.
    pub observer: Option<Observer>,

    /// Cooperative cancellation flag, checked between stages only. Default:
    /// none.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            speech_rate: 150,
            concurrency: 4,
            observer: None,
            cancel: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("audio_enabled", &self.audio_enabled)
            .field("speech_rate", &self.speech_rate)
            .field("concurrency", &self.concurrency)
            .field("observer", &self.observer.as_ref().map(|_| "<dyn PipelineObserver>"))
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn audio_enabled(mut self, v: bool) -> Self {
        self.config.audio_enabled = v;
        self
    }

    pub fn speech_rate(mut self, wpm: u32) -> Self {
        self.config.speech_rate = wpm;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.config.observer = Some(observer);
        self
    }

    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.config.cancel = Some(flag);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        let c = &self.config;
        if !(50..=400).contains(&c.speech_rate) {
            return Err(PipelineError::InvalidConfig(format!(
                "Speech rate must be 50–400 wpm, got {}",
                c.speech_rate
            )));
        }
        if c.concurrency == 0 {
            return Err(PipelineError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}
