//! Pipeline observation
//!
//! Components report stage progress through an injected [`PipelineObserver`]
//! rather than logging through a process-wide handle. [`TracingObserver`]
//! forwards everything to `tracing`.

use crate::error::{PipelineError, Stage};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Receiver of stage lifecycle notifications
pub trait PipelineObserver: Send + Sync {
    fn stage_started(&self, stage: Stage);

    fn stage_completed(&self, stage: Stage, elapsed: Duration);

    fn stage_failed(&self, stage: Stage, error: &PipelineError);

    /// Free-form progress message
    fn event(&self, stage: Stage, message: &str) {
        let _ = (stage, message);
    }
}

impl<T: PipelineObserver + ?Sized> PipelineObserver for Arc<T> {
    fn stage_started(&self, stage: Stage) {
        (**self).stage_started(stage)
    }

    fn stage_completed(&self, stage: Stage, elapsed: Duration) {
        (**self).stage_completed(stage, elapsed)
    }

    fn stage_failed(&self, stage: Stage, error: &PipelineError) {
        (**self).stage_failed(stage, error)
    }

    fn event(&self, stage: Stage, message: &str) {
        (**self).event(stage, message)
    }
}

/// Default observer backed by `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn stage_started(&self, stage: Stage) {
        info!(stage = %stage, "Stage started");
    }

    fn stage_completed(&self, stage: Stage, elapsed: Duration) {
        info!(stage = %stage, elapsed_ms = elapsed.as_millis() as u64, "Stage completed");
    }

    fn stage_failed(&self, stage: Stage, error: &PipelineError) {
        error!(stage = %stage, error = %error, "Stage failed");
    }

    fn event(&self, stage: Stage, message: &str) {
        info!(stage = %stage, "{}", message);
    }
}

/// Observer that records notifications, for tests and diagnostics
#[derive(Debug, Default)]
pub struct RecordingObserver {
    records: std::sync::Mutex<Vec<ObservedEvent>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    Started(Stage),
    Completed(Stage),
    Failed(Stage, String),
    Message(Stage, String),
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Stages that completed, in order
    pub fn completed_stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObservedEvent::Completed(stage) => Some(stage),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ObservedEvent) {
        if let Ok(mut records) = self.records.lock() {
            records.push(event);
        }
    }
}

impl PipelineObserver for RecordingObserver {
    fn stage_started(&self, stage: Stage) {
        self.push(ObservedEvent::Started(stage));
    }

    fn stage_completed(&self, stage: Stage, _elapsed: Duration) {
        self.push(ObservedEvent::Completed(stage));
    }

    fn stage_failed(&self, stage: Stage, error: &PipelineError) {
        self.push(ObservedEvent::Failed(stage, error.to_string()));
    }

    fn event(&self, stage: Stage, message: &str) {
        self.push(ObservedEvent::Message(stage, message.to_string()));
    }
}

/// Run `f` as `stage`: notify the observer and tag any error with the stage.
pub fn observe_stage<T, F>(observer: &dyn PipelineObserver, stage: Stage, f: F) -> crate::Result<T>
where
    F: FnOnce() -> crate::Result<T>,
{
    let start = std::time::Instant::now();
    observer.stage_started(stage);
    match f() {
        Ok(value) => {
            observer.stage_completed(stage, start.elapsed());
            Ok(value)
        }
        Err(err) => {
            let err = err.in_stage(stage);
            observer.stage_failed(stage, &err);
            Err(err)
        }
    }
}
