//! Stage contract and the synchronous pipeline orchestrator.
//!
//! A pipeline is an ordered chain of stages: the first stage is the source,
//! the last is the sink. The orchestrator pumps the source one parcel at a
//! time and cascades each produced event through the downstream stages.
//! After the source is exhausted every stage gets exactly one end-of-stream
//! flush, in pipeline order, so a buffering stage can release withheld
//! output before teardown.

use thiserror::Error;

use crate::events::{Parcel, ReplayEvent};

#[derive(Debug, Error)]
pub enum StageError {
    #[error("device command failed: {0}")]
    Device(String),

    #[error("event processing error: {0}")]
    Processing(String),
}

/// The capability set every pipeline component implements.
pub trait PipelineStage {
    /// Processes one event (or a pump call with `None` for the source
    /// stage) and returns the events to feed downstream, possibly none.
    ///
    /// Sources signal exhaustion by returning an empty parcel.
    fn process(&mut self, input: Option<ReplayEvent>) -> Result<Parcel, StageError>;

    /// Invoked exactly once after this stage's upstream is exhausted.
    /// Stages that buffer emit everything withheld here.
    fn flush_eof(&mut self) -> Result<Parcel, StageError> {
        Ok(Parcel::new())
    }
}

/// Drives a chain of stages end-to-end, then flushes.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn PipelineStage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage in execution order.
    pub fn add_step(&mut self, stage: Box<dyn PipelineStage>) {
        self.stages.push(stage);
    }

    /// Runs the pipeline to completion.
    ///
    /// Any stage error aborts execution; device actions already performed
    /// downstream are irreversible and are not rolled back.
    pub fn execute(&mut self) -> Result<(), StageError> {
        if self.stages.is_empty() {
            return Ok(());
        }
        loop {
            let parcel = self.stages[0].process(None)?;
            if parcel.is_empty() {
                break;
            }
            for event in parcel {
                self.cascade(1, event)?;
            }
        }
        for idx in 0..self.stages.len() {
            let flushed = self.stages[idx].flush_eof()?;
            for event in flushed {
                self.cascade(idx + 1, event)?;
            }
        }
        Ok(())
    }

    /// Feeds one event into the stage at `start` and pipes each stage's
    /// output into its successor. Every stage may emit zero or more events
    /// per input event.
    fn cascade(&mut self, start: usize, event: ReplayEvent) -> Result<(), StageError> {
        let mut current = vec![event];
        for stage in self.stages.iter_mut().skip(start) {
            let mut next = Vec::new();
            for event in current {
                next.extend(stage.process(Some(event))?);
            }
            if next.is_empty() {
                return Ok(());
            }
            current = next;
        }
        Ok(())
    }
}
