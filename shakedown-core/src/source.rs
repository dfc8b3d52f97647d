//! Source stages: bounded, time-ordered gesture sequences.

use std::collections::VecDeque;

use crate::events::{Parcel, ReplayEvent};
use crate::pipeline::{PipelineStage, StageError};

/// Synthetic generator emitting blank gesture events at a fixed interval.
///
/// Timestamps are strictly increasing: `interval, 2*interval, ...`. Useful
/// for pure-injection runs where the disruptive events are the whole point
/// and no recorded trace exists.
pub struct BlankEventSource {
    interval_ms: u64,
    remaining: usize,
    next_ts: u64,
}

impl BlankEventSource {
    pub fn new(interval_ms: u64, count: usize) -> Self {
        Self {
            interval_ms,
            remaining: count,
            next_ts: 0,
        }
    }
}

impl PipelineStage for BlankEventSource {
    fn process(&mut self, _input: Option<ReplayEvent>) -> Result<Parcel, StageError> {
        let mut parcel = Parcel::new();
        if self.remaining > 0 {
            self.remaining -= 1;
            self.next_ts += self.interval_ms;
            parcel.enqueue(ReplayEvent::gesture(self.next_ts));
        }
        Ok(parcel)
    }
}

/// Replays the gesture timestamps of a recorded trace, one per pump call.
pub struct TraceSource {
    timestamps: VecDeque<u64>,
}

impl TraceSource {
    pub fn new(timestamps: Vec<u64>) -> Self {
        Self {
            timestamps: timestamps.into(),
        }
    }
}

impl PipelineStage for TraceSource {
    fn process(&mut self, _input: Option<ReplayEvent>) -> Result<Parcel, StageError> {
        let mut parcel = Parcel::new();
        if let Some(ts) = self.timestamps.pop_front() {
            parcel.enqueue(ReplayEvent::gesture(ts));
        }
        Ok(parcel)
    }
}
