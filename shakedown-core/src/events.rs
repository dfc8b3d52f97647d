//! Replay event types and the parcel batch container.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed catalog of disruptive actions that can be spliced into a
/// replay trace. Serialized names match the historical trace format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultKind {
    #[serde(rename = "wifi")]
    Wifi,
    #[serde(rename = "cellular")]
    Cellular,
    #[serde(rename = "toggleScreen")]
    ToggleScreen,
    #[serde(rename = "rotateScreen")]
    RotateScreen,
    #[serde(rename = "pressBack")]
    PressBack,
    #[serde(rename = "pressHome")]
    PressHome,
}

impl FaultKind {
    /// The full catalog, in its canonical order.
    pub const CATALOG: [FaultKind; 6] = [
        FaultKind::Wifi,
        FaultKind::Cellular,
        FaultKind::ToggleScreen,
        FaultKind::RotateScreen,
        FaultKind::PressBack,
        FaultKind::PressHome,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FaultKind::Wifi => "wifi",
            FaultKind::Cellular => "cellular",
            FaultKind::ToggleScreen => "toggleScreen",
            FaultKind::RotateScreen => "rotateScreen",
            FaultKind::PressBack => "pressBack",
            FaultKind::PressHome => "pressHome",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when a trace or configuration names a fault kind outside
/// the catalog. Surfaced at construction time, never during dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown fault kind: {0}")]
pub struct UnknownFaultKind(pub String);

impl FromStr for FaultKind {
    type Err = UnknownFaultKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaultKind::CATALOG
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownFaultKind(s.to_string()))
    }
}

/// What an event does when it reaches the replay sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An ordinary recorded gesture slot; replay of the actual touch/drag
    /// primitives is delegated to the recording-specific replayer.
    Gesture,
    /// A spliced-in disruptive action.
    Fault(FaultKind),
}

/// A single timestamped unit flowing through the pipeline.
///
/// Timestamps are monotonic offsets in milliseconds from the start of the
/// recorded trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayEvent {
    pub timestamp_ms: u64,
    pub kind: EventKind,
}

impl ReplayEvent {
    #[inline]
    pub fn gesture(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            kind: EventKind::Gesture,
        }
    }

    #[inline]
    pub fn fault(kind: FaultKind, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            kind: EventKind::Fault(kind),
        }
    }

    #[inline]
    pub fn is_fault(&self) -> bool {
        matches!(self.kind, EventKind::Fault(_))
    }
}

/// An ordered, appendable batch of events passed between pipeline stages.
///
/// Events are enqueued and consumed strictly in insertion order; a parcel is
/// owned exclusively by whichever stage currently holds it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parcel {
    events: VecDeque<ReplayEvent>,
}

impl Parcel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, event: ReplayEvent) {
        self.events.push_back(event);
    }

    pub fn dequeue(&mut self) -> Option<ReplayEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplayEvent> {
        self.events.iter()
    }

    /// BLAKE3 digest over the ordered (timestamp, kind) sequence, hex
    /// encoded. Two parcels fingerprint equal iff they hold the same events
    /// in the same order, which makes reproducibility checks one string
    /// comparison.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for event in &self.events {
            hasher.update(&event.timestamp_ms.to_le_bytes());
            match event.kind {
                EventKind::Gesture => {
                    hasher.update(b"gesture");
                }
                EventKind::Fault(kind) => {
                    hasher.update(kind.as_str().as_bytes());
                }
            }
        }
        hex::encode(hasher.finalize().as_bytes())
    }
}

impl IntoIterator for Parcel {
    type Item = ReplayEvent;
    type IntoIter = std::collections::vec_deque::IntoIter<ReplayEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl FromIterator<ReplayEvent> for Parcel {
    fn from_iter<T: IntoIterator<Item = ReplayEvent>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}
