/*!
# Shakedown Core

Event model and staged pipeline for replaying recorded finger-gesture traces
against a live Android device while weaving in reproducible disruptive events
("Heisenbugs": connectivity toggles, screen rotation, home/back presses).

## Key Components:
- **Replay Events:** Timestamped gesture and fault events.
- **Parcel:** Ordered batch of events flowing between pipeline stages.
- **Pipeline:** Synchronous stage chain with end-of-stream flush propagation.
- **Sources:** Synthetic blank-event generator and recorded-trace source.
*/

pub mod events;
pub mod pipeline;
pub mod source;

pub use events::{EventKind, FaultKind, Parcel, ReplayEvent};
pub use pipeline::{Pipeline, PipelineStage, StageError};
pub use source::{BlankEventSource, TraceSource};
