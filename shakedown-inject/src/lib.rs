/*!
# Shakedown Inject

Reproducible Heisenbug injection. The [`TroubleInjector`] stage buffers the
incoming gesture trace and deterministically splices fault events into the
gaps between adjacent gestures, releasing the full augmented trace only at
end-of-stream. All randomness comes from a locally-owned RNG seeded at
construction, so a fixed seed, catalog, and target count reproduce the
identical augmented trace on every run.
*/

use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info};

use shakedown_core::events::{FaultKind, Parcel, ReplayEvent};
use shakedown_core::pipeline::{PipelineStage, StageError};

pub mod schedule;

use schedule::InjectionSchedule;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InjectError {
    #[error("fault catalog must not be empty")]
    EmptyCatalog,
}

/// Derives a 64-bit RNG seed from an arbitrary string, so trace configs can
/// keep using memorable seeds.
pub fn seed_from_str(seed: &str) -> u64 {
    let digest = blake3::hash(seed.as_bytes());
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(buf)
}

/// Buffering stage that splices fault events into a gesture trace.
///
/// Each injected fault lands at the integer midpoint of the gap between the
/// two gestures surrounding it; gestures are never reordered. `process`
/// always returns an empty parcel: a gap's midpoint needs both endpoint
/// timestamps, so nothing is released until upstream completion is signaled
/// through [`PipelineStage::flush_eof`].
#[derive(Debug)]
pub struct TroubleInjector {
    schedule: InjectionSchedule,
    prev_timestamp: Option<u64>,
    buffer: Parcel,
    injected: usize,
}

impl TroubleInjector {
    /// Builds an injector targeting `count` fault insertions.
    ///
    /// When `count` exceeds the number of gaps the trace turns out to have,
    /// the surplus schedule entries are simply never consumed and fewer
    /// faults are injected.
    pub fn new(seed: u64, catalog: &[FaultKind], count: usize) -> Result<Self, InjectError> {
        if catalog.is_empty() {
            return Err(InjectError::EmptyCatalog);
        }
        let mut rng = SmallRng::seed_from_u64(seed);
        Ok(Self {
            schedule: InjectionSchedule::new(&mut rng, catalog, count),
            prev_timestamp: None,
            buffer: Parcel::new(),
            injected: 0,
        })
    }

    /// Convenience constructor for string seeds.
    pub fn with_str_seed(
        seed: &str,
        catalog: &[FaultKind],
        count: usize,
    ) -> Result<Self, InjectError> {
        Self::new(seed_from_str(seed), catalog, count)
    }

    /// Number of faults spliced in so far.
    pub fn injected(&self) -> usize {
        self.injected
    }
}

impl PipelineStage for TroubleInjector {
    fn process(&mut self, input: Option<ReplayEvent>) -> Result<Parcel, StageError> {
        let Some(event) = input else {
            return Ok(Parcel::new());
        };
        if let Some(prev) = self.prev_timestamp {
            // Only consult the decision series while unused fault kinds
            // remain; later gaps leave both cursors untouched.
            if self.schedule.faults_remaining() > 0 && self.schedule.next_decision() {
                let midpoint = prev + (event.timestamp_ms - prev) / 2;
                if let Some(kind) = self.schedule.next_fault() {
                    debug!(fault = %kind, timestamp_ms = midpoint, "scheduling fault");
                    self.buffer.enqueue(ReplayEvent::fault(kind, midpoint));
                    self.injected += 1;
                }
            }
        }
        self.buffer.enqueue(event);
        self.prev_timestamp = Some(event.timestamp_ms);
        Ok(Parcel::new())
    }

    fn flush_eof(&mut self) -> Result<Parcel, StageError> {
        let parcel = std::mem::take(&mut self.buffer);
        info!(
            events = parcel.len(),
            injected = self.injected,
            fingerprint = %parcel.fingerprint(),
            "releasing augmented trace"
        );
        Ok(parcel)
    }
}
