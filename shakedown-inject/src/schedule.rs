//! Seeded injection schedule.
//!
//! Precomputes, from a locally-owned seeded RNG, both random series the
//! injector consumes: the ordered fault-kind sequence and the per-gap
//! insert-here decision sequence. Fixed seed, catalog, and target count
//! yield the identical (slot, kind) assignment on every run.

use std::collections::VecDeque;

use rand::seq::index;
use rand::rngs::SmallRng;
use rand::Rng;

use shakedown_core::events::FaultKind;

#[derive(Debug)]
pub struct InjectionSchedule {
    faults: VecDeque<FaultKind>,
    decisions: VecDeque<bool>,
}

impl InjectionSchedule {
    /// Draws both series from `rng`.
    ///
    /// The fault sequence is `count` draws without replacement from the
    /// catalog repeated `count / catalog.len() + 1` times, so every kind
    /// stays available even when `count` exceeds the catalog size. The
    /// decision sequence is independent fair-coin draws, extended until it
    /// holds exactly `count` `true` entries.
    pub fn new(rng: &mut SmallRng, catalog: &[FaultKind], count: usize) -> Self {
        let repetitions = count / catalog.len() + 1;
        let mut pool = Vec::with_capacity(repetitions * catalog.len());
        for _ in 0..repetitions {
            pool.extend_from_slice(catalog);
        }
        let faults = index::sample(rng, pool.len(), count)
            .into_iter()
            .map(|i| pool[i])
            .collect();

        let mut decisions = VecDeque::new();
        let mut trues = 0;
        while trues < count {
            let insert = rng.random_bool(0.5);
            if insert {
                trues += 1;
            }
            decisions.push_back(insert);
        }

        Self { faults, decisions }
    }

    /// Consumes the next decision for a gap between two adjacent gestures.
    pub fn next_decision(&mut self) -> bool {
        self.decisions.pop_front().unwrap_or(false)
    }

    /// Consumes the next fault kind from the ordered sequence.
    pub fn next_fault(&mut self) -> Option<FaultKind> {
        self.faults.pop_front()
    }

    pub fn faults_remaining(&self) -> usize {
        self.faults.len()
    }

    #[cfg(test)]
    pub(crate) fn series(&self) -> (Vec<FaultKind>, Vec<bool>) {
        (
            self.faults.iter().copied().collect(),
            self.decisions.iter().copied().collect(),
        )
    }
}
