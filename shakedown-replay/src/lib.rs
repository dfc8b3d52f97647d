/*!
# Shakedown Replay

Terminal pipeline stage that paces the merged event stream against wall
clock time and dispatches fault actions to the device agents.

The replayer keeps a logical clock of the last performed event. When an
event's nominal timestamp lies ahead of the clock it blocks the whole
pipeline via the device sleep primitive, which is acceptable because the
sink is the terminal stage. Fault dispatch is an exhaustive match on the
closed fault catalog; there is no unknown-name case at this layer.
*/

use tracing::{debug, info};

use shakedown_core::events::{EventKind, FaultKind, Parcel, ReplayEvent};
use shakedown_core::pipeline::{PipelineStage, StageError};
use shakedown_device::agents::{CellularAgent, KeypressAgent, ScreenAgent, WifiAgent};
use shakedown_device::Device;

/// Pause between the two orientation changes of a rotate fault, giving the
/// app time to re-layout before rotating back.
pub const DEFAULT_ROTATE_SETTLE_MS: u64 = 2000;

/// Replays a trace with Heisenbug events spliced in between.
///
/// Gesture events only advance the logical clock here; replaying the actual
/// touch/drag primitives is the concern of a recording-specific replayer
/// fed from the same trace.
pub struct TroubleReplayer<D: Device> {
    device: D,
    current_timestamp_ms: u64,
    rotate_settle_ms: u64,
}

impl<D: Device> TroubleReplayer<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            current_timestamp_ms: 0,
            rotate_settle_ms: DEFAULT_ROTATE_SETTLE_MS,
        }
    }

    pub fn with_rotate_settle(device: D, rotate_settle_ms: u64) -> Self {
        Self {
            device,
            current_timestamp_ms: 0,
            rotate_settle_ms,
        }
    }

    /// Logical clock of the last performed event, in trace milliseconds.
    pub fn current_timestamp_ms(&self) -> u64 {
        self.current_timestamp_ms
    }

    /// Each fault action is best-effort: the agents log failures and the
    /// replay keeps moving either way.
    fn dispatch(&self, kind: FaultKind) {
        match kind {
            FaultKind::Wifi => {
                WifiAgent::new(&self.device).toggle();
            }
            FaultKind::Cellular => {
                CellularAgent::new(&self.device).toggle();
            }
            FaultKind::ToggleScreen => {
                let agent = ScreenAgent::new(&self.device);
                // Toggle twice to land back in the original screen state.
                agent.toggle_screen();
                agent.toggle_screen();
            }
            FaultKind::RotateScreen => {
                let agent = ScreenAgent::new(&self.device);
                // Rotate twice to land back in the original orientation.
                agent.change_orientation();
                self.device.sleep(self.rotate_settle_ms);
                agent.change_orientation();
            }
            FaultKind::PressBack => {
                KeypressAgent::new(&self.device).press_back();
            }
            FaultKind::PressHome => {
                KeypressAgent::new(&self.device).press_home();
            }
        }
    }
}

impl<D: Device> PipelineStage for TroubleReplayer<D> {
    fn process(&mut self, input: Option<ReplayEvent>) -> Result<Parcel, StageError> {
        let Some(event) = input else {
            return Ok(Parcel::new());
        };
        match event.kind {
            EventKind::Fault(kind) => {
                let delta = event.timestamp_ms.saturating_sub(self.current_timestamp_ms);
                if delta > 0 {
                    self.device.sleep(delta);
                }
                info!(fault = %kind, timestamp_ms = event.timestamp_ms, "injecting fault");
                self.dispatch(kind);
                self.current_timestamp_ms = event.timestamp_ms;
            }
            EventKind::Gesture => {
                debug!(timestamp_ms = event.timestamp_ms, "gesture event");
                self.current_timestamp_ms = event.timestamp_ms;
            }
        }
        Ok(Parcel::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakedown_device::DeviceError;
    use std::cell::RefCell;
    use tracing_test::traced_test;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Shell(String),
        Sleep(u64),
        Press(String),
    }

    #[derive(Default)]
    struct MockDevice {
        calls: RefCell<Vec<Call>>,
    }

    impl MockDevice {
        fn sleeps(&self) -> Vec<u64> {
            self.calls
                .borrow()
                .iter()
                .filter_map(|c| match c {
                    Call::Sleep(ms) => Some(*ms),
                    _ => None,
                })
                .collect()
        }
    }

    impl Device for MockDevice {
        fn shell(&self, cmd: &str) -> Result<String, DeviceError> {
            self.calls.borrow_mut().push(Call::Shell(cmd.to_string()));
            Ok(String::new())
        }

        fn sleep(&self, ms: u64) {
            self.calls.borrow_mut().push(Call::Sleep(ms));
        }

        fn touch(&self, _x: i32, _y: i32) -> Result<(), DeviceError> {
            Ok(())
        }

        fn drag(
            &self,
            _from: (i32, i32),
            _to: (i32, i32),
            _duration_ms: u64,
        ) -> Result<(), DeviceError> {
            Ok(())
        }

        fn press(&self, key: &str) -> Result<(), DeviceError> {
            self.calls.borrow_mut().push(Call::Press(key.to_string()));
            Ok(())
        }

        fn type_text(&self, _text: &str) -> Result<(), DeviceError> {
            Ok(())
        }
    }

    fn replayer() -> TroubleReplayer<MockDevice> {
        TroubleReplayer::new(MockDevice::default())
    }

    #[test]
    fn test_fault_behind_schedule_sleeps_the_delta() {
        let mut replayer = replayer();
        replayer
            .process(Some(ReplayEvent::gesture(1000)))
            .unwrap();
        replayer
            .process(Some(ReplayEvent::fault(FaultKind::PressBack, 1500)))
            .unwrap();

        assert_eq!(replayer.current_timestamp_ms(), 1500);
        let calls = replayer.device.calls.borrow();
        assert_eq!(
            *calls,
            vec![Call::Sleep(500), Call::Press("KEYCODE_BACK".to_string())]
        );
    }

    #[test]
    fn test_past_due_fault_never_sleeps() {
        let mut replayer = replayer();
        replayer
            .process(Some(ReplayEvent::gesture(2000)))
            .unwrap();
        replayer
            .process(Some(ReplayEvent::fault(FaultKind::PressHome, 2000)))
            .unwrap();
        replayer
            .process(Some(ReplayEvent::fault(FaultKind::PressHome, 1500)))
            .unwrap();

        assert!(replayer.device.sleeps().is_empty());
        // Clock still advances (and may move backwards for late events).
        assert_eq!(replayer.current_timestamp_ms(), 1500);
    }

    #[test]
    fn test_gesture_only_advances_clock() {
        let mut replayer = replayer();
        replayer
            .process(Some(ReplayEvent::gesture(3000)))
            .unwrap();
        assert_eq!(replayer.current_timestamp_ms(), 3000);
        assert!(replayer.device.calls.borrow().is_empty());
    }

    #[test]
    fn test_screen_toggle_returns_to_original_state() {
        let mut replayer = replayer();
        replayer
            .process(Some(ReplayEvent::fault(FaultKind::ToggleScreen, 0)))
            .unwrap();
        let presses = replayer
            .device
            .calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Press(_)))
            .count();
        assert_eq!(presses, 2);
    }

    #[test]
    fn test_rotate_pauses_between_changes() {
        let mut replayer = TroubleReplayer::with_rotate_settle(MockDevice::default(), 2000);
        replayer
            .process(Some(ReplayEvent::fault(FaultKind::RotateScreen, 0)))
            .unwrap();
        assert_eq!(replayer.device.sleeps(), vec![2000]);
    }

    #[traced_test]
    #[test]
    fn test_fault_dispatch_is_logged() {
        let mut replayer = replayer();
        replayer
            .process(Some(ReplayEvent::fault(FaultKind::Wifi, 100)))
            .unwrap();
        assert!(logs_contain("injecting fault"));
    }
}
