//! Fault-agent wrappers over the device facade.
//!
//! Each agent performs one class of disruptive action as a best-effort
//! operation: failures are logged and reported as `false` rather than
//! propagated, so a replay keeps moving when a toggle misfires.

use tracing::warn;

use crate::status::{CellularDataState, StatusReader, WifiStatus};
use crate::Device;

pub struct WifiAgent<'d, D: Device + ?Sized> {
    device: &'d D,
}

impl<'d, D: Device + ?Sized> WifiAgent<'d, D> {
    pub fn new(device: &'d D) -> Self {
        Self { device }
    }

    /// Needs root access on the device.
    pub fn turn_on(&self) -> bool {
        match self.device.shell("svc wifi enable") {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "failed to turn on wifi");
                false
            }
        }
    }

    /// Needs root access on the device.
    pub fn turn_off(&self) -> bool {
        match self.device.shell("svc wifi disable") {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "failed to turn off wifi");
                false
            }
        }
    }

    /// Flips wifi to the opposite state. In the transient connected and
    /// disconnected states the radio is mid-transition and left alone.
    pub fn toggle(&self) -> bool {
        match StatusReader::new(self.device).wifi_status() {
            Ok(WifiStatus::Enabled) => self.turn_off(),
            Ok(WifiStatus::Disabled) => self.turn_on(),
            Ok(status) => {
                warn!(?status, "wifi not toggleable right now");
                false
            }
            Err(e) => {
                warn!(error = %e, "failed to read wifi status");
                false
            }
        }
    }
}

pub struct CellularAgent<'d, D: Device + ?Sized> {
    device: &'d D,
}

impl<'d, D: Device + ?Sized> CellularAgent<'d, D> {
    pub fn new(device: &'d D) -> Self {
        Self { device }
    }

    /// Needs root access on the device.
    pub fn turn_on(&self) -> bool {
        match self.device.shell("svc data enable") {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "failed to turn on cellular data");
                false
            }
        }
    }

    /// Needs root access on the device.
    pub fn turn_off(&self) -> bool {
        match self.device.shell("svc data disable") {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "failed to turn off cellular data");
                false
            }
        }
    }

    pub fn toggle(&self) -> bool {
        match StatusReader::new(self.device).cellular_data_state() {
            Ok(CellularDataState::Connected) => self.turn_off(),
            Ok(_) => self.turn_on(),
            Err(e) => {
                warn!(error = %e, "failed to read cellular data state");
                false
            }
        }
    }
}

pub struct ScreenAgent<'d, D: Device + ?Sized> {
    device: &'d D,
}

impl<'d, D: Device + ?Sized> ScreenAgent<'d, D> {
    pub fn new(device: &'d D) -> Self {
        Self { device }
    }

    /// Toggles the screen via the power key and reports whether the state
    /// actually changed.
    pub fn toggle_screen(&self) -> bool {
        let reader = StatusReader::new(self.device);
        let before = reader.screen_on().ok();
        if let Err(e) = self.device.press("KEYCODE_POWER") {
            warn!(error = %e, "failed to toggle screen");
            return false;
        }
        match (before, reader.screen_on().ok()) {
            (Some(before), Some(after)) => before != after,
            // State unreadable; assume the keypress did its job.
            _ => true,
        }
    }

    /// Rotates the display one step clockwise by pinning user rotation.
    /// Reports whether the orientation actually changed.
    pub fn change_orientation(&self) -> bool {
        let reader = StatusReader::new(self.device);
        let current = match reader.orientation() {
            Ok(current) => current,
            Err(e) => {
                warn!(error = %e, "failed to read orientation");
                return false;
            }
        };
        let next = (current + 1) % 4;
        let commands = [
            "settings put system accelerometer_rotation 0".to_string(),
            format!("settings put system user_rotation {next}"),
        ];
        for cmd in &commands {
            if let Err(e) = self.device.shell(cmd) {
                warn!(error = %e, "failed to change orientation");
                return false;
            }
        }
        reader.orientation().map(|o| o != current).unwrap_or(true)
    }
}

pub struct KeypressAgent<'d, D: Device + ?Sized> {
    device: &'d D,
}

impl<'d, D: Device + ?Sized> KeypressAgent<'d, D> {
    pub fn new(device: &'d D) -> Self {
        Self { device }
    }

    pub fn press_back(&self) -> bool {
        match self.device.press("KEYCODE_BACK") {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to press back");
                false
            }
        }
    }

    pub fn press_home(&self) -> bool {
        match self.device.press("KEYCODE_HOME") {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to press home");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeviceError;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FlakyDevice {
        wifi_dump: &'static str,
        fail_shell: bool,
        shells: RefCell<Vec<String>>,
        presses: RefCell<Vec<String>>,
    }

    impl Device for FlakyDevice {
        fn shell(&self, cmd: &str) -> Result<String, DeviceError> {
            if self.fail_shell {
                return Err(DeviceError::Command("offline".into()));
            }
            self.shells.borrow_mut().push(cmd.to_string());
            if cmd == "dumpsys wifi" {
                return Ok(self.wifi_dump.to_string());
            }
            Ok(String::new())
        }

        fn sleep(&self, _ms: u64) {}

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
            self.presses.borrow_mut().push(key.to_string());
            Ok(())
        }

        fn type_text(&self, _text: &str) -> Result<(), DeviceError> {
            Ok(())
        }
    }

    #[test]
    fn test_wifi_toggle_turns_enabled_off() {
        let device = FlakyDevice {
            wifi_dump: "Wi-Fi is enabled",
            ..Default::default()
        };
        assert!(WifiAgent::new(&device).toggle());
        assert!(device
            .shells
            .borrow()
            .contains(&"svc wifi disable".to_string()));
    }

    #[test]
    fn test_wifi_toggle_in_transition_is_a_no_op() {
        let device = FlakyDevice {
            wifi_dump: "Wi-Fi is connected",
            ..Default::default()
        };
        assert!(!WifiAgent::new(&device).toggle());
        assert!(!device
            .shells
            .borrow()
            .iter()
            .any(|cmd| cmd.starts_with("svc wifi")));
    }

    #[test]
    fn test_agent_failure_degrades_to_logged_no_op() {
        let device = FlakyDevice {
            fail_shell: true,
            ..Default::default()
        };
        assert!(!WifiAgent::new(&device).toggle());
        assert!(!CellularAgent::new(&device).toggle());
        assert!(!ScreenAgent::new(&device).change_orientation());
    }

    #[test]
    fn test_keypress_agent_uses_key_names() {
        let device = FlakyDevice::default();
        let agent = KeypressAgent::new(&device);
        assert!(agent.press_back());
        assert!(agent.press_home());
        assert_eq!(
            *device.presses.borrow(),
            vec!["KEYCODE_BACK".to_string(), "KEYCODE_HOME".to_string()]
        );
    }
}
