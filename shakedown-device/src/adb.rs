//! `adb`-backed implementation of the device facade.

use std::process::Command;
use std::thread;
use std::time::Duration;

use crate::{Device, DeviceError};

/// Controls a device through the `adb` binary on the host `PATH`.
pub struct AdbDevice {
    serial: Option<String>,
}

impl AdbDevice {
    /// Targets the only attached device.
    pub fn new() -> Self {
        Self { serial: None }
    }

    /// Targets a specific device serial (`adb -s <serial>`).
    pub fn with_serial(serial: impl Into<String>) -> Self {
        Self {
            serial: Some(serial.into()),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, DeviceError> {
        let mut cmd = Command::new("adb");
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        let output = cmd.args(args).output()?;
        if !output.status.success() {
            return Err(DeviceError::Command(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for AdbDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for AdbDevice {
    fn shell(&self, cmd: &str) -> Result<String, DeviceError> {
        self.run(&["shell", cmd])
    }

    fn sleep(&self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }

    fn touch(&self, x: i32, y: i32) -> Result<(), DeviceError> {
        self.shell(&format!("input tap {x} {y}")).map(|_| ())
    }

    fn drag(
        &self,
        from: (i32, i32),
        to: (i32, i32),
        duration_ms: u64,
    ) -> Result<(), DeviceError> {
        self.shell(&format!(
            "input swipe {} {} {} {} {duration_ms}",
            from.0, from.1, to.0, to.1
        ))
        .map(|_| ())
    }

    fn press(&self, key: &str) -> Result<(), DeviceError> {
        self.shell(&format!("input keyevent {key}")).map(|_| ())
    }

    fn type_text(&self, text: &str) -> Result<(), DeviceError> {
        self.shell(&format!("input text {text}")).map(|_| ())
    }
}
