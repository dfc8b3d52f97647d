/*!
# Shakedown Device

Device-control facade consumed by the replay sink and the fault agents.

The [`Device`] trait covers the primitives the pipeline needs: raw shell
access, wall-clock sleeping, and the gesture primitives used by
recording-specific replayers. [`adb::AdbDevice`] backs the trait with the
`adb` binary; [`LogOnlyDevice`] is a dry-run stand-in that logs every call.
*/

use std::io;

use thiserror::Error;
use tracing::info;

pub mod adb;
pub mod agents;
pub mod status;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device command failed: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unparsable status dump: {0}")]
    Status(String),
}

/// Control surface of one attached device.
///
/// Exactly one active replay pipeline owns a device handle at a time; the
/// single-threaded pipeline model keeps the methods `&self` without locks.
pub trait Device {
    /// Runs a shell command on the device and returns its stdout.
    fn shell(&self, cmd: &str) -> Result<String, DeviceError>;

    /// Blocks the calling thread for `ms` milliseconds of device time.
    fn sleep(&self, ms: u64);

    fn touch(&self, x: i32, y: i32) -> Result<(), DeviceError>;

    fn drag(
        &self,
        from: (i32, i32),
        to: (i32, i32),
        duration_ms: u64,
    ) -> Result<(), DeviceError>;

    /// Presses a named key, e.g. `KEYCODE_BACK`.
    fn press(&self, key: &str) -> Result<(), DeviceError>;

    fn type_text(&self, text: &str) -> Result<(), DeviceError>;
}

/// Dry-run device: logs every command and performs nothing. Sleeps are
/// logged rather than slept so a dry run finishes immediately.
#[derive(Debug, Default)]
pub struct LogOnlyDevice;

impl Device for LogOnlyDevice {
    fn shell(&self, cmd: &str) -> Result<String, DeviceError> {
        info!(cmd, "dry-run shell");
        Ok(String::new())
    }

    fn sleep(&self, ms: u64) {
        info!(ms, "dry-run sleep");
    }

    fn touch(&self, x: i32, y: i32) -> Result<(), DeviceError> {
        info!(x, y, "dry-run touch");
        Ok(())
    }

    fn drag(
        &self,
        from: (i32, i32),
        to: (i32, i32),
        duration_ms: u64,
    ) -> Result<(), DeviceError> {
        info!(?from, ?to, duration_ms, "dry-run drag");
        Ok(())
    }

    fn press(&self, key: &str) -> Result<(), DeviceError> {
        info!(key, "dry-run press");
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), DeviceError> {
        info!(text, "dry-run type");
        Ok(())
    }
}
