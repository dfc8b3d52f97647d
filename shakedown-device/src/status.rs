//! Device-state inspection via `dumpsys` free-text parsing.
//!
//! Android exposes no structured API for most of these states; the dumps
//! are stable enough in practice that a pattern match per field works. A
//! missing pattern surfaces as [`DeviceError::Status`] so callers can tell
//! "state unknown" apart from "command failed".

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Device, DeviceError};

static WIFI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Wi-Fi is (\w+)").unwrap());
static DATA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"mDataConnectionState=([0-3])").unwrap());
static SCREEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"mScreenOn=(true|false)").unwrap());
static ORIENTATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"mCurrentOrientation=([0-3])").unwrap());
static BATTERY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"level: (\d+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiStatus {
    Enabled,
    Disabled,
    Connected,
    Disconnected,
}

/// Telephony data connection states as reported by the registry dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellularDataState {
    Disconnected,
    Connecting,
    Connected,
    Suspended,
}

/// Reads device state off a borrowed device handle.
pub struct StatusReader<'d, D: Device + ?Sized> {
    device: &'d D,
}

impl<'d, D: Device + ?Sized> StatusReader<'d, D> {
    pub fn new(device: &'d D) -> Self {
        Self { device }
    }

    fn capture(&self, cmd: &str, re: &Regex) -> Result<String, DeviceError> {
        let dump = self.device.shell(cmd)?;
        re.captures(&dump)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| DeviceError::Status(format!("no match for {cmd}")))
    }

    pub fn wifi_status(&self) -> Result<WifiStatus, DeviceError> {
        match self.capture("dumpsys wifi", &WIFI_RE)?.as_str() {
            "enabled" => Ok(WifiStatus::Enabled),
            "disabled" => Ok(WifiStatus::Disabled),
            "connected" => Ok(WifiStatus::Connected),
            "disconnected" => Ok(WifiStatus::Disconnected),
            other => Err(DeviceError::Status(format!("wifi status: {other}"))),
        }
    }

    pub fn cellular_data_state(&self) -> Result<CellularDataState, DeviceError> {
        match self
            .capture("dumpsys telephony.registry", &DATA_RE)?
            .as_str()
        {
            "0" => Ok(CellularDataState::Disconnected),
            "1" => Ok(CellularDataState::Connecting),
            "2" => Ok(CellularDataState::Connected),
            // Regex admits 0-3 only.
            _ => Ok(CellularDataState::Suspended),
        }
    }

    pub fn screen_on(&self) -> Result<bool, DeviceError> {
        Ok(self.capture("dumpsys power", &SCREEN_RE)? == "true")
    }

    /// Surface rotation: 0 portrait, 1 landscape (left down), 2 portrait
    /// upside down, 3 landscape (right down).
    pub fn orientation(&self) -> Result<u8, DeviceError> {
        // Unwrap is fine, the regex only matches a single digit.
        Ok(self
            .capture("dumpsys display", &ORIENTATION_RE)?
            .parse()
            .unwrap_or(0))
    }

    /// Remaining battery percentage.
    pub fn battery_level(&self) -> Result<u8, DeviceError> {
        let level: u32 = self
            .capture("dumpsys battery", &BATTERY_RE)?
            .parse()
            .map_err(|_| DeviceError::Status("battery level out of range".into()))?;
        if level > 100 {
            return Err(DeviceError::Status("battery level out of range".into()));
        }
        Ok(level as u8)
    }
}
