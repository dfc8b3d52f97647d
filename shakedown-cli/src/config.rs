//! Replay run configuration, loaded from a YAML file.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use shakedown_core::events::FaultKind;
use shakedown_inject::seed_from_str;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("deserialization error: {0}")]
    Serde(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Seed for the injection schedule. Numbers are used as-is; strings are
/// hashed down to 64 bits so memorable seeds keep working.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    Number(u64),
    Text(String),
}

impl Seed {
    pub fn to_u64(&self) -> u64 {
        match self {
            Seed::Number(n) => *n,
            Seed::Text(s) => seed_from_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplayConfig {
    #[serde(default = "default_seed")]
    pub seed: Seed,

    /// Fault kinds eligible for injection.
    #[serde(default = "default_faults")]
    pub faults: Vec<FaultKind>,

    /// Target number of fault insertions.
    #[serde(default = "default_injections")]
    pub injections: usize,

    #[serde(default)]
    pub source: SourceConfig,

    /// Pause between the two orientation changes of a rotate fault.
    #[serde(default = "default_rotate_settle_ms")]
    pub rotate_settle_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    /// Spacing of generated blank events, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Number of blank events to generate.
    #[serde(default = "default_events")]
    pub events: usize,

    /// Recorded gesture timestamps; when present, replayed instead of the
    /// blank-event generator.
    #[serde(default)]
    pub trace: Option<Vec<u64>>,
}

fn default_seed() -> Seed {
    Seed::Text("WTF".to_string())
}

fn default_faults() -> Vec<FaultKind> {
    FaultKind::CATALOG.to_vec()
}

fn default_injections() -> usize {
    25
}

fn default_interval_ms() -> u64 {
    3000
}

fn default_events() -> usize {
    100
}

fn default_rotate_settle_ms() -> u64 {
    2000
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            events: default_events(),
            trace: None,
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            faults: default_faults(),
            injections: default_injections(),
            source: SourceConfig::default(),
            rotate_settle_ms: default_rotate_settle_ms(),
        }
    }
}

impl ReplayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.faults.is_empty() {
            return Err(ConfigError::Validation(
                "fault catalog must not be empty".to_string(),
            ));
        }
        if let Some(trace) = &self.source.trace {
            if trace.windows(2).any(|pair| pair[0] > pair[1]) {
                return Err(ConfigError::Validation(
                    "trace timestamps must be non-decreasing".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Loads and validates a replay configuration from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ReplayConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::FileNotFound(format!(
            "{} does not exist",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    let config: ReplayConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
seed: 42
faults: [wifi, pressBack]
injections: 2
source:
  trace: [1000, 2000, 3000]
rotate_settle_ms: 500
"#;
        let config: ReplayConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.seed.to_u64(), 42);
        assert_eq!(config.faults, vec![FaultKind::Wifi, FaultKind::PressBack]);
        assert_eq!(config.injections, 2);
        assert_eq!(config.source.trace, Some(vec![1000, 2000, 3000]));
        assert_eq!(config.rotate_settle_ms, 500);
    }

    #[test]
    fn test_defaults_fill_in() {
        let config: ReplayConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.faults, FaultKind::CATALOG.to_vec());
        assert_eq!(config.injections, 25);
        assert_eq!(config.source.interval_ms, 3000);
        assert_eq!(config.source.events, 100);
        assert!(config.source.trace.is_none());
    }

    #[test]
    fn test_string_seed_is_deterministic() {
        let a: ReplayConfig = serde_yaml::from_str("seed: heisenbug").unwrap();
        let b: ReplayConfig = serde_yaml::from_str("seed: heisenbug").unwrap();
        assert_eq!(a.seed.to_u64(), b.seed.to_u64());
    }

    #[test]
    fn test_unknown_fault_name_is_rejected() {
        let result: Result<ReplayConfig, _> =
            serde_yaml::from_str("faults: [wifi, unplugBattery]");
        assert!(result.is_err());
    }

    #[test]
    fn test_unordered_trace_is_rejected() {
        let config: ReplayConfig =
            serde_yaml::from_str("source:\n  trace: [2000, 1000]").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }
}
