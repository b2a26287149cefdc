//! Engine configuration
//!
//! Loaded once at startup; a malformed config is a fatal setup error, never
//! silently coerced.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors. All of these abort setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid delta time mode: expected \"seconds\" or \"milliseconds\", got \"{0}\"")]
    InvalidDtMode(String),
    #[error("malformed config: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Unit the engine samples and reports time deltas in.
///
/// Parses from the strings `"seconds"` / `"milliseconds"`, case-insensitive;
/// anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DtMode {
    #[default]
    Seconds,
    Milliseconds,
}

impl FromStr for DtMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "seconds" => Ok(DtMode::Seconds),
            "milliseconds" => Ok(DtMode::Milliseconds),
            _ => Err(ConfigError::InvalidDtMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for DtMode {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse().map_err(|e: ConfigError| e.to_string())
    }
}

impl From<DtMode> for String {
    fn from(mode: DtMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for DtMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DtMode::Seconds => "seconds",
            DtMode::Milliseconds => "milliseconds",
        })
    }
}

/// Engine settings, deserializable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delta-time unit.
    pub dt_mode: DtMode,
    /// Initial speed of time. 1.0 is real time, 0.0 pauses non-exempt
    /// entities.
    pub time_scale: f32,
    /// Camera follow convergence in (0, 1]; 1 snaps to target.
    pub camera_tightness: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dt_mode: DtMode::Seconds,
            time_scale: 1.0,
            camera_tightness: 1.0,
        }
    }
}

impl EngineConfig {
    /// Parses a config from JSON, failing fast on unknown dt modes.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        log::info!(
            "engine config: dt_mode={}, time_scale={}, camera_tightness={}",
            config.dt_mode,
            config.time_scale,
            config.camera_tightness
        );
        Ok(config)
    }
}
