//! Editor configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::env::VarError;

use crate::consts::{DEFAULT_HISTORY_DEPTH, DEFAULT_RACK_HEIGHT, MAX_RACK_HEIGHT};
use crate::error::ErrorCode;
use crate::history::HistoryConfig;
use crate::layout::{Face, RackWidth};

pub const ENV_HISTORY_DEPTH: &str = "RACKPLAN_HISTORY_DEPTH";
pub const ENV_DEFAULT_RACK_HEIGHT: &str = "RACKPLAN_DEFAULT_RACK_HEIGHT";
pub const ENV_DEFAULT_RACK_WIDTH: &str = "RACKPLAN_DEFAULT_RACK_WIDTH";
pub const ENV_DEFAULT_FACE: &str = "RACKPLAN_DEFAULT_FACE";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: rack height {value} outside 1..=100")]
    RackHeightOutOfRange { var: &'static str, value: u32 },
    #[error("{var}: {message}")]
    Parse { var: &'static str, message: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RackHeightOutOfRange { .. } => "E_CONFIG_RANGE",
            Self::Parse { .. } => "E_CONFIG_PARSE",
        }
    }

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    /// Height of racks created without an explicit height.
    pub default_rack_height: u32,
    pub default_rack_width: RackWidth,
    /// Face new placements target when none is given.
    pub default_face: Face,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig { max_depth: DEFAULT_HISTORY_DEPTH },
            default_rack_height: DEFAULT_RACK_HEIGHT,
            default_rack_width: RackWidth::default(),
            default_face: Face::Front,
        }
    }
}

impl EditorConfig {
    /// Build typed editor config from the process environment.
    ///
    /// Optional:
    /// - `RACKPLAN_HISTORY_DEPTH`: default 50, `0` for unbounded
    /// - `RACKPLAN_DEFAULT_RACK_HEIGHT`: default 42
    /// - `RACKPLAN_DEFAULT_RACK_WIDTH`: `10`, `19` (default), `21`, or `23`
    /// - `RACKPLAN_DEFAULT_FACE`: `front` (default) or `rear`
    ///
    /// # Errors
    ///
    /// Unknown width or face values, and rack heights outside `1..=100`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env_value(key, std::env::var(key)))
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`EditorConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let max_depth = parse_or_default(lookup(ENV_HISTORY_DEPTH), ENV_HISTORY_DEPTH, DEFAULT_HISTORY_DEPTH);

        let default_rack_height =
            parse_or_default(lookup(ENV_DEFAULT_RACK_HEIGHT), ENV_DEFAULT_RACK_HEIGHT, DEFAULT_RACK_HEIGHT);
        if default_rack_height == 0 || default_rack_height > MAX_RACK_HEIGHT {
            return Err(ConfigError::RackHeightOutOfRange { var: ENV_DEFAULT_RACK_HEIGHT, value: default_rack_height });
        }

        let default_rack_width = parse_width(lookup(ENV_DEFAULT_RACK_WIDTH).as_deref())?;
        let default_face = parse_face(lookup(ENV_DEFAULT_FACE).as_deref())?;

        Ok(Self { history: HistoryConfig { max_depth }, default_rack_height, default_rack_width, default_face })
    }
}

/// Unset variables fall back silently; non-unicode ones are logged, then treated as unset.
fn env_value(var: &str, value: Result<String, VarError>) -> Option<String> {
    match value {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(raw)) => {
            tracing::warn!(var, raw = ?raw, "ignoring non-unicode value, using default");
            None
        }
    }
}

fn parse_or_default<T: std::str::FromStr>(raw: Option<String>, var: &str, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(var, raw = %raw, "ignoring unparsable value, using default");
            default
        }
    }
}

fn parse_width(raw: Option<&str>) -> Result<RackWidth, ConfigError> {
    let Some(raw) = raw else {
        return Ok(RackWidth::default());
    };
    let inches = raw.trim().parse::<u32>().map_err(|e| ConfigError::Parse {
        var: ENV_DEFAULT_RACK_WIDTH,
        message: format!("invalid width '{raw}': {e}"),
    })?;
    RackWidth::try_from(inches).map_err(|message| ConfigError::Parse { var: ENV_DEFAULT_RACK_WIDTH, message })
}

fn parse_face(raw: Option<&str>) -> Result<Face, ConfigError> {
    match raw.map(str::trim).unwrap_or("front") {
        "front" => Ok(Face::Front),
        "rear" => Ok(Face::Rear),
        other => Err(ConfigError::Parse {
            var: ENV_DEFAULT_FACE,
            message: format!("unknown face '{other}' (expected 'front' or 'rear')"),
        }),
    }
}
