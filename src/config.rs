//! Tuning knobs loaded from environment variables.
//!
//! Every knob has a default in [`crate::consts`]; an unset or unparsable
//! variable falls back to it. Range checks happen in `validate`, so a host can
//! decide whether a bad value is fatal.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{DEFAULT_VELOCITY_THRESHOLD, REFERENCE_WIDTH, SNAP_DIRECTIONS, SNAP_JITTER_THRESHOLD};
use crate::error::ConfigError;

/// Capture-side tuning for the carve constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureConfig {
    /// Maximum carve velocity, surface pixels per millisecond.
    pub velocity_threshold: f64,
    /// Number of snap directions.
    pub snap_directions: u32,
    /// Normalized distance below which snapping is skipped.
    pub snap_jitter: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            snap_directions: SNAP_DIRECTIONS,
            snap_jitter: SNAP_JITTER_THRESHOLD,
        }
    }
}

impl CaptureConfig {
    /// Read from the environment.
    ///
    /// Optional:
    /// - `INKWALL_VELOCITY_THRESHOLD`: default 0.15
    /// - `INKWALL_SNAP_DIRECTIONS`: default 8
    /// - `INKWALL_SNAP_JITTER`: default 0.005
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            velocity_threshold: env_parse("INKWALL_VELOCITY_THRESHOLD", DEFAULT_VELOCITY_THRESHOLD),
            snap_directions: env_parse("INKWALL_SNAP_DIRECTIONS", SNAP_DIRECTIONS),
            snap_jitter: env_parse("INKWALL_SNAP_JITTER", SNAP_JITTER_THRESHOLD),
        }
    }

    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for a non-positive threshold, zero directions or a negative jitter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.velocity_threshold.is_finite() && self.velocity_threshold > 0.0) {
            return Err(ConfigError::Invalid {
                key: "INKWALL_VELOCITY_THRESHOLD",
                reason: format!("must be a positive number, got {}", self.velocity_threshold),
            });
        }
        if self.snap_directions == 0 {
            return Err(ConfigError::Invalid { key: "INKWALL_SNAP_DIRECTIONS", reason: "must be at least 1".into() });
        }
        if !(self.snap_jitter.is_finite() && self.snap_jitter >= 0.0) {
            return Err(ConfigError::Invalid {
                key: "INKWALL_SNAP_JITTER",
                reason: format!("must be zero or positive, got {}", self.snap_jitter),
            });
        }
        Ok(())
    }
}

/// Render-side tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Target width at which implement styles are authored.
    pub reference_width: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { reference_width: REFERENCE_WIDTH }
    }
}

impl RenderConfig {
    /// Read from the environment.
    ///
    /// Optional:
    /// - `INKWALL_REFERENCE_WIDTH`: default 1024
    #[must_use]
    pub fn from_env() -> Self {
        Self { reference_width: env_parse("INKWALL_REFERENCE_WIDTH", REFERENCE_WIDTH) }
    }

    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for a non-positive reference width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reference_width.is_finite() && self.reference_width > 0.0 {
            return Ok(());
        }
        Err(ConfigError::Invalid {
            key: "INKWALL_REFERENCE_WIDTH",
            reason: format!("must be a positive number, got {}", self.reference_width),
        })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
