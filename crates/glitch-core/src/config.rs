//! # Configuration
//!
//! Serializable construction parameters for [`GlitchEffect`](crate::GlitchEffect).
//! Missing fields in a JSON document fall back to the defaults below.

use crate::errors::{GlitchError, Result};
use crate::types::{Interval, Strength};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default width of the glitch bands.
pub const DEFAULT_COLUMNS: f32 = 0.05;
/// Default threshold above which a sporadic glitch is strong.
pub const DEFAULT_RATIO: f32 = 0.85;
/// Default edge length of a generated perturbation map.
pub const DEFAULT_NOISE_SIZE: u32 = 64;
/// Largest edge length accepted for a generated perturbation map.
pub const MAX_NOISE_SIZE: u32 = 4096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    /// Minimum and maximum delay between activations, in seconds.
    pub delay: Interval,
    /// Minimum and maximum duration of an activation, in seconds.
    pub duration: Interval,
    pub strength: Strength,
    /// Scale of the blocky glitch columns.
    pub columns: f32,
    pub ratio: f32,
    /// Size of the generated noise map. Ignored when a map is supplied.
    pub noise_size: u32,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            delay: Interval::new(1.5, 3.5),
            duration: Interval::new(0.6, 1.0),
            strength: Strength::default(),
            columns: DEFAULT_COLUMNS,
            ratio: DEFAULT_RATIO,
            noise_size: DEFAULT_NOISE_SIZE,
        }
    }
}

impl GlitchConfig {
    pub fn validate(&self) -> Result<()> {
        self.delay.validate("delay")?;
        self.duration.validate("duration")?;
        self.strength.validate()?;
        validate_columns(self.columns)?;
        validate_ratio(self.ratio)?;
        validate_noise_size(self.noise_size)?;
        Ok(())
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GlitchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

pub(crate) fn validate_columns(columns: f32) -> Result<()> {
    if !columns.is_finite() || columns <= 0.0 {
        return Err(GlitchError::InvalidConfiguration(format!(
            "columns must be a positive finite number, got {columns}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_noise_size(size: u32) -> Result<()> {
    if size == 0 || size > MAX_NOISE_SIZE {
        return Err(GlitchError::InvalidConfiguration(format!(
            "noise_size must lie in [1, {MAX_NOISE_SIZE}], got {size}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_ratio(ratio: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(GlitchError::InvalidConfiguration(format!(
            "ratio must lie in [0, 1], got {ratio}"
        )));
    }
    Ok(())
}
