//! # Types Module
//!
//! Shared value types for the glitch controller.
//!
//! ## Key Types
//! - `GlitchMode`: Activation policy selected by the host.
//! - `Interval`: Closed `[min, max]` range of seconds.
//! - `BreakPoint`: One sampled `(delay, duration)` activation cycle.
//! - `Strength`: Amplitudes of weak and strong glitches.
//! - `GlitchIntensity`: Which tier fired on the last update.

use crate::errors::{GlitchError, Result};
use crate::random::{random_float, RandomSource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Activation policy of the glitch controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlitchMode {
    /// Never active.
    Disabled,
    /// Fires at random intervals drawn from the delay/duration ranges.
    #[default]
    Sporadic,
    /// Always active with the weak strength.
    ConstantMild,
    /// Always active with the strong strength.
    ConstantWild,
}

impl fmt::Display for GlitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlitchMode::Disabled => write!(f, "disabled"),
            GlitchMode::Sporadic => write!(f, "sporadic"),
            GlitchMode::ConstantMild => write!(f, "constant_mild"),
            GlitchMode::ConstantWild => write!(f, "constant_wild"),
        }
    }
}

/// A closed range of seconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Checks that both bounds are finite, non-negative and ordered.
    pub fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(GlitchError::InvalidConfiguration(format!(
                "{name} bounds must be finite, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min < 0.0 {
            return Err(GlitchError::InvalidConfiguration(format!(
                "{name} minimum must be non-negative, got {}",
                self.min
            )));
        }
        if self.min > self.max {
            return Err(GlitchError::InvalidConfiguration(format!(
                "{name} minimum {} exceeds maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Draws a value in `[min, max]`.
    pub fn sample(&self, rng: &mut dyn RandomSource) -> f32 {
        random_float(rng, self.min, self.max).clamp(self.min, self.max)
    }
}

/// The sampled timing of one sporadic activation cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakPoint {
    /// Seconds to wait before the glitch may fire.
    pub delay: f32,
    /// Seconds the glitch window stays open once triggered.
    pub duration: f32,
}

impl BreakPoint {
    pub fn sample(delay: &Interval, duration: &Interval, rng: &mut dyn RandomSource) -> Self {
        Self {
            delay: delay.sample(rng),
            duration: duration.sample(rng),
        }
    }

    /// Elapsed time at which the cycle ends and a new breakpoint is drawn.
    pub fn end(&self) -> f32 {
        self.delay + self.duration
    }
}

/// Amplitudes of weak and strong glitches.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    pub weak: f32,
    pub strong: f32,
}

impl Strength {
    pub const fn new(weak: f32, strong: f32) -> Self {
        Self { weak, strong }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.weak.is_finite() || !self.strong.is_finite() {
            return Err(GlitchError::InvalidConfiguration(format!(
                "strength must be finite, got ({}, {})",
                self.weak, self.strong
            )));
        }
        Ok(())
    }

    pub fn for_intensity(&self, intensity: GlitchIntensity) -> f32 {
        match intensity {
            GlitchIntensity::Weak => self.weak,
            GlitchIntensity::Strong => self.strong,
        }
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self::new(0.3, 1.0)
    }
}

/// The tier selected when a glitch fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlitchIntensity {
    Weak,
    Strong,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SequenceRandom, StdRandom};

    #[test]
    fn test_interval_validation() {
        assert!(Interval::new(0.0, 0.0).validate("delay").is_ok());
        assert!(Interval::new(1.5, 3.5).validate("delay").is_ok());
        assert!(Interval::new(2.0, 1.0).validate("delay").is_err());
        assert!(Interval::new(-0.1, 1.0).validate("delay").is_err());
        assert!(Interval::new(0.0, f32::INFINITY).validate("delay").is_err());
        assert!(Interval::new(f32::NAN, 1.0).validate("delay").is_err());
    }

    #[test]
    fn test_sampled_breakpoints_stay_in_range() {
        let delay = Interval::new(1.5, 3.5);
        let duration = Interval::new(0.6, 1.0);
        let mut rng = StdRandom::seeded(7);
        for _ in 0..1000 {
            let bp = BreakPoint::sample(&delay, &duration, &mut rng);
            assert!(delay.contains(bp.delay), "delay {} out of range", bp.delay);
            assert!(
                duration.contains(bp.duration),
                "duration {} out of range",
                bp.duration
            );
        }
    }

    #[test]
    fn test_sample_uses_lower_bound_for_zero_draw() {
        let mut rng = SequenceRandom::new(vec![0.0, 0.5]);
        let bp = BreakPoint::sample(&Interval::new(1.0, 3.0), &Interval::new(0.0, 2.0), &mut rng);
        assert_eq!(bp.delay, 1.0);
        assert!((bp.duration - 1.0).abs() < 1e-6);
        assert!((bp.end() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_mode_serialization() {
        let json = serde_json::to_string(&GlitchMode::ConstantWild).unwrap();
        assert_eq!(json, "\"constant_wild\"");
        let loaded: GlitchMode = serde_json::from_str("\"constant_mild\"").unwrap();
        assert_eq!(loaded, GlitchMode::ConstantMild);
        assert_eq!(GlitchMode::default(), GlitchMode::Sporadic);
    }
}
