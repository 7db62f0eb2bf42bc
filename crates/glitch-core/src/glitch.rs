//! # Glitch Effect
//!
//! The per-frame controller. Each [`GlitchEffect::update`] advances the
//! sporadic timer, decides whether the glitch is active and at which
//! intensity, and rewrites the uniform block accordingly.
//!
//! ## Timing
//! In [`GlitchMode::Sporadic`] the controller cycles through breakpoints:
//! it stays idle for `delay` seconds, then triggers until `delay + duration`
//! has elapsed, at which point a new breakpoint is drawn and the timer
//! restarts. The constant modes ignore the timer.

use crate::config::{self, GlitchConfig};
use crate::effect::Effect;
use crate::errors::Result;
use crate::random::{random_float, RandomSource, StdRandom};
use crate::shaders::GLITCH_FRAGMENT;
use crate::texture::{
    Ownership, PerturbationMap, PixelFormat, SamplingOptions, TextureBackend, TextureHandle,
};
use crate::types::{BreakPoint, GlitchIntensity, GlitchMode, Interval, Strength};
use crate::uniforms::{GlitchUniforms, UniformValue};
use glam::Vec2;
use std::cell::Cell;
use std::f32::consts::PI;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, instrument, warn};

/// Scales the random draw into the chromatic aberration amplitude.
const OFFSET_SCALE: f32 = 0.03;

/// A chromatic aberration offset shared between the host and the glitch effect.
///
/// Clones share the same cell. The effect writes the offset on every update;
/// the host reads it when binding its own chromatic aberration pass.
#[derive(Clone, Debug, Default)]
pub struct ChromaticOffset(Rc<Cell<Vec2>>);

impl ChromaticOffset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Vec2 {
        self.0.get()
    }

    pub fn set(&self, value: Vec2) {
        self.0.set(value);
    }
}

/// Builder for [`GlitchEffect`].
pub struct GlitchEffectBuilder {
    config: GlitchConfig,
    chromatic_offset: Option<ChromaticOffset>,
    perturbation_map: Option<TextureHandle>,
    random: Option<Box<dyn RandomSource>>,
}

impl GlitchEffectBuilder {
    /// Binds an offset the effect will drive.
    pub fn chromatic_offset(mut self, offset: ChromaticOffset) -> Self {
        self.chromatic_offset = Some(offset);
        self
    }

    /// Uses a caller-owned perturbation map instead of generating one.
    pub fn perturbation_map(mut self, handle: TextureHandle) -> Self {
        self.perturbation_map = Some(handle);
        self
    }

    /// Replaces the default entropy-seeded generator.
    pub fn random_source(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    pub fn build(self, textures: &mut dyn TextureBackend) -> Result<GlitchEffect> {
        GlitchEffect::from_parts(self, textures)
    }
}

pub struct GlitchEffect {
    delay: Interval,
    duration: Interval,
    strength: Strength,
    ratio: f32,
    mode: GlitchMode,
    break_point: BreakPoint,
    time: f32,
    intensity: Option<GlitchIntensity>,
    uniforms: GlitchUniforms,
    perturbation_map: Option<PerturbationMap>,
    chromatic_offset: Option<ChromaticOffset>,
    random: Box<dyn RandomSource>,
}

impl fmt::Debug for GlitchEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlitchEffect")
            .field("mode", &self.mode)
            .field("break_point", &self.break_point)
            .field("time", &self.time)
            .field("uniforms", &self.uniforms)
            .field("perturbation_map", &self.perturbation_map)
            .finish()
    }
}

impl GlitchEffect {
    pub const NAME: &'static str = "GlitchEffect";

    /// Starts building an effect from a configuration.
    pub fn builder(config: GlitchConfig) -> GlitchEffectBuilder {
        GlitchEffectBuilder {
            config,
            chromatic_offset: None,
            perturbation_map: None,
            random: None,
        }
    }

    /// Creates an effect with a generated perturbation map and an entropy-seeded generator.
    pub fn new(config: GlitchConfig, textures: &mut dyn TextureBackend) -> Result<Self> {
        Self::builder(config).build(textures)
    }

    #[instrument(level = "debug", skip_all, fields(noise_size = builder.config.noise_size))]
    fn from_parts(builder: GlitchEffectBuilder, textures: &mut dyn TextureBackend) -> Result<Self> {
        let GlitchEffectBuilder {
            config,
            chromatic_offset,
            perturbation_map,
            random,
        } = builder;
        config.validate()?;

        let mut random = random.unwrap_or_else(|| Box::new(StdRandom::from_entropy()));
        let break_point = BreakPoint::sample(&config.delay, &config.duration, random.as_mut());

        let mut effect = Self {
            delay: config.delay,
            duration: config.duration,
            strength: config.strength,
            ratio: config.ratio,
            mode: GlitchMode::Sporadic,
            break_point,
            time: 0.0,
            intensity: None,
            uniforms: GlitchUniforms::new(config.columns),
            perturbation_map: None,
            chromatic_offset,
            random,
        };

        match perturbation_map {
            Some(handle) => effect.set_perturbation_map(handle, textures)?,
            None => {
                effect.regenerate_perturbation_map(config.noise_size, textures)?;
            }
        }

        debug!(?break_point, "glitch effect created");
        Ok(effect)
    }

    /// Advances the effect by `delta` seconds and rewrites the uniforms.
    ///
    /// A negative or non-finite `delta` counts as a zero-length step.
    pub fn update(&mut self, delta: f32) {
        let delta = if delta.is_finite() && delta >= 0.0 {
            delta
        } else {
            warn!(delta, "ignoring invalid frame delta");
            0.0
        };

        let mut intensity = None;
        let mut amplitude = 0.0_f32;
        let mut angle = 0.0_f32;

        if self.mode != GlitchMode::Disabled {
            let mut trigger = false;
            if self.mode == GlitchMode::Sporadic {
                self.time += delta;
                trigger = self.time > self.break_point.delay;
                if self.time >= self.break_point.end() {
                    self.break_point =
                        BreakPoint::sample(&self.delay, &self.duration, self.random.as_mut());
                    self.time = 0.0;
                    debug!(break_point = ?self.break_point, "resampled breakpoint");
                }
            }

            let r = self.random.next_f32();
            self.uniforms.random = r;

            if (trigger && r > self.ratio) || self.mode == GlitchMode::ConstantWild {
                intensity = Some(GlitchIntensity::Strong);
            } else if trigger || self.mode == GlitchMode::ConstantMild {
                intensity = Some(GlitchIntensity::Weak);
            }

            if let Some(tier) = intensity {
                let s = self.strength.for_intensity(tier);
                amplitude = r * s * OFFSET_SCALE;
                angle = random_float(self.random.as_mut(), -PI, PI);
                let seed_x = random_float(self.random.as_mut(), -s, s);
                let seed_y = random_float(self.random.as_mut(), -s, s);
                self.uniforms.seeds = Vec2::new(seed_x, seed_y);
                let dist_x = self.random.next_f32();
                let dist_y = self.random.next_f32();
                self.uniforms.distortion = Vec2::new(dist_x, dist_y);
            }
        }

        let active = intensity.is_some();
        if let Some(offset) = &self.chromatic_offset {
            if active {
                offset.set(Vec2::new(angle.cos(), angle.sin()) * amplitude);
            } else {
                offset.set(Vec2::ZERO);
            }
        }

        self.intensity = intensity;
        self.uniforms.active = active;
    }

    /// Releases the perturbation map if this effect generated it.
    pub fn dispose(&mut self, textures: &mut dyn TextureBackend) {
        if let Some(map) = self.perturbation_map.take() {
            if map.is_generated() {
                debug!(handle = %map.handle, "releasing generated perturbation map");
                textures.release(map.handle);
            }
        }
        self.uniforms.perturbation_map = None;
    }

    pub fn perturbation_map(&self) -> Option<TextureHandle> {
        self.perturbation_map.map(|m| m.handle)
    }

    /// Installs a caller-owned perturbation map.
    ///
    /// A previously generated map is released first; the new one is never
    /// released by this effect. Passing the handle that is already installed
    /// only refreshes its sampling state.
    pub fn set_perturbation_map(
        &mut self,
        handle: TextureHandle,
        textures: &mut dyn TextureBackend,
    ) -> Result<()> {
        self.install_map(
            PerturbationMap {
                handle,
                ownership: Ownership::Borrowed,
            },
            textures,
        )
    }

    /// Generates a `size x size` noise map and installs it as owned.
    pub fn regenerate_perturbation_map(
        &mut self,
        size: u32,
        textures: &mut dyn TextureBackend,
    ) -> Result<TextureHandle> {
        config::validate_noise_size(size)?;
        let handle = textures.create_noise(size, size, PixelFormat::Rgba8)?;
        let map = PerturbationMap {
            handle,
            ownership: Ownership::Generated,
        };
        if let Err(e) = self.install_map(map, textures) {
            textures.release(handle);
            return Err(e);
        }
        Ok(handle)
    }

    fn install_map(
        &mut self,
        mut map: PerturbationMap,
        textures: &mut dyn TextureBackend,
    ) -> Result<()> {
        textures.configure(map.handle, &SamplingOptions::PERTURBATION)?;
        if let Some(current) = self.perturbation_map.take() {
            if current.handle == map.handle {
                // Reinstalling the current map keeps whoever owned it.
                map.ownership = current.ownership;
            } else if current.is_generated() {
                debug!(handle = %current.handle, "releasing replaced perturbation map");
                textures.release(current.handle);
            }
        }
        self.perturbation_map = Some(map);
        self.uniforms.perturbation_map = Some(map.handle);
        Ok(())
    }

    pub fn mode(&self) -> GlitchMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GlitchMode) {
        self.mode = mode;
    }

    pub fn is_active(&self) -> bool {
        self.uniforms.active
    }

    /// The tier that fired on the last update, `None` while inactive.
    pub fn intensity(&self) -> Option<GlitchIntensity> {
        self.intensity
    }

    pub fn uniforms(&self) -> &GlitchUniforms {
        &self.uniforms
    }

    pub fn break_point(&self) -> BreakPoint {
        self.break_point
    }

    /// Seconds since the last breakpoint reset.
    pub fn elapsed(&self) -> f32 {
        self.time
    }

    pub fn chromatic_offset(&self) -> Option<&ChromaticOffset> {
        self.chromatic_offset.as_ref()
    }

    pub fn delay(&self) -> Interval {
        self.delay
    }

    /// Takes effect from the next breakpoint.
    pub fn set_delay(&mut self, delay: Interval) -> Result<()> {
        delay.validate("delay")?;
        self.delay = delay;
        Ok(())
    }

    pub fn duration(&self) -> Interval {
        self.duration
    }

    /// Takes effect from the next breakpoint.
    pub fn set_duration(&mut self, duration: Interval) -> Result<()> {
        duration.validate("duration")?;
        self.duration = duration;
        Ok(())
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    pub fn set_strength(&mut self, strength: Strength) -> Result<()> {
        strength.validate()?;
        self.strength = strength;
        Ok(())
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn set_ratio(&mut self, ratio: f32) -> Result<()> {
        config::validate_ratio(ratio)?;
        self.ratio = ratio;
        Ok(())
    }

    pub fn columns(&self) -> f32 {
        self.uniforms.columns
    }

    pub fn set_columns(&mut self, columns: f32) -> Result<()> {
        config::validate_columns(columns)?;
        self.uniforms.columns = columns;
        Ok(())
    }
}

impl Effect for GlitchEffect {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fragment_shader(&self) -> &'static str {
        GLITCH_FRAGMENT
    }

    fn uniforms(&self) -> Vec<(&'static str, UniformValue)> {
        self.uniforms.bindings()
    }

    fn update(&mut self, delta: f32) {
        GlitchEffect::update(self, delta);
    }

    fn dispose(&mut self, textures: &mut dyn TextureBackend) {
        GlitchEffect::dispose(self, textures);
    }
}

impl Drop for GlitchEffect {
    fn drop(&mut self) {
        if let Some(map) = self.perturbation_map {
            if map.is_generated() {
                warn!(handle = %map.handle, "glitch effect dropped without dispose; generated map leaked");
            }
        }
    }
}
