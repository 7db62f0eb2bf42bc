//! # Textures
//!
//! The boundary to whatever owns GPU textures. The controller never touches
//! pixel data; it only asks a [`TextureBackend`] for noise maps, configures
//! their sampling and releases the ones it created.
//!
//! ## Key Types
//! - `TextureHandle`: Opaque identifier handed out by a backend.
//! - `SamplingOptions`: Filtering/wrapping state applied to a texture.
//! - `PerturbationMap`: A handle plus who owns it.
//! - `MemoryTextures`: CPU backend used by the CLI and tests.

use crate::config::MAX_NOISE_SIZE;
use crate::errors::{GlitchError, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Opaque identifier for a texture owned by a [`TextureBackend`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u64);

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Sampling state of a texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingOptions {
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub generate_mipmaps: bool,
}

impl SamplingOptions {
    /// Applied to every perturbation map: blocky lookups that tile forever.
    pub const PERTURBATION: SamplingOptions = SamplingOptions {
        min_filter: FilterMode::Nearest,
        mag_filter: FilterMode::Nearest,
        wrap_s: WrapMode::Repeat,
        wrap_t: WrapMode::Repeat,
        generate_mipmaps: false,
    };
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            wrap_s: WrapMode::ClampToEdge,
            wrap_t: WrapMode::ClampToEdge,
            generate_mipmaps: true,
        }
    }
}

/// Whether the controller is responsible for releasing a map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// Created by the controller; released on replacement or dispose.
    Generated,
    /// Supplied by the caller; never released by the controller.
    Borrowed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PerturbationMap {
    pub handle: TextureHandle,
    pub ownership: Ownership,
}

impl PerturbationMap {
    pub fn is_generated(&self) -> bool {
        self.ownership == Ownership::Generated
    }
}

/// Creates, configures and releases textures on behalf of effects.
pub trait TextureBackend {
    /// Creates a `width x height` texture filled with random noise.
    fn create_noise(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<TextureHandle>;

    /// Applies sampling state to an existing texture.
    fn configure(&mut self, handle: TextureHandle, sampling: &SamplingOptions) -> Result<()>;

    /// Frees the texture. Unknown handles are ignored.
    fn release(&mut self, handle: TextureHandle);
}

/// A texture stored in [`MemoryTextures`].
#[derive(Clone, Debug)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub sampling: SamplingOptions,
    pub pixels: Vec<u8>,
}

/// CPU-side texture store.
///
/// Textures live in a map keyed by handle; handles are never reused so a
/// stale handle can be detected after release.
#[derive(Debug)]
pub struct MemoryTextures {
    textures: HashMap<TextureHandle, TextureData>,
    next_id: u64,
    released: HashMap<TextureHandle, usize>,
    rng: StdRng,
}

impl MemoryTextures {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Noise content is reproducible for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            textures: HashMap::new(),
            next_id: 1,
            released: HashMap::new(),
            rng,
        }
    }

    /// Registers caller-provided pixels, e.g. a map loaded from disk.
    pub fn insert(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: Vec<u8>,
    ) -> Result<TextureHandle> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(GlitchError::InvalidConfiguration(format!(
                "expected {expected} bytes for a {width}x{height} texture, got {}",
                pixels.len()
            )));
        }
        let handle = TextureHandle(self.next_id);
        self.next_id += 1;
        self.textures.insert(
            handle,
            TextureData {
                width,
                height,
                format,
                sampling: SamplingOptions::default(),
                pixels,
            },
        );
        Ok(handle)
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&TextureData> {
        self.textures.get(&handle)
    }

    pub fn is_live(&self, handle: TextureHandle) -> bool {
        self.textures.contains_key(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.textures.len()
    }

    /// How many times `handle` has been released.
    pub fn release_count(&self, handle: TextureHandle) -> usize {
        self.released.get(&handle).copied().unwrap_or(0)
    }
}

impl Default for MemoryTextures {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureBackend for MemoryTextures {
    fn create_noise(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<TextureHandle> {
        if width > MAX_NOISE_SIZE || height > MAX_NOISE_SIZE {
            return Err(GlitchError::InvalidConfiguration(format!(
                "noise texture {width}x{height} exceeds {MAX_NOISE_SIZE}x{MAX_NOISE_SIZE}"
            )));
        }
        let len = width as usize * height as usize * format.bytes_per_pixel();
        let mut pixels = vec![0u8; len];
        self.rng.fill_bytes(&mut pixels);
        let handle = self.insert(width, height, format, pixels)?;
        debug!(%handle, width, height, "created noise texture");
        Ok(handle)
    }

    fn configure(&mut self, handle: TextureHandle, sampling: &SamplingOptions) -> Result<()> {
        let texture = self
            .textures
            .get_mut(&handle)
            .ok_or(GlitchError::UnknownTexture(handle))?;
        texture.sampling = *sampling;
        Ok(())
    }

    fn release(&mut self, handle: TextureHandle) {
        if self.textures.remove(&handle).is_none() {
            warn!(%handle, "release of unknown texture");
        }
        *self.released.entry(handle).or_insert(0) += 1;
    }
}
