//! # Glitch Core
//!
//! `glitch-core` drives a parametric "glitch" post-processing effect.
//!
//! The rendering itself belongs to the host pipeline. This crate owns the part
//! that decides, frame by frame, *whether* the image should glitch, how strong
//! the glitch is and which band/seed parameters the shader receives.
//!
//! ## Core Features
//!
//! *   **Timing State Machine**: Sporadic activations drawn from configurable delay and duration ranges.
//! *   **Modes**: Disabled, sporadic, constant mild and constant wild operation.
//! *   **Typed Uniforms**: A fixed uniform block with conversion to named bindings or raw bytes.
//! *   **Ownership Tracking**: Generated perturbation maps are released, borrowed ones never are.
//! *   **Deterministic Randomness**: Every draw goes through an injectable [`RandomSource`].
//!
//! ## Usage
//!
//! ```rust
//! use glitch_core::{GlitchConfig, GlitchEffect, MemoryTextures};
//!
//! let mut textures = MemoryTextures::new();
//! let mut effect = GlitchEffect::new(GlitchConfig::default(), &mut textures).unwrap();
//!
//! for _ in 0..60 {
//!     effect.update(1.0 / 60.0);
//!     let _uniforms = effect.uniforms();
//! }
//!
//! effect.dispose(&mut textures);
//! ```

/// Serializable construction parameters.
pub mod config;

/// The `Effect` contract expected by post-processing pipelines.
pub mod effect;

pub mod errors;

/// The per-frame glitch controller.
pub mod glitch;

/// Injectable uniform random sources.
pub mod random;

/// Shader source text.
pub mod shaders;

/// Texture handles, sampling state and the backend trait.
pub mod texture;

/// Shared value types (modes, intervals, breakpoints, strengths).
pub mod types;

/// The uniform block and its binding conversions.
pub mod uniforms;

pub use config::GlitchConfig;
pub use effect::Effect;
pub use errors::{GlitchError, Result};
pub use glitch::{ChromaticOffset, GlitchEffect, GlitchEffectBuilder};
pub use random::{RandomSource, SequenceRandom, StdRandom};
pub use texture::{
    MemoryTextures, Ownership, PixelFormat, SamplingOptions, TextureBackend, TextureHandle,
};
pub use types::{BreakPoint, GlitchIntensity, GlitchMode, Interval, Strength};
pub use uniforms::{GlitchUniforms, UniformValue};
