//! # Glitch Engine
//!
//! `glitch-engine` re-exports [`glitch_core`], the frame-driven glitch effect
//! controller. Hosts depend on this crate and drive a [`GlitchEffect`] from
//! their render loop; the headless driver lives in `crates/glitch-cli`.

pub use glitch_core::*;
