//! # Uniforms
//!
//! The fixed parameter block handed to the glitch shader each frame, and its
//! conversion to the generic key/value form a rendering backend binds.

use crate::texture::TextureHandle;
use glam::Vec2;
use serde::{Deserialize, Serialize};

pub const PERTURBATION_MAP: &str = "perturbationMap";
pub const COLUMNS: &str = "columns";
pub const ACTIVE: &str = "active";
pub const RANDOM: &str = "random";
pub const SEEDS: &str = "seeds";
pub const DISTORTION: &str = "distortion";

/// A typed shader uniform value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformValue {
    Texture(Option<TextureHandle>),
    Float(f32),
    Bool(bool),
    Vec2(Vec2),
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlitchUniforms {
    pub perturbation_map: Option<TextureHandle>,
    pub columns: f32,
    pub active: bool,
    pub random: f32,
    pub seeds: Vec2,
    pub distortion: Vec2,
}

impl GlitchUniforms {
    pub fn new(columns: f32) -> Self {
        Self {
            perturbation_map: None,
            columns,
            active: false,
            random: 1.0,
            seeds: Vec2::ZERO,
            distortion: Vec2::ZERO,
        }
    }

    /// Named bindings in shader declaration order.
    pub fn bindings(&self) -> Vec<(&'static str, UniformValue)> {
        vec![
            (PERTURBATION_MAP, UniformValue::Texture(self.perturbation_map)),
            (COLUMNS, UniformValue::Float(self.columns)),
            (ACTIVE, UniformValue::Bool(self.active)),
            (RANDOM, UniformValue::Float(self.random)),
            (SEEDS, UniformValue::Vec2(self.seeds)),
            (DISTORTION, UniformValue::Vec2(self.distortion)),
        ]
    }

    /// Packs the numeric uniforms as little-endian `f32`s in declaration order:
    /// `columns, active, random, seeds.xy, distortion.xy`.
    ///
    /// The sampler is bound separately. `active` is encoded as `1.0`/`0.0`.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let values = [
            self.columns,
            if self.active { 1.0 } else { 0.0 },
            self.random,
            self.seeds.x,
            self.seeds.y,
            self.distortion.x,
            self.distortion.y,
        ];
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_cover_every_key() {
        let uniforms = GlitchUniforms::new(0.05);
        let keys: Vec<_> = uniforms.bindings().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["perturbationMap", "columns", "active", "random", "seeds", "distortion"]
        );
    }

    #[test]
    fn test_packed_layout() {
        let mut uniforms = GlitchUniforms::new(0.05);
        uniforms.active = true;
        uniforms.seeds = Vec2::new(-0.5, 0.25);
        let bytes = uniforms.to_le_bytes();
        assert_eq!(bytes.len(), 7 * 4);
        assert_eq!(f32::from_le_bytes(bytes[4..8].try_into().unwrap()), 1.0);
        assert_eq!(f32::from_le_bytes(bytes[12..16].try_into().unwrap()), -0.5);
        assert_eq!(f32::from_le_bytes(bytes[16..20].try_into().unwrap()), 0.25);
    }

    #[test]
    fn test_json_uses_shader_names() {
        let uniforms = GlitchUniforms::new(0.05);
        let json = serde_json::to_value(uniforms).unwrap();
        assert!(json.get("perturbationMap").is_some());
        assert_eq!(json["active"], serde_json::Value::Bool(false));
    }
}
