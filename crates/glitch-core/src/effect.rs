use crate::texture::TextureBackend;
use crate::uniforms::UniformValue;

/// The contract a post-processing pipeline expects from an effect.
///
/// The host calls [`update`](Effect::update) once per frame and reads
/// [`uniforms`](Effect::uniforms) afterwards to bind them to the shader.
pub trait Effect {
    /// Stable name used by the pipeline for caching and diagnostics.
    fn name(&self) -> &str;

    /// Fragment source the pipeline compiles for this effect.
    fn fragment_shader(&self) -> &'static str;

    /// Current uniform values, keyed by their shader names.
    fn uniforms(&self) -> Vec<(&'static str, UniformValue)>;

    /// Advances the effect by `delta` seconds.
    fn update(&mut self, delta: f32);

    /// Releases resources the effect created. Safe to call more than once.
    fn dispose(&mut self, textures: &mut dyn TextureBackend);
}
