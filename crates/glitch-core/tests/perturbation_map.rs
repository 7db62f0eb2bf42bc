//! Perturbation Map Tests
//!
//! Ownership of generated vs. caller-supplied maps and their sampling state.

use glitch_core::{
    GlitchConfig, GlitchEffect, GlitchError, MemoryTextures, PixelFormat, SamplingOptions,
    StdRandom, TextureBackend, TextureHandle,
};

fn effect(textures: &mut MemoryTextures) -> GlitchEffect {
    GlitchEffect::builder(GlitchConfig::default())
        .random_source(Box::new(StdRandom::seeded(1)))
        .build(textures)
        .unwrap()
}

/// Without a supplied map the effect generates a `noise_size` square noise map.
#[test]
fn generates_default_map() {
    let mut textures = MemoryTextures::seeded(2);
    let mut glitch = effect(&mut textures);

    let handle = glitch.perturbation_map().expect("map should be generated");
    let data = textures.get(handle).unwrap();
    assert_eq!((data.width, data.height), (64, 64));
    assert_eq!(data.format, PixelFormat::Rgba8);
    assert_eq!(data.sampling, SamplingOptions::PERTURBATION);
    assert_eq!(glitch.uniforms().perturbation_map, Some(handle));

    glitch.dispose(&mut textures);
    assert!(!textures.is_live(handle));
}

/// A caller map is configured for nearest/repeat sampling but never released.
#[test]
fn supplied_map_is_borrowed() {
    let mut textures = MemoryTextures::seeded(2);
    let own = textures.create_noise(16, 16, PixelFormat::Rgba8).unwrap();
    assert_eq!(textures.get(own).unwrap().sampling, SamplingOptions::default());

    let mut glitch = GlitchEffect::builder(GlitchConfig::default())
        .perturbation_map(own)
        .build(&mut textures)
        .unwrap();
    assert_eq!(glitch.perturbation_map(), Some(own));
    assert_eq!(textures.live_count(), 1, "no map should be generated");

    let sampling = textures.get(own).unwrap().sampling;
    assert_eq!(sampling, SamplingOptions::PERTURBATION);
    assert!(!sampling.generate_mipmaps);

    glitch.dispose(&mut textures);
    glitch.dispose(&mut textures);
    assert!(textures.is_live(own));
    assert_eq!(textures.release_count(own), 0);
}

/// Disposing twice releases a generated map exactly once.
#[test]
fn dispose_is_idempotent() {
    let mut textures = MemoryTextures::seeded(2);
    let mut glitch = effect(&mut textures);
    let handle = glitch.perturbation_map().unwrap();

    glitch.dispose(&mut textures);
    glitch.dispose(&mut textures);
    assert_eq!(textures.release_count(handle), 1);
    assert_eq!(glitch.perturbation_map(), None);
}

/// Setting a map then reading it back returns the same handle.
#[test]
fn set_then_get_round_trips() {
    let mut textures = MemoryTextures::seeded(2);
    let mut glitch = effect(&mut textures);
    let generated = glitch.perturbation_map().unwrap();

    let own = textures.create_noise(32, 32, PixelFormat::Rgba8).unwrap();
    glitch.set_perturbation_map(own, &mut textures).unwrap();
    assert_eq!(glitch.perturbation_map(), Some(own));
    assert_eq!(glitch.uniforms().perturbation_map, Some(own));

    // The generated map is released when replaced
    assert!(!textures.is_live(generated));
    assert_eq!(textures.release_count(generated), 1);

    // Replacing a borrowed map leaves it alone
    let other = textures.create_noise(8, 8, PixelFormat::Rgba8).unwrap();
    glitch.set_perturbation_map(other, &mut textures).unwrap();
    assert!(textures.is_live(own));

    glitch.dispose(&mut textures);
    assert!(textures.is_live(other));
}

/// Regenerating swaps in a fresh owned map and frees the previous one.
#[test]
fn regenerate_replaces_generated_map() {
    let mut textures = MemoryTextures::seeded(2);
    let mut glitch = effect(&mut textures);
    let first = glitch.perturbation_map().unwrap();

    let second = glitch.regenerate_perturbation_map(128, &mut textures).unwrap();
    assert_ne!(first, second);
    assert!(!textures.is_live(first));
    assert_eq!(textures.get(second).unwrap().width, 128);

    assert!(matches!(
        glitch.regenerate_perturbation_map(0, &mut textures),
        Err(GlitchError::InvalidConfiguration(_))
    ));
    assert_eq!(glitch.perturbation_map(), Some(second));

    glitch.dispose(&mut textures);
    assert_eq!(textures.live_count(), 0);
}

/// Oversized noise maps are rejected before the backend allocates anything.
#[test]
fn oversized_map_is_rejected() {
    let mut textures = MemoryTextures::seeded(2);
    let mut glitch = effect(&mut textures);
    let current = glitch.perturbation_map().unwrap();

    for size in [4_097, 4_000_000_000] {
        let result = glitch.regenerate_perturbation_map(size, &mut textures);
        assert!(
            matches!(result, Err(GlitchError::InvalidConfiguration(_))),
            "size {size} should be rejected"
        );
    }
    assert_eq!(glitch.perturbation_map(), Some(current));
    assert_eq!(textures.live_count(), 1);

    let config = GlitchConfig {
        noise_size: 4_000_000_000,
        ..Default::default()
    };
    let result = GlitchEffect::new(config, &mut textures);
    assert!(matches!(result, Err(GlitchError::InvalidConfiguration(_))));
    assert_eq!(textures.live_count(), 1);
    glitch.dispose(&mut textures);
}

/// Repeated regeneration frees every replaced map exactly once.
#[test]
fn repeated_regeneration_releases_each_map_once() {
    let mut textures = MemoryTextures::seeded(2);
    let mut glitch = effect(&mut textures);
    let mut previous = vec![glitch.perturbation_map().unwrap()];

    for _ in 0..50 {
        previous.push(glitch.regenerate_perturbation_map(4, &mut textures).unwrap());
        assert_eq!(textures.live_count(), 1, "only the current map should be live");
    }
    let current = previous.pop().unwrap();
    assert!(previous.iter().all(|h| textures.release_count(*h) == 1));
    assert_eq!(textures.release_count(current), 0);

    glitch.dispose(&mut textures);
    assert_eq!(textures.release_count(current), 1);
}

/// Installing the map that is already current keeps its ownership.
#[test]
fn reinstalling_current_map_keeps_ownership() {
    let mut textures = MemoryTextures::seeded(2);
    let mut glitch = effect(&mut textures);
    let handle = glitch.perturbation_map().unwrap();

    glitch.set_perturbation_map(handle, &mut textures).unwrap();
    assert!(textures.is_live(handle));
    assert_eq!(textures.release_count(handle), 0);

    // Still generated, so dispose frees it
    glitch.dispose(&mut textures);
    assert!(!textures.is_live(handle));
    assert_eq!(textures.release_count(handle), 1);
}

/// An unknown handle is rejected and the current map stays installed.
#[test]
fn unknown_handle_is_rejected() {
    let mut textures = MemoryTextures::seeded(2);
    let mut glitch = effect(&mut textures);
    let current = glitch.perturbation_map().unwrap();

    let result = glitch.set_perturbation_map(TextureHandle(9_999), &mut textures);
    assert!(matches!(result, Err(GlitchError::UnknownTexture(TextureHandle(9_999)))));
    assert_eq!(glitch.perturbation_map(), Some(current));
    assert!(textures.is_live(current));
    glitch.dispose(&mut textures);
}

/// Invalid configuration is rejected before any texture is created.
#[test]
fn invalid_config_creates_nothing() {
    let mut textures = MemoryTextures::seeded(2);
    let config = GlitchConfig {
        ratio: 2.0,
        ..Default::default()
    };
    let result = GlitchEffect::new(config, &mut textures);
    assert!(matches!(result, Err(GlitchError::InvalidConfiguration(_))));
    assert_eq!(textures.live_count(), 0);
}
