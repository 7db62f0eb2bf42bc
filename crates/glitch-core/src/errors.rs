use crate::texture::TextureHandle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlitchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Unknown texture: {0}")]
    UnknownTexture(TextureHandle),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GlitchError>;
