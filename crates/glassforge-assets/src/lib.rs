//! # GlassForge Assets
//!
//! Game data for the GlassForge engine.
//!
//! ## Features
//! - JSON game manifest: sprites, levels and the terrain spawn table
//! - Sprite library tracking which images are still loading
//! - PNG decoding into RGBA [`Image`](glassforge_render::Image)s
//! - Level packs on disk (a manifest next to its images)

pub mod library;
pub mod loader;
pub mod manifest;

pub use library::SpriteLibrary;
pub use loader::{decode_png, LevelPack};
pub use manifest::{GameManifest, LevelDef, SpawnEntry, SpawnGroup, SpriteDef};

use thiserror::Error;

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Invalid image: {0}")]
    InvalidImage(#[from] glassforge_render::RenderError),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;
