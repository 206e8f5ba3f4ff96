//! Image decoding and level packs
//!
//! A level pack is a directory holding `game.json` and the images it
//! references by relative path.

use std::fs;
use std::path::{Path, PathBuf};

use glassforge_render::Image;
use image::ImageFormat;

use crate::manifest::GameManifest;
use crate::{AssetError, AssetResult};

/// Manifest file name inside a pack
pub const MANIFEST_FILE: &str = "game.json";

/// Decode PNG bytes into an RGBA image
pub fn decode_png(bytes: &[u8]) -> AssetResult<Image> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Image::from_rgba(width, height, rgba.into_raw())?)
}

/// Game data on disk
#[derive(Debug, Clone)]
pub struct LevelPack {
    root: PathBuf,
    manifest: GameManifest,
}

impl LevelPack {
    /// Open a pack directory and parse its manifest
    pub fn open(root: impl Into<PathBuf>) -> AssetResult<Self> {
        let root = root.into();
        let manifest_path = root.join(MANIFEST_FILE);
        let json = fs::read_to_string(&manifest_path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(manifest_path.display().to_string()),
            _ => AssetError::IoError(err),
        })?;
        let manifest = GameManifest::from_json(&json)?;
        log::info!(
            "Opened pack {}: {} sprite(s), {} level(s)",
            root.display(),
            manifest.sprites.len(),
            manifest.levels.len()
        );
        Ok(Self { root, manifest })
    }

    /// Create a pack from an already parsed manifest
    pub fn from_manifest(root: impl Into<PathBuf>, manifest: GameManifest) -> Self {
        Self {
            root: root.into(),
            manifest,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &GameManifest {
        &self.manifest
    }

    /// Take the manifest out of the pack
    pub fn into_manifest(self) -> GameManifest {
        self.manifest
    }

    /// Resolve an image path relative to the pack
    pub fn image_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Read and decode an image of the pack
    pub fn load_image(&self, name: &str) -> AssetResult<Image> {
        let path = self.image_path(name);
        let bytes = fs::read(&path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(path.display().to_string()),
            _ => AssetError::IoError(err),
        })?;
        decode_png(&bytes)
    }
}
