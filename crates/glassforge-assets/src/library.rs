//! Sprite Library
//!
//! Sprites are declared by name first and their images arrive later from
//! the host's sprite pipeline. Until an image arrives the sprite resolves
//! to nothing, and objects using it stay invisible and intangible.

use ahash::AHashMap;
use glassforge_render::{Image, Sprite};

use crate::manifest::SpriteDef;
use crate::{AssetError, AssetResult};

/// Named sprites and their load state
#[derive(Debug, Default)]
pub struct SpriteLibrary {
    defs: AHashMap<String, SpriteDef>,
    loaded: AHashMap<String, Sprite>,
}

impl SpriteLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library from manifest declarations
    pub fn from_defs<'a>(defs: impl IntoIterator<Item = (&'a String, &'a SpriteDef)>) -> Self {
        let mut library = Self::new();
        for (name, def) in defs {
            library.register(name.clone(), def.clone());
        }
        library
    }

    /// Declare a sprite; redeclaring drops any loaded image
    pub fn register(&mut self, name: impl Into<String>, def: SpriteDef) {
        let name = name.into();
        if self.loaded.remove(&name).is_some() {
            log::debug!("Sprite {} redeclared, image dropped", name);
        }
        self.defs.insert(name, def);
    }

    /// Check if a sprite name is declared
    pub fn is_registered(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Check if a sprite's image has arrived
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    /// Declaration of a sprite
    pub fn definition(&self, name: &str) -> Option<&SpriteDef> {
        self.defs.get(name)
    }

    /// Loaded sprite by name
    pub fn get(&self, name: &str) -> Option<&Sprite> {
        self.loaded.get(name)
    }

    /// Declared sprites whose images have not arrived, sorted by name
    pub fn pending(&self) -> Vec<(&str, &SpriteDef)> {
        let mut pending: Vec<_> = self
            .defs
            .iter()
            .filter(|(name, _)| !self.loaded.contains_key(*name))
            .map(|(name, def)| (name.as_str(), def))
            .collect();
        pending.sort_by(|a, b| a.0.cmp(b.0));
        pending
    }

    /// Accept a loaded image for a declared sprite
    ///
    /// Frame layout comes from the declaration; frame size defaults to the
    /// image dimensions.
    pub fn on_sprite_loaded(&mut self, name: &str, image: Image) -> AssetResult<&Sprite> {
        let def = self
            .defs
            .get(name)
            .ok_or_else(|| AssetError::NotFound(format!("sprite {}", name)))?;
        let sprite = Sprite::new(image, def.frames, def.width)?;
        log::debug!(
            "Sprite {} loaded: {} frame(s) of {}x{}",
            name,
            sprite.frames(),
            sprite.width(),
            sprite.height()
        );
        self.loaded.insert(name.to_string(), sprite);
        self.loaded
            .get(name)
            .ok_or_else(|| AssetError::NotFound(format!("sprite {}", name)))
    }

    /// Number of declared sprites
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
