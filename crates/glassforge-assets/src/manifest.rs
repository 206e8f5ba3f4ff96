//! Game Manifest
//!
//! Everything a game declares up front: engine configuration, named
//! sprites, the ordered level table and the spawn table that turns terrain
//! tokens into objects.
//!
//! ```json
//! {
//!   "config": { "screen_width": 32, "screen_height": 32 },
//!   "sprites": { "crate": { "image": "crate.png" } },
//!   "levels": [ { "image": "level1.png", "status_text": ["Push the crate"] } ],
//!   "spawn_table": { "128": { "default": { "kind": "crate", "params": { "sprite": "crate" } } } }
//! }
//! ```

use std::collections::BTreeMap;

use glassforge_core::{EngineConfig, SpawnParams};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{AssetError, AssetResult};

/// Sprite declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpriteDef {
    /// Image file, relative to the pack
    pub image: String,
    /// Number of frames in a horizontal strip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<u32>,
    /// Width of one frame, the image width divided by `frames` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

/// Level declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelDef {
    /// Terrain raster, relative to the pack
    pub image: String,
    /// Status lines; the first is shown on the first visit
    #[serde(default)]
    pub status_text: Vec<String>,
    /// Objects spawned on the first visit, before the raster tokens
    #[serde(default)]
    pub objects: Vec<SpawnParams>,
}

/// Object produced by a spawn token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpawnEntry {
    /// Registered object kind
    pub kind: String,
    /// Extra spawn parameters layered over the token's position
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl SpawnEntry {
    /// Spawn parameters for this entry placed at a terrain pixel
    pub fn params_at(&self, x: i32, y: i32) -> glassforge_core::EngineResult<SpawnParams> {
        SpawnParams::from_overlay(&self.kind, x, y, &self.params)
    }
}

/// Spawn entries sharing one type token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpawnGroup {
    /// Used when the subtype token has no entry of its own
    #[serde(default)]
    pub default: Option<SpawnEntry>,
    /// Entries by subtype token
    #[serde(default)]
    pub variants: BTreeMap<u8, SpawnEntry>,
}

impl SpawnGroup {
    /// Entry for a subtype, falling back to the default
    pub fn resolve(&self, subtype: u8) -> Option<&SpawnEntry> {
        self.variants.get(&subtype).or(self.default.as_ref())
    }
}

/// Complete game declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameManifest {
    /// Engine configuration, defaults when absent
    #[serde(default)]
    pub config: Option<EngineConfig>,
    /// Sprites by name
    #[serde(default)]
    pub sprites: BTreeMap<String, SpriteDef>,
    /// Levels in play order
    #[serde(default)]
    pub levels: Vec<LevelDef>,
    /// Spawn groups by type token (green channel)
    #[serde(default)]
    pub spawn_table: BTreeMap<u8, SpawnGroup>,
}

impl GameManifest {
    /// Parse and validate a manifest
    pub fn from_json(json: &str) -> AssetResult<Self> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Engine configuration, falling back to defaults
    pub fn engine_config(&self) -> EngineConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Spawn entry for a (type, subtype) token pair
    pub fn spawn_entry(&self, kind_token: u8, subtype: u8) -> Option<&SpawnEntry> {
        self.spawn_table.get(&kind_token).and_then(|group| group.resolve(subtype))
    }

    /// Check references and layouts
    pub fn validate(&self) -> AssetResult<()> {
        if let Some(config) = &self.config {
            config
                .validate()
                .map_err(|err| AssetError::InvalidManifest(err.to_string()))?;
        }
        for (name, sprite) in &self.sprites {
            if sprite.frames == Some(0) {
                return Err(AssetError::InvalidManifest(format!("sprite {} has zero frames", name)));
            }
            if sprite.image.is_empty() {
                return Err(AssetError::InvalidManifest(format!("sprite {} has no image", name)));
            }
        }
        for (index, level) in self.levels.iter().enumerate() {
            if level.image.is_empty() {
                return Err(AssetError::InvalidManifest(format!("level {} has no image", index)));
            }
            for object in &level.objects {
                self.check_sprite_ref(object.sprite.as_deref())?;
            }
        }
        if self.spawn_table.contains_key(&0) {
            return Err(AssetError::InvalidManifest("type token 0 means an empty cell".into()));
        }
        Ok(())
    }

    fn check_sprite_ref(&self, sprite: Option<&str>) -> AssetResult<()> {
        match sprite {
            Some(name) if !self.sprites.contains_key(name) => {
                Err(AssetError::InvalidManifest(format!("unknown sprite {}", name)))
            }
            _ => Ok(()),
        }
    }
}
