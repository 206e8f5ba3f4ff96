//! Object construction
//!
//! [`ObjectFactory`] turns [`SpawnParams`] into a [`GameObject`]: the kind's
//! registered defaults are applied first, the params override them, and
//! the kind's behavior is built from the params' typed configuration.
//! [`SpawnTable`] maps terrain spawn tokens to spawn entries.

use std::collections::BTreeMap;
use std::fmt;

use ahash::AHashMap;
use glassforge_assets::{GameManifest, SpawnEntry, SpawnGroup, SpriteLibrary};
use glassforge_core::{EngineError, EngineResult, ObjectId, SpawnParams};
use glassforge_physics::Body;
use glassforge_render::Animator;

use crate::behavior::Behavior;
use crate::object::{GameObject, ObjectState};

/// Per-kind defaults, overridden by spawn params
#[derive(Debug, Clone, PartialEq)]
pub struct KindDefaults {
    pub sprite: Option<String>,
    pub solid: bool,
    pub ephemeral: bool,
    pub dont_regenerate: bool,
    pub altitude: i32,
    pub frame_speed: u32,
}

impl Default for KindDefaults {
    fn default() -> Self {
        Self {
            sprite: None,
            solid: true,
            ephemeral: false,
            dont_regenerate: false,
            altitude: 0,
            frame_speed: 0,
        }
    }
}

/// A behavior type with a registered kind name
pub trait Kind: Behavior + Sized + 'static {
    /// Name used in spawn params
    const NAME: &'static str;

    fn defaults() -> KindDefaults {
        KindDefaults::default()
    }

    /// Build the behavior, decoding the params' configuration block
    fn from_params(params: &SpawnParams) -> EngineResult<Self>;
}

type BehaviorBuilder = Box<dyn Fn(&SpawnParams) -> EngineResult<Box<dyn Behavior>>>;

struct KindEntry {
    defaults: KindDefaults,
    builder: BehaviorBuilder,
}

/// Registered object kinds
#[derive(Default)]
pub struct ObjectFactory {
    kinds: AHashMap<String, KindEntry>,
}

impl fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectFactory").field("kinds", &self.kinds()).finish()
    }
}

impl ObjectFactory {
    /// Create a factory with no kinds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory with the generic built-in kinds registered
    pub fn with_builtin_kinds() -> Self {
        let mut factory = Self::new();
        crate::kinds::register_builtin_kinds(&mut factory);
        factory
    }

    /// Register a kind from a builder closure, replacing any previous one
    pub fn register<F>(&mut self, kind: impl Into<String>, defaults: KindDefaults, builder: F)
    where
        F: Fn(&SpawnParams) -> EngineResult<Box<dyn Behavior>> + 'static,
    {
        let kind = kind.into();
        log::debug!("Registered kind {}", kind);
        self.kinds.insert(
            kind,
            KindEntry {
                defaults,
                builder: Box::new(builder),
            },
        );
    }

    /// Register a [`Kind`] implementation
    pub fn register_kind<K: Kind>(&mut self) {
        self.register(K::NAME, K::defaults(), |params| {
            K::from_params(params).map(|kind| Box::new(kind) as Box<dyn Behavior>)
        });
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Registered kind names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Build an object with the given id
    ///
    /// Fails for unknown kinds, undeclared sprites and invalid kind
    /// configuration.
    pub fn build(&self, id: ObjectId, params: &SpawnParams, sprites: &SpriteLibrary) -> EngineResult<GameObject> {
        let entry = self
            .kinds
            .get(&params.kind)
            .ok_or_else(|| EngineError::UnknownKind(params.kind.clone()))?;
        let defaults = &entry.defaults;

        let sprite = params.sprite.clone().or_else(|| defaults.sprite.clone());
        if let Some(name) = &sprite {
            if !sprites.is_registered(name) {
                return Err(EngineError::UnknownSprite(name.clone()));
            }
        }

        let mut body = Body::new(params.x, params.y).with_offset(params.width_offset, params.height_offset);
        body.width = params.width;
        body.height = params.height;
        body.invert_x = params.invert_x;
        body.invert_y = params.invert_y;

        let mut state = ObjectState::new(id, params.kind.as_str(), body);
        state.sprite = sprite;
        state.set_solid(params.solid.unwrap_or(defaults.solid));
        state.set_ephemeral(params.ephemeral.unwrap_or(defaults.ephemeral));
        state.set_dont_regenerate(params.dont_regenerate.unwrap_or(defaults.dont_regenerate));
        state.altitude = params.altitude.unwrap_or(defaults.altitude);
        state.opacity = params.opacity.unwrap_or(1.0).clamp(0.0, 1.0);
        state.animator = Animator::new(params.frame_speed.unwrap_or(defaults.frame_speed));

        let mut behavior = (entry.builder)(params)?;
        behavior.on_spawn(&mut state);
        Ok(GameObject::new(state, behavior))
    }
}

/// Terrain token lookup: type token (green) to a group, subtype (blue) to
/// an entry with the group default as fallback
#[derive(Debug, Clone, Default)]
pub struct SpawnTable {
    groups: BTreeMap<u8, SpawnGroup>,
}

impl SpawnTable {
    pub fn new(groups: BTreeMap<u8, SpawnGroup>) -> Self {
        Self { groups }
    }

    pub fn from_manifest(manifest: &GameManifest) -> Self {
        Self::new(manifest.spawn_table.clone())
    }

    /// Entry for a token pair; `None` for unknown type tokens and for
    /// unknown subtypes of a group without a default
    pub fn resolve(&self, kind_token: u8, subtype: u8) -> Option<&SpawnEntry> {
        self.groups.get(&kind_token).and_then(|group| group.resolve(subtype))
    }

    /// Every entry, defaults first within each group
    pub fn entries(&self) -> impl Iterator<Item = &SpawnEntry> {
        self.groups
            .values()
            .flat_map(|group| group.default.iter().chain(group.variants.values()))
    }

    /// Check that every entry names a registered kind
    pub fn validate(&self, factory: &ObjectFactory) -> EngineResult<()> {
        match self.entries().find(|entry| !factory.contains(&entry.kind)) {
            Some(entry) => Err(EngineError::UnknownKind(entry.kind.clone())),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
