//! World
//!
//! Everything that changes during play, in one aggregate owned by the
//! engine: the pixel surface, the level's collision grid and terrain, the
//! object registry, loaded sprites, controls and the camera. Object hooks
//! never mutate it directly; they queue [`Command`]s that the engine
//! applies between hooks.

use std::collections::VecDeque;

use glam::IVec2;
use glassforge_assets::SpriteLibrary;
use glassforge_core::{EngineConfig, EngineError, EngineResult, Event, ObjectId, SpawnParams};
use glassforge_physics::CollisionGrid;
use glassforge_platform::Controls;
use glassforge_render::{Blit, Image, PixelSurface};

use crate::behavior::{Context, DrawContext};
use crate::camera::Camera;
use crate::level::LevelRequest;
use crate::object::GameObject;
use crate::registry::ObjectRegistry;
use crate::spawn::ObjectFactory;

/// A deferred change requested by an object hook or listener
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Spawn(SpawnParams),
    Delete(ObjectId),
    Emit(Event),
    RequestLevel(LevelRequest),
    Follow(Option<ObjectId>),
    Status(String),
}

/// FIFO of pending commands
#[derive(Debug, Default)]
pub struct Commands {
    queue: VecDeque<Command>,
}

impl Commands {
    pub fn push(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Mutable game state
#[derive(Debug)]
pub struct World {
    pub config: EngineConfig,
    pub surface: PixelSurface,
    pub grid: CollisionGrid,
    pub objects: ObjectRegistry,
    pub sprites: SpriteLibrary,
    pub controls: Controls,
    pub camera: Camera,
    pub(crate) commands: Commands,
    terrain: Option<Image>,
    deletions: Vec<ObjectId>,
}

impl World {
    /// Create an empty world with no level loaded
    pub fn new(config: EngineConfig, sprites: SpriteLibrary) -> Self {
        Self {
            surface: PixelSurface::new(config.screen_width, config.screen_height, config.style.background),
            grid: CollisionGrid::new(0, 0),
            objects: ObjectRegistry::new(),
            sprites,
            controls: Controls::new(),
            camera: Camera::default(),
            commands: Commands::default(),
            terrain: None,
            deletions: Vec::new(),
            config,
        }
    }

    /// Hook context without surface access
    pub fn context(&mut self) -> Context<'_> {
        Context {
            grid: &self.grid,
            objects: &self.objects,
            sprites: &self.sprites,
            controls: &self.controls,
            camera: &self.camera,
            config: &self.config,
            commands: &mut self.commands,
            surface: None,
        }
    }

    /// Hook context that may draw on the surface
    pub fn render_context(&mut self) -> Context<'_> {
        Context {
            grid: &self.grid,
            objects: &self.objects,
            sprites: &self.sprites,
            controls: &self.controls,
            camera: &self.camera,
            config: &self.config,
            commands: &mut self.commands,
            surface: Some(&mut self.surface),
        }
    }

    /// Displayed terrain of the current level
    pub fn terrain(&self) -> Option<&Image> {
        self.terrain.as_ref()
    }

    /// Replace the level: new terrain, an empty grid of its size, no objects
    ///
    /// Returns the objects of the previous level in registry order.
    /// Deletions still queued are applied first, so a deleted object never
    /// reaches a snapshot.
    pub fn reset_level(&mut self, terrain: Image) -> Vec<GameObject> {
        self.drain_deletions();
        let previous = self.objects.drain();
        self.camera.follow(None);
        self.grid = CollisionGrid::new(terrain.width(), terrain.height());
        self.terrain = Some(terrain);
        previous
    }

    /// Build an object and register it with its footprint in place
    pub fn spawn(&mut self, factory: &ObjectFactory, params: &SpawnParams) -> EngineResult<ObjectId> {
        let id = self.objects.next_id();
        let mut object = factory.build(id, params, &self.sprites)?;
        let altitude = object.state.altitude;
        if !self.config.altitude_in_range(altitude) {
            return Err(EngineError::InvalidParams {
                kind: params.kind.clone(),
                reason: format!(
                    "altitude {} outside {}..={}",
                    altitude, self.config.min_altitude, self.config.max_altitude
                ),
            });
        }
        self.objects.allocate_id();
        self.settle(&mut object);
        log::debug!("Spawned {} {} at ({}, {})", object.state.kind(), id, params.x, params.y);
        self.objects.insert(object);
        Ok(id)
    }

    /// Bring an object's footprint in line with its current state
    ///
    /// Objects with an unresolved sprite, and ephemeral objects, keep no
    /// footprint.
    pub fn settle(&mut self, object: &mut GameObject) {
        let id = object.id();
        let state = &mut object.state;
        match state.visual_size(&self.sprites) {
            Some(visual) => {
                let ephemeral = state.is_ephemeral();
                state.body.sync_footprint(id, &mut self.grid, visual, ephemeral);
            }
            None => {
                state.body.release_footprint(id, &mut self.grid);
                state.body.record_position();
            }
        }
    }

    /// Return a detached object, dropping its footprint if it turned ephemeral
    pub fn reattach(&mut self, mut object: GameObject) {
        if object.state.is_ephemeral() {
            object.state.body.release_footprint(object.id(), &mut self.grid);
        }
        self.objects.reattach(object);
    }

    /// Queue an object for removal at the next drain
    pub fn queue_deletion(&mut self, id: ObjectId) {
        if !self.deletions.contains(&id) {
            self.deletions.push(id);
        }
    }

    /// Objects waiting for the next drain
    pub fn pending_deletions(&self) -> &[ObjectId] {
        &self.deletions
    }

    /// Remove queued objects, clearing their footprints first
    pub fn drain_deletions(&mut self) -> usize {
        let mut removed = 0;
        for id in std::mem::take(&mut self.deletions) {
            let Some(mut object) = self.objects.remove(id) else {
                continue;
            };
            object.state.body.release_footprint(id, &mut self.grid);
            if self.camera.target() == Some(id) {
                self.camera.follow(None);
            }
            log::debug!("Deleted {} {}", object.state.kind(), id);
            removed += 1;
        }
        removed
    }

    /// Draw the terrain at the camera position
    pub fn draw_terrain(&mut self) {
        let Some(terrain) = &self.terrain else {
            return;
        };
        let origin = self.camera.world_to_screen(IVec2::ZERO, self.config.half_screen());
        self.surface.image_blit(terrain, &Blit::at(origin.x, origin.y));
    }

    /// Draw objects by ascending altitude, registry order within a bucket
    pub fn draw_objects(&mut self) {
        let mut ctx = DrawContext {
            surface: &mut self.surface,
            sprites: &self.sprites,
            camera: &self.camera,
            half_screen: self.config.half_screen(),
        };
        for altitude in self.config.min_altitude..=self.config.max_altitude {
            for object in self.objects.iter_mut().filter(|object| object.state.altitude == altitude) {
                object.draw(&mut ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glassforge_core::Rgba;

    fn world() -> World {
        let mut world = World::new(EngineConfig::default(), SpriteLibrary::new());
        world.reset_level(Image::filled(10, 10, Rgba::new(0, 0, 0, 0)));
        world
    }

    fn block(x: i32, y: i32) -> SpawnParams {
        SpawnParams {
            width: Some(2),
            height: Some(2),
            ..SpawnParams::new("prop", x, y)
        }
    }

    #[test]
    fn test_spawn_writes_footprint() {
        let mut world = world();
        let factory = ObjectFactory::with_builtin_kinds();
        let id = world.spawn(&factory, &block(5, 5)).unwrap();
        assert_eq!(id, ObjectId(0));
        assert_eq!(world.grid.footprint_area(id), 4);
        assert!(world.grid.query(glassforge_core::Rect::from_xywh(5, 5, 1, 1)).contains(id));
    }

    #[test]
    fn test_failed_spawn_does_not_consume_id() {
        let mut world = world();
        let factory = ObjectFactory::with_builtin_kinds();
        assert!(world.spawn(&factory, &SpawnParams::new("dragon", 0, 0)).is_err());
        assert_eq!(world.spawn(&factory, &block(0, 0)).unwrap(), ObjectId(0));
    }

    #[test]
    fn test_spawn_rejects_altitude_out_of_range() {
        let mut world = world();
        let factory = ObjectFactory::with_builtin_kinds();
        let high = SpawnParams {
            altitude: Some(5),
            ..block(0, 0)
        };
        let err = world.spawn(&factory, &high).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParams { ref kind, .. } if kind == "prop"));
        assert!(world.objects.is_empty());

        let top = SpawnParams {
            altitude: Some(4),
            ..block(0, 0)
        };
        assert_eq!(world.spawn(&factory, &top).unwrap(), ObjectId(0));
    }

    #[test]
    fn test_reset_level_applies_queued_deletions() {
        let mut world = world();
        let factory = ObjectFactory::with_builtin_kinds();
        let gone = world.spawn(&factory, &block(0, 0)).unwrap();
        let kept = world.spawn(&factory, &block(4, 4)).unwrap();
        world.queue_deletion(gone);

        let previous = world.reset_level(Image::filled(6, 6, Rgba::new(0, 0, 0, 0)));
        let ids: Vec<ObjectId> = previous.iter().map(|object| object.id()).collect();
        assert_eq!(ids, vec![kept]);
        assert!(world.pending_deletions().is_empty());
    }

    #[test]
    fn test_drain_clears_footprint_and_camera() {
        let mut world = world();
        let factory = ObjectFactory::with_builtin_kinds();
        let id = world.spawn(&factory, &block(1, 1)).unwrap();
        world.camera.follow(Some(id));

        world.queue_deletion(id);
        world.queue_deletion(id);
        assert_eq!(world.pending_deletions().len(), 1);
        assert!(world.objects.get(id).is_some());

        assert_eq!(world.drain_deletions(), 1);
        assert_eq!(world.grid.footprint_area(id), 0);
        assert!(world.objects.get(id).is_none());
        assert_eq!(world.camera.target(), None);
    }

    #[test]
    fn test_reattach_releases_ephemeral_footprint() {
        let mut world = world();
        let factory = ObjectFactory::with_builtin_kinds();
        let id = world.spawn(&factory, &block(1, 1)).unwrap();

        let mut object = world.objects.detach(id).unwrap();
        object.state.set_ephemeral(true);
        world.reattach(object);
        assert_eq!(world.grid.footprint_area(id), 0);
    }

    #[test]
    fn test_reset_level_resizes_grid() {
        let mut world = world();
        let factory = ObjectFactory::with_builtin_kinds();
        world.spawn(&factory, &block(1, 1)).unwrap();
        let previous = world.reset_level(Image::filled(6, 4, Rgba::default()));
        assert_eq!(previous.len(), 1);
        assert!(world.objects.is_empty());
        assert_eq!((world.grid.width(), world.grid.height()), (6, 4));
        assert_eq!(world.objects.next_id(), ObjectId(0));
    }
}
