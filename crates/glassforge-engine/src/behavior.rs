//! Behavior seam
//!
//! Kind-specific logic plugs into the engine through [`Behavior`], a
//! capability set of hooks with no-op defaults. Hooks receive the object's
//! own [`ObjectState`] mutably and a [`Context`] giving read access to the
//! world and a command queue for everything that changes other objects.

use std::fmt;

use glam::{IVec2, Vec2};
use glassforge_assets::SpriteLibrary;
use glassforge_core::{EngineConfig, Event, ObjectId, Occupant, Rect, SpawnParams};
use glassforge_physics::{CollisionGrid, Obstacles, Occupancy};
use glassforge_platform::Controls;
use glassforge_render::PixelSurface;
use serde_json::{Map, Value};

use crate::camera::Camera;
use crate::level::LevelRequest;
use crate::object::ObjectState;
use crate::registry::ObjectRegistry;
use crate::world::{Command, Commands};

/// Per-kind object logic
///
/// Every hook is optional. `tick` runs before the object moves, `collide`
/// once per distinct neighbour found by the collision pass, `draw` during
/// rendering and `on_event` for each subscribed event.
pub trait Behavior: fmt::Debug {
    /// Called once after construction, before the object is registered
    fn on_spawn(&mut self, _object: &mut ObjectState) {}

    fn tick(&mut self, _object: &mut ObjectState, _ctx: &mut Context<'_>) {}

    fn collide(&mut self, _object: &mut ObjectState, _other: &ObjectState, _ctx: &mut Context<'_>) {}

    fn draw(&mut self, object: &mut ObjectState, ctx: &mut DrawContext<'_>) {
        object.draw(ctx);
    }

    fn on_event(&mut self, _object: &mut ObjectState, _event: &Event, _ctx: &mut Context<'_>) {}

    /// Kind-specific configuration needed to rebuild this object
    fn config(&self) -> Map<String, Value> {
        Map::new()
    }
}

/// World access while running object hooks and event listeners
///
/// The object being run is detached from the registry for the duration of
/// its hook, so `objects` never contains it.
pub struct Context<'a> {
    pub grid: &'a CollisionGrid,
    pub objects: &'a ObjectRegistry,
    pub sprites: &'a SpriteLibrary,
    pub controls: &'a Controls,
    pub camera: &'a Camera,
    pub config: &'a EngineConfig,
    pub(crate) commands: &'a mut Commands,
    pub(crate) surface: Option<&'a mut PixelSurface>,
}

impl<'a> Context<'a> {
    /// Whether an object currently blocks movement
    pub fn is_solid(&self, id: ObjectId) -> bool {
        self.objects.state(id).is_some_and(ObjectState::blocks)
    }

    /// Raw occupants of a rectangle, terrain included
    pub fn query(&self, rect: Rect) -> Occupancy {
        self.grid.query(rect)
    }

    /// Whether anything other than `object` occupies `rect`
    pub fn touching(&self, object: &ObjectState, rect: Rect) -> bool {
        let own = Occupant::Object(object.id());
        self.grid.query(rect).iter().any(|occupant| occupant != own)
    }

    /// Whether terrain or a solid object other than `object` occupies `rect`
    pub fn blocked(&self, object: &ObjectState, rect: Rect) -> bool {
        self.grid.is_blocked(rect, Some(object.id()), |id| self.is_solid(id))
    }

    /// Move an object by a fractional delta against the collision grid
    ///
    /// Objects whose sprite has not loaded yet stay put. Returns whether any
    /// axis was halted.
    pub fn move_object(&self, object: &mut ObjectState, delta: Vec2) -> bool {
        let Some(visual) = object.visual_size(self.sprites) else {
            return false;
        };
        let is_solid = |id: ObjectId| self.is_solid(id);
        let obstacles = Obstacles {
            grid: self.grid,
            is_solid: &is_solid,
        };
        object.body.move_by(Some(object.id()), delta, visual, &obstacles)
    }

    /// Surface access, only while dispatching render-time events
    pub fn surface(&mut self) -> Option<&mut PixelSurface> {
        self.surface.as_deref_mut()
    }

    /// Half the screen size, the camera offset
    pub fn half_screen(&self) -> IVec2 {
        self.config.half_screen()
    }

    /// Create an object after the current hook returns
    pub fn spawn(&mut self, params: SpawnParams) {
        self.commands.push(Command::Spawn(params));
    }

    /// Queue an object for deletion
    ///
    /// It keeps ticking, colliding and drawing until the next deletion
    /// drain.
    pub fn delete(&mut self, id: ObjectId) {
        self.commands.push(Command::Delete(id));
    }

    /// Dispatch an event after the current hook returns
    pub fn emit(&mut self, event: Event) {
        self.commands.push(Command::Emit(event));
    }

    /// Ask for a level change, applied at the end of the tick
    pub fn request_level(&mut self, request: LevelRequest) {
        self.commands.push(Command::RequestLevel(request));
    }

    /// Make the camera track an object, or stop tracking with `None`
    pub fn follow(&mut self, target: Option<ObjectId>) {
        self.commands.push(Command::Follow(target));
    }

    /// Show a line of status text
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.commands.push(Command::Status(text.into()));
    }
}

/// Rendering access for `draw` hooks
pub struct DrawContext<'a> {
    pub surface: &'a mut PixelSurface,
    pub sprites: &'a SpriteLibrary,
    pub camera: &'a Camera,
    pub half_screen: IVec2,
}
