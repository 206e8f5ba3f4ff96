//! Game objects
//!
//! A [`GameObject`] pairs the engine-owned [`ObjectState`] (placement,
//! collision body, sprite, flags, subscriptions) with the kind-specific
//! [`Behavior`] resolved once by the factory.

use bitflags::bitflags;
use glam::{IVec2, UVec2};
use glassforge_assets::SpriteLibrary;
use glassforge_core::{Event, EventKey, ObjectId, Rect, SpawnParams};
use glassforge_physics::Body;
use glassforge_render::{Animator, Blit};
use smallvec::SmallVec;

use crate::behavior::{Behavior, Context, DrawContext};

bitflags! {
    /// Collision and persistence flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ObjectFlags: u8 {
        /// Kept out of the collision grid entirely
        const EPHEMERAL = 0b001;
        /// Blocks the movement of other objects
        const SOLID = 0b010;
        /// Not restored when its level is revisited
        const DONT_REGENERATE = 0b100;
    }
}

/// Engine-visible state of an object
#[derive(Debug, Clone)]
pub struct ObjectState {
    id: ObjectId,
    kind: String,
    /// Position, collision box and velocity
    pub body: Body,
    /// Sprite name, resolved through the sprite library on use
    pub sprite: Option<String>,
    pub animator: Animator,
    pub flags: ObjectFlags,
    /// Render bucket; objects outside the configured range are not drawn
    pub altitude: i32,
    pub opacity: f32,
    stopped: bool,
    subscriptions: SmallVec<[EventKey; 2]>,
}

impl ObjectState {
    /// Create a solid object of `kind` with default settings
    pub fn new(id: ObjectId, kind: impl Into<String>, body: Body) -> Self {
        Self {
            id,
            kind: kind.into(),
            body,
            sprite: None,
            animator: Animator::new(0),
            flags: ObjectFlags::SOLID,
            altitude: 0,
            opacity: 1.0,
            stopped: false,
            subscriptions: SmallVec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_ephemeral(&self) -> bool {
        self.flags.contains(ObjectFlags::EPHEMERAL)
    }

    /// Change ephemerality; the footprint follows on the next grid update
    pub fn set_ephemeral(&mut self, ephemeral: bool) {
        self.flags.set(ObjectFlags::EPHEMERAL, ephemeral);
    }

    pub fn is_solid(&self) -> bool {
        self.flags.contains(ObjectFlags::SOLID)
    }

    pub fn set_solid(&mut self, solid: bool) {
        self.flags.set(ObjectFlags::SOLID, solid);
    }

    pub fn dont_regenerate(&self) -> bool {
        self.flags.contains(ObjectFlags::DONT_REGENERATE)
    }

    pub fn set_dont_regenerate(&mut self, dont_regenerate: bool) {
        self.flags.set(ObjectFlags::DONT_REGENERATE, dont_regenerate);
    }

    /// Whether this object stops others moving into it
    pub fn blocks(&self) -> bool {
        self.is_solid() && !self.is_ephemeral()
    }

    /// Whether the last velocity update was halted on any axis
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub(crate) fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }

    /// Listen for an event
    pub fn subscribe(&mut self, key: EventKey) {
        if !self.subscriptions.contains(&key) {
            self.subscriptions.push(key);
        }
    }

    /// Stop listening for an event
    pub fn unsubscribe(&mut self, key: &EventKey) {
        self.subscriptions.retain(|k| k != key);
    }

    pub fn is_subscribed(&self, key: &EventKey) -> bool {
        self.subscriptions.contains(key)
    }

    pub fn subscriptions(&self) -> &[EventKey] {
        &self.subscriptions
    }

    pub fn position(&self) -> IVec2 {
        self.body.position()
    }

    /// Current bounding box, `None` until the object has been placed
    pub fn bounding_box(&self) -> Option<Rect> {
        self.body.bounding_box()
    }

    /// Size of the visual frame, `None` while the sprite is still loading
    ///
    /// Objects without a sprite use their explicit collision size.
    pub fn visual_size(&self, sprites: &SpriteLibrary) -> Option<UVec2> {
        match &self.sprite {
            Some(name) => sprites.get(name).map(|sprite| UVec2::new(sprite.width(), sprite.height())),
            None => Some(UVec2::new(
                self.body.width.unwrap_or(0),
                self.body.height.unwrap_or(0),
            )),
        }
    }

    /// Center of the collision box in world coordinates
    pub fn center(&self, sprites: &SpriteLibrary) -> IVec2 {
        let visual = self.visual_size(sprites).unwrap_or(UVec2::ZERO);
        self.body.center(visual)
    }

    /// Strip of `depth` pixels directly above the bounding box
    pub fn above(&self, depth: i32) -> Option<Rect> {
        self.bounding_box()
            .map(|bb| Rect::from_xywh(bb.left, bb.top - depth, bb.width(), depth))
    }

    /// Strip of `depth` pixels directly below the bounding box
    pub fn below(&self, depth: i32) -> Option<Rect> {
        self.bounding_box()
            .map(|bb| Rect::from_xywh(bb.left, bb.bottom, bb.width(), depth))
    }

    /// Blit the current animation frame and step the animation
    pub fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let Some(name) = &self.sprite else {
            return;
        };
        let Some(sprite) = ctx.sprites.get(name) else {
            return;
        };

        let screen = ctx.camera.world_to_screen(self.body.position(), ctx.half_screen);
        let (width, height) = (sprite.width() as i32, sprite.height() as i32);
        if screen.x + width < 0
            || screen.y + height < 0
            || screen.x >= ctx.surface.width() as i32
            || screen.y >= ctx.surface.height() as i32
        {
            return;
        }

        let frame = sprite.frame_rect(self.animator.current(sprite.frames()));
        let blit = Blit::at(screen.x, screen.y)
            .source(frame)
            .mirrored(self.body.invert_x, self.body.invert_y)
            .opacity(self.opacity);
        ctx.surface.image_blit(sprite.image(), &blit);
        self.animator.advance(sprite.frames());
    }

    /// Reconstruction parameters without kind-specific configuration
    pub fn spawn_params(&self) -> SpawnParams {
        SpawnParams {
            kind: self.kind.clone(),
            x: self.body.x,
            y: self.body.y,
            sprite: self.sprite.clone(),
            width: self.body.width,
            height: self.body.height,
            width_offset: self.body.width_offset,
            height_offset: self.body.height_offset,
            invert_x: self.body.invert_x,
            invert_y: self.body.invert_y,
            altitude: Some(self.altitude),
            ephemeral: Some(self.is_ephemeral()),
            solid: Some(self.is_solid()),
            dont_regenerate: Some(self.dont_regenerate()),
            frame_speed: Some(self.animator.frame_speed),
            opacity: Some(self.opacity),
            config: Default::default(),
        }
    }
}

/// An object in the registry
#[derive(Debug)]
pub struct GameObject {
    pub state: ObjectState,
    behavior: Box<dyn Behavior>,
}

impl GameObject {
    /// Pair a state with its behavior
    pub fn new(state: ObjectState, behavior: Box<dyn Behavior>) -> Self {
        Self { state, behavior }
    }

    pub fn id(&self) -> ObjectId {
        self.state.id()
    }

    pub fn behavior(&self) -> &dyn Behavior {
        self.behavior.as_ref()
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) {
        self.behavior.tick(&mut self.state, ctx);
    }

    pub fn collide(&mut self, other: &ObjectState, ctx: &mut Context<'_>) {
        self.behavior.collide(&mut self.state, other, ctx);
    }

    pub fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        self.behavior.draw(&mut self.state, ctx);
    }

    pub fn on_event(&mut self, event: &Event, ctx: &mut Context<'_>) {
        self.behavior.on_event(&mut self.state, event, ctx);
    }

    /// Parameters that rebuild this object as it is now
    pub fn spawn_params(&self) -> SpawnParams {
        SpawnParams {
            config: self.behavior.config(),
            ..self.state.spawn_params()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glassforge_assets::SpriteDef;
    use glassforge_core::Rgba;
    use glassforge_render::Image;

    fn library() -> SpriteLibrary {
        let mut sprites = SpriteLibrary::new();
        sprites.register("box", SpriteDef { image: "box.png".into(), frames: None, width: None });
        sprites.register("late", SpriteDef { image: "late.png".into(), frames: None, width: None });
        sprites
            .on_sprite_loaded("box", Image::filled(4, 3, Rgba::new(255, 0, 0, 255)))
            .unwrap();
        sprites
    }

    #[test]
    fn test_default_flags() {
        let state = ObjectState::new(ObjectId(0), "prop", Body::new(0, 0));
        assert!(state.is_solid());
        assert!(!state.is_ephemeral());
        assert!(state.blocks());
    }

    #[test]
    fn test_ephemeral_objects_do_not_block() {
        let mut state = ObjectState::new(ObjectId(0), "prop", Body::new(0, 0));
        state.set_ephemeral(true);
        assert!(state.is_solid());
        assert!(!state.blocks());
    }

    #[test]
    fn test_visual_size_waits_for_sprite() {
        let sprites = library();
        let mut state = ObjectState::new(ObjectId(0), "prop", Body::new(0, 0));
        state.sprite = Some("box".into());
        assert_eq!(state.visual_size(&sprites), Some(UVec2::new(4, 3)));
        state.sprite = Some("late".into());
        assert_eq!(state.visual_size(&sprites), None);
        state.sprite = None;
        state.body.width = Some(2);
        assert_eq!(state.visual_size(&sprites), Some(UVec2::new(2, 0)));
    }

    #[test]
    fn test_subscriptions_are_unique() {
        let mut state = ObjectState::new(ObjectId(0), "prop", Body::new(0, 0));
        state.subscribe(EventKey::Camera);
        state.subscribe(EventKey::Camera);
        assert_eq!(state.subscriptions().len(), 1);
        state.unsubscribe(&EventKey::Camera);
        assert!(!state.is_subscribed(&EventKey::Camera));
    }

    #[test]
    fn test_probe_strips() {
        let sprites = library();
        let mut state = ObjectState::new(ObjectId(0), "prop", Body::new(2, 2));
        state.sprite = Some("box".into());
        assert!(state.below(1).is_none());
        state.body.refresh_bounding_box(state.visual_size(&sprites).unwrap(), UVec2::new(20, 20));
        assert_eq!(state.below(1), Some(Rect::from_xywh(2, 5, 4, 1)));
        assert_eq!(state.above(2), Some(Rect::from_xywh(2, 0, 4, 2)));
    }

    #[test]
    fn test_spawn_params_capture_placement() {
        let mut state = ObjectState::new(ObjectId(3), "prop", Body::new(5, 6).with_offset(1, 0));
        state.sprite = Some("box".into());
        state.altitude = 2;
        state.body.invert_x = true;
        let params = state.spawn_params();
        assert_eq!(params.kind, "prop");
        assert_eq!((params.x, params.y), (5, 6));
        assert_eq!(params.width_offset, 1);
        assert!(params.invert_x);
        assert_eq!(params.altitude, Some(2));
        assert_eq!(params.solid, Some(true));
    }
}
