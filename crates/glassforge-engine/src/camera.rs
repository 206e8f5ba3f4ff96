//! Camera
//!
//! A single world point mapped to the middle of the screen. It only
//! affects drawing; collision never looks at it.

use glam::IVec2;
use glassforge_assets::SpriteLibrary;
use glassforge_core::ObjectId;

use crate::registry::ObjectRegistry;

/// World-to-screen translation, optionally tracking an object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Camera {
    /// World point shown at the middle of the screen
    pub position: IVec2,
    target: Option<ObjectId>,
}

impl Camera {
    /// Create a static camera
    pub fn new(position: IVec2) -> Self {
        Self {
            position,
            target: None,
        }
    }

    /// Track an object's center every tick, or stay put with `None`
    pub fn follow(&mut self, target: Option<ObjectId>) {
        self.target = target;
    }

    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    /// Move to the target's center; a missing target leaves the camera put
    pub fn track(&mut self, objects: &ObjectRegistry, sprites: &SpriteLibrary) {
        if let Some(state) = self.target.and_then(|id| objects.state(id)) {
            self.position = state.center(sprites);
        }
    }

    /// Screen position of a world point
    pub fn world_to_screen(&self, world: IVec2, half_screen: IVec2) -> IVec2 {
        half_screen + world - self.position
    }

    /// World position of a screen point
    pub fn screen_to_world(&self, screen: IVec2, half_screen: IVec2) -> IVec2 {
        screen - half_screen + self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Behavior;
    use crate::object::{GameObject, ObjectState};
    use glassforge_physics::Body;

    #[derive(Debug)]
    struct Inert;

    impl Behavior for Inert {}

    #[test]
    fn test_world_screen_round_trip() {
        let camera = Camera::new(IVec2::new(20, 8));
        let half = IVec2::new(16, 16);
        let screen = camera.world_to_screen(IVec2::new(20, 8), half);
        assert_eq!(screen, half);
        assert_eq!(camera.screen_to_world(screen, half), IVec2::new(20, 8));
        assert_eq!(camera.world_to_screen(IVec2::new(4, 0), half), IVec2::new(0, 8));
    }

    #[test]
    fn test_tracks_target_center() {
        let mut registry = ObjectRegistry::new();
        let id = registry.allocate_id();
        registry.insert(GameObject::new(
            ObjectState::new(id, "prop", Body::new(10, 4).with_size(4, 2)),
            Box::new(Inert),
        ));

        let mut camera = Camera::default();
        camera.follow(Some(id));
        camera.track(&registry, &SpriteLibrary::new());
        assert_eq!(camera.position, IVec2::new(12, 5));
    }

    #[test]
    fn test_missing_target_keeps_position() {
        let mut camera = Camera::new(IVec2::new(3, 3));
        camera.follow(Some(ObjectId(9)));
        camera.track(&ObjectRegistry::new(), &SpriteLibrary::new());
        assert_eq!(camera.position, IVec2::new(3, 3));
    }
}
