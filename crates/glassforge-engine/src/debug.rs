//! Collision overlay
//!
//! Marks each screen cell whose world pixel has collision-grid occupants
//! with a border and the occupant count.

use glam::IVec2;
use glassforge_core::EngineConfig;
use glassforge_physics::CollisionGrid;
use glassforge_platform::{DebugMark, Host};

use crate::camera::Camera;

#[derive(Debug, Clone, Default)]
pub struct CollisionOverlay {
    enabled: bool,
    drawn: bool,
}

impl CollisionOverlay {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            drawn: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        log::info!("Collision overlay {}", if self.enabled { "on" } else { "off" });
    }

    /// Redraw the overlay, or clear it once after it was switched off
    pub fn update(
        &mut self,
        host: &mut dyn Host,
        grid: &CollisionGrid,
        camera: &Camera,
        config: &EngineConfig,
        level_ready: bool,
    ) {
        let half = config.half_screen();
        if self.enabled && level_ready {
            for y in 0..config.screen_height {
                for x in 0..config.screen_width {
                    let world = camera.screen_to_world(IVec2::new(x as i32, y as i32), half);
                    let count = grid.occupant_count(world.x, world.y);
                    let mark = (count > 0).then_some(DebugMark {
                        count,
                        color: config.style.debug,
                    });
                    host.set_debug_cell(x, y, mark);
                }
            }
            self.drawn = true;
        } else if self.drawn {
            for y in 0..config.screen_height {
                for x in 0..config.screen_width {
                    host.set_debug_cell(x, y, None);
                }
            }
            self.drawn = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glassforge_core::{ObjectId, Rect};
    use glassforge_platform::HeadlessHost;

    fn setup() -> (HeadlessHost, CollisionGrid, Camera, EngineConfig) {
        let config = EngineConfig {
            screen_width: 4,
            screen_height: 4,
            ..EngineConfig::default()
        };
        let mut grid = CollisionGrid::new(4, 4);
        grid.write_terrain(0, 0);
        grid.write_footprint(ObjectId(1), Rect::from_xywh(0, 0, 2, 1));
        // Screen (0, 0) shows world (0, 0)
        let camera = Camera::new(config.half_screen());
        (HeadlessHost::new(4, 4), grid, camera, config)
    }

    #[test]
    fn test_marks_occupied_cells() {
        let (mut host, grid, camera, config) = setup();
        let mut overlay = CollisionOverlay::new(true);
        overlay.update(&mut host, &grid, &camera, &config, true);
        assert_eq!(host.debug_cell(0, 0).map(|mark| mark.count), Some(2));
        assert_eq!(host.debug_cell(1, 0).map(|mark| mark.count), Some(1));
        assert_eq!(host.marked_cells(), 2);
    }

    #[test]
    fn test_cleared_after_toggle_off() {
        let (mut host, grid, camera, config) = setup();
        let mut overlay = CollisionOverlay::new(true);
        overlay.update(&mut host, &grid, &camera, &config, true);
        overlay.toggle();
        overlay.update(&mut host, &grid, &camera, &config, true);
        assert_eq!(host.marked_cells(), 0);
        assert!(!overlay.is_enabled());
    }

    #[test]
    fn test_nothing_drawn_without_level() {
        let (mut host, grid, camera, config) = setup();
        let mut overlay = CollisionOverlay::new(true);
        overlay.update(&mut host, &grid, &camera, &config, false);
        assert_eq!(host.marked_cells(), 0);
    }
}
