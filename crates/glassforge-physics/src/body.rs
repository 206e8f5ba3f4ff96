//! Stepped Body
//!
//! Position, collision box and velocity of one object, plus the movement
//! resolver. Motion is accumulated into fractional step counters and
//! committed one pixel at a time, probing a 1-pixel strip along the leading
//! edge before every step. Axes are resolved independently in the order
//! x+, x-, y+, y-.

use glam::{IVec2, UVec2, Vec2};
use glassforge_core::{ObjectId, Rect};

use crate::grid::CollisionGrid;

/// What a moving body is tested against
pub struct Obstacles<'a> {
    /// Level collision grid
    pub grid: &'a CollisionGrid,
    /// Whether an object blocks movement
    pub is_solid: &'a dyn Fn(ObjectId) -> bool,
}

/// Collision body of a game object
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Left edge of the sprite in world pixels
    pub x: i32,
    /// Top edge of the sprite in world pixels
    pub y: i32,
    /// Collision box width, the sprite width when `None`
    pub width: Option<u32>,
    /// Collision box height, the sprite height when `None`
    pub height: Option<u32>,
    /// Collision box offset from the sprite's left edge
    pub width_offset: i32,
    /// Collision box offset from the sprite's top edge
    pub height_offset: i32,
    /// Sprite mirrored horizontally; the box offset mirrors with it
    pub invert_x: bool,
    /// Sprite mirrored vertically; the box offset mirrors with it
    pub invert_y: bool,
    /// Pixels per tick, applied through the step counters
    pub velocity: Vec2,
    step: Vec2,
    prev: IVec2,
    bounding_box: Option<Rect>,
    footprint: Option<Rect>,
}

impl Body {
    /// Create a body at a world position
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            width: None,
            height: None,
            width_offset: 0,
            height_offset: 0,
            invert_x: false,
            invert_y: false,
            velocity: Vec2::ZERO,
            step: Vec2::ZERO,
            prev: IVec2::new(x, y),
            bounding_box: None,
            footprint: None,
        }
    }

    /// Set an explicit collision box size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the collision box offset
    pub fn with_offset(mut self, width_offset: i32, height_offset: i32) -> Self {
        self.width_offset = width_offset;
        self.height_offset = height_offset;
        self
    }

    pub fn position(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Position recorded at the end of the last update
    pub fn prev_position(&self) -> IVec2 {
        self.prev
    }

    /// Fractional movement not yet committed
    pub fn step_counters(&self) -> Vec2 {
        self.step
    }

    /// Bounding box computed by the last refresh, `None` before the first
    pub fn bounding_box(&self) -> Option<Rect> {
        self.bounding_box
    }

    /// Rectangle currently written into the collision grid
    pub fn footprint(&self) -> Option<Rect> {
        self.footprint
    }

    /// Collision box size given the sprite frame size
    pub fn extent(&self, visual: UVec2) -> UVec2 {
        UVec2::new(self.width.unwrap_or(visual.x), self.height.unwrap_or(visual.y))
    }

    /// Center of the collision box relative to the world origin
    pub fn center(&self, visual: UVec2) -> IVec2 {
        let extent = self.extent(visual);
        IVec2::new(self.x + extent.x as i32 / 2, self.y + extent.y as i32 / 2)
    }

    /// Bounding box for the current position, clipped to the level
    ///
    /// `visual` is the sprite frame size, needed to mirror the box offset
    /// when the sprite is inverted.
    pub fn compute_bounding_box(&self, visual: UVec2, level: UVec2) -> Rect {
        let extent = self.extent(visual);
        let (width, height) = (extent.x as i32, extent.y as i32);
        let offset_x = if self.invert_x {
            visual.x as i32 - self.width_offset - width
        } else {
            self.width_offset
        };
        let offset_y = if self.invert_y {
            visual.y as i32 - self.height_offset - height
        } else {
            self.height_offset
        };
        Rect::from_xywh(self.x + offset_x, self.y + offset_y, width, height).clip_to(level.x, level.y)
    }

    /// Recompute and store the bounding box
    pub fn refresh_bounding_box(&mut self, visual: UVec2, level: UVec2) -> Rect {
        let bounding_box = self.compute_bounding_box(visual, level);
        self.bounding_box = Some(bounding_box);
        bounding_box
    }

    /// Apply the current velocity
    pub fn update_movement(
        &mut self,
        id: Option<ObjectId>,
        visual: UVec2,
        obstacles: &Obstacles<'_>,
    ) -> bool {
        self.move_by(id, self.velocity, visual, obstacles)
    }

    /// Move by a fractional delta, one pixel at a time
    ///
    /// A step is refused when the 1-pixel strip beyond the leading edge
    /// holds terrain or a solid object other than `id`, or when the edge is
    /// at the level boundary. A refused axis has its counter and velocity
    /// zeroed. Returns whether any axis was halted.
    pub fn move_by(
        &mut self,
        id: Option<ObjectId>,
        delta: Vec2,
        visual: UVec2,
        obstacles: &Obstacles<'_>,
    ) -> bool {
        let grid = obstacles.grid;
        let level = UVec2::new(grid.width(), grid.height());
        let blocked = |probe: Rect| grid.is_blocked(probe, id, obstacles.is_solid);

        // Reversing direction drops the leftover fraction
        if self.step.x * delta.x < 0.0 {
            self.step.x = 0.0;
        }
        if self.step.y * delta.y < 0.0 {
            self.step.y = 0.0;
        }
        self.step += delta;

        let mut bb = self.refresh_bounding_box(visual, level);
        let mut stopped = false;

        while self.step.x > 1.0 {
            let probe = Rect::from_xywh(bb.right, bb.top, 1, bb.height());
            if bb.right >= level.x as i32 || blocked(probe) {
                self.step.x = 0.0;
                self.velocity.x = 0.0;
                stopped = true;
            } else {
                self.step.x -= 1.0;
                self.x += 1;
                bb = self.refresh_bounding_box(visual, level);
            }
        }
        while self.step.x < -1.0 {
            let probe = Rect::from_xywh(bb.left - 1, bb.top, 1, bb.height());
            if bb.left <= 0 || blocked(probe) {
                self.step.x = 0.0;
                self.velocity.x = 0.0;
                stopped = true;
            } else {
                self.step.x += 1.0;
                self.x -= 1;
                bb = self.refresh_bounding_box(visual, level);
            }
        }
        while self.step.y > 1.0 {
            let probe = Rect::from_xywh(bb.left, bb.bottom, bb.width(), 1);
            if bb.bottom >= level.y as i32 || blocked(probe) {
                self.step.y = 0.0;
                self.velocity.y = 0.0;
                stopped = true;
            } else {
                self.step.y -= 1.0;
                self.y += 1;
                bb = self.refresh_bounding_box(visual, level);
            }
        }
        while self.step.y < -1.0 {
            let probe = Rect::from_xywh(bb.left, bb.top - 1, bb.width(), 1);
            if bb.top <= 0 || blocked(probe) {
                self.step.y = 0.0;
                self.velocity.y = 0.0;
                stopped = true;
            } else {
                self.step.y += 1.0;
                self.y -= 1;
                bb = self.refresh_bounding_box(visual, level);
            }
        }

        stopped
    }

    /// Remember the current position for the next update
    pub fn record_position(&mut self) {
        self.prev = IVec2::new(self.x, self.y);
    }

    /// Replace the previous footprint with the current bounding box
    ///
    /// The previous footprint is always cleared; the new one is only
    /// written for non-ephemeral bodies.
    pub fn sync_footprint(
        &mut self,
        id: ObjectId,
        grid: &mut CollisionGrid,
        visual: UVec2,
        ephemeral: bool,
    ) -> Rect {
        self.release_footprint(id, grid);
        let bounding_box = self.refresh_bounding_box(visual, UVec2::new(grid.width(), grid.height()));
        if !ephemeral {
            grid.write_footprint(id, bounding_box);
            self.footprint = Some(bounding_box);
        }
        self.record_position();
        bounding_box
    }

    /// Remove the body's footprint from the grid
    pub fn release_footprint(&mut self, id: ObjectId, grid: &mut CollisionGrid) {
        if let Some(previous) = self.footprint.take() {
            grid.clear_footprint(id, previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVER: ObjectId = ObjectId(0);
    const WALL: ObjectId = ObjectId(1);

    fn all_solid(_: ObjectId) -> bool {
        true
    }

    fn none_solid(_: ObjectId) -> bool {
        false
    }

    fn tick(body: &mut Body, grid: &mut CollisionGrid, visual: UVec2, is_solid: &dyn Fn(ObjectId) -> bool) -> bool {
        let stopped = {
            let obstacles = Obstacles { grid: &*grid, is_solid };
            body.update_movement(Some(MOVER), visual, &obstacles)
        };
        body.sync_footprint(MOVER, grid, visual, false);
        stopped
    }

    #[test]
    fn test_bounding_box_uses_offsets() {
        let body = Body::new(3, 4).with_size(2, 1).with_offset(1, 2);
        let bb = body.compute_bounding_box(UVec2::new(5, 5), UVec2::new(20, 20));
        assert_eq!(bb, Rect::from_xywh(4, 6, 2, 1));
    }

    #[test]
    fn test_bounding_box_mirrors_offsets() {
        let mut body = Body::new(0, 0).with_size(2, 1).with_offset(1, 0);
        body.invert_x = true;
        body.invert_y = true;
        let bb = body.compute_bounding_box(UVec2::new(6, 4), UVec2::new(20, 20));
        // left = 6 - 1 - 2, top = 4 - 0 - 1
        assert_eq!(bb, Rect::from_xywh(3, 3, 2, 1));
    }

    #[test]
    fn test_size_defaults_to_sprite() {
        let body = Body::new(1, 1);
        assert_eq!(body.extent(UVec2::new(4, 3)), UVec2::new(4, 3));
        assert_eq!(body.center(UVec2::new(4, 3)), IVec2::new(3, 2));
    }

    #[test]
    fn test_halts_against_solid_object() {
        let mut grid = CollisionGrid::new(10, 10);
        grid.write_footprint(WALL, Rect::from_xywh(5, 5, 2, 2));
        let mut body = Body::new(0, 5).with_size(2, 2);
        body.velocity = Vec2::new(1.0, 0.0);
        let visual = UVec2::new(2, 2);

        for _ in 0..20 {
            tick(&mut body, &mut grid, visual, &all_solid);
        }

        assert_eq!(body.bounding_box().unwrap().right, 5);
        assert_eq!(body.x, 3);
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn test_passes_through_non_solid_object() {
        let mut grid = CollisionGrid::new(10, 10);
        grid.write_footprint(WALL, Rect::from_xywh(5, 5, 2, 2));
        let mut body = Body::new(0, 5).with_size(2, 2);
        body.velocity = Vec2::new(1.0, 0.0);

        for _ in 0..20 {
            tick(&mut body, &mut grid, UVec2::new(2, 2), &none_solid);
        }

        assert_eq!(body.bounding_box().unwrap().right, 10);
    }

    #[test]
    fn test_never_penetrates_terrain() {
        let mut grid = CollisionGrid::new(12, 12);
        for x in 0..12 {
            grid.write_terrain(x, 9);
        }
        let mut body = Body::new(4, 0).with_size(2, 3);
        body.velocity = Vec2::new(0.0, 2.5);

        for _ in 0..20 {
            tick(&mut body, &mut grid, UVec2::new(2, 3), &all_solid);
            let bb = body.bounding_box().unwrap();
            assert!(bb.bottom <= 9);
        }
        assert_eq!(body.bounding_box().unwrap().bottom, 9);
    }

    #[test]
    fn test_level_boundary_stops_motion() {
        let mut grid = CollisionGrid::new(6, 6);
        let mut body = Body::new(2, 2).with_size(1, 1);
        let obstacles = Obstacles { grid: &grid, is_solid: &all_solid };
        let stopped = body.move_by(Some(MOVER), Vec2::new(-10.0, 0.0), UVec2::ONE, &obstacles);
        assert!(stopped);
        assert_eq!(body.x, 0);
        assert_eq!(body.step_counters().x, 0.0);
        body.sync_footprint(MOVER, &mut grid, UVec2::ONE, false);
    }

    #[test]
    fn test_fraction_accumulates_across_calls() {
        let grid = CollisionGrid::new(20, 20);
        let obstacles = Obstacles { grid: &grid, is_solid: &all_solid };
        let mut body = Body::new(0, 0).with_size(1, 1);
        for _ in 0..5 {
            body.move_by(Some(MOVER), Vec2::new(0.5, 0.0), UVec2::ONE, &obstacles);
        }
        // Steps are only taken while the counter exceeds 1
        assert_eq!(body.x, 2);
        assert!((body.step_counters().x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_direction_reversal_resets_counter() {
        let grid = CollisionGrid::new(20, 20);
        let obstacles = Obstacles { grid: &grid, is_solid: &all_solid };
        let mut body = Body::new(10, 10).with_size(1, 1);
        body.move_by(Some(MOVER), Vec2::new(0.9, 0.0), UVec2::ONE, &obstacles);
        body.move_by(Some(MOVER), Vec2::new(-0.5, 0.0), UVec2::ONE, &obstacles);
        assert_eq!(body.x, 10);
        assert!((body.step_counters().x + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_diagonal_catches_one_axis_and_slides_on_other() {
        let mut grid = CollisionGrid::new(20, 20);
        for x in 0..20 {
            grid.write_terrain(x, 6);
        }
        let obstacles = Obstacles { grid: &grid, is_solid: &all_solid };
        let mut body = Body::new(0, 3).with_size(2, 2);
        let stopped = body.move_by(Some(MOVER), Vec2::new(4.5, 4.5), UVec2::new(2, 2), &obstacles);
        assert!(stopped);
        assert_eq!(body.x, 4);
        assert_eq!(body.bounding_box().unwrap().bottom, 6);
    }

    #[test]
    fn test_own_footprint_never_blocks() {
        let mut grid = CollisionGrid::new(10, 10);
        grid.write_footprint(MOVER, Rect::from_xywh(5, 2, 1, 2));
        let mut body = Body::new(3, 2).with_size(2, 2);
        body.velocity = Vec2::new(2.5, 0.0);
        tick(&mut body, &mut grid, UVec2::new(2, 2), &all_solid);
        assert_eq!(body.x, 5);
    }

    #[test]
    fn test_footprint_tracks_box_area() {
        let mut grid = CollisionGrid::new(10, 10);
        let mut body = Body::new(1, 1).with_size(3, 2);
        body.velocity = Vec2::new(1.5, 1.5);
        for _ in 0..4 {
            tick(&mut body, &mut grid, UVec2::new(3, 2), &all_solid);
            let bb = body.bounding_box().unwrap();
            assert_eq!(grid.footprint_area(MOVER), bb.area());
            assert_eq!(body.prev_position(), body.position());
        }
    }

    #[test]
    fn test_ephemeral_sync_writes_nothing() {
        let mut grid = CollisionGrid::new(10, 10);
        let mut body = Body::new(1, 1).with_size(3, 2);
        body.sync_footprint(MOVER, &mut grid, UVec2::new(3, 2), false);
        assert_eq!(grid.footprint_area(MOVER), 6);
        body.sync_footprint(MOVER, &mut grid, UVec2::new(3, 2), true);
        assert_eq!(grid.footprint_area(MOVER), 0);
        assert!(body.footprint().is_none());
        assert!(body.bounding_box().is_some());
    }
}
