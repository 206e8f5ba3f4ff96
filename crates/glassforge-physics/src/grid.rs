//! Collision Grid
//!
//! One sparse occupant set per level pixel, indexed by `x + y * width`.
//! Terrain cells are written once at level load; objects maintain their
//! own footprints every tick by clearing the previous box and writing the
//! new one.

use glassforge_core::{ObjectId, Occupant, Rect};
use smallvec::SmallVec;

type Cell = SmallVec<[Occupant; 2]>;

/// Distinct occupants found by a range query, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occupancy {
    occupants: SmallVec<[Occupant; 8]>,
}

impl Occupancy {
    fn insert(&mut self, occupant: Occupant) {
        if !self.occupants.contains(&occupant) {
            self.occupants.push(occupant);
        }
    }

    /// Iterate over all occupants, terrain included
    pub fn iter(&self) -> impl Iterator<Item = Occupant> + '_ {
        self.occupants.iter().copied()
    }

    /// Iterate over object occupants only
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.occupants.iter().filter_map(Occupant::object)
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Check if terrain was found
    pub fn has_terrain(&self) -> bool {
        self.occupants.iter().any(Occupant::is_terrain)
    }

    /// Check if an object was found
    pub fn contains(&self, id: ObjectId) -> bool {
        self.occupants.contains(&Occupant::Object(id))
    }

    /// Check if terrain or any object accepted by `is_solid` was found
    pub fn is_solid(&self, is_solid: impl Fn(ObjectId) -> bool) -> bool {
        self.occupants.iter().any(|occupant| match occupant {
            Occupant::Terrain => true,
            Occupant::Object(id) => is_solid(*id),
        })
    }
}

/// Per-pixel occupancy map of a level
#[derive(Debug, Clone)]
pub struct CollisionGrid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl CollisionGrid {
    /// Create an empty grid covering a `width x height` level
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::new(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Full level rectangle
    pub fn bounds(&self) -> Rect {
        Rect::from_xywh(0, 0, self.width as i32, self.height as i32)
    }

    fn index(&self, x: i32, y: i32) -> usize {
        x as usize + y as usize * self.width as usize
    }

    /// Check if a pixel lies inside the level
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.bounds().contains(x, y)
    }

    /// Mark a pixel as impassable terrain
    pub fn write_terrain(&mut self, x: i32, y: i32) {
        if !self.in_bounds(x, y) {
            log::warn!("write_terrain: ({}, {}) outside {}x{} level", x, y, self.width, self.height);
            return;
        }
        let index = self.index(x, y);
        let cell = &mut self.cells[index];
        if !cell.contains(&Occupant::Terrain) {
            cell.push(Occupant::Terrain);
        }
    }

    /// Check if a pixel is terrain
    pub fn is_terrain(&self, x: i32, y: i32) -> bool {
        self.occupants_at(x, y).contains(&Occupant::Terrain)
    }

    /// Occupants of a single pixel, empty outside the level
    pub fn occupants_at(&self, x: i32, y: i32) -> &[Occupant] {
        if !self.in_bounds(x, y) {
            return &[];
        }
        &self.cells[self.index(x, y)]
    }

    /// Number of occupants of a single pixel
    pub fn occupant_count(&self, x: i32, y: i32) -> usize {
        self.occupants_at(x, y).len()
    }

    /// Union of the occupants of every pixel in `rect`, clipped to the level
    pub fn query(&self, rect: Rect) -> Occupancy {
        let mut found = Occupancy::default();
        for (x, y) in rect.clip_to(self.width, self.height).pixels() {
            for &occupant in &self.cells[self.index(x, y)] {
                found.insert(occupant);
            }
        }
        found
    }

    /// Check if `rect` holds terrain or a solid object other than `exclude`
    pub fn is_blocked(
        &self,
        rect: Rect,
        exclude: Option<ObjectId>,
        is_solid: impl Fn(ObjectId) -> bool,
    ) -> bool {
        rect.clip_to(self.width, self.height).pixels().any(|(x, y)| {
            self.cells[self.index(x, y)].iter().any(|occupant| match occupant {
                Occupant::Terrain => true,
                Occupant::Object(id) => Some(*id) != exclude && is_solid(*id),
            })
        })
    }

    /// Remove an object from every pixel of `rect`
    pub fn clear_footprint(&mut self, id: ObjectId, rect: Rect) {
        let occupant = Occupant::Object(id);
        for (x, y) in rect.clip_to(self.width, self.height).pixels() {
            let index = self.index(x, y);
            self.cells[index].retain(|o| *o != occupant);
        }
    }

    /// Add an object to every pixel of `rect`
    pub fn write_footprint(&mut self, id: ObjectId, rect: Rect) {
        let occupant = Occupant::Object(id);
        for (x, y) in rect.clip_to(self.width, self.height).pixels() {
            let index = self.index(x, y);
            let cell = &mut self.cells[index];
            if !cell.contains(&occupant) {
                cell.push(occupant);
            }
        }
    }

    /// Number of pixels currently holding `id`
    pub fn footprint_area(&self, id: ObjectId) -> usize {
        let occupant = Occupant::Object(id);
        self.cells.iter().filter(|cell| cell.contains(&occupant)).count()
    }

    /// Remove every object footprint, keeping terrain
    pub fn clear_objects(&mut self) {
        for cell in &mut self.cells {
            cell.retain(|o| o.is_terrain());
        }
    }
}
