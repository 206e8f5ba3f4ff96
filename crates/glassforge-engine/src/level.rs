//! Level Loading
//!
//! [`LevelCursor`] is the level transition state machine. Requests only
//! set a pending index; the engine applies it once per tick, after the
//! frame has been flushed. A switch requests the terrain image from the
//! host under a fresh [`LoadTicket`], and only the completion carrying the
//! newest ticket is ingested.
//!
//! [`ingest_terrain`] turns a terrain raster into the level: red above the
//! wall threshold is terrain, green and blue are a spawn token read on the
//! first visit only. Leaving a level snapshots the spawn params of its
//! regenerating objects, and a revisit restores them instead of reading
//! tokens again.

use ahash::AHashMap;
use glassforge_assets::LevelDef;
use glassforge_core::SpawnParams;
use glassforge_platform::LoadTicket;
use glassforge_render::Image;

use crate::spawn::{ObjectFactory, SpawnTable};
use crate::world::World;

/// A level change asked for by an object, listener or debug key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelRequest {
    Next,
    Previous,
    Absolute(usize),
}

/// Where the level state machine is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    /// No level requested yet
    Idle,
    /// Waiting for the terrain image; gameplay is suspended
    Loading { index: usize, ticket: LoadTicket },
    /// A level is ingested and ticking
    Playing,
}

/// Level transition state
#[derive(Debug, Clone)]
pub struct LevelCursor {
    count: usize,
    current: Option<usize>,
    loaded: Option<usize>,
    pending: Option<i64>,
    state: LevelState,
    next_ticket: LoadTicket,
    snapshots: AHashMap<usize, Vec<SpawnParams>>,
}

impl LevelCursor {
    /// Create a cursor over `count` levels
    pub fn new(count: usize) -> Self {
        Self {
            count,
            current: None,
            loaded: None,
            pending: None,
            state: LevelState::Idle,
            next_ticket: LoadTicket(0),
            snapshots: AHashMap::new(),
        }
    }

    pub fn level_count(&self) -> usize {
        self.count
    }

    /// Level most recently switched to
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Level whose objects are in the registry
    pub fn loaded(&self) -> Option<usize> {
        self.loaded
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == LevelState::Playing
    }

    /// Pending target index, possibly out of range
    pub fn pending(&self) -> Option<i64> {
        self.pending
    }

    /// Record a level change; it is validated when applied
    pub fn request(&mut self, request: LevelRequest) {
        let base = self.current.map_or(-1, |index| index as i64);
        let target = match request {
            LevelRequest::Next => base + 1,
            LevelRequest::Previous => base - 1,
            LevelRequest::Absolute(index) => index as i64,
        };
        log::debug!("Level change requested: {:?} -> {}", request, target);
        self.pending = Some(target);
    }

    /// Take the pending switch, if it names another valid level
    ///
    /// An out-of-range target is dropped with a warning and the current
    /// level stays.
    pub fn take_switch(&mut self) -> Option<usize> {
        let target = self.pending.take()?;
        if self.current.is_some_and(|current| current as i64 == target) {
            return None;
        }
        if target < 0 || target >= self.count as i64 {
            log::warn!(
                "Level {} out of range ({} levels), staying on {:?}",
                target,
                self.count,
                self.current
            );
            return None;
        }
        Some(target as usize)
    }

    /// Switch to a level and issue the ticket for its terrain request
    pub fn begin_load(&mut self, index: usize) -> LoadTicket {
        let ticket = self.next_ticket;
        self.next_ticket = ticket.next();
        self.current = Some(index);
        self.state = LevelState::Loading { index, ticket };
        ticket
    }

    /// Level a terrain completion belongs to, if it is the one awaited
    pub fn accept(&self, ticket: LoadTicket) -> Option<usize> {
        match self.state {
            LevelState::Loading { index, ticket: awaited } if awaited == ticket => Some(index),
            _ => None,
        }
    }

    /// Mark a level as ingested
    pub fn finish_load(&mut self, index: usize) {
        self.loaded = Some(index);
        self.state = LevelState::Playing;
    }

    /// Whether a level was left before and has a snapshot
    pub fn visited(&self, index: usize) -> bool {
        self.snapshots.contains_key(&index)
    }

    pub fn snapshot(&self, index: usize) -> Option<&[SpawnParams]> {
        self.snapshots.get(&index).map(Vec::as_slice)
    }

    /// Remember the objects a level is left with
    pub fn store_snapshot(&mut self, index: usize, objects: Vec<SpawnParams>) {
        self.snapshots.insert(index, objects);
    }
}

/// What ingesting a terrain raster produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub index: usize,
    pub first_visit: bool,
    pub spawned: usize,
    pub skipped: usize,
    pub walls: usize,
}

struct Token {
    x: i32,
    y: i32,
    kind: u8,
    subtype: u8,
}

/// Replace the world's level with a terrain raster
///
/// Returns `None` when the raster has fewer than three channels.
pub fn ingest_terrain(
    world: &mut World,
    cursor: &mut LevelCursor,
    level: &LevelDef,
    index: usize,
    image: Image,
    factory: &ObjectFactory,
    table: &SpawnTable,
) -> Option<IngestReport> {
    let mut raster = image.into_rgba();
    if raster.channels() < 4 {
        log::error!(
            "Terrain for level {} has {} channels, expected RGB or RGBA",
            index,
            raster.channels()
        );
        return None;
    }

    let width = raster.width();
    let threshold = world.config.wall_threshold;
    let wall = world.config.style.wall;
    let mut walls = Vec::new();
    let mut tokens = Vec::new();
    for (i, pixel) in raster.pixels_mut().enumerate() {
        let (x, y) = ((i as u32 % width) as i32, (i as u32 / width) as i32);
        if pixel[1] != 0 {
            tokens.push(Token {
                x,
                y,
                kind: pixel[1],
                subtype: pixel[2],
            });
        }
        if pixel[0] > threshold {
            walls.push((x, y));
            pixel[..4].copy_from_slice(&wall.with_alpha(255).to_array());
        } else {
            pixel[3] = 0;
        }
    }

    let previous = world.reset_level(raster);
    if let Some(left) = cursor.loaded() {
        let snapshot = previous
            .iter()
            .filter(|object| !object.state.dont_regenerate())
            .map(|object| object.spawn_params())
            .collect();
        cursor.store_snapshot(left, snapshot);
    }

    for &(x, y) in &walls {
        world.grid.write_terrain(x, y);
    }

    log::info!("Generating level {}", index + 1);
    let mut report = IngestReport {
        index,
        first_visit: !cursor.visited(index),
        walls: walls.len(),
        ..IngestReport::default()
    };

    let spawn = |world: &mut World, params: &SpawnParams, report: &mut IngestReport| {
        match world.spawn(factory, params) {
            Ok(_) => report.spawned += 1,
            Err(err) => {
                log::warn!("Skipping {} at ({}, {}): {}", params.kind, params.x, params.y, err);
                report.skipped += 1;
            }
        }
    };

    if let Some(snapshot) = cursor.snapshot(index) {
        for params in snapshot {
            spawn(world, params, &mut report);
        }
    } else {
        for params in &level.objects {
            spawn(world, params, &mut report);
        }
        for token in &tokens {
            match table.resolve(token.kind, token.subtype) {
                Some(entry) => match entry.params_at(token.x, token.y) {
                    Ok(params) => {
                        log::info!("Placing {} at ({}, {})", entry.kind, token.x, token.y);
                        spawn(world, &params, &mut report);
                    }
                    Err(err) => {
                        log::warn!("Bad spawn entry at ({}, {}): {}", token.x, token.y, err);
                        report.skipped += 1;
                    }
                },
                None => {
                    log::warn!(
                        "Unrecognized object token {}/{} at ({}, {})",
                        token.kind,
                        token.subtype,
                        token.x,
                        token.y
                    );
                    report.skipped += 1;
                }
            }
        }
    }

    cursor.finish_load(index);
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glassforge_assets::{GameManifest, SpriteLibrary};
    use glassforge_core::{EngineConfig, ObjectId, Occupant, Rect, Rgb};

    fn raster(width: u32, height: u32, pixels: &[(u32, u32, [u8; 4])]) -> Image {
        let mut data = vec![0u8; (width * height * 4) as usize];
        for &(x, y, rgba) in pixels {
            let at = ((x + y * width) * 4) as usize;
            data[at..at + 4].copy_from_slice(&rgba);
        }
        Image::from_rgba(width, height, data).unwrap()
    }

    fn table() -> SpawnTable {
        let manifest = GameManifest::from_json(
            r#"{ "spawn_table": {
                "10": { "default": { "kind": "prop", "params": { "width": 1, "height": 1 } } },
                "20": { "variants": { "1": { "kind": "crate", "params": { "width": 2, "height": 2 } } } }
            } }"#,
        )
        .unwrap();
        SpawnTable::from_manifest(&manifest)
    }

    fn level() -> LevelDef {
        LevelDef {
            image: "level.png".into(),
            status_text: Vec::new(),
            objects: Vec::new(),
        }
    }

    #[test]
    fn test_relative_requests() {
        let mut cursor = LevelCursor::new(3);
        cursor.request(LevelRequest::Next);
        assert_eq!(cursor.take_switch(), Some(0));
        cursor.begin_load(0);
        cursor.request(LevelRequest::Next);
        assert_eq!(cursor.take_switch(), Some(1));
        cursor.begin_load(1);
        cursor.request(LevelRequest::Previous);
        assert_eq!(cursor.take_switch(), Some(0));
        assert_eq!(cursor.take_switch(), None);
    }

    #[test]
    fn test_out_of_range_request_keeps_current() {
        let mut cursor = LevelCursor::new(2);
        cursor.begin_load(1);
        cursor.request(LevelRequest::Next);
        assert_eq!(cursor.pending(), Some(2));
        assert_eq!(cursor.take_switch(), None);
        assert_eq!(cursor.pending(), None);
        assert_eq!(cursor.current(), Some(1));

        cursor.request(LevelRequest::Absolute(1));
        assert_eq!(cursor.take_switch(), None);
    }

    #[test]
    fn test_only_newest_ticket_accepted() {
        let mut cursor = LevelCursor::new(3);
        let first = cursor.begin_load(0);
        let second = cursor.begin_load(2);
        assert_eq!(cursor.accept(first), None);
        assert_eq!(cursor.accept(second), Some(2));
        cursor.finish_load(2);
        assert_eq!(cursor.accept(second), None);
        assert!(cursor.is_playing());
    }

    #[test]
    fn test_walls_are_recolored_and_floor_made_transparent() {
        let mut world = World::new(EngineConfig::default(), SpriteLibrary::new());
        let mut cursor = LevelCursor::new(1);
        cursor.begin_load(0);
        let image = raster(3, 1, &[(0, 0, [200, 0, 0, 255]), (1, 0, [128, 0, 0, 255]), (2, 0, [10, 5, 7, 255])]);

        let report = ingest_terrain(&mut world, &mut cursor, &level(), 0, image, &ObjectFactory::with_builtin_kinds(), &SpawnTable::default())
            .unwrap();
        assert_eq!(report.walls, 1);
        assert!(world.grid.is_terrain(0, 0));
        assert!(!world.grid.is_terrain(1, 0));

        let terrain = world.terrain().unwrap();
        assert_eq!(terrain.pixel(0, 0), &[255, 255, 255, 255]);
        assert_eq!(terrain.pixel(1, 0)[3], 0);
        assert_eq!(world.config.style.wall, Rgb::WHITE);
    }

    #[test]
    fn test_tokens_spawn_objects_with_fallback() {
        let mut world = World::new(EngineConfig::default(), SpriteLibrary::new());
        let mut cursor = LevelCursor::new(1);
        cursor.begin_load(0);
        let image = raster(
            8,
            8,
            &[(1, 1, [0, 10, 99, 255]), (4, 4, [0, 20, 1, 255]), (6, 6, [0, 20, 2, 255]), (7, 0, [0, 30, 0, 255])],
        );

        let report = ingest_terrain(&mut world, &mut cursor, &level(), 0, image, &ObjectFactory::with_builtin_kinds(), &table())
            .unwrap();
        assert!(report.first_visit);
        assert_eq!(report.spawned, 2);
        assert_eq!(report.skipped, 2);

        let kinds: Vec<&str> = world.objects.iter().map(|o| o.state.kind()).collect();
        assert_eq!(kinds, vec!["prop", "crate"]);
        assert_eq!(world.grid.occupants_at(1, 1), &[Occupant::Object(ObjectId(0))]);
        assert_eq!(world.grid.footprint_area(ObjectId(1)), 4);
        assert!(world.grid.query(Rect::from_xywh(4, 4, 2, 2)).contains(ObjectId(1)));
    }

    #[test]
    fn test_revisit_restores_snapshot_instead_of_tokens() {
        let factory = ObjectFactory::with_builtin_kinds();
        let table = table();
        let mut world = World::new(EngineConfig::default(), SpriteLibrary::new());
        let mut cursor = LevelCursor::new(2);
        let level_zero = || raster(8, 8, &[(1, 1, [0, 10, 0, 255]), (3, 3, [0, 10, 0, 255])]);

        cursor.begin_load(0);
        ingest_terrain(&mut world, &mut cursor, &level(), 0, level_zero(), &factory, &table).unwrap();
        assert_eq!(world.objects.len(), 2);

        // One object leaves for good, another is excluded from regeneration
        world.queue_deletion(ObjectId(0));
        world.drain_deletions();
        world.spawn(&factory, &SpawnParams { dont_regenerate: Some(true), ..SpawnParams::new("prop", 5, 5) }).unwrap();

        cursor.begin_load(1);
        ingest_terrain(&mut world, &mut cursor, &level(), 1, raster(4, 4, &[]), &factory, &table).unwrap();
        assert!(world.objects.is_empty());
        assert!(cursor.visited(0));

        cursor.begin_load(0);
        let report = ingest_terrain(&mut world, &mut cursor, &level(), 0, level_zero(), &factory, &table).unwrap();
        assert!(!report.first_visit);
        assert_eq!(report.spawned, 1);
        let restored = world.objects.get(ObjectId(0)).unwrap();
        assert_eq!(restored.state.position(), glam::IVec2::new(3, 3));
    }
}
