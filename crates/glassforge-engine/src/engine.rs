//! Engine
//!
//! Drives one game against a [`Host`]. Each call to [`Engine::tick`] is one
//! logical frame:
//!
//! 1. while a level is playing and not paused: update every object
//!    (hook, movement, footprint), run the collision pass, drain deletions;
//! 2. while a level is playing: move the camera, dispatch `Camera`, draw
//!    the terrain and the objects by altitude;
//! 3. always: dispatch `AfterRenderAll`, flush the surface to the host,
//!    apply a pending level switch, refresh the debug overlay.
//!
//! Image loads are asynchronous: the engine asks the host for them and the
//! host hands the results back through [`Engine::on_sprite_loaded`] and
//! [`Engine::on_terrain_loaded`].

use glam::IVec2;
use glassforge_assets::{GameManifest, LevelDef, SpriteLibrary};
use glassforge_core::{EngineConfig, EngineError, EngineResult, Event, EventKey, ObjectId, Occupant, SpawnParams};
use glassforge_platform::{Host, ImageRequest, InputEvent, KeyCode, LoadTicket, Pipeline};
use glassforge_render::Image;

use crate::behavior::Context;
use crate::debug::CollisionOverlay;
use crate::events::{EventBus, ListenerId};
use crate::level::{ingest_terrain, LevelCursor, LevelRequest};
use crate::spawn::{ObjectFactory, SpawnTable};
use crate::world::{Command, World};

/// The game engine
pub struct Engine<H: Host> {
    host: H,
    world: World,
    bus: EventBus,
    factory: ObjectFactory,
    table: SpawnTable,
    levels: Vec<LevelDef>,
    cursor: LevelCursor,
    overlay: CollisionOverlay,
    sprite_ticket: LoadTicket,
    ticks: u64,
}

impl<H: Host> Engine<H> {
    /// Create an engine with the built-in kinds
    pub fn new(manifest: GameManifest, host: H) -> EngineResult<Self> {
        Self::with_factory(manifest, host, ObjectFactory::with_builtin_kinds())
    }

    /// Create an engine with a custom set of kinds
    ///
    /// Every kind named by the spawn table or a level's object list must be
    /// registered.
    pub fn with_factory(manifest: GameManifest, host: H, factory: ObjectFactory) -> EngineResult<Self> {
        manifest
            .validate()
            .map_err(|err| EngineError::InvalidConfig(err.to_string()))?;
        let config = manifest.engine_config();
        config.validate()?;
        if manifest.levels.is_empty() {
            return Err(EngineError::NoLevels);
        }

        let table = SpawnTable::from_manifest(&manifest);
        table.validate(&factory)?;
        for object in manifest.levels.iter().flat_map(|level| &level.objects) {
            if !factory.contains(&object.kind) {
                return Err(EngineError::UnknownKind(object.kind.clone()));
            }
        }

        let sprites = SpriteLibrary::from_defs(&manifest.sprites);
        let overlay = CollisionOverlay::new(config.debug_draw);
        Ok(Self {
            host,
            cursor: LevelCursor::new(manifest.levels.len()),
            world: World::new(config, sprites),
            bus: EventBus::new(),
            factory,
            table,
            levels: manifest.levels,
            overlay,
            sprite_ticket: LoadTicket(0),
            ticks: 0,
        })
    }

    /// Start the game: size the host, request every sprite and level 0
    pub fn init(&mut self) {
        self.emit(Event::Init);

        let (width, height) = (self.world.config.screen_width, self.world.config.screen_height);
        self.host.set_grid_size(width, height);

        let pending: Vec<(String, String)> = self
            .world
            .sprites
            .pending()
            .into_iter()
            .map(|(name, def)| (name.to_string(), def.image.clone()))
            .collect();
        for (name, path) in pending {
            let ticket = self.sprite_ticket;
            self.sprite_ticket = ticket.next();
            self.host.request_image(ImageRequest {
                pipeline: Pipeline::Sprites,
                name,
                path,
                ticket,
            });
        }

        self.cursor.request(LevelRequest::Absolute(0));
    }

    /// Run one frame
    pub fn tick(&mut self) {
        self.ticks += 1;

        if self.cursor.is_playing() {
            // Deletions queued since the last drain (listeners, host calls)
            if !self.world.pending_deletions().is_empty() {
                self.world.drain_deletions();
            }
            if !self.world.controls.paused {
                self.update_objects();
                self.compute_collisions();
                self.world.drain_deletions();
            }

            self.world.camera.track(&self.world.objects, &self.world.sprites);
            self.emit(Event::Camera);

            self.world.draw_terrain();
            self.world.draw_objects();
        }

        self.emit(Event::AfterRenderAll);
        self.world.surface.flush(&mut self.host);

        self.apply_level_switch();

        let ready = self.cursor.is_playing();
        self.overlay
            .update(&mut self.host, &self.world.grid, &self.world.camera, &self.world.config, ready);
        self.world.controls.end_tick();
    }

    fn update_objects(&mut self) {
        for id in self.world.objects.ids() {
            let Some(mut object) = self.world.objects.detach(id) else {
                continue;
            };
            {
                let mut ctx = self.world.context();
                object.tick(&mut ctx);
                let velocity = object.state.body.velocity;
                let stopped = ctx.move_object(&mut object.state, velocity);
                object.state.set_stopped(stopped);
            }
            self.world.settle(&mut object);
            self.world.reattach(object);
            self.pump();
        }
    }

    fn compute_collisions(&mut self) {
        for id in self.world.objects.ids() {
            let Some(mut object) = self.world.objects.detach(id) else {
                continue;
            };
            // Ephemeral and unplaced objects have no footprint
            if let Some(footprint) = object.state.body.footprint() {
                let found = self.world.grid.query(footprint.dilate(1));
                let mut ctx = self.world.context();
                let objects = ctx.objects;
                for other in found.objects().filter(|other| *other != id) {
                    if let Some(other) = objects.state(other) {
                        object.collide(other, &mut ctx);
                    }
                }
            }
            self.world.reattach(object);
            self.pump();
        }
    }

    fn apply_level_switch(&mut self) {
        let Some(index) = self.cursor.take_switch() else {
            return;
        };
        self.emit(Event::BeforeLoadLevel);

        let ticket = self.cursor.begin_load(index);
        let path = self.levels[index].image.clone();
        log::info!("Loading level {} from {} ({})", index + 1, path, ticket);
        self.host.request_image(ImageRequest {
            pipeline: Pipeline::Terrain,
            name: path.clone(),
            path,
            ticket,
        });
    }

    /// Dispatch an event and everything it causes
    pub fn emit(&mut self, event: Event) {
        self.bus.dispatch(&event, &mut self.world);
        self.pump();
    }

    fn pump(&mut self) {
        while let Some(command) = self.world.commands.pop() {
            match command {
                Command::Spawn(params) => {
                    if let Err(err) = self.world.spawn(&self.factory, &params) {
                        log::warn!("Spawn of {} failed: {}", params.kind, err);
                    }
                }
                Command::Delete(id) => self.world.queue_deletion(id),
                Command::Emit(event) => self.bus.dispatch(&event, &mut self.world),
                Command::RequestLevel(request) => self.cursor.request(request),
                Command::Follow(target) => self.world.camera.follow(target),
                Command::Status(text) => self.host.set_status_text(&text),
            }
        }
    }

    /// Sprite image arrived; returns whether it was accepted
    pub fn on_sprite_loaded(&mut self, name: &str, image: Image) -> bool {
        match self.world.sprites.on_sprite_loaded(name, image) {
            Ok(_) => true,
            Err(err) => {
                log::warn!("Sprite {} rejected: {}", name, err);
                false
            }
        }
    }

    /// Terrain image arrived; returns whether it was ingested
    ///
    /// Completions for anything but the newest terrain request are ignored.
    pub fn on_terrain_loaded(&mut self, ticket: LoadTicket, image: Image) -> bool {
        let Some(index) = self.cursor.accept(ticket) else {
            log::warn!("Ignoring stale terrain completion ({})", ticket);
            return false;
        };

        let Some(report) = ingest_terrain(
            &mut self.world,
            &mut self.cursor,
            &self.levels[index],
            index,
            image,
            &self.factory,
            &self.table,
        ) else {
            return false;
        };
        log::info!(
            "Level {} ready: {} objects, {} skipped, {} wall pixels",
            index + 1,
            report.spawned,
            report.skipped,
            report.walls
        );

        if report.first_visit {
            if let Some(text) = self.levels[index].status_text.first() {
                self.host.set_status_text(text);
            }
        }
        self.emit(Event::AfterLoadLevel);
        true
    }

    /// Feed one host input event
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(KeyCode::F1) => self.overlay.toggle(),
            InputEvent::KeyDown(KeyCode::F2) => {
                log::info!("Debug: skipping level");
                self.cursor.request(LevelRequest::Next);
                self.emit(Event::Debug);
            }
            InputEvent::KeyDown(KeyCode::F3) => {
                log::info!("Debug: back a level");
                self.cursor.request(LevelRequest::Previous);
                self.emit(Event::Debug);
            }
            InputEvent::Touch { x, y } => {
                self.world.controls.handle_event(&event);
                self.emit(Event::Touch { x, y });
            }
            InputEvent::Shutdown => {
                log::info!("Shutting down after {} ticks", self.ticks);
                self.emit(Event::Shutdown);
            }
            _ => self.world.controls.handle_event(&event),
        }
    }

    pub fn key_down(&mut self, key: KeyCode) {
        self.handle_input(InputEvent::KeyDown(key));
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.handle_input(InputEvent::KeyUp(key));
    }

    pub fn touch(&mut self, x: i32, y: i32) {
        self.handle_input(InputEvent::Touch { x, y });
    }

    pub fn enter(&mut self, x: i32, y: i32) {
        self.handle_input(InputEvent::Enter { x, y });
    }

    pub fn shutdown(&mut self) {
        self.handle_input(InputEvent::Shutdown);
    }

    /// Collision-grid occupants under a screen cell, terrain included
    pub fn occupants_at_screen(&self, x: i32, y: i32) -> Vec<Occupant> {
        let world = self
            .world
            .camera
            .screen_to_world(IVec2::new(x, y), self.world.config.half_screen());
        self.world.grid.occupants_at(world.x, world.y).to_vec()
    }

    /// Create an object in the current level
    pub fn spawn(&mut self, params: SpawnParams) -> EngineResult<ObjectId> {
        self.world.spawn(&self.factory, &params)
    }

    /// Queue an object for deletion
    pub fn delete(&mut self, id: ObjectId) {
        self.world.queue_deletion(id);
    }

    /// Ask for a level change, applied at the end of the next tick
    pub fn request_level(&mut self, request: LevelRequest) {
        self.cursor.request(request);
    }

    /// Register a global event listener
    pub fn add_listener<F>(&mut self, key: EventKey, listener: F) -> ListenerId
    where
        F: FnMut(&Event, &mut Context<'_>) + 'static,
    {
        self.bus.add_listener(key, listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.bus.remove_listener(id)
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.world.controls.paused = paused;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.world.config
    }

    pub fn cursor(&self) -> &LevelCursor {
        &self.cursor
    }

    pub fn levels(&self) -> &[LevelDef] {
        &self.levels
    }

    pub fn factory(&self) -> &ObjectFactory {
        &self.factory
    }

    pub fn overlay(&self) -> &CollisionOverlay {
        &self.overlay
    }

    /// Frames run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
