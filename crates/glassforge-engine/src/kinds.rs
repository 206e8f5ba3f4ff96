//! Built-in kinds
//!
//! Generic objects that exercise the engine contract: an inert prop, a
//! falling crate, a level door, a pressure plate, a block that yields while
//! plates are pressed, and a controllable avatar. Each kind decodes its own
//! typed configuration and rejects unknown keys.

use glam::Vec2;
use glassforge_core::{EngineResult, Event, EventKey, SpawnParams};
use glassforge_platform::Buttons;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::behavior::{Behavior, Context, DrawContext};
use crate::level::LevelRequest;
use crate::object::ObjectState;
use crate::spawn::{Kind, KindDefaults, ObjectFactory};

/// Signal emitted when a plate becomes pressed
pub const PLATE_PRESSED: &str = "plate_pressed";
/// Signal emitted when a pressed plate is released
pub const PLATE_RELEASED: &str = "plate_released";

/// Register every built-in kind
pub fn register_builtin_kinds(factory: &mut ObjectFactory) {
    factory.register_kind::<Prop>();
    factory.register_kind::<Crate>();
    factory.register_kind::<Door>();
    factory.register_kind::<Plate>();
    factory.register_kind::<ToggleBlock>();
    factory.register_kind::<Avatar>();
}

fn decode<T: DeserializeOwned>(params: &SpawnParams) -> EngineResult<T> {
    params.decode_config()
}

fn encode<T: Serialize>(config: &T) -> Map<String, Value> {
    match serde_json::to_value(config) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoConfig {}

/// Falling speed update shared by gravity-driven kinds
fn fall(velocity: &mut Vec2, grounded: bool, gravity: f32, max_fall: f32) {
    if grounded {
        velocity.y = velocity.y.min(0.0);
    } else {
        velocity.y = (velocity.y + gravity).min(max_fall);
    }
}

/// Inert scenery
#[derive(Debug, Default)]
pub struct Prop;

impl Behavior for Prop {}

impl Kind for Prop {
    const NAME: &'static str = "prop";

    fn from_params(params: &SpawnParams) -> EngineResult<Self> {
        decode::<NoConfig>(params)?;
        Ok(Prop)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrateConfig {
    pub gravity: f32,
    pub max_fall: f32,
}

impl Default for CrateConfig {
    fn default() -> Self {
        Self {
            gravity: 0.07,
            max_fall: 1.0,
        }
    }
}

/// Falls until it rests on anything
#[derive(Debug)]
pub struct Crate {
    config: CrateConfig,
}

impl Behavior for Crate {
    fn tick(&mut self, object: &mut ObjectState, ctx: &mut Context<'_>) {
        let Some(below) = object.below(1) else {
            return;
        };
        let grounded = ctx.touching(object, below);
        fall(&mut object.body.velocity, grounded, self.config.gravity, self.config.max_fall);
    }

    fn config(&self) -> Map<String, Value> {
        encode(&self.config)
    }
}

impl Kind for Crate {
    const NAME: &'static str = "crate";

    fn defaults() -> KindDefaults {
        KindDefaults {
            altitude: 1,
            ..KindDefaults::default()
        }
    }

    fn from_params(params: &SpawnParams) -> EngineResult<Self> {
        Ok(Crate {
            config: decode(params)?,
        })
    }
}

/// Level a door leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorTarget {
    #[default]
    Next,
    Previous,
    Level(usize),
}

impl From<DoorTarget> for LevelRequest {
    fn from(target: DoorTarget) -> Self {
        match target {
            DoorTarget::Next => LevelRequest::Next,
            DoorTarget::Previous => LevelRequest::Previous,
            DoorTarget::Level(index) => LevelRequest::Absolute(index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DoorConfig {
    pub target: DoorTarget,
    /// Kind of object that opens the door
    pub trigger: String,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            target: DoorTarget::Next,
            trigger: Avatar::NAME.to_string(),
        }
    }
}

/// Requests a level change when the trigger kind newly touches it
#[derive(Debug)]
pub struct Door {
    config: DoorConfig,
    touching: bool,
    touched: bool,
}

impl Behavior for Door {
    fn tick(&mut self, _object: &mut ObjectState, _ctx: &mut Context<'_>) {
        self.touching = self.touched;
        self.touched = false;
    }

    fn collide(&mut self, object: &mut ObjectState, other: &ObjectState, ctx: &mut Context<'_>) {
        if other.kind() != self.config.trigger {
            return;
        }
        self.touched = true;
        if !self.touching {
            self.touching = true;
            log::info!("Door {} opened by {} {}", object.id(), other.kind(), other.id());
            ctx.request_level(self.config.target.into());
        }
    }

    fn config(&self) -> Map<String, Value> {
        encode(&self.config)
    }
}

impl Kind for Door {
    const NAME: &'static str = "door";

    fn defaults() -> KindDefaults {
        KindDefaults {
            solid: false,
            ..KindDefaults::default()
        }
    }

    fn from_params(params: &SpawnParams) -> EngineResult<Self> {
        // Spawning on top of the trigger does not open the door
        Ok(Door {
            config: decode(params)?,
            touching: true,
            touched: true,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlateConfig {
    /// Ticks an object must rest on the plate before it is pressed
    pub threshold: u32,
    /// Sprite drawn while pressed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressed_sprite: Option<String>,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            threshold: 30,
            pressed_sprite: None,
        }
    }
}

/// Pressure plate, signalling when weighed down and when freed
#[derive(Debug)]
pub struct Plate {
    config: PlateConfig,
    press_time: u32,
    pressed: bool,
}

impl Plate {
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

impl Behavior for Plate {
    fn tick(&mut self, object: &mut ObjectState, ctx: &mut Context<'_>) {
        let probe = if object.body.invert_y {
            object.below(2)
        } else {
            object.above(2)
        };
        let Some(probe) = probe else {
            return;
        };
        let own = object.id();
        let loaded = ctx.query(probe).objects().any(|id| id != own);

        if loaded {
            self.press_time = (self.press_time + 1).min(self.config.threshold);
            if !self.pressed && self.press_time >= self.config.threshold {
                self.pressed = true;
                log::debug!("Plate {} pressed", own);
                ctx.emit(Event::signal(PLATE_PRESSED));
            }
        } else {
            self.press_time = self.press_time.saturating_sub(1);
            if self.pressed && self.press_time == 0 {
                self.pressed = false;
                log::debug!("Plate {} released", own);
                ctx.emit(Event::signal(PLATE_RELEASED));
            }
        }
    }

    fn draw(&mut self, object: &mut ObjectState, ctx: &mut DrawContext<'_>) {
        match (&self.config.pressed_sprite, self.pressed) {
            (Some(pressed), true) => {
                let rest = object.sprite.replace(pressed.clone());
                object.draw(ctx);
                object.sprite = rest;
            }
            _ => object.draw(ctx),
        }
    }

    fn config(&self) -> Map<String, Value> {
        encode(&self.config)
    }
}

impl Kind for Plate {
    const NAME: &'static str = "plate";

    fn defaults() -> KindDefaults {
        KindDefaults {
            solid: false,
            ..KindDefaults::default()
        }
    }

    fn from_params(params: &SpawnParams) -> EngineResult<Self> {
        Ok(Plate {
            config: decode(params)?,
            press_time: 0,
            pressed: false,
        })
    }
}

/// Turns ephemeral and fades out while any plate is pressed
#[derive(Debug, Default)]
pub struct ToggleBlock {
    active_plates: u32,
}

impl ToggleBlock {
    const FADE_OUT: f32 = 0.02;
    const FADE_IN: f32 = 0.04;
}

impl Behavior for ToggleBlock {
    fn on_spawn(&mut self, object: &mut ObjectState) {
        object.subscribe(EventKey::signal(PLATE_PRESSED));
        object.subscribe(EventKey::signal(PLATE_RELEASED));
    }

    fn tick(&mut self, object: &mut ObjectState, _ctx: &mut Context<'_>) {
        let delta = if object.is_ephemeral() {
            -Self::FADE_OUT
        } else {
            Self::FADE_IN
        };
        object.opacity = (object.opacity + delta).clamp(0.0, 1.0);
    }

    fn on_event(&mut self, object: &mut ObjectState, event: &Event, _ctx: &mut Context<'_>) {
        let Event::Signal(name) = event else {
            return;
        };
        match &**name {
            PLATE_PRESSED => self.active_plates += 1,
            PLATE_RELEASED => self.active_plates = self.active_plates.saturating_sub(1),
            _ => return,
        }
        object.set_ephemeral(self.active_plates > 0);
    }
}

impl Kind for ToggleBlock {
    const NAME: &'static str = "toggle_block";

    fn from_params(params: &SpawnParams) -> EngineResult<Self> {
        decode::<NoConfig>(params)?;
        Ok(ToggleBlock::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AvatarConfig {
    pub speed: f32,
    pub jump: f32,
    pub gravity: f32,
    pub max_fall: f32,
    /// Sprite shown while walking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walk_sprite: Option<String>,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            speed: 0.3,
            jump: 1.0,
            gravity: 0.07,
            max_fall: 1.0,
            walk_sprite: None,
        }
    }
}

/// Controls-driven walker and camera target
#[derive(Debug)]
pub struct Avatar {
    config: AvatarConfig,
    idle_sprite: Option<String>,
    followed: bool,
}

impl Behavior for Avatar {
    fn on_spawn(&mut self, object: &mut ObjectState) {
        self.idle_sprite = object.sprite.clone();
    }

    fn tick(&mut self, object: &mut ObjectState, ctx: &mut Context<'_>) {
        if !self.followed {
            ctx.follow(Some(object.id()));
            self.followed = true;
        }

        let direction = ctx.controls.horizontal();
        object.body.velocity.x = direction as f32 * self.config.speed;
        if direction != 0 {
            object.body.invert_x = direction < 0;
        }
        object.sprite = match (&self.config.walk_sprite, direction) {
            (Some(walk), d) if d != 0 => Some(walk.clone()),
            _ => self.idle_sprite.clone(),
        };

        let grounded = object.below(1).is_some_and(|probe| ctx.blocked(object, probe));
        fall(&mut object.body.velocity, grounded, self.config.gravity, self.config.max_fall);
        let jump = ctx.controls.is_just_pressed(Buttons::UP) || ctx.controls.is_just_pressed(Buttons::ACTION);
        if grounded && jump {
            object.body.velocity.y = -self.config.jump;
        }
    }

    fn config(&self) -> Map<String, Value> {
        encode(&self.config)
    }
}

impl Kind for Avatar {
    const NAME: &'static str = "avatar";

    fn defaults() -> KindDefaults {
        KindDefaults {
            altitude: 2,
            dont_regenerate: true,
            ..KindDefaults::default()
        }
    }

    fn from_params(params: &SpawnParams) -> EngineResult<Self> {
        Ok(Avatar {
            config: decode(params)?,
            idle_sprite: None,
            followed: false,
        })
    }
}
