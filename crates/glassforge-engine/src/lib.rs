//! # GlassForge Engine
//!
//! Runtime of the GlassForge 2D platformer engine.
//!
//! This crate ties the core types, collision, rendering and assets together:
//! - **Objects**: Registry of game objects with pluggable behaviors
//! - **Kinds**: Factory of named object kinds, spawn tables for terrain tokens
//! - **Events**: Typed event bus with global listeners and object subscriptions
//! - **Levels**: Asynchronous terrain loading, wall extraction and revisit snapshots
//! - **Engine**: The per-tick orchestration against a host

pub mod behavior;
pub mod camera;
pub mod debug;
pub mod engine;
pub mod events;
pub mod kinds;
pub mod level;
pub mod object;
pub mod registry;
pub mod spawn;
pub mod world;

pub use behavior::{Behavior, Context, DrawContext};
pub use camera::Camera;
pub use debug::CollisionOverlay;
pub use engine::Engine;
pub use events::{EventBus, Listener, ListenerId};
pub use level::{IngestReport, LevelCursor, LevelRequest, LevelState};
pub use object::{GameObject, ObjectFlags, ObjectState};
pub use registry::ObjectRegistry;
pub use spawn::{Kind, KindDefaults, ObjectFactory, SpawnTable};
pub use world::{Command, Commands, World};
