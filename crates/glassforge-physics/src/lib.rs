//! # GlassForge Physics
//!
//! Collision for the GlassForge engine.
//!
//! ## Features
//! - Per-pixel collision grid with terrain and object footprints
//! - Range queries with a solidity test
//! - Incremental footprint maintenance (clear, move, write)
//! - Axis-separated, unit-stepped movement with sub-pixel accumulators

pub mod body;
pub mod grid;

pub use body::{Body, Obstacles};
pub use grid::{CollisionGrid, Occupancy};
