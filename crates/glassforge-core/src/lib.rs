//! # GlassForge Core
//!
//! Foundational types shared by every GlassForge crate.
//!
//! This crate provides:
//! - **Config**: Screen size, altitude range, colors and tick rate
//! - **Color**: RGB/RGBA pixel values
//! - **Math**: Integer bounding boxes and glam re-exports
//! - **Ids**: Object identifiers and collision-grid occupants
//! - **Events**: Typed engine and game events
//! - **Spawn params**: Serializable object construction parameters

pub mod color;
pub mod error;
pub mod event;
pub mod id;
pub mod math;
pub mod params;

pub use color::{Rgb, Rgba};
pub use error::{EngineError, EngineResult};
pub use event::{Event, EventKey};
pub use id::{ObjectId, Occupant};
pub use math::Rect;
pub use params::SpawnParams;

use serde::{Deserialize, Serialize};

/// Colors used by the engine when drawing terrain, clearing and debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Style {
    /// Color the pixel surface is reset to after every flush
    pub background: Rgb,
    /// Display color written over wall pixels of the terrain raster
    pub wall: Rgb,
    /// Glyph and border color of the collision overlay
    pub debug: Rgb,
    /// Status line text color
    pub status: Rgb,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: Rgb::BLACK,
            wall: Rgb::WHITE,
            debug: Rgb::new(0, 255, 0),
            status: Rgb::WHITE,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Width of the pixel surface (and host grid) in pixels
    pub screen_width: u32,
    /// Height of the pixel surface (and host grid) in pixels
    pub screen_height: u32,
    /// Lowest altitude bucket that is rendered
    pub min_altitude: i32,
    /// Highest altitude bucket that is rendered
    pub max_altitude: i32,
    /// Terrain pixels with a red channel above this value are walls
    pub wall_threshold: u8,
    /// Host timer rate
    pub ticks_per_second: u32,
    /// Draw the collision overlay through the host
    pub debug_draw: bool,
    /// Engine colors
    pub style: Style,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen_width: 32,
            screen_height: 32,
            min_altitude: 0,
            max_altitude: 4,
            wall_threshold: 128,
            ticks_per_second: 60,
            debug_draw: false,
            style: Style::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON, rejecting unknown keys
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the engine relies on
    pub fn validate(&self) -> EngineResult<()> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "screen must be non-empty, got {}x{}",
                self.screen_width, self.screen_height
            )));
        }
        if self.min_altitude > self.max_altitude {
            return Err(EngineError::InvalidConfig(format!(
                "altitude range {}..={} is empty",
                self.min_altitude, self.max_altitude
            )));
        }
        if self.ticks_per_second == 0 {
            return Err(EngineError::InvalidConfig("ticks_per_second must be positive".into()));
        }
        Ok(())
    }

    /// Whether an altitude falls inside the rendered range
    pub fn altitude_in_range(&self, altitude: i32) -> bool {
        (self.min_altitude..=self.max_altitude).contains(&altitude)
    }

    /// Half of the screen, the world-to-screen offset used with the camera
    pub fn half_screen(&self) -> glam::IVec2 {
        glam::IVec2::new(self.screen_width as i32 / 2, self.screen_height as i32 / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.screen_width, 32);
        assert_eq!(config.max_altitude, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json_partial() {
        let config = EngineConfig::from_json(r#"{ "screen_width": 16, "style": { "wall": [10, 20, 30] } }"#).unwrap();
        assert_eq!(config.screen_width, 16);
        assert_eq!(config.screen_height, 32);
        assert_eq!(config.style.wall, Rgb::new(10, 20, 30));
        assert_eq!(config.style.background, Rgb::BLACK);
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        assert!(EngineConfig::from_json(r#"{ "screen_widht": 16 }"#).is_err());
    }

    #[test]
    fn test_config_rejects_empty_altitude_range() {
        let result = EngineConfig::from_json(r#"{ "min_altitude": 3, "max_altitude": 1 }"#);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_altitude_range() {
        let config = EngineConfig::default();
        assert!(config.altitude_in_range(0));
        assert!(config.altitude_in_range(4));
        assert!(!config.altitude_in_range(5));
        assert!(!config.altitude_in_range(-1));
    }
}
