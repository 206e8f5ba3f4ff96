//! Spawn parameters
//!
//! The minimal description needed to construct an object: its kind, its
//! placement and the overrides of its kind's defaults. Level definitions
//! list them explicitly, the spawn table builds them from terrain tokens,
//! and objects produce them again when a level is left so a revisit can
//! restore the same state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};

/// Reconstruction parameters of a game object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpawnParams {
    /// Registered object kind
    pub kind: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// Sprite name, the kind's default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    /// Collision box width, the sprite width when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Collision box height, the sprite height when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub width_offset: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub height_offset: i32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub invert_x: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub invert_y: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dont_regenerate: Option<bool>,
    /// Ticks between animation frames, higher is slower
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_speed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Kind-specific configuration, validated by the kind's factory
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl SpawnParams {
    /// Create parameters for a kind at a position
    pub fn new(kind: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            kind: kind.into(),
            x,
            y,
            ..Default::default()
        }
    }

    /// Build parameters from a `{x, y}` base with extra keys layered on top
    ///
    /// Keys in `extra` win over the base. Unknown keys are rejected.
    pub fn from_overlay(kind: &str, x: i32, y: i32, extra: &Map<String, Value>) -> EngineResult<Self> {
        let mut object = Map::new();
        object.insert("kind".into(), Value::from(kind));
        object.insert("x".into(), Value::from(x));
        object.insert("y".into(), Value::from(y));
        for (key, value) in extra {
            object.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(object)).map_err(|err| EngineError::InvalidParams {
            kind: kind.to_string(),
            reason: err.to_string(),
        })
    }

    /// Decode the kind-specific configuration block
    pub fn decode_config<T>(&self) -> EngineResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        serde_json::from_value(Value::Object(self.config.clone())).map_err(|err| {
            EngineError::InvalidParams {
                kind: self.kind.clone(),
                reason: err.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Default, PartialEq)]
    #[serde(default, deny_unknown_fields)]
    struct DoorConfig {
        target: Option<usize>,
    }

    #[test]
    fn test_minimal_json() {
        let params: SpawnParams = serde_json::from_str(r#"{ "kind": "prop", "x": 3 }"#).unwrap();
        assert_eq!(params, SpawnParams::new("prop", 3, 0));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(serde_json::from_str::<SpawnParams>(r#"{ "kind": "prop", "colour": 1 }"#).is_err());
    }

    #[test]
    fn test_overlay_wins_over_position() {
        let mut extra = Map::new();
        extra.insert("y".into(), Value::from(9));
        extra.insert("sprite".into(), Value::from("door"));
        let params = SpawnParams::from_overlay("door", 1, 2, &extra).unwrap();
        assert_eq!(params.x, 1);
        assert_eq!(params.y, 9);
        assert_eq!(params.sprite.as_deref(), Some("door"));
    }

    #[test]
    fn test_overlay_rejects_unknown_key() {
        let mut extra = Map::new();
        extra.insert("speed".into(), Value::from(2));
        let result = SpawnParams::from_overlay("crate", 0, 0, &extra);
        assert!(matches!(result, Err(EngineError::InvalidParams { .. })));
    }

    #[test]
    fn test_decode_config() {
        let params: SpawnParams =
            serde_json::from_str(r#"{ "kind": "door", "config": { "target": 2 } }"#).unwrap();
        assert_eq!(params.decode_config::<DoorConfig>().unwrap(), DoorConfig { target: Some(2) });

        let bad: SpawnParams =
            serde_json::from_str(r#"{ "kind": "door", "config": { "tagret": 2 } }"#).unwrap();
        assert!(bad.decode_config::<DoorConfig>().is_err());
    }

    #[test]
    fn test_defaults_are_not_serialized() {
        let json = serde_json::to_string(&SpawnParams::new("prop", 1, 2)).unwrap();
        assert_eq!(json, r#"{"kind":"prop","x":1,"y":2}"#);
    }
}
