//! Object identifiers and collision-grid occupants

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a game object, unique within one level load
///
/// Ids are handed out from zero every time a level loads, so an id must
/// never be kept across a level transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Get the raw id value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that can occupy a collision-grid cell
///
/// Queries always report raw occupants, terrain included; callers that
/// only care about objects filter with [`Occupant::object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Occupant {
    /// Impassable level background
    Terrain,
    /// A live, non-ephemeral game object
    Object(ObjectId),
}

impl Occupant {
    /// Check if this is the terrain sentinel
    pub fn is_terrain(&self) -> bool {
        matches!(self, Occupant::Terrain)
    }

    /// The object id, if this occupant is an object
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            Occupant::Object(id) => Some(*id),
            Occupant::Terrain => None,
        }
    }
}

impl From<ObjectId> for Occupant {
    fn from(id: ObjectId) -> Self {
        Occupant::Object(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_predicate() {
        assert!(Occupant::Terrain.is_terrain());
        assert!(!Occupant::Object(ObjectId(0)).is_terrain());
    }

    #[test]
    fn test_occupant_object() {
        assert_eq!(Occupant::from(ObjectId(3)).object(), Some(ObjectId(3)));
        assert_eq!(Occupant::Terrain.object(), None);
    }
}
