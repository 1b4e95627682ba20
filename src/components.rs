use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Unique thing identifier. Never use raw u64 where a ThingId is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThingId(pub u64);

impl Hash for ThingId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Thing kind (definition) identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KindId(pub u32);

/// Terrain kind identity. The inner value is the ordinal used to index
/// the host's precomputed terrain value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainId(pub u16);

/// Roll-up category identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub u32);

impl CategoryId {
    /// Dedicated category for terrain nodes.
    pub const FLOORS: CategoryId = CategoryId(u32::MAX - 1);
    /// Fallback when a kind has no resolvable category.
    pub const UNKNOWN: CategoryId = CategoryId(u32::MAX);
}

/// Anything that can hold other things: a storage building, a pawn, a
/// holder component attached to a thing, or a non-physical holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

/// Grid cell on the terrain map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

/// Kind-specific payload of a thing. Closed set: every valuation and
/// count rule matches on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThingClass {
    /// Artificial (constructed) building.
    Building,
    /// Stackable item.
    Item { stack_count: u32 },
    /// Colonist, prisoner, animal.
    Pawn { slave: bool, quest_lodger: bool },
}

impl ThingClass {
    /// Occurrences this thing adds to its node's instance count.
    pub fn instance_count(&self) -> u32 {
        match self {
            ThingClass::Building => 1,
            ThingClass::Item { stack_count } => *stack_count,
            ThingClass::Pawn { .. } => 1,
        }
    }
}

/// A game object as the host reports it.
#[derive(Debug, Clone)]
pub struct Thing {
    pub id: ThingId,
    pub kind: KindId,
    /// Display label, e.g. "steel sword (normal)".
    pub label: String,
    pub class: ThingClass,
    pub player_owned: bool,
    /// Spawned on the map, directly or through any parent holder.
    pub spawned: bool,
    /// Position of the thing or of its outermost spawned holder.
    pub position: Option<Cell>,
}

/// Locatable reference the camera can jump to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Thing(ThingId),
    Cell(Cell),
}
