//! Interfaces the wealth window needs from the host game.
//!
//! The host owns the object model, valuation rules and the terrain grid.
//! Everything here is read-only except the camera jump.

use std::fmt;

use smallvec::SmallVec;

use crate::components::{ContainerId, KindId, TerrainId, Thing, ThingId, Target};
use crate::defs::DefRegistry;

/// What a container is, as far as the pass predicate cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// A thing that holds things itself (storage building, pawn).
    Thing(ThingId),
    /// A holder component or tracker attached to a thing
    /// (pawn inventory, equipment, a casket's contents).
    Component { owner: ThingId },
    /// Trader ship in orbit. Contents are not on the map.
    PassingShip,
    /// Map-level component holding things outside the physical map.
    MapComponent,
}

/// Child container listing. Most holders have a handful of children.
pub type ChildContainers = SmallVec<[ContainerId; 4]>;

pub trait ContainerGraph {
    fn container_kind(&self, container: ContainerId) -> Option<ContainerKind>;

    /// Things held directly by this container (not by its children).
    fn directly_held(&self, container: ContainerId) -> &[ThingId];

    fn child_containers(&self, container: ContainerId) -> ChildContainers;

    /// False for holders whose contents are not physically present
    /// (e.g. a pawn's memory of an item, a ship manifest).
    fn contents_real(&self, container: ContainerId) -> bool;

    /// Every holder on the map: things that are holders plus every holder
    /// component attached to a map thing. These are the traversal roots.
    fn map_holders(&self) -> Vec<ContainerId>;
}

pub trait ThingIndex {
    fn thing(&self, id: ThingId) -> Option<&Thing>;

    /// Every thing spawned directly on the map.
    fn spawned_things(&self) -> &[ThingId];

    /// Every pawn on the map, spawned or held.
    fn map_pawns(&self) -> &[ThingId];
}

pub trait TerrainQuery {
    /// (width, height) in cells.
    fn grid_size(&self) -> (usize, usize);

    /// Top terrain at a row-major cell index.
    fn terrain_at(&self, index: usize) -> Option<TerrainId>;

    fn fogged(&self, index: usize) -> bool;

    fn cell_count(&self) -> usize {
        let (w, h) = self.grid_size();
        w * h
    }
}

/// The host's own wealth-watcher totals, shown next to the breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WatcherTotals {
    pub buildings: f32,
    pub floors_only: f32,
    pub items: f32,
    pub pawns: f32,
}

pub trait Valuation {
    /// Market value of one unit of this thing.
    fn market_value(&self, thing: &Thing) -> Result<f32, ValuationError>;

    /// Market value ignoring hit-point damage (used for buildings).
    fn market_value_ignore_hp(&self, thing: &Thing) -> Result<f32, ValuationError>;

    /// Per-tile value indexed by terrain ordinal.
    fn terrain_unit_values(&self) -> &[f32];

    /// Force the host watcher to recount and return its totals.
    fn recount_watcher(&self) -> WatcherTotals {
        WatcherTotals::default()
    }
}

pub trait CameraJumper {
    fn jump_to(&mut self, target: Target);
}

/// Everything a scan reads from the host.
pub trait Colony: ThingIndex + ContainerGraph + TerrainQuery + Valuation {
    fn defs(&self) -> &DefRegistry;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValuationError {
    /// The thing's kind has no definition.
    UnknownKind(KindId),
    /// The host produced NaN or infinity.
    NotFinite { thing: ThingId, value: f32 },
    /// The host produced a negative value.
    Negative { thing: ThingId, value: f32 },
}

impl fmt::Display for ValuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuationError::UnknownKind(kind) => write!(f, "no definition for kind {}", kind.0),
            ValuationError::NotFinite { thing, value } => {
                write!(f, "thing {} valued at non-finite {}", thing.0, value)
            }
            ValuationError::Negative { thing, value } => {
                write!(f, "thing {} valued at negative {}", thing.0, value)
            }
        }
    }
}

impl std::error::Error for ValuationError {}
