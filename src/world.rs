use std::collections::HashMap;

use crate::components::*;
use crate::defs::DefRegistry;
use crate::host::{
    CameraJumper, ChildContainers, Colony, ContainerGraph, ContainerKind, TerrainQuery,
    ThingIndex, Valuation, ValuationError, WatcherTotals,
};
use crate::tile_map::TileMap;

/// Holder entry in the in-memory container graph.
pub struct ContainerData {
    pub kind: ContainerKind,
    pub held: Vec<ThingId>,
    pub children: Vec<ContainerId>,
    /// Contents physically present.
    pub real: bool,
    /// Listed as a map holder (traversal root).
    pub root: bool,
}

/// In-memory colony used by the demo binary and the tests.
/// Implements every host interface the wealth window consumes.
pub struct World {
    pub defs: DefRegistry,
    pub things: HashMap<ThingId, Thing>,
    /// Things spawned directly on the map.
    pub spawned: Vec<ThingId>,
    /// Every pawn on the map, spawned or held.
    pub pawns: Vec<ThingId>,
    pub containers: HashMap<ContainerId, ContainerData>,
    pub tiles: TileMap,
    pub watcher: WatcherTotals,
    /// Last camera jump target.
    pub camera: Option<Target>,
    terrain_values: Vec<f32>,
    next_thing_id: u64,
    next_container_id: u64,
}

impl World {
    pub fn new(defs: DefRegistry, width: usize, height: usize) -> Self {
        let terrain_values = defs.terrain_value_table();
        Self {
            defs,
            things: HashMap::new(),
            spawned: Vec::new(),
            pawns: Vec::new(),
            containers: HashMap::new(),
            tiles: TileMap::new(width, height),
            watcher: WatcherTotals::default(),
            camera: None,
            terrain_values,
            next_thing_id: 1, // 0 is reserved/unused
            next_container_id: 1,
        }
    }

    /// Rebuild the cached terrain value table after editing `defs`.
    pub fn refresh_terrain_values(&mut self) {
        self.terrain_values = self.defs.terrain_value_table();
    }

    fn next_thing(&mut self) -> ThingId {
        let id = ThingId(self.next_thing_id);
        self.next_thing_id += 1;
        id
    }

    fn next_container(&mut self) -> ContainerId {
        let id = ContainerId(self.next_container_id);
        self.next_container_id += 1;
        id
    }

    fn insert_thing(&mut self, thing: Thing) -> ThingId {
        let id = thing.id;
        if matches!(thing.class, ThingClass::Pawn { .. }) {
            self.pawns.push(id);
        }
        self.things.insert(id, thing);
        id
    }

    /// Spawn a player-owned thing directly on the map.
    pub fn spawn(&mut self, kind: KindId, label: &str, class: ThingClass, cell: Cell) -> ThingId {
        let id = self.next_thing();
        self.spawned.push(id);
        self.insert_thing(Thing {
            id,
            kind,
            label: label.to_string(),
            class,
            player_owned: true,
            spawned: true,
            position: Some(cell),
        })
    }

    pub fn set_player_owned(&mut self, id: ThingId, owned: bool) {
        if let Some(t) = self.things.get_mut(&id) {
            t.player_owned = owned;
        }
    }

    /// Register a thing as a holder. Spawned things become map holders.
    pub fn make_holder(&mut self, owner: ThingId) -> ContainerId {
        let root = self.things.get(&owner).is_some_and(|t| t.spawned);
        self.add_container(ContainerKind::Thing(owner), true, root)
    }

    /// Attach a holder component (inventory, equipment) under `parent`.
    pub fn add_component(&mut self, owner: ThingId, parent: ContainerId) -> ContainerId {
        let id = self.add_container(ContainerKind::Component { owner }, true, false);
        self.link(parent, id);
        id
    }

    /// Add a container with no parent. `root` lists it as a map holder.
    pub fn add_container(&mut self, kind: ContainerKind, real: bool, root: bool) -> ContainerId {
        let id = self.next_container();
        self.containers.insert(
            id,
            ContainerData {
                kind,
                held: Vec::new(),
                children: Vec::new(),
                real,
                root,
            },
        );
        id
    }

    /// Make `child` a child container of `parent`.
    pub fn link(&mut self, parent: ContainerId, child: ContainerId) {
        if let Some(p) = self.containers.get_mut(&parent) {
            p.children.push(child);
        }
    }

    pub fn set_contents_real(&mut self, container: ContainerId, real: bool) {
        if let Some(c) = self.containers.get_mut(&container) {
            c.real = real;
        }
    }

    /// Create a thing held by `container`. It inherits spawned state and
    /// position from the thing owning the container, if any.
    pub fn store(
        &mut self,
        container: ContainerId,
        kind: KindId,
        label: &str,
        class: ThingClass,
    ) -> Option<ThingId> {
        let owner = match self.containers.get(&container)?.kind {
            ContainerKind::Thing(owner) | ContainerKind::Component { owner } => {
                self.things.get(&owner)
            }
            ContainerKind::PassingShip | ContainerKind::MapComponent => None,
        };
        let (spawned, position, player_owned) = owner
            .map(|o| (o.spawned, o.position, o.player_owned))
            .unwrap_or((false, None, false));

        let id = self.next_thing();
        self.insert_thing(Thing {
            id,
            kind,
            label: label.to_string(),
            class,
            player_owned,
            spawned,
            position,
        });
        if let Some(c) = self.containers.get_mut(&container) {
            c.held.push(id);
        }
        Some(id)
    }
}

impl ThingIndex for World {
    fn thing(&self, id: ThingId) -> Option<&Thing> {
        self.things.get(&id)
    }

    fn spawned_things(&self) -> &[ThingId] {
        &self.spawned
    }

    fn map_pawns(&self) -> &[ThingId] {
        &self.pawns
    }
}

impl ContainerGraph for World {
    fn container_kind(&self, container: ContainerId) -> Option<ContainerKind> {
        self.containers.get(&container).map(|c| c.kind)
    }

    fn directly_held(&self, container: ContainerId) -> &[ThingId] {
        self.containers
            .get(&container)
            .map(|c| c.held.as_slice())
            .unwrap_or(&[])
    }

    fn child_containers(&self, container: ContainerId) -> ChildContainers {
        self.containers
            .get(&container)
            .map(|c| c.children.iter().copied().collect())
            .unwrap_or_default()
    }

    fn contents_real(&self, container: ContainerId) -> bool {
        self.containers.get(&container).is_some_and(|c| c.real)
    }

    fn map_holders(&self) -> Vec<ContainerId> {
        let mut roots: Vec<ContainerId> = self
            .containers
            .iter()
            .filter(|(_, c)| c.root)
            .map(|(&id, _)| id)
            .collect();
        roots.sort();
        roots
    }
}

impl TerrainQuery for World {
    fn grid_size(&self) -> (usize, usize) {
        (self.tiles.width(), self.tiles.height())
    }

    fn terrain_at(&self, index: usize) -> Option<TerrainId> {
        self.tiles.terrain_at_index(index)
    }

    fn fogged(&self, index: usize) -> bool {
        self.tiles.fogged_at_index(index)
    }
}

impl Valuation for World {
    fn market_value(&self, thing: &Thing) -> Result<f32, ValuationError> {
        self.defs
            .kind(thing.kind)
            .map(|k| k.base_value)
            .ok_or(ValuationError::UnknownKind(thing.kind))
    }

    fn market_value_ignore_hp(&self, thing: &Thing) -> Result<f32, ValuationError> {
        self.market_value(thing)
    }

    fn terrain_unit_values(&self) -> &[f32] {
        &self.terrain_values
    }

    fn recount_watcher(&self) -> WatcherTotals {
        self.watcher
    }
}

impl CameraJumper for World {
    fn jump_to(&mut self, target: Target) {
        log::debug!("camera jump to {:?}", target);
        self.camera = Some(target);
    }
}

impl Colony for World {
    fn defs(&self) -> &DefRegistry {
        &self.defs
    }
}

/// Validate world invariants: every held thing exists, every child
/// container exists, spawned and pawn lists reference live things.
#[cfg(debug_assertions)]
pub fn validate_world(world: &World) {
    for (id, c) in &world.containers {
        for thing in &c.held {
            assert!(
                world.things.contains_key(thing),
                "container {:?} holds missing thing {:?}",
                id,
                thing
            );
        }
        for child in &c.children {
            assert!(
                world.containers.contains_key(child),
                "container {:?} links missing child {:?}",
                id,
                child
            );
        }
    }
    for thing in world.spawned.iter().chain(world.pawns.iter()) {
        assert!(
            world.things.contains_key(thing),
            "listed thing {:?} missing from things",
            thing
        );
    }
}
