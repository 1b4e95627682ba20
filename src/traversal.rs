use std::collections::HashSet;

use crate::components::{ContainerId, Thing, ThingClass};
use crate::defs::DefRegistry;
use crate::host::{Colony, ContainerKind};

/// Which things a traversal hands to its visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThingRequest {
    /// Kinds that can ever be hauled (items).
    HaulableEver,
    BuildingArtificial,
    Pawn,
    Any,
}

impl ThingRequest {
    pub fn accepts(&self, thing: &Thing, defs: &DefRegistry) -> bool {
        match self {
            ThingRequest::HaulableEver => defs.kind(thing.kind).is_some_and(|k| k.haulable),
            ThingRequest::BuildingArtificial => matches!(thing.class, ThingClass::Building),
            ThingRequest::Pawn => matches!(thing.class, ThingClass::Pawn { .. }),
            ThingRequest::Any => true,
        }
    }
}

/// One traversal: acceptance filter, container pass predicate, and flags.
pub struct TraversalRequest<P> {
    pub accept: ThingRequest,
    /// Containers failing this are neither read nor descended into.
    pub pass: P,
    /// Read holders whose contents are not physically real.
    pub allow_unreal: bool,
    /// Also visit matching things spawned directly on the map.
    pub visit_spawned: bool,
}

/// Pass predicate used by the item scan: skips passing ships, map-level
/// components, and pawns that are not the player's own colonists.
pub fn item_pass<H: Colony + ?Sized>(host: &H, container: ContainerId) -> bool {
    match host.container_kind(container) {
        None | Some(ContainerKind::PassingShip | ContainerKind::MapComponent) => false,
        Some(ContainerKind::Thing(owner)) => match host.thing(owner) {
            Some(Thing {
                class: ThingClass::Pawn { quest_lodger, .. },
                player_owned,
                ..
            }) => *player_owned && !*quest_lodger,
            _ => true,
        },
        Some(ContainerKind::Component { .. }) => true,
    }
}

/// Reusable traversal state. The stack and visited set keep their
/// allocations between scans.
#[derive(Default)]
pub struct HolderWalker {
    stack: Vec<ContainerId>,
    visited: HashSet<ContainerId>,
    revisits: usize,
}

impl HolderWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Containers reached more than once during the last `visit_all`.
    pub fn revisits(&self) -> usize {
        self.revisits
    }

    /// Visit every accepted thing reachable from the map's holders, plus
    /// (optionally) accepted things spawned directly on the map.
    pub fn visit_all<H, P, V>(&mut self, host: &H, request: &TraversalRequest<P>, mut visit: V)
    where
        H: Colony + ?Sized,
        P: Fn(&H, ContainerId) -> bool,
        V: FnMut(&Thing),
    {
        self.visited.clear();
        self.revisits = 0;

        if request.visit_spawned {
            let defs = host.defs();
            for &id in host.spawned_things() {
                if let Some(thing) = host.thing(id)
                    && request.accept.accepts(thing, defs)
                {
                    visit(thing);
                }
            }
        }

        for root in host.map_holders() {
            self.walk(host, root, request, &mut visit);
        }

        if self.revisits > 0 {
            log::debug!("traversal skipped {} revisited containers", self.revisits);
        }
    }

    /// Depth-first walk below one holder. No recursion.
    fn walk<H, P, V>(&mut self, host: &H, root: ContainerId, request: &TraversalRequest<P>, visit: &mut V)
    where
        H: Colony + ?Sized,
        P: Fn(&H, ContainerId) -> bool,
        V: FnMut(&Thing),
    {
        if !(request.pass)(host, root) {
            return;
        }
        let defs = host.defs();

        self.stack.clear();
        self.stack.push(root);

        while let Some(container) = self.stack.pop() {
            // Shared or cyclic containers are read once per traversal.
            if !self.visited.insert(container) {
                self.revisits += 1;
                continue;
            }

            if request.allow_unreal || host.contents_real(container) {
                for &id in host.directly_held(container) {
                    if let Some(thing) = host.thing(id)
                        && request.accept.accepts(thing, defs)
                    {
                        visit(thing);
                    }
                }
            }

            for child in host.child_containers(container) {
                if (request.pass)(host, child) {
                    self.stack.push(child);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Cell, KindId, ThingId};
    use crate::defs::ThingKind;
    use crate::world::World;

    const STEEL: KindId = KindId(1);
    const SHELF: KindId = KindId(2);
    const HUMAN: KindId = KindId(3);

    fn test_world() -> World {
        let mut defs = DefRegistry::new();
        for (id, label, haulable) in [(STEEL, "steel", true), (SHELF, "shelf", false), (HUMAN, "human", false)] {
            defs.insert_kind(ThingKind {
                id,
                label: label.into(),
                category: None,
                haulable,
                base_value: 1.0,
            });
        }
        World::new(defs, 8, 8)
    }

    fn items_request<H: Colony + ?Sized>() -> TraversalRequest<impl Fn(&H, ContainerId) -> bool> {
        TraversalRequest {
            accept: ThingRequest::HaulableEver,
            pass: |h: &H, c| item_pass(h, c),
            allow_unreal: false,
            visit_spawned: true,
        }
    }

    fn collect(world: &World, request: &TraversalRequest<impl Fn(&World, ContainerId) -> bool>) -> Vec<ThingId> {
        let mut walker = HolderWalker::new();
        let mut seen = Vec::new();
        walker.visit_all(world, request, |t| seen.push(t.id));
        seen.sort();
        seen
    }

    fn stack(n: u32) -> ThingClass {
        ThingClass::Item { stack_count: n }
    }

    #[test]
    fn visits_spawned_and_held_items() {
        let mut world = test_world();
        let loose = world.spawn(STEEL, "steel", stack(10), Cell { x: 0, y: 0 });
        let shelf = world.spawn(SHELF, "shelf", ThingClass::Building, Cell { x: 1, y: 1 });
        let holder = world.make_holder(shelf);
        let stored = world.store(holder, STEEL, "steel", stack(75)).unwrap();

        let seen = collect(&world, &items_request());
        assert_eq!(seen, vec![loose, stored]);
    }

    #[test]
    fn deep_nesting_is_walked() {
        let mut world = test_world();
        let shelf = world.spawn(SHELF, "shelf", ThingClass::Building, Cell { x: 1, y: 1 });
        let mut parent = world.make_holder(shelf);
        let mut deepest = None;
        for _ in 0..500 {
            parent = world.add_component(shelf, parent);
            deepest = world.store(parent, STEEL, "steel", stack(1));
        }
        let seen = collect(&world, &items_request());
        assert_eq!(seen.len(), 500);
        assert!(seen.contains(&deepest.unwrap()));
    }

    #[test]
    fn unreal_contents_skipped_but_children_walked() {
        let mut world = test_world();
        let shelf = world.spawn(SHELF, "shelf", ThingClass::Building, Cell { x: 1, y: 1 });
        let holder = world.make_holder(shelf);
        let ghost = world.store(holder, STEEL, "steel", stack(5)).unwrap();
        world.set_contents_real(holder, false);
        let inner = world.add_component(shelf, holder);
        let real = world.store(inner, STEEL, "steel", stack(5)).unwrap();

        let seen = collect(&world, &items_request());
        assert_eq!(seen, vec![real]);

        let mut request = items_request();
        request.allow_unreal = true;
        let seen = collect(&world, &request);
        assert_eq!(seen, vec![ghost, real]);
    }

    #[test]
    fn pass_predicate_blocks_ships_and_foreign_pawns() {
        let mut world = test_world();
        let ship = world.add_container(ContainerKind::PassingShip, true, true);
        world.store(ship, STEEL, "steel", stack(500));

        let stranger = world.spawn(HUMAN, "stranger", ThingClass::Pawn { slave: false, quest_lodger: false }, Cell { x: 2, y: 2 });
        world.set_player_owned(stranger, false);
        let pack = world.make_holder(stranger);
        world.store(pack, STEEL, "steel", stack(20));

        let lodger = world.spawn(HUMAN, "lodger", ThingClass::Pawn { slave: false, quest_lodger: true }, Cell { x: 3, y: 2 });
        let lodger_pack = world.make_holder(lodger);
        world.store(lodger_pack, STEEL, "steel", stack(20));

        let colonist = world.spawn(HUMAN, "colonist", ThingClass::Pawn { slave: false, quest_lodger: false }, Cell { x: 4, y: 2 });
        let own_pack = world.make_holder(colonist);
        let carried = world.store(own_pack, STEEL, "steel", stack(3)).unwrap();

        let seen = collect(&world, &items_request());
        assert_eq!(seen, vec![carried]);
    }

    #[test]
    fn cycle_does_not_loop_forever() {
        let mut world = test_world();
        let shelf = world.spawn(SHELF, "shelf", ThingClass::Building, Cell { x: 1, y: 1 });
        let a = world.make_holder(shelf);
        let b = world.add_component(shelf, a);
        world.link(b, a);
        let item = world.store(b, STEEL, "steel", stack(1)).unwrap();

        let mut walker = HolderWalker::new();
        let mut seen = Vec::new();
        walker.visit_all(&world, &items_request(), |t| seen.push(t.id));
        assert_eq!(seen, vec![item]);
        assert_eq!(walker.revisits(), 1);
    }

    #[test]
    fn shared_container_read_once() {
        let mut world = test_world();
        let s1 = world.spawn(SHELF, "shelf", ThingClass::Building, Cell { x: 1, y: 1 });
        let s2 = world.spawn(SHELF, "shelf", ThingClass::Building, Cell { x: 2, y: 1 });
        let h1 = world.make_holder(s1);
        let h2 = world.make_holder(s2);
        let shared = world.add_component(s1, h1);
        world.link(h2, shared);
        world.store(shared, STEEL, "steel", stack(1));

        let mut walker = HolderWalker::new();
        let mut count = 0;
        walker.visit_all(&world, &items_request(), |_| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn spawned_visit_can_be_disabled() {
        let mut world = test_world();
        world.spawn(STEEL, "steel", stack(10), Cell { x: 0, y: 0 });
        let mut request = items_request();
        request.visit_spawned = false;
        assert!(collect(&world, &request).is_empty());
    }

    #[test]
    fn request_groups() {
        let world = test_world();
        let defs = &world.defs;
        let pawn = Thing {
            id: ThingId(1),
            kind: HUMAN,
            label: "Ana".into(),
            class: ThingClass::Pawn { slave: false, quest_lodger: false },
            player_owned: true,
            spawned: true,
            position: None,
        };
        assert!(ThingRequest::Pawn.accepts(&pawn, defs));
        assert!(ThingRequest::Any.accepts(&pawn, defs));
        assert!(!ThingRequest::HaulableEver.accepts(&pawn, defs));
        assert!(!ThingRequest::BuildingArtificial.accepts(&pawn, defs));
    }
}
