use std::collections::{BTreeSet, HashMap};

use rand::rngs::StdRng;
use slotmap::{SlotMap, new_key_type};

use crate::components::{CategoryId, KindId, TerrainId, Thing, ThingClass, ThingId};
use crate::defs::DefRegistry;
use crate::grouping::GroupMode;
use crate::host::{Colony, Valuation, ValuationError};
use crate::rng::{create_rng, random_node_color};
use crate::ui::Rect;

new_key_type! {
    pub struct NodeId;
}

/// What a node aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Kind(KindId),
    Terrain(TerrainId),
    Category(CategoryId),
}

#[derive(Debug, Clone)]
pub struct WealthNode {
    pub key: NodeKey,
    pub label: String,
    pub wealth: f32,
    /// Distinct things counted into this node.
    pub things: BTreeSet<ThingId>,
    /// Tiles counted into a terrain node.
    pub terrain_count: u32,
    /// Occurrences: stack counts for items, one per building or pawn,
    /// one per tile. Category nodes sum their children.
    instance_count: u32,
    /// Kind or terrain nodes rolled up into a category node.
    pub children: Vec<NodeId>,
    pub selected: bool,
    /// Where the node was drawn last frame.
    pub layout_rect: Rect,
    pub color: [f32; 4],
}

impl WealthNode {
    fn new(key: NodeKey, label: String, color: [f32; 4]) -> Self {
        Self {
            key,
            label,
            wealth: 0.0,
            things: BTreeSet::new(),
            terrain_count: 0,
            instance_count: 0,
            children: Vec::new(),
            selected: false,
            layout_rect: Rect::ZERO,
            color,
        }
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn is_empty(&self) -> bool {
        self.instance_count == 0
    }

    /// Wealth per instance, 0 when the node is empty.
    pub fn average_value(&self) -> f32 {
        if self.instance_count == 0 {
            0.0
        } else {
            self.wealth / self.instance_count as f32
        }
    }
}

/// Result of the last scan: per-kind and per-terrain nodes, plus category
/// nodes once grouping has run. Rebuilt from scratch on every scan.
pub struct WealthTree {
    nodes: SlotMap<NodeId, WealthNode>,
    by_key: HashMap<NodeKey, NodeId>,
    /// Kind and terrain nodes in creation order.
    key_order: Vec<NodeId>,
    /// Category nodes in creation order.
    category_order: Vec<NodeId>,
    total: f32,
    color_seed: u64,
    rng: StdRng,
}

impl WealthTree {
    pub fn new(color_seed: u64) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            by_key: HashMap::new(),
            key_order: Vec::new(),
            category_order: Vec::new(),
            total: 0.0,
            color_seed,
            rng: create_rng(color_seed),
        }
    }

    /// Drop every node, zero the running total and reseed the colors so
    /// an unchanged colony lays out the same way again.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.by_key.clear();
        self.key_order.clear();
        self.category_order.clear();
        self.total = 0.0;
        self.rng = create_rng(self.color_seed);
    }

    pub fn node(&self, id: NodeId) -> Option<&WealthNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut WealthNode> {
        self.nodes.get_mut(id)
    }

    pub fn node_for(&self, key: NodeKey) -> Option<NodeId> {
        self.by_key.get(&key).copied()
    }

    /// Kind and terrain nodes.
    pub fn key_nodes(&self) -> &[NodeId] {
        &self.key_order
    }

    pub fn category_nodes(&self) -> &[NodeId] {
        &self.category_order
    }

    /// The node list the given grouping mode displays.
    pub fn nodes_for(&self, mode: GroupMode) -> &[NodeId] {
        match mode {
            GroupMode::ByKind => &self.key_order,
            GroupMode::ByCategory => &self.category_order,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &WealthNode)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sum of all wealth added to kind and terrain nodes.
    pub fn total(&self) -> f32 {
        self.total
    }

    /// Get or create the node for `key`. `label` runs only on creation.
    pub fn get_or_insert(&mut self, key: NodeKey, label: impl FnOnce() -> String) -> NodeId {
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let color = random_node_color(&mut self.rng);
        let id = self.nodes.insert(WealthNode::new(key, label(), color));
        self.by_key.insert(key, id);
        match key {
            NodeKey::Category(_) => self.category_order.push(id),
            NodeKey::Kind(_) | NodeKey::Terrain(_) => self.key_order.push(id),
        }
        id
    }

    /// Count `thing` into `node`. A thing already in the node adds nothing.
    /// Returns whether it was newly added.
    pub fn add_thing(&mut self, node: NodeId, thing: &Thing, wealth: f32) -> bool {
        let Some(n) = self.nodes.get_mut(node) else {
            return false;
        };
        if !n.things.insert(thing.id) {
            return false;
        }
        n.wealth += wealth;
        n.instance_count = n.instance_count.saturating_add(thing.class.instance_count());
        self.total += wealth;
        true
    }

    /// Count one terrain tile into `node`.
    pub fn add_tile(&mut self, node: NodeId, unit_value: f32) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.wealth += unit_value;
            n.terrain_count += 1;
            n.instance_count = n.instance_count.saturating_add(1);
            self.total += unit_value;
        }
    }

    /// Attach `child` under `parent`, rolling its wealth and count up.
    /// Does not touch the running total.
    pub fn adopt(&mut self, parent: NodeId, child: NodeId) {
        let Some((wealth, count)) = self.nodes.get(child).map(|c| (c.wealth, c.instance_count))
        else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
            p.wealth += wealth;
            p.instance_count = p.instance_count.saturating_add(count);
        }
    }

    /// Deselect every node.
    pub fn clear_selection(&mut self) {
        for (_, n) in self.nodes.iter_mut() {
            n.selected = false;
        }
    }
}

/// Case-insensitive substring filter applied while aggregating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, label: &str) -> bool {
        self.needle.is_empty() || label.to_lowercase().contains(&self.needle)
    }

    /// A thing passes on its own label or its kind's label.
    pub fn matches_thing(&self, thing: &Thing, kind_label: &str) -> bool {
        self.matches(&thing.label) || self.matches(kind_label)
    }
}

/// Capitalize the first character of a definition label.
pub fn label_cap(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Wealth a single thing contributes. Buildings ignore hit-point damage,
/// items scale by stack count, slave pawns by `slave_multiplier`.
pub fn thing_wealth<V: Valuation + ?Sized>(
    thing: &Thing,
    valuation: &V,
    slave_multiplier: f32,
) -> Result<f32, ValuationError> {
    let value = match thing.class {
        ThingClass::Building => valuation.market_value_ignore_hp(thing)?,
        ThingClass::Item { stack_count } => valuation.market_value(thing)? * stack_count as f32,
        ThingClass::Pawn { slave, .. } => {
            let unit = valuation.market_value(thing)?;
            if slave { unit * slave_multiplier } else { unit }
        }
    };
    if !value.is_finite() {
        return Err(ValuationError::NotFinite {
            thing: thing.id,
            value,
        });
    }
    if value < 0.0 {
        return Err(ValuationError::Negative {
            thing: thing.id,
            value,
        });
    }
    Ok(value)
}

/// Adds visited things and terrain to a tree under the active filter.
pub struct Aggregator<'a, H: Colony + ?Sized> {
    host: &'a H,
    tree: &'a mut WealthTree,
    filter: &'a SearchFilter,
    slave_multiplier: f32,
    skipped: usize,
}

impl<'a, H: Colony + ?Sized> Aggregator<'a, H> {
    pub fn new(host: &'a H, tree: &'a mut WealthTree, filter: &'a SearchFilter, slave_multiplier: f32) -> Self {
        Self {
            host,
            tree,
            filter,
            slave_multiplier,
            skipped: 0,
        }
    }

    /// Things dropped because the host could not value them.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Count a building, item or pawn into its kind node.
    pub fn visit_thing(&mut self, thing: &Thing) {
        let host = self.host;
        let defs: &DefRegistry = host.defs();
        let Some(kind) = defs.kind(thing.kind) else {
            log::debug!("thing {} has no kind definition, skipped", thing.id.0);
            return;
        };
        if !self.filter.matches_thing(thing, &kind.label) {
            return;
        }
        let wealth = match thing_wealth(thing, host, self.slave_multiplier) {
            Ok(w) => w,
            Err(e) => {
                log::warn!("skipping {}: {}", thing.label, e);
                self.skipped += 1;
                return;
            }
        };
        let node = self
            .tree
            .get_or_insert(NodeKey::Kind(thing.kind), || label_cap(&kind.label));
        self.tree.add_thing(node, thing, wealth);
    }

    /// Items are counted only when on the map and not under fog.
    pub fn visit_item(&mut self, thing: &Thing) {
        if !thing.spawned {
            return;
        }
        if let Some(cell) = thing.position
            && self.is_fogged(cell.x, cell.y)
        {
            return;
        }
        self.visit_thing(thing);
    }

    fn is_fogged(&self, x: i32, y: i32) -> bool {
        let (w, h) = self.host.grid_size();
        if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
            return true;
        }
        self.host.fogged(y as usize * w + x as usize)
    }

    /// Count every unfogged tile with a top terrain into its terrain node.
    pub fn visit_floors(&mut self) {
        let host = self.host;
        let defs = host.defs();
        let values = host.terrain_unit_values();
        // Filter decision per terrain ordinal; None until first seen.
        let mut passes: Vec<Option<bool>> = Vec::new();

        for index in 0..host.cell_count() {
            if host.fogged(index) {
                continue;
            }
            let Some(terrain) = host.terrain_at(index) else {
                continue;
            };
            let slot = terrain.0 as usize;
            if passes.len() <= slot {
                passes.resize(slot + 1, None);
            }
            let pass = *passes[slot].get_or_insert_with(|| {
                defs.terrain(terrain)
                    .is_some_and(|t| self.filter.matches(&t.label))
            });
            if !pass {
                continue;
            }
            let unit = values.get(slot).copied().unwrap_or(0.0);
            if !unit.is_finite() || unit < 0.0 {
                log::warn!("terrain {} has invalid tile value {}, skipped", terrain.0, unit);
                self.skipped += 1;
                continue;
            }
            let node = self.tree.get_or_insert(NodeKey::Terrain(terrain), || {
                defs.terrain(terrain)
                    .map(|t| label_cap(&t.label))
                    .unwrap_or_default()
            });
            self.tree.add_tile(node, unit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Cell;
    use crate::defs::{TerrainKind, ThingKind};
    use crate::world::World;

    const SWORD: KindId = KindId(1);
    const STEEL: KindId = KindId(2);
    const HUMAN: KindId = KindId(3);
    const SAND: TerrainId = TerrainId(0);

    fn test_world() -> World {
        let mut defs = DefRegistry::new();
        for (id, label, haulable, value) in [
            (SWORD, "steel sword", true, 100.0),
            (STEEL, "steel", true, 2.0),
            (HUMAN, "human", false, 1000.0),
        ] {
            defs.insert_kind(ThingKind {
                id,
                label: label.into(),
                category: None,
                haulable,
                base_value: value,
            });
        }
        defs.insert_terrain(TerrainKind {
            id: SAND,
            label: "sand".into(),
            unit_value: 5.0,
        });
        World::new(defs, 4, 4)
    }

    fn pawn(slave: bool) -> ThingClass {
        ThingClass::Pawn {
            slave,
            quest_lodger: false,
        }
    }

    #[test]
    fn slave_value_scaled() {
        let mut world = test_world();
        let id = world.spawn(HUMAN, "Ana", pawn(true), Cell { x: 0, y: 0 });
        let thing = world.things[&id].clone();
        let w = thing_wealth(&thing, &world, 0.75).unwrap();
        assert!((w - 750.0).abs() < 0.01);

        let free = world.spawn(HUMAN, "Bo", pawn(false), Cell { x: 0, y: 0 });
        let thing = world.things[&free].clone();
        assert!((thing_wealth(&thing, &world, 0.75).unwrap() - 1000.0).abs() < 0.01);
    }

    #[test]
    fn item_value_scales_with_stack() {
        let mut world = test_world();
        let id = world.spawn(STEEL, "steel", ThingClass::Item { stack_count: 75 }, Cell { x: 0, y: 0 });
        let thing = world.things[&id].clone();
        assert!((thing_wealth(&thing, &world, 0.75).unwrap() - 150.0).abs() < 0.01);
    }

    #[test]
    fn invalid_values_rejected() {
        let mut world = test_world();
        world.defs.insert_kind(ThingKind {
            id: KindId(9),
            label: "cursed".into(),
            category: None,
            haulable: true,
            base_value: -5.0,
        });
        let id = world.spawn(KindId(9), "cursed", ThingClass::Building, Cell { x: 0, y: 0 });
        let thing = world.things[&id].clone();
        assert!(matches!(
            thing_wealth(&thing, &world, 0.75),
            Err(ValuationError::Negative { .. })
        ));

        world.defs.insert_kind(ThingKind {
            id: KindId(9),
            label: "cursed".into(),
            category: None,
            haulable: true,
            base_value: f32::NAN,
        });
        assert!(matches!(
            thing_wealth(&thing, &world, 0.75),
            Err(ValuationError::NotFinite { .. })
        ));
    }

    #[test]
    fn thing_counted_once_per_node() {
        let mut world = test_world();
        let id = world.spawn(SWORD, "steel sword", ThingClass::Item { stack_count: 1 }, Cell { x: 0, y: 0 });
        let thing = world.things[&id].clone();
        let mut tree = WealthTree::new(1);
        let filter = SearchFilter::default();
        let mut agg = Aggregator::new(&world, &mut tree, &filter, 0.75);
        agg.visit_thing(&thing);
        agg.visit_thing(&thing);

        let node = tree.node_for(NodeKey::Kind(SWORD)).unwrap();
        let n = tree.node(node).unwrap();
        assert_eq!(n.things.len(), 1);
        assert_eq!(n.instance_count(), 1);
        assert!((n.wealth - 100.0).abs() < 0.01);
        assert!((tree.total() - 100.0).abs() < 0.01);
        assert_eq!(n.label, "Steel sword");
    }

    #[test]
    fn filter_matches_thing_or_kind_label() {
        let filter = SearchFilter::new("GOLD");
        let thing = Thing {
            id: ThingId(1),
            kind: SWORD,
            label: "Steel Sword".into(),
            class: ThingClass::Item { stack_count: 1 },
            player_owned: true,
            spawned: true,
            position: None,
        };
        assert!(!filter.matches_thing(&thing, "steel sword"));
        assert!(filter.matches_thing(&thing, "golden sword"));
        assert!(SearchFilter::new("sword").matches_thing(&thing, "x"));
        assert!(SearchFilter::default().matches("anything"));
    }

    #[test]
    fn fogged_and_unspawned_items_skipped() {
        let mut world = test_world();
        let fogged = world.spawn(STEEL, "steel", ThingClass::Item { stack_count: 5 }, Cell { x: 1, y: 1 });
        world.tiles.set_fogged(1, 1, true);
        let loose = world.spawn(STEEL, "steel", ThingClass::Item { stack_count: 5 }, Cell { x: 2, y: 1 });
        let mut unspawned = world.things[&loose].clone();
        unspawned.id = ThingId(999);
        unspawned.spawned = false;

        let mut tree = WealthTree::new(1);
        let filter = SearchFilter::default();
        let mut agg = Aggregator::new(&world, &mut tree, &filter, 0.75);
        agg.visit_item(&world.things[&fogged]);
        agg.visit_item(&world.things[&loose]);
        agg.visit_item(&unspawned);

        let node = tree.node_for(NodeKey::Kind(STEEL)).unwrap();
        assert_eq!(tree.node(node).unwrap().instance_count(), 5);
    }

    #[test]
    fn sand_tiles_counted() {
        let mut world = test_world();
        for x in 0..2 {
            for y in 0..2 {
                world.tiles.set_terrain(x, y, SAND);
            }
        }
        let mut tree = WealthTree::new(1);
        let filter = SearchFilter::default();
        Aggregator::new(&world, &mut tree, &filter, 0.75).visit_floors();

        let node = tree.node_for(NodeKey::Terrain(SAND)).unwrap();
        let n = tree.node(node).unwrap();
        assert_eq!(n.terrain_count, 4);
        assert_eq!(n.instance_count(), 4);
        assert!((n.wealth - 20.0).abs() < 0.01);
        assert!((n.average_value() - 5.0).abs() < 0.01);
        assert_eq!(n.label, "Sand");
    }

    #[test]
    fn terrain_filter_uses_terrain_label() {
        let mut world = test_world();
        world.tiles.set_terrain(0, 0, SAND);
        let mut tree = WealthTree::new(1);
        let filter = SearchFilter::new("steel");
        Aggregator::new(&world, &mut tree, &filter, 0.75).visit_floors();
        assert!(tree.is_empty());
    }

    #[test]
    fn valuation_failure_skips_only_that_thing() {
        let mut world = test_world();
        let bad = world.spawn(KindId(77), "ghost", ThingClass::Building, Cell { x: 0, y: 0 });
        world.defs.insert_kind(ThingKind {
            id: KindId(77),
            label: "ghost".into(),
            category: None,
            haulable: false,
            base_value: f32::INFINITY,
        });
        let good = world.spawn(SWORD, "sword", ThingClass::Item { stack_count: 1 }, Cell { x: 0, y: 0 });

        let mut tree = WealthTree::new(1);
        let filter = SearchFilter::default();
        let mut agg = Aggregator::new(&world, &mut tree, &filter, 0.75);
        agg.visit_thing(&world.things[&bad]);
        agg.visit_thing(&world.things[&good]);
        assert_eq!(agg.skipped(), 1);
        assert!((tree.total() - 100.0).abs() < 0.01);
        assert!(tree.node_for(NodeKey::Kind(KindId(77))).is_none());
    }

    #[test]
    fn huge_stacks_saturate_count() {
        let mut world = test_world();
        let big = world.spawn(STEEL, "steel", ThingClass::Item { stack_count: u32::MAX }, Cell { x: 0, y: 0 });
        let small = world.spawn(STEEL, "steel", ThingClass::Item { stack_count: 2 }, Cell { x: 1, y: 0 });

        let mut tree = WealthTree::new(1);
        let filter = SearchFilter::default();
        let mut agg = Aggregator::new(&world, &mut tree, &filter, 0.75);
        agg.visit_thing(&world.things[&big]);
        agg.visit_thing(&world.things[&small]);

        let steel = tree.node_for(NodeKey::Kind(STEEL)).unwrap();
        assert_eq!(tree.node(steel).unwrap().instance_count(), u32::MAX);

        let sand = tree.get_or_insert(NodeKey::Terrain(SAND), || "Sand".into());
        tree.add_tile(sand, 5.0);
        let category = tree.get_or_insert(NodeKey::Category(CategoryId(4)), || "Resources".into());
        tree.adopt(category, steel);
        tree.adopt(category, sand);
        let rolled = tree.node(category).unwrap();
        assert_eq!(rolled.instance_count(), u32::MAX);
        assert_eq!(rolled.children.len(), 2);
    }

    #[test]
    fn average_of_empty_node_is_zero() {
        let mut tree = WealthTree::new(1);
        let id = tree.get_or_insert(NodeKey::Kind(SWORD), || "Sword".into());
        assert_eq!(tree.node(id).unwrap().average_value(), 0.0);
    }

    #[test]
    fn label_capitalization() {
        assert_eq!(label_cap("steel"), "Steel");
        assert_eq!(label_cap(""), "");
        assert_eq!(label_cap("élan"), "Élan");
    }
}
