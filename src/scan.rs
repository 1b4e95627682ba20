use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregator, SearchFilter, WealthTree};
use crate::components::{ContainerId, ThingClass};
use crate::grouping::group_by_category;
use crate::host::Colony;
use crate::traversal::{HolderWalker, ThingRequest, TraversalRequest, item_pass};

/// Which sources a scan reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSources {
    /// Player-owned artificial buildings plus floor tiles.
    pub buildings: bool,
    pub items: bool,
    pub pawns: bool,
}

impl Default for ScanSources {
    fn default() -> Self {
        Self {
            buildings: true,
            items: true,
            pawns: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub sources: ScanSources,
    pub slave_multiplier: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSummary {
    pub key_nodes: usize,
    pub category_nodes: usize,
    pub total: f32,
    /// Entities dropped because valuation failed.
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Rebuild `tree` from the host under `filter`.
pub fn run_scan<H: Colony + ?Sized>(
    host: &H,
    tree: &mut WealthTree,
    walker: &mut HolderWalker,
    filter: &SearchFilter,
    options: &ScanOptions,
) -> ScanSummary {
    let start = Instant::now();
    tree.reset();

    let mut agg = Aggregator::new(host, tree, filter, options.slave_multiplier);

    if options.sources.buildings {
        let defs = host.defs();
        for &id in host.spawned_things() {
            if let Some(thing) = host.thing(id)
                && thing.player_owned
                && ThingRequest::BuildingArtificial.accepts(thing, defs)
            {
                agg.visit_thing(thing);
            }
        }
        agg.visit_floors();
    }

    if options.sources.items {
        let request = TraversalRequest {
            accept: ThingRequest::HaulableEver,
            pass: |h: &H, c: ContainerId| item_pass(h, c),
            allow_unreal: false,
            visit_spawned: true,
        };
        walker.visit_all(host, &request, |thing| agg.visit_item(thing));
    }

    if options.sources.pawns {
        for &id in host.map_pawns() {
            if let Some(thing) = host.thing(id)
                && thing.player_owned
                && let ThingClass::Pawn {
                    quest_lodger: false,
                    ..
                } = thing.class
            {
                agg.visit_thing(thing);
            }
        }
    }

    let skipped = agg.skipped();
    group_by_category(tree, host.defs());

    let summary = ScanSummary {
        key_nodes: tree.key_nodes().len(),
        category_nodes: tree.category_nodes().len(),
        total: tree.total(),
        skipped,
        elapsed: start.elapsed(),
    };
    log::info!(
        "Wealth scan: {} nodes, {} categories, total {:.0} ({} skipped) in {:.2?}",
        summary.key_nodes,
        summary.category_nodes,
        summary.total,
        summary.skipped,
        summary.elapsed
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::NodeKey;
    use crate::components::{Cell, KindId};
    use crate::defs::{DefRegistry, ThingKind};
    use crate::world::World;

    const WALL: KindId = KindId(1);
    const STEEL: KindId = KindId(2);
    const HUMAN: KindId = KindId(3);

    fn world() -> World {
        let mut defs = DefRegistry::new();
        for (id, label, haulable, value) in [
            (WALL, "wall", false, 10.0),
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
        World::new(defs, 4, 4)
    }

    fn options(sources: ScanSources) -> ScanOptions {
        ScanOptions {
            sources,
            slave_multiplier: 0.75,
        }
    }

    fn scan(world: &World, sources: ScanSources) -> WealthTree {
        let mut tree = WealthTree::new(1);
        let mut walker = HolderWalker::new();
        run_scan(world, &mut tree, &mut walker, &SearchFilter::default(), &options(sources));
        tree
    }

    #[test]
    fn sources_are_independent() {
        let mut w = world();
        w.spawn(WALL, "wall", ThingClass::Building, Cell { x: 0, y: 0 });
        w.spawn(STEEL, "steel", ThingClass::Item { stack_count: 10 }, Cell { x: 1, y: 0 });
        w.spawn(
            HUMAN,
            "Ana",
            ThingClass::Pawn {
                slave: true,
                quest_lodger: false,
            },
            Cell { x: 2, y: 0 },
        );

        let all = scan(&w, ScanSources::default());
        assert!((all.total() - (10.0 + 20.0 + 750.0)).abs() < 0.01);

        let only_items = scan(
            &w,
            ScanSources {
                buildings: false,
                items: true,
                pawns: false,
            },
        );
        assert!((only_items.total() - 20.0).abs() < 0.01);
        assert!(only_items.node_for(NodeKey::Kind(WALL)).is_none());
    }

    #[test]
    fn foreign_buildings_and_lodgers_excluded() {
        let mut w = world();
        let wall = w.spawn(WALL, "wall", ThingClass::Building, Cell { x: 0, y: 0 });
        w.set_player_owned(wall, false);
        w.spawn(
            HUMAN,
            "guest",
            ThingClass::Pawn {
                slave: false,
                quest_lodger: true,
            },
            Cell { x: 1, y: 1 },
        );
        let tree = scan(&w, ScanSources::default());
        assert_eq!(tree.total(), 0.0);
        assert!(tree.key_nodes().is_empty());
    }

    #[test]
    fn rescan_is_idempotent() {
        let mut w = world();
        w.spawn(WALL, "wall", ThingClass::Building, Cell { x: 0, y: 0 });
        w.spawn(STEEL, "steel", ThingClass::Item { stack_count: 10 }, Cell { x: 1, y: 0 });
        let mut tree = WealthTree::new(1);
        let mut walker = HolderWalker::new();
        let opts = options(ScanSources::default());
        let first = run_scan(&w, &mut tree, &mut walker, &SearchFilter::default(), &opts);
        let second = run_scan(&w, &mut tree, &mut walker, &SearchFilter::default(), &opts);
        assert_eq!(first.total, second.total);
        assert_eq!(first.key_nodes, second.key_nodes);
        assert_eq!(first.category_nodes, second.category_nodes);
    }
}
