use std::collections::HashMap;

use crate::components::*;
use crate::defs::{Category, DefRegistry, TerrainKind, ThingKind};
use crate::host::{ContainerKind, WatcherTotals};
use crate::settings::WindowSettings;
use crate::world::World;

/// Parse a KDL file and return the document. Logs a warning and returns None on failure.
fn parse_kdl_file(path: &str) -> Option<kdl::KdlDocument> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("failed to read {}: {}", path, e);
            return None;
        }
    };
    parse_kdl(&content, path)
}

fn parse_kdl(content: &str, source: &str) -> Option<kdl::KdlDocument> {
    match content.parse::<kdl::KdlDocument>() {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::warn!("failed to parse KDL {}: {}", source, e);
            None
        }
    }
}

/// Helper to get a string value from a child node's first argument.
fn child_str<'a>(children: &'a kdl::KdlDocument, key: &str) -> Option<&'a str> {
    children.get_arg(key)?.as_string()
}

/// Helper to get an i128 value from a child node's first argument.
fn child_i128(children: &kdl::KdlDocument, key: &str) -> Option<i128> {
    children.get_arg(key)?.as_integer()
}

/// Helper to get an f64 value from a child node's first argument.
/// Accepts both float and integer values.
fn child_f64(children: &kdl::KdlDocument, key: &str) -> Option<f64> {
    let val = children.get_arg(key)?;
    val.as_float()
        .or_else(|| val.as_integer().map(|i| i as f64))
}

fn child_bool(children: &kdl::KdlDocument, key: &str) -> Option<bool> {
    children.get_arg(key)?.as_bool()
}

/// First argument of a node as a string, e.g. kind "steel".
fn node_label(node: &kdl::KdlNode) -> Option<&str> {
    node.get(0).and_then(|v| v.as_string())
}

/// Load window settings from a RON file. Missing or malformed files give
/// the defaults.
pub fn load_settings(path: &str) -> WindowSettings {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("failed to read {}: {}, using default settings", path, e);
            return WindowSettings::default();
        }
    };
    match WindowSettings::from_ron(&content) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("failed to parse RON {}: {}, using default settings", path, e);
            WindowSettings::default()
        }
    }
}

/// Load a colony from a KDL file.
pub fn load_colony(path: &str) -> Option<World> {
    let doc = parse_kdl_file(path)?;
    Some(build_colony(&doc))
}

/// Build a colony from KDL text.
pub fn parse_colony(text: &str) -> Option<World> {
    let doc = parse_kdl(text, "<inline>")?;
    Some(build_colony(&doc))
}

/// Label → id tables for definitions declared in the document.
#[derive(Default)]
struct DefNames {
    categories: HashMap<String, CategoryId>,
    kinds: HashMap<String, KindId>,
    terrains: HashMap<String, TerrainId>,
}

fn build_colony(doc: &kdl::KdlDocument) -> World {
    let (defs, names) = read_defs(doc);

    let (width, height) = doc
        .get("map")
        .and_then(|n| n.children())
        .map(|c| {
            (
                child_i128(c, "width").unwrap_or(0).max(0) as usize,
                child_i128(c, "height").unwrap_or(0).max(0) as usize,
            )
        })
        .unwrap_or((0, 0));

    let mut world = World::new(defs, width, height);

    if let Some(fill) = doc
        .get("map")
        .and_then(|n| n.children())
        .and_then(|c| child_str(c, "fill"))
    {
        match names.terrains.get(fill) {
            Some(&t) => world.tiles.fill_terrain(t),
            None => log::warn!("map fill uses unknown terrain {:?}", fill),
        }
    }

    for node in doc.nodes() {
        match node.name().value() {
            "tiles" => load_tiles(&mut world, node, &names),
            "fog" => {
                if let Some(c) = node.children() {
                    for_each_cell(c, |x, y| world.tiles.set_fogged(x, y, true));
                }
            }
            "building" | "item" | "pawn" => {
                spawn_thing(&mut world, node, &names, None);
            }
            "ship" => {
                let ship = world.add_container(ContainerKind::PassingShip, true, true);
                load_contents(&mut world, node, &names, ship);
            }
            "watcher" => {
                if let Some(c) = node.children() {
                    world.watcher = WatcherTotals {
                        buildings: child_f64(c, "buildings").unwrap_or(0.0) as f32,
                        floors_only: child_f64(c, "floors").unwrap_or(0.0) as f32,
                        items: child_f64(c, "items").unwrap_or(0.0) as f32,
                        pawns: child_f64(c, "pawns").unwrap_or(0.0) as f32,
                    };
                }
            }
            _ => {}
        }
    }

    log::info!(
        "Loaded colony: {}x{} map, {} things, {} containers",
        width,
        height,
        world.things.len(),
        world.containers.len()
    );
    world
}

/// Categories, kinds and terrain. Ids are assigned in declaration order.
fn read_defs(doc: &kdl::KdlDocument) -> (DefRegistry, DefNames) {
    let mut defs = DefRegistry::new();
    let mut names = DefNames::default();

    for node in doc.nodes() {
        if node.name().value() != "category" {
            continue;
        }
        let Some(label) = node_label(node) else {
            continue;
        };
        let id = CategoryId(names.categories.len() as u32 + 1);
        names.categories.insert(label.to_string(), id);
        defs.insert_category(Category {
            id,
            label: label.to_string(),
        });
    }

    for node in doc.nodes() {
        let Some(label) = node_label(node) else {
            continue;
        };
        match node.name().value() {
            "kind" => {
                let c = node.children();
                let category = c.and_then(|c| child_str(c, "category")).and_then(|name| {
                    let found = names.categories.get(name).copied();
                    if found.is_none() {
                        log::warn!("kind {:?} uses unknown category {:?}", label, name);
                    }
                    found
                });
                let id = KindId(names.kinds.len() as u32 + 1);
                names.kinds.insert(label.to_string(), id);
                defs.insert_kind(ThingKind {
                    id,
                    label: label.to_string(),
                    category,
                    haulable: c.and_then(|c| child_bool(c, "haulable")).unwrap_or(false),
                    base_value: c.and_then(|c| child_f64(c, "value")).unwrap_or(0.0) as f32,
                });
            }
            "terrain" => {
                let id = TerrainId(names.terrains.len() as u16);
                names.terrains.insert(label.to_string(), id);
                defs.insert_terrain(TerrainKind {
                    id,
                    label: label.to_string(),
                    unit_value: node
                        .children()
                        .and_then(|c| child_f64(c, "value"))
                        .unwrap_or(0.0) as f32,
                });
            }
            _ => {}
        }
    }

    (defs, names)
}

/// Call `f` for every cell of the `x y w h` rectangle in `children`.
fn for_each_cell(children: &kdl::KdlDocument, mut f: impl FnMut(usize, usize)) {
    let x0 = child_i128(children, "x").unwrap_or(0).max(0) as usize;
    let y0 = child_i128(children, "y").unwrap_or(0).max(0) as usize;
    let w = child_i128(children, "w").unwrap_or(1).max(0) as usize;
    let h = child_i128(children, "h").unwrap_or(1).max(0) as usize;
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            f(x, y);
        }
    }
}

fn load_tiles(world: &mut World, node: &kdl::KdlNode, names: &DefNames) {
    let Some(label) = node_label(node) else {
        return;
    };
    let Some(&terrain) = names.terrains.get(label) else {
        log::warn!("tiles use unknown terrain {:?}", label);
        return;
    };
    if let Some(c) = node.children() {
        for_each_cell(c, |x, y| world.tiles.set_terrain(x, y, terrain));
    }
}

/// Spawn a building, item or pawn. With `parent` set the thing is stored
/// in that container instead of spawned on the map.
fn spawn_thing(
    world: &mut World,
    node: &kdl::KdlNode,
    names: &DefNames,
    parent: Option<ContainerId>,
) -> Option<ThingId> {
    let label = node_label(node)?;
    let c = node.children();
    let kind_name = c.and_then(|c| child_str(c, "kind")).unwrap_or(label);
    let Some(&kind) = names.kinds.get(kind_name) else {
        log::warn!("{:?} uses unknown kind {:?}", label, kind_name);
        return None;
    };

    let class = match node.name().value() {
        "building" => ThingClass::Building,
        "item" => ThingClass::Item {
            stack_count: c
                .and_then(|c| child_i128(c, "stack"))
                .unwrap_or(1)
                .clamp(0, u32::MAX as i128) as u32,
        },
        "pawn" => ThingClass::Pawn {
            slave: c.and_then(|c| child_bool(c, "slave")).unwrap_or(false),
            quest_lodger: c.and_then(|c| child_bool(c, "lodger")).unwrap_or(false),
        },
        _ => return None,
    };

    let id = match parent {
        None => {
            let cell = Cell {
                x: c.and_then(|c| child_i128(c, "x")).unwrap_or(0) as i32,
                y: c.and_then(|c| child_i128(c, "y")).unwrap_or(0) as i32,
            };
            world.spawn(kind, label, class, cell)
        }
        Some(container) => world.store(container, kind, label, class)?,
    };

    if let Some(owned) = c.and_then(|c| child_bool(c, "owned")) {
        world.set_player_owned(id, owned);
    }

    if let Some(holds) = c.and_then(|c| c.get("holds")) {
        let container = match parent {
            None => world.make_holder(id),
            Some(p) => world.add_component(id, p),
        };
        if let Some(real) = holds.get("real").and_then(|v| v.as_bool()) {
            world.set_contents_real(container, real);
        }
        load_contents(world, holds, names, container);
    }
    Some(id)
}

fn load_contents(world: &mut World, node: &kdl::KdlNode, names: &DefNames, container: ContainerId) {
    let Some(children) = node.children() else {
        return;
    };
    for child in children.nodes() {
        spawn_thing(world, child, names, Some(container));
    }
}
