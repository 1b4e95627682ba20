use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::components::{CategoryId, KindId, TerrainId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThingKind {
    pub id: KindId,
    pub label: String,
    /// First roll-up category, if the kind declares one.
    pub category: Option<CategoryId>,
    /// Can ever be hauled (the item traversal only accepts these).
    pub haulable: bool,
    /// Base market value of one unit.
    pub base_value: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainKind {
    pub id: TerrainId,
    pub label: String,
    /// Market value of one tile of this terrain.
    pub unit_value: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub label: String,
}

/// Definitions for thing kinds, terrain kinds and categories.
/// `new()` pre-registers the built-in Floors and Unknown categories.
#[derive(Debug, Clone)]
pub struct DefRegistry {
    kinds: HashMap<KindId, ThingKind>,
    terrains: HashMap<TerrainId, TerrainKind>,
    categories: HashMap<CategoryId, Category>,
}

impl Default for DefRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DefRegistry {
    pub fn new() -> Self {
        let mut reg = Self {
            kinds: HashMap::new(),
            terrains: HashMap::new(),
            categories: HashMap::new(),
        };
        reg.insert_category(Category {
            id: CategoryId::FLOORS,
            label: "Floors".into(),
        });
        reg.insert_category(Category {
            id: CategoryId::UNKNOWN,
            label: "Unknown".into(),
        });
        reg
    }

    pub fn insert_kind(&mut self, kind: ThingKind) {
        self.kinds.insert(kind.id, kind);
    }

    pub fn insert_terrain(&mut self, terrain: TerrainKind) {
        self.terrains.insert(terrain.id, terrain);
    }

    pub fn insert_category(&mut self, category: Category) {
        self.categories.insert(category.id, category);
    }

    pub fn kind(&self, id: KindId) -> Option<&ThingKind> {
        self.kinds.get(&id)
    }

    pub fn terrain(&self, id: TerrainId) -> Option<&TerrainKind> {
        self.terrains.get(&id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// Per-tile value table indexed by terrain ordinal. Ordinals with no
    /// registered terrain are 0.0.
    pub fn terrain_value_table(&self) -> Vec<f32> {
        let len = self
            .terrains
            .keys()
            .map(|t| t.0 as usize + 1)
            .max()
            .unwrap_or(0);
        let mut table = vec![0.0; len];
        for t in self.terrains.values() {
            table[t.id.0 as usize] = t.unit_value;
        }
        table
    }
}
