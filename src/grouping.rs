use serde::{Deserialize, Serialize};

use crate::aggregate::{NodeKey, WealthTree, label_cap};
use crate::components::CategoryId;
use crate::defs::DefRegistry;

/// Which node list the window displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupMode {
    #[default]
    ByKind,
    ByCategory,
}

impl GroupMode {
    pub fn from_flag(group_by_category: bool) -> Self {
        if group_by_category {
            GroupMode::ByCategory
        } else {
            GroupMode::ByKind
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            GroupMode::ByKind => GroupMode::ByCategory,
            GroupMode::ByCategory => GroupMode::ByKind,
        }
    }
}

/// Category a node rolls up into. Terrain always goes to Floors; kinds
/// without a resolvable category go to Unknown.
pub fn category_for(key: NodeKey, defs: &DefRegistry) -> CategoryId {
    match key {
        NodeKey::Kind(kind) => defs
            .kind(kind)
            .and_then(|k| k.category)
            .filter(|c| defs.category(*c).is_some())
            .unwrap_or(CategoryId::UNKNOWN),
        NodeKey::Terrain(_) => CategoryId::FLOORS,
        NodeKey::Category(c) => c,
    }
}

/// Attach every non-empty kind or terrain node to its category node,
/// creating category nodes on first use. Category wealth and counts are
/// the sums of their children.
pub fn group_by_category(tree: &mut WealthTree, defs: &DefRegistry) {
    let keyed: Vec<_> = tree.key_nodes().to_vec();
    for id in keyed {
        let Some(node) = tree.node(id) else {
            continue;
        };
        if node.is_empty() {
            continue;
        }
        let category = category_for(node.key, defs);
        let parent = tree.get_or_insert(NodeKey::Category(category), || {
            defs.category(category)
                .map(|c| label_cap(&c.label))
                .unwrap_or_else(|| "Null Label".to_string())
        });
        tree.adopt(parent, id);
    }
}
