use std::collections::btree_set;

use crate::aggregate::{NodeId, NodeKey, WealthTree};
use crate::components::{Target, TerrainId, ThingId};
use crate::host::TerrainQuery;
use crate::tile_map::cell_from_index;
use crate::ui::ModifierFlags;

/// How a click on a node changes the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickModifier {
    /// Select only the clicked node.
    Replace,
    /// Flip the clicked node.
    Toggle,
    /// Select the span covering the clicked node and the current selection.
    Range,
}

impl ClickModifier {
    /// Control wins over shift.
    pub fn from_modifiers(m: ModifierFlags) -> Self {
        if m.ctrl {
            ClickModifier::Toggle
        } else if m.shift {
            ClickModifier::Range
        } else {
            ClickModifier::Replace
        }
    }
}

/// Apply a click on `visible[index]`. Out-of-range indices are ignored.
pub fn apply_click(tree: &mut WealthTree, visible: &[NodeId], index: usize, modifier: ClickModifier) {
    let Some(&clicked) = visible.get(index) else {
        return;
    };
    match modifier {
        ClickModifier::Replace => {
            tree.clear_selection();
            set_selected(tree, clicked, true);
        }
        ClickModifier::Toggle => {
            if let Some(node) = tree.node_mut(clicked) {
                node.selected = !node.selected;
            }
        }
        ClickModifier::Range => {
            let is_selected = |id: &NodeId| tree.node(*id).is_some_and(|n| n.selected);
            let first = visible.iter().position(is_selected).unwrap_or(index);
            let last = visible.iter().rposition(is_selected).unwrap_or(index);
            let (lo, hi) = (first.min(index), last.max(index));
            for (i, &id) in visible.iter().enumerate() {
                set_selected(tree, id, (lo..=hi).contains(&i));
            }
        }
    }
}

fn set_selected(tree: &mut WealthTree, id: NodeId, selected: bool) {
    if let Some(node) = tree.node_mut(id) {
        node.selected = selected;
    }
}

/// Selected nodes of the visible list, in display order.
pub fn selected_nodes<'a>(tree: &'a WealthTree, visible: &'a [NodeId]) -> impl Iterator<Item = NodeId> + 'a {
    visible
        .iter()
        .copied()
        .filter(move |&id| tree.node(id).is_some_and(|n| n.selected))
}

/// Sum of wealth over selected visible nodes.
pub fn selected_wealth(tree: &WealthTree, visible: &[NodeId]) -> f32 {
    selected_nodes(tree, visible)
        .filter_map(|id| tree.node(id))
        .map(|n| n.wealth)
        .sum()
}

enum Pending {
    /// Expand a node: its cells, then its things, then its children.
    Node(NodeId),
    Things(NodeId),
}

enum Cursor<'a> {
    Idle,
    Cells {
        terrain: TerrainId,
        next: usize,
        end: usize,
        width: usize,
    },
    Things(btree_set::Iter<'a, ThingId>),
}

/// Lazy target sequence for the selected nodes. For each node: unfogged
/// cells whose top terrain matches a terrain node (only when the node
/// still has wealth), then its things, then its children depth-first.
/// Produces one target per `next` without materializing the list.
pub struct TargetIter<'a, H: TerrainQuery + ?Sized> {
    host: &'a H,
    tree: &'a WealthTree,
    pending: Vec<Pending>,
    cursor: Cursor<'a>,
}

impl<'a, H: TerrainQuery + ?Sized> TargetIter<'a, H> {
    pub fn new(host: &'a H, tree: &'a WealthTree, roots: impl IntoIterator<Item = NodeId>) -> Self {
        let mut pending: Vec<Pending> = roots.into_iter().map(Pending::Node).collect();
        pending.reverse();
        Self {
            host,
            tree,
            pending,
            cursor: Cursor::Idle,
        }
    }

    fn expand(&mut self, id: NodeId) {
        let tree: &'a WealthTree = self.tree;
        let Some(node) = tree.node(id) else {
            return;
        };
        for &child in node.children.iter().rev() {
            self.pending.push(Pending::Node(child));
        }
        self.pending.push(Pending::Things(id));
        if let NodeKey::Terrain(terrain) = node.key
            && node.wealth != 0.0
        {
            self.cursor = Cursor::Cells {
                terrain,
                next: 0,
                end: self.host.cell_count(),
                width: self.host.grid_size().0,
            };
        }
    }
}

impl<'a, H: TerrainQuery + ?Sized> Iterator for TargetIter<'a, H> {
    type Item = Target;

    fn next(&mut self) -> Option<Target> {
        loop {
            match &mut self.cursor {
                Cursor::Cells {
                    terrain,
                    next,
                    end,
                    width,
                } => {
                    while *next < *end {
                        let index = *next;
                        *next += 1;
                        if !self.host.fogged(index) && self.host.terrain_at(index) == Some(*terrain) {
                            return Some(Target::Cell(cell_from_index(index, *width)));
                        }
                    }
                    self.cursor = Cursor::Idle;
                }
                Cursor::Things(iter) => {
                    if let Some(&id) = iter.next() {
                        return Some(Target::Thing(id));
                    }
                    self.cursor = Cursor::Idle;
                }
                Cursor::Idle => match self.pending.pop()? {
                    Pending::Node(id) => self.expand(id),
                    Pending::Things(id) => {
                        let tree: &'a WealthTree = self.tree;
                        if let Some(node) = tree.node(id) {
                            self.cursor = Cursor::Things(node.things.iter());
                        }
                    }
                },
            }
        }
    }
}

/// Targets behind the selected nodes of the visible list.
pub fn selection_targets<'a, H: TerrainQuery + ?Sized>(
    host: &'a H,
    tree: &'a WealthTree,
    visible: &'a [NodeId],
) -> TargetIter<'a, H> {
    TargetIter::new(host, tree, selected_nodes(tree, visible))
}
