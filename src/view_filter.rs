use crate::aggregate::{NodeId, WealthNode, WealthTree};
use crate::grouping::GroupMode;

/// Inclusive wealth bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRange {
    pub min: f32,
    pub max: f32,
}

impl Default for ViewRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl ViewRange {
    pub fn contains(&self, wealth: f32) -> bool {
        self.min <= wealth && wealth <= self.max
    }
}

/// Largest wealth among non-empty nodes of the mode's list, 0 when there
/// are none.
pub fn max_wealth(tree: &WealthTree, mode: GroupMode) -> f32 {
    tree.nodes_for(mode)
        .iter()
        .filter_map(|&id| tree.node(id))
        .filter(|n| !n.is_empty())
        .map(|n| n.wealth)
        .fold(0.0, f32::max)
}

/// Holds the displayed range and the slider limit it is clamped to.
#[derive(Debug, Clone, Default)]
pub struct ViewFilter {
    range: ViewRange,
    /// Upper bound of the slider: the wealth max of the last scan.
    limit: f32,
}

impl ViewFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(&self) -> ViewRange {
        self.range
    }

    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// After a scan: the limit becomes the new max and the range opens to
    /// [0, max].
    pub fn reset(&mut self, max: f32) {
        self.limit = max.max(0.0);
        self.range = ViewRange {
            min: 0.0,
            max: self.limit,
        };
    }

    /// Set the range from user input. Bounds are ordered and clamped to
    /// [0, limit].
    pub fn set_range(&mut self, min: f32, max: f32) {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.range = ViewRange {
            min: lo.clamp(0.0, self.limit),
            max: hi.clamp(0.0, self.limit),
        };
    }

    pub fn in_view(&self, node: &WealthNode) -> bool {
        !node.is_empty() && self.range.contains(node.wealth)
    }

    /// Nodes of the mode's list inside the range, by wealth descending.
    /// Ties keep label order so the list does not shuffle between frames.
    pub fn visible(&self, tree: &WealthTree, mode: GroupMode) -> Vec<NodeId> {
        let mut visible: Vec<(NodeId, &WealthNode)> = tree
            .nodes_for(mode)
            .iter()
            .filter_map(|&id| tree.node(id).map(|n| (id, n)))
            .filter(|(_, n)| self.in_view(n))
            .collect();
        visible.sort_by(|(_, a), (_, b)| {
            b.wealth
                .total_cmp(&a.wealth)
                .then_with(|| a.label.cmp(&b.label))
        });
        visible.into_iter().map(|(id, _)| id).collect()
    }
}
