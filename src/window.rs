use winit::keyboard::KeyCode;

use crate::aggregate::{NodeId, NodeKey, SearchFilter, WealthNode, WealthTree, label_cap, thing_wealth};
use crate::components::Target;
use crate::grouping::GroupMode;
use crate::host::{CameraJumper, Colony, WatcherTotals};
use crate::scan::{ScanOptions, ScanSources, ScanSummary, run_scan};
use crate::selection::{ClickModifier, TargetIter, apply_click, selected_wealth, selection_targets};
use crate::settings::WindowSettings;
use crate::traversal::HolderWalker;
use crate::ui::{
    Action, DrawList, FrameInput, IconRef, KeyBindings, KeyCombo, Rect, ScrollState, Size,
    TextAnchor, Theme, Ui, VirtualList,
};
use crate::view_filter::{ViewFilter, ViewRange, max_wealth};

/// What one frame produced.
#[derive(Debug, Default)]
pub struct FrameOutput {
    pub draw: DrawList,
    /// Target row clicked this frame.
    pub jump: Option<Target>,
}

impl FrameOutput {
    /// Hand the clicked target, if any, to the host camera.
    pub fn jump_camera<J: CameraJumper + ?Sized>(&self, camera: &mut J) {
        if let Some(target) = self.jump {
            camera.jump_to(target);
        }
    }
}

pub struct WealthWindow {
    settings: WindowSettings,
    theme: Theme,
    bindings: KeyBindings,
    rect: Rect,
    open: bool,
    tree: WealthTree,
    walker: HolderWalker,
    /// Contents of the search field. Becomes the filter on submit.
    search_text: String,
    filter: SearchFilter,
    mode: GroupMode,
    sources: ScanSources,
    view: ViewFilter,
    selected_wealth: f32,
    watcher: WatcherTotals,
    node_scroll: ScrollState,
    target_scroll: ScrollState,
    last_scan: Option<ScanSummary>,
}

fn money(value: f32) -> String {
    format!("${:.0}", value)
}

impl WealthWindow {
    pub fn new(settings: WindowSettings) -> Self {
        let theme = Theme::default();
        let rect = Rect::new(0.0, 0.0, theme.window_width, theme.window_height);
        Self {
            tree: WealthTree::new(settings.color_seed),
            mode: GroupMode::from_flag(settings.group_by_category),
            sources: ScanSources {
                buildings: settings.show_buildings,
                items: settings.show_items,
                pawns: settings.show_pawns,
            },
            settings,
            theme,
            bindings: KeyBindings::defaults(),
            rect,
            open: false,
            walker: HolderWalker::new(),
            search_text: String::new(),
            filter: SearchFilter::default(),
            view: ViewFilter::new(),
            selected_wealth: 0.0,
            watcher: WatcherTotals::default(),
            node_scroll: ScrollState::default(),
            target_scroll: ScrollState::default(),
            last_scan: None,
        }
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn settings(&self) -> &WindowSettings {
        &self.settings
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open the window: clear the filter and rescan.
    pub fn open<H: Colony + ?Sized>(&mut self, host: &H) {
        self.reset(host);
        self.open = true;
        log::info!("Wealth window opened");
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Clear the search text and filter, then rescan.
    pub fn reset<H: Colony + ?Sized>(&mut self, host: &H) {
        self.search_text.clear();
        self.filter = SearchFilter::default();
        self.scan(host);
    }

    /// Rebuild the tree. The view range reopens to [0, max] and both lists
    /// scroll back to the top.
    pub fn scan<H: Colony + ?Sized>(&mut self, host: &H) {
        self.watcher = host.recount_watcher();
        let options = ScanOptions {
            sources: self.sources,
            slave_multiplier: self.settings.slave_multiplier,
        };
        let summary = run_scan(host, &mut self.tree, &mut self.walker, &self.filter, &options);
        self.view.reset(max_wealth(&self.tree, self.mode));
        self.node_scroll.reset();
        self.target_scroll.reset();
        self.selected_wealth = 0.0;
        self.last_scan = Some(summary);
    }

    pub fn last_scan(&self) -> Option<&ScanSummary> {
        self.last_scan.as_ref()
    }

    pub fn tree(&self) -> &WealthTree {
        &self.tree
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Edit the search field without applying it.
    pub fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
    }

    /// Apply the search field as the filter and rescan.
    pub fn submit_search<H: Colony + ?Sized>(&mut self, host: &H) {
        self.filter = SearchFilter::new(&self.search_text);
        self.scan(host);
    }

    /// Set the search text and apply it in one step.
    pub fn set_filter<H: Colony + ?Sized>(&mut self, host: &H, text: &str) {
        self.set_search_text(text);
        self.submit_search(host);
    }

    pub fn group_mode(&self) -> GroupMode {
        self.mode
    }

    pub fn set_group_mode<H: Colony + ?Sized>(&mut self, host: &H, mode: GroupMode) {
        if self.mode != mode {
            self.mode = mode;
            self.scan(host);
        }
    }

    pub fn sources(&self) -> ScanSources {
        self.sources
    }

    pub fn set_sources<H: Colony + ?Sized>(&mut self, host: &H, sources: ScanSources) {
        if self.sources != sources {
            self.sources = sources;
            self.scan(host);
        }
    }

    pub fn view_range(&self) -> ViewRange {
        self.view.range()
    }

    /// Upper bound of the range slider.
    pub fn view_limit(&self) -> f32 {
        self.view.limit()
    }

    pub fn set_view_range(&mut self, min: f32, max: f32) {
        self.view.set_range(min, max);
        self.refresh_selected_wealth();
    }

    /// Nodes currently displayed, by wealth descending.
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        self.view.visible(&self.tree, self.mode)
    }

    /// Click the node at `index` of the visible list.
    pub fn click_node(&mut self, index: usize, modifier: ClickModifier) {
        let visible = self.visible_nodes();
        apply_click(&mut self.tree, &visible, index, modifier);
        self.selected_wealth = selected_wealth(&self.tree, &visible);
    }

    fn refresh_selected_wealth(&mut self) {
        let visible = self.visible_nodes();
        self.selected_wealth = selected_wealth(&self.tree, &visible);
    }

    pub fn selected_wealth(&self) -> f32 {
        self.selected_wealth
    }

    pub fn total(&self) -> f32 {
        self.tree.total()
    }

    pub fn watcher(&self) -> WatcherTotals {
        self.watcher
    }

    /// Lazy targets behind the selected visible nodes.
    pub fn targets<'a, H: Colony + ?Sized>(&'a self, host: &'a H) -> TargetIter<'a, H> {
        let tree = &self.tree;
        let selected = self
            .visible_nodes()
            .into_iter()
            .filter(|&id| tree.node(id).is_some_and(|n| n.selected));
        TargetIter::new(host, tree, selected)
    }

    pub fn info_text(&self) -> String {
        let w = &self.watcher;
        format!(
            "WealthGraph: (Buildings: {}, Floors: {}, Items: {}, Pawns: {})\nSelected Wealth: {} of {}",
            money(w.buildings),
            money(w.floors_only),
            money(w.items),
            money(w.pawns),
            money(self.selected_wealth),
            money(self.tree.total())
        )
    }

    /// The open hotkey was released with the configured modifier held.
    pub fn hotkey_fired(&self, input: &FrameInput) -> bool {
        let Some(combo) = self.bindings.combo_for(Action::ToggleWindow) else {
            return false;
        };
        input.released(combo.key) && input.modifiers.holds(self.settings.modifier_key)
    }

    /// Run one frame. While closed only the hotkey is checked.
    pub fn frame<H: Colony + ?Sized>(&mut self, host: &H, input: FrameInput) -> FrameOutput {
        let mut ui = Ui::new(input, self.theme.clone());

        if !self.open {
            if !self.hotkey_fired(&ui.input) {
                return FrameOutput {
                    draw: ui.draw,
                    jump: None,
                };
            }
            self.open(host);
        }

        let mut rescan = false;
        for key in ui.input.take_keys_pressed() {
            let combo = KeyCombo {
                modifiers: ui.input.modifiers,
                key,
            };
            match self.bindings.lookup(combo) {
                Some(Action::CloseWindow) => {
                    self.close();
                    return FrameOutput {
                        draw: ui.draw,
                        jump: None,
                    };
                }
                Some(Action::SubmitSearch) => {
                    self.filter = SearchFilter::new(&self.search_text);
                    rescan = true;
                }
                Some(Action::Rescan) => rescan = true,
                Some(Action::ToggleGrouping) => {
                    self.mode = self.mode.toggled();
                    rescan = true;
                }
                Some(Action::ToggleWindow) | None => {
                    if key == KeyCode::Backspace {
                        self.search_text.pop();
                    }
                }
            }
        }
        self.search_text
            .extend(ui.input.text.chars().filter(|c| !c.is_control()));

        let t = self.theme.clone();
        ui.panel(self.rect, t.window_bg, t.window_border);
        let inner = self.rect.contracted(t.window_padding);
        let (toolbar, map) = inner.split_top(t.toolbar_height);
        let (search_row, rest) = toolbar.split_top(t.toolbar_row_height);
        let (options_row, info_row) = rest.split_top(t.toolbar_row_height);

        // Scan button, search field, search button.
        let scan_label = "Scan Wealth";
        let (scan_rect, rest) =
            search_row.split_left(t.text_width(scan_label, t.font_small) + t.button_text_pad);
        if ui.button(scan_rect, scan_label) {
            rescan = true;
        }
        let (_, rest) = rest.split_left(t.toolbar_spacing);
        let (field_rect, search_rect) = rest.split_left(rest.width - t.search_button_width);
        ui.text_field(field_rect, &self.search_text);
        if ui.button(search_rect, "Search") {
            self.filter = SearchFilter::new(&self.search_text);
            rescan = true;
        }

        // Grouping and source toggles.
        let mut group = self.mode == GroupMode::ByCategory;
        let mut sources = self.sources;
        let mut row = options_row;
        for (label, value) in [
            ("Group by Category", &mut group),
            ("Show Buildings", &mut sources.buildings),
            ("Show Items", &mut sources.items),
            ("Show Pawns", &mut sources.pawns),
        ] {
            let (cell, after) = row.split_left(t.text_width(label, t.font_small) + t.checkbox_text_pad);
            if ui.checkbox(cell, label, value) {
                rescan = true;
            }
            row = after.split_left(t.toolbar_spacing).1;
        }
        self.mode = GroupMode::from_flag(group);
        self.sources = sources;

        ui.label(info_row, &self.info_text(), TextAnchor::UpperLeft, t.font_tiny);

        if rescan {
            self.scan(host);
        }

        let map = map.contracted(t.content_margin);
        let (slider_rect, graph) = map.split_top(t.slider_height);
        let range = self.view.range();
        let (mut lo, mut hi) = (range.min, range.max);
        if ui.float_range(slider_rect, &mut lo, &mut hi, self.view.limit()) {
            self.view.set_range(lo, hi);
        }

        let graph = graph.split_top(t.list_gap).1;
        let (nodes_rect, targets_rect) =
            graph.split_left(t.node_width + t.scrollbar_width + t.content_margin / 2.0);
        let targets_rect = targets_rect.split_left(t.content_margin).1;

        let visible = self.visible_nodes();
        // Sorted descending, so the first visible node is the view max.
        let view_max = visible
            .first()
            .and_then(|&id| self.tree.node(id))
            .map_or(0.0, |n| n.wealth);
        let bar_scale = if view_max != 0.0 { 1.0 / view_max } else { 1.0 };

        let node_list = VirtualList {
            viewport: nodes_rect,
            item_size: Size {
                width: t.node_width,
                height: t.node_height,
            },
            scrollbar_width: t.scrollbar_width,
            min_thumb_height: t.min_thumb_height,
            scroll_step: self.settings.scroll_step,
        };
        let mut clicked = None;
        let tree = &mut self.tree;
        node_list.show(&mut ui, &mut self.node_scroll, visible.iter().copied(), |ui, rect, index, id| {
            if let Some(node) = tree.node_mut(id) {
                node.layout_rect = rect;
                if draw_node(ui, rect, node, bar_scale) {
                    clicked = Some(index);
                }
            }
        });
        if let Some(index) = clicked {
            let modifier = ClickModifier::from_modifiers(ui.input.modifiers);
            apply_click(&mut self.tree, &visible, index, modifier);
        }

        let target_list = VirtualList {
            viewport: targets_rect,
            item_size: Size {
                width: (targets_rect.width - t.target_row_inset).max(0.0),
                height: t.target_row_height,
            },
            scrollbar_width: t.scrollbar_width,
            min_thumb_height: t.min_thumb_height,
            scroll_step: self.settings.scroll_step,
        };
        let mut jump = None;
        let targets = selection_targets(host, &self.tree, &visible);
        target_list.show(&mut ui, &mut self.target_scroll, targets, |ui, rect, _, target| {
            if draw_target_row(ui, host, rect, target) {
                jump = Some(target);
            }
        });

        self.selected_wealth = selected_wealth(&self.tree, &visible);

        // Wheel input over the window never reaches the map.
        ui.input.take_scroll(self.rect);

        if let Some(target) = jump {
            log::debug!("jump to {:?}", target);
        }
        FrameOutput {
            draw: ui.draw,
            jump,
        }
    }
}

/// Draw one node row. Returns true when the node was clicked.
fn draw_node(ui: &mut Ui, rect: Rect, node: &WealthNode, bar_scale: f32) -> bool {
    let t = &ui.theme;
    let (highlight, border, font_small, font_tiny) =
        (t.highlight, t.node_border, t.font_small, t.font_tiny);
    let (padding, bar_height, bar_thickness) = (t.node_padding, t.node_bar_height, t.node_bar_thickness);

    let outer = rect.contracted(padding / 3.0);
    if node.selected {
        ui.box_solid(outer, highlight);
    }
    ui.box_outline(outer, border, 1.0);

    let inner = outer.contracted(padding);
    let (upper, bar_row) = inner.split_top(inner.height - bar_height);
    let (icon_rect, text_rect) = upper.split_left(upper.height + 4.0);
    let icon = match node.key {
        NodeKey::Kind(k) => IconRef::Kind(k),
        NodeKey::Terrain(tr) => IconRef::Terrain(tr),
        NodeKey::Category(c) => IconRef::Category(c),
    };
    ui.icon(icon_rect.contracted(2.0), icon);

    ui.label(text_rect, &node.label, TextAnchor::UpperLeft, font_small);
    ui.label(text_rect, &money(node.wealth), TextAnchor::UpperRight, font_small);
    ui.label(
        text_rect,
        &format!("{} x ~${:.2}", node.instance_count(), node.average_value()),
        TextAnchor::LowerLeft,
        font_tiny,
    );

    let bar = Rect::new(
        bar_row.x,
        bar_row.y + (bar_row.height - bar_thickness) / 2.0,
        bar_row.width * (node.wealth * bar_scale).clamp(0.0, 1.0),
        bar_thickness,
    );
    ui.box_solid(bar, node.color);

    ui.input.take_click(inner)
}

/// Draw one target row. Returns true when the row was clicked.
fn draw_target_row<H: Colony + ?Sized>(ui: &mut Ui, host: &H, rect: Rect, target: Target) -> bool {
    let font = ui.theme.font_small;
    let icon_rect = Rect::new(rect.x, rect.y, rect.height, rect.height);
    let text_rect = rect.split_left(rect.height + 4.0).1;

    match target {
        Target::Thing(id) => {
            let Some(thing) = host.thing(id) else {
                return false;
            };
            ui.icon(icon_rect, IconRef::Thing(id));
            let value = thing_wealth(thing, host, 1.0)
                .map(money)
                .unwrap_or_else(|_| "?".to_string());
            let text = format!("{}: {}", label_cap(&thing.label), value);
            ui.label(text_rect, &text, TextAnchor::MiddleLeft, font);
        }
        Target::Cell(cell) => {
            let (width, _) = host.grid_size();
            let index = cell.y as usize * width + cell.x as usize;
            let Some(terrain) = host.terrain_at(index) else {
                return false;
            };
            ui.icon(icon_rect, IconRef::Terrain(terrain));
            let label = host
                .defs()
                .terrain(terrain)
                .map(|k| label_cap(&k.label))
                .unwrap_or_default();
            let value = host
                .terrain_unit_values()
                .get(terrain.0 as usize)
                .copied()
                .unwrap_or(0.0);
            let text = format!("{} ({}, {}): {}", label, cell.x, cell.y, money(value));
            ui.label(text_rect, &text, TextAnchor::MiddleLeft, font);
        }
    }
    ui.input.take_click(rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Cell, KindId, TerrainId, ThingClass};
    use crate::defs::{DefRegistry, TerrainKind, ThingKind};
    use crate::settings::ModifierKey;
    use crate::ui::ModifierFlags;
    use crate::world::World;

    const SWORD: KindId = KindId(1);
    const SAND: TerrainId = TerrainId(0);

    fn world() -> World {
        let mut defs = DefRegistry::new();
        defs.insert_kind(ThingKind {
            id: SWORD,
            label: "steel sword".into(),
            category: None,
            haulable: true,
            base_value: 100.0,
        });
        defs.insert_terrain(TerrainKind {
            id: SAND,
            label: "sand".into(),
            unit_value: 5.0,
        });
        let mut w = World::new(defs, 2, 2);
        w.tiles.fill_terrain(SAND);
        w.spawn(SWORD, "Steel Sword", ThingClass::Item { stack_count: 1 }, Cell { x: 0, y: 0 });
        w
    }

    fn released(key: KeyCode, modifiers: ModifierFlags) -> FrameInput {
        let mut input = FrameInput::new();
        input.keys_released.push(key);
        input.modifiers = modifiers;
        input
    }

    #[test]
    fn hotkey_requires_modifier() {
        let w = world();
        let settings = WindowSettings {
            modifier_key: ModifierKey::Alt,
            ..WindowSettings::default()
        };
        let mut win = WealthWindow::new(settings);
        win.frame(&w, released(KeyCode::F8, ModifierFlags::NONE));
        assert!(!win.is_open());

        let alt = ModifierFlags {
            alt: true,
            ..ModifierFlags::NONE
        };
        let out = win.frame(&w, released(KeyCode::F8, alt));
        assert!(win.is_open());
        assert!(!out.draw.is_empty());
        assert!((win.total() - 120.0).abs() < 0.01);
    }

    #[test]
    fn open_resets_filter() {
        let w = world();
        let mut win = WealthWindow::new(WindowSettings::default());
        win.open(&w);
        win.set_filter(&w, "gold");
        assert_eq!(win.total(), 0.0);
        win.open(&w);
        assert_eq!(win.search_text(), "");
        assert!((win.total() - 120.0).abs() < 0.01);
    }

    #[test]
    fn scan_resets_view_range() {
        let w = world();
        let mut win = WealthWindow::new(WindowSettings::default());
        win.open(&w);
        assert_eq!(win.view_range(), ViewRange { min: 0.0, max: 100.0 });
        win.set_view_range(50.0, 60.0);
        assert!(win.visible_nodes().is_empty());
        win.scan(&w);
        assert_eq!(win.visible_nodes().len(), 2);
    }

    #[test]
    fn escape_closes() {
        let w = world();
        let mut win = WealthWindow::new(WindowSettings::default());
        win.open(&w);
        let mut input = FrameInput::new();
        input.keys_pressed.push(KeyCode::Escape);
        win.frame(&w, input);
        assert!(!win.is_open());
    }

    #[test]
    fn typed_text_then_enter_filters() {
        let w = world();
        let mut win = WealthWindow::new(WindowSettings::default());
        win.open(&w);
        let mut input = FrameInput::new();
        input.text = "sand".into();
        win.frame(&w, input);
        assert_eq!(win.search_text(), "sand");
        // Not applied until submitted.
        assert!((win.total() - 120.0).abs() < 0.01);

        let mut input = FrameInput::new();
        input.keys_pressed.push(KeyCode::Enter);
        win.frame(&w, input);
        assert!((win.total() - 20.0).abs() < 0.01);
    }

    #[test]
    fn click_selects_and_sums() {
        let w = world();
        let mut win = WealthWindow::new(WindowSettings::default());
        win.open(&w);
        win.click_node(0, ClickModifier::Replace);
        assert!((win.selected_wealth() - 100.0).abs() < 0.01);
        win.click_node(1, ClickModifier::Toggle);
        assert!((win.selected_wealth() - 120.0).abs() < 0.01);
        assert!(win.info_text().contains("Selected Wealth: $120 of $120"));
    }

    #[test]
    fn frame_click_selects_node_row() {
        let w = world();
        let mut win = WealthWindow::new(WindowSettings::default());
        win.open(&w);
        win.frame(&w, FrameInput::new());
        let first = win.visible_nodes()[0];
        let r = win.tree().node(first).unwrap().layout_rect;
        assert!(r.height > 0.0);

        let (cx, cy) = (r.x + r.width / 2.0, r.y + r.height / 2.0);
        win.frame(&w, FrameInput::click_at(cx, cy, ModifierFlags::NONE));
        assert!(win.tree().node(first).unwrap().selected);
        assert!((win.selected_wealth() - 100.0).abs() < 0.01);
    }

    #[test]
    fn targets_list_and_jump() {
        let mut w = world();
        let mut win = WealthWindow::new(WindowSettings::default());
        win.open(&w);
        // Sand (4 tiles × 5) sorts below the sword (100).
        win.click_node(1, ClickModifier::Replace);
        let targets: Vec<Target> = win.targets(&w).collect();
        assert_eq!(targets.len(), 4);
        assert_eq!(targets[0], Target::Cell(Cell { x: 0, y: 0 }));

        // First frame lays out the target list; click its first row.
        let out = win.frame(&w, FrameInput::new());
        let row = out
            .draw
            .texts_containing("Sand (0, 0)")
            .next()
            .map(|t| (t.x, t.y + t.height / 2.0));
        let (x, y) = row.unwrap();
        let out = win.frame(&w, FrameInput::click_at(x + 1.0, y, ModifierFlags::NONE));
        assert_eq!(out.jump, Some(Target::Cell(Cell { x: 0, y: 0 })));
        out.jump_camera(&mut w);
        assert_eq!(w.camera, Some(Target::Cell(Cell { x: 0, y: 0 })));
    }

    #[test]
    fn grouping_toggle_rescans() {
        let w = world();
        let mut win = WealthWindow::new(WindowSettings::default());
        win.open(&w);
        win.set_group_mode(&w, GroupMode::ByCategory);
        let visible = win.visible_nodes();
        assert_eq!(visible.len(), 2); // Unknown and Floors
        assert_eq!(win.view_limit(), 100.0);
    }
}
