use super::draw::PanelCommand;
use super::{Rect, Size, Ui};

/// Active scrollbar thumb drag state.
#[derive(Debug, Clone, Copy)]
struct ScrollDrag {
    start_mouse_y: f32,
    start_scroll_offset: f32,
}

/// Per-list scroll state that survives between frames.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    pub offset: f32,
    drag: Option<ScrollDrag>,
    /// Virtual height measured last frame.
    content_height: f32,
}

impl ScrollState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }
}

/// Scrollable list of fixed-size rows. Rows outside the viewport are
/// counted but never drawn.
#[derive(Debug, Clone, Copy)]
pub struct VirtualList {
    pub viewport: Rect,
    pub item_size: Size,
    pub scrollbar_width: f32,
    pub min_thumb_height: f32,
    /// Pixels per wheel notch.
    pub scroll_step: f32,
}

impl VirtualList {
    /// max(viewport height, count × item height).
    pub fn virtual_height(&self, count: usize) -> f32 {
        (count as f32 * self.item_size.height).max(self.viewport.height)
    }

    pub fn max_scroll(&self, content_height: f32) -> f32 {
        (content_height - self.viewport.height).max(0.0)
    }

    /// Screen rect of row `index` at the given scroll offset.
    pub fn row_rect(&self, index: usize, offset: f32) -> Rect {
        Rect::new(
            self.viewport.x,
            self.viewport.y + index as f32 * self.item_size.height - offset,
            self.item_size.width,
            self.item_size.height,
        )
    }

    fn thumb_height(&self, content_height: f32) -> f32 {
        let vh = self.viewport.height;
        (vh * vh / content_height).max(self.min_thumb_height)
    }

    fn track(&self) -> Rect {
        self.viewport.right_part(self.scrollbar_width)
    }

    /// Run one frame of the list: apply scrollbar drag and wheel input,
    /// pull every item from `items`, call `draw_item` for the rows that
    /// overlap the viewport, and draw the scrollbar. Returns the item count.
    pub fn show<I, T, F>(&self, ui: &mut Ui, state: &mut ScrollState, items: I, mut draw_item: F) -> usize
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&mut Ui, Rect, usize, T),
    {
        self.update_drag(ui, state);

        // Rows only take clicks that land inside the viewport.
        let held_click = if ui.input.hovering(self.viewport) {
            None
        } else {
            ui.input.clicked.take()
        };

        let mut count = 0;
        for (index, item) in items.into_iter().enumerate() {
            let row = self.row_rect(index, state.offset);
            if row.overlaps(&self.viewport) {
                draw_item(ui, row, index, item);
            }
            count = index + 1;
        }

        if held_click.is_some() {
            ui.input.clicked = held_click;
        }

        state.content_height = self.virtual_height(count);
        let max_scroll = self.max_scroll(state.content_height);

        if let Some(notches) = ui.input.take_scroll(self.viewport) {
            state.offset += notches * self.scroll_step;
        }
        state.offset = state.offset.clamp(0.0, max_scroll);

        self.draw_scrollbar(ui, state);
        count
    }

    fn update_drag(&self, ui: &mut Ui, state: &mut ScrollState) {
        let content_height = state.content_height.max(self.viewport.height);
        let max_scroll = self.max_scroll(content_height);

        if let Some(drag) = state.drag {
            if !ui.input.left_down {
                state.drag = None;
                return;
            }
            let available_track = self.viewport.height - self.thumb_height(content_height);
            if available_track > 0.0 {
                let delta_y = ui.input.cursor.1 - drag.start_mouse_y;
                let new_offset = drag.start_scroll_offset + delta_y * max_scroll / available_track;
                state.offset = new_offset.clamp(0.0, max_scroll);
            }
            return;
        }

        if max_scroll > 0.0 && ui.input.take_press(self.track()) {
            state.drag = Some(ScrollDrag {
                start_mouse_y: ui.input.cursor.1,
                start_scroll_offset: state.offset,
            });
        }
    }

    /// Scrollbar thumb (auto-hides when content fits).
    fn draw_scrollbar(&self, ui: &mut Ui, state: &ScrollState) {
        let viewport_h = self.viewport.height;
        let total_h = state.content_height;
        if total_h <= viewport_h || viewport_h <= 0.0 {
            return;
        }
        let thumb_h = self.thumb_height(total_h);
        let track_range = viewport_h - thumb_h;
        let max_scroll = self.max_scroll(total_h);
        let thumb_y = if max_scroll > 0.0 {
            self.viewport.y + (state.offset / max_scroll) * track_range
        } else {
            self.viewport.y
        };
        let track = self.track();
        let color = ui.theme.scrollbar_color;
        ui.draw.panels.push(PanelCommand {
            x: track.x,
            y: thumb_y,
            width: track.width,
            height: thumb_h,
            bg_color: color,
            border_color: [0.0; 4],
            border_width: 0.0,
        });
    }
}
