use super::draw::{IconCommand, IconRef, PanelCommand, TextAnchor, TextCommand};
use super::{Rect, Ui};

impl Ui {
    pub fn box_solid(&mut self, rect: Rect, color: [f32; 4]) {
        self.draw.panels.push(PanelCommand {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            bg_color: color,
            border_color: [0.0; 4],
            border_width: 0.0,
        });
    }

    pub fn box_outline(&mut self, rect: Rect, color: [f32; 4], width: f32) {
        self.draw.panels.push(PanelCommand {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            bg_color: [0.0; 4],
            border_color: color,
            border_width: width,
        });
    }

    pub fn panel(&mut self, rect: Rect, bg: [f32; 4], border: [f32; 4]) {
        self.draw.panels.push(PanelCommand {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            bg_color: bg,
            border_color: border,
            border_width: 1.0,
        });
    }

    pub fn label(&mut self, rect: Rect, text: &str, anchor: TextAnchor, font_size: f32) {
        let color = self.theme.text;
        self.label_colored(rect, text, anchor, font_size, color);
    }

    pub fn label_colored(
        &mut self,
        rect: Rect,
        text: &str,
        anchor: TextAnchor,
        font_size: f32,
        color: [f32; 4],
    ) {
        self.draw.texts.push(TextCommand {
            text: text.to_string(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            color,
            font_size,
            anchor,
        });
    }

    pub fn icon(&mut self, rect: Rect, icon: IconRef) {
        self.draw.icons.push(IconCommand {
            x: rect.x,
            y: rect.y,
            size: rect.width.min(rect.height),
            icon,
        });
    }

    /// Text button. Returns true when clicked this frame.
    pub fn button(&mut self, rect: Rect, text: &str) -> bool {
        let (bg, border) = (self.theme.button_bg, self.theme.button_border);
        self.panel(rect, bg, border);
        let size = self.theme.font_small;
        self.label(rect, text, TextAnchor::MiddleCenter, size);
        self.input.take_click(rect)
    }

    /// Labeled checkbox. Flips `value` and returns true when clicked.
    pub fn checkbox(&mut self, rect: Rect, text: &str, value: &mut bool) -> bool {
        let size = self.theme.font_small;
        let box_size = (rect.height * 0.6).min(24.0);
        let (text_rect, rest) = rect.split_left(rect.width - box_size - 4.0);
        let check = Rect::new(
            rest.right() - box_size,
            rect.y + (rect.height - box_size) / 2.0,
            box_size,
            box_size,
        );
        self.label(text_rect, text, TextAnchor::MiddleLeft, size);
        let fill = if *value {
            self.theme.checkbox_on
        } else {
            self.theme.checkbox_off
        };
        let border = self.theme.button_border;
        self.panel(check, fill, border);

        if self.input.take_click(rect) {
            *value = !*value;
            return true;
        }
        false
    }

    /// Single-line text field showing `text`. Editing is driven by the
    /// owner from `FrameInput::text`.
    pub fn text_field(&mut self, rect: Rect, text: &str) {
        let (bg, border) = (self.theme.field_bg, self.theme.button_border);
        self.panel(rect, bg, border);
        let size = self.theme.font_small;
        self.label(rect.contracted(4.0), text, TextAnchor::MiddleLeft, size);
    }

    /// Two-handle range slider over [0, limit]. A press moves whichever
    /// handle is nearer the cursor. Returns true when either value changed.
    pub fn float_range(&mut self, rect: Rect, lo: &mut f32, hi: &mut f32, limit: f32) -> bool {
        let theme = &self.theme;
        let (track_color, fill_color, handle_color) =
            (theme.slider_track, theme.slider_fill, theme.button_border);
        let handle_w = theme.slider_handle_width;
        let font = theme.font_tiny;

        let track = Rect::new(rect.x, rect.y + rect.height / 2.0 - 2.0, rect.width, 4.0);
        self.box_solid(track, track_color);

        let to_x = |v: f32| {
            if limit > 0.0 {
                rect.x + (v / limit).clamp(0.0, 1.0) * rect.width
            } else {
                rect.x
            }
        };

        let mut changed = false;
        if self.input.left_down && self.input.hovering(rect) {
            let t = ((self.input.cursor.0 - rect.x) / rect.width.max(1.0)).clamp(0.0, 1.0);
            let v = t * limit.max(0.0);
            let near_lo = (v - *lo).abs() <= (v - *hi).abs();
            if near_lo && v <= *hi {
                changed = v != *lo;
                *lo = v;
            } else {
                changed = v != *hi;
                *hi = v.max(*lo);
            }
            self.input.pressed = None;
        }

        let (lx, hx) = (to_x(*lo), to_x(*hi));
        self.box_solid(Rect::new(lx, track.y, (hx - lx).max(0.0), track.height), fill_color);
        for x in [lx, hx] {
            self.box_solid(
                Rect::new(x - handle_w / 2.0, rect.y, handle_w, rect.height),
                handle_color,
            );
        }

        let (left, right) = rect.split_left(rect.width / 2.0);
        self.label(left, &format!("{:.0}", *lo), TextAnchor::UpperLeft, font);
        self.label(right, &format!("{:.0}", *hi), TextAnchor::UpperRight, font);
        changed
    }
}

#[cfg(test)]
mod tests {
    use crate::ui::{FrameInput, ModifierFlags, Rect, Theme, Ui};

    #[test]
    fn button_click() {
        let mut ui = Ui::new(
            FrameInput::click_at(20.0, 10.0, ModifierFlags::NONE),
            Theme::default(),
        );
        assert!(!ui.button(Rect::new(100.0, 0.0, 80.0, 32.0), "Search"));
        assert!(ui.button(Rect::new(0.0, 0.0, 80.0, 32.0), "Scan Wealth"));
        assert_eq!(ui.draw.texts.len(), 2);
    }

    #[test]
    fn checkbox_toggles() {
        let mut ui = Ui::new(
            FrameInput::click_at(5.0, 5.0, ModifierFlags::NONE),
            Theme::default(),
        );
        let mut value = false;
        assert!(ui.checkbox(Rect::new(0.0, 0.0, 150.0, 32.0), "Show Items", &mut value));
        assert!(value);
    }

    #[test]
    fn range_drag_moves_nearest_handle() {
        let rect = Rect::new(0.0, 0.0, 100.0, 24.0);
        let (mut lo, mut hi) = (0.0, 1000.0);

        let mut input = FrameInput::at(80.0, 10.0);
        input.left_down = true;
        let mut ui = Ui::new(input, Theme::default());
        assert!(ui.float_range(rect, &mut lo, &mut hi, 1000.0));
        assert_eq!(lo, 0.0);
        assert!((hi - 800.0).abs() < 0.01);

        let mut input = FrameInput::at(10.0, 10.0);
        input.left_down = true;
        let mut ui = Ui::new(input, Theme::default());
        assert!(ui.float_range(rect, &mut lo, &mut hi, 1000.0));
        assert!((lo - 100.0).abs() < 0.01);
    }

    #[test]
    fn range_idle_unchanged() {
        let mut ui = Ui::new(FrameInput::at(50.0, 10.0), Theme::default());
        let (mut lo, mut hi) = (10.0, 20.0);
        assert!(!ui.float_range(Rect::new(0.0, 0.0, 100.0, 24.0), &mut lo, &mut hi, 100.0));
        assert_eq!((lo, hi), (10.0, 20.0));
    }
}
