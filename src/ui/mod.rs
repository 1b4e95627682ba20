mod draw;
mod input;
pub mod keybindings;
mod theme;
mod virtual_list;
mod widgets;

pub use draw::{DrawList, IconCommand, IconRef, PanelCommand, TextAnchor, TextCommand};
pub use input::{FrameInput, MouseButton};
pub use keybindings::{Action, KeyBindings, KeyCombo, ModifierFlags};
pub use theme::{Theme, hsv};
pub use virtual_list::{ScrollState, VirtualList};

// ---------------------------------------------------------------------------
// Geometry primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns true if the point (px, py) is inside this rectangle.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Strict overlap: rectangles sharing only an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Shrink by `by` on every side. Never goes negative.
    pub fn contracted(&self, by: f32) -> Rect {
        Rect {
            x: self.x + by,
            y: self.y + by,
            width: (self.width - 2.0 * by).max(0.0),
            height: (self.height - 2.0 * by).max(0.0),
        }
    }

    /// Split into a top strip of `height` and the remainder.
    pub fn split_top(&self, height: f32) -> (Rect, Rect) {
        let h = height.clamp(0.0, self.height);
        (
            Rect::new(self.x, self.y, self.width, h),
            Rect::new(self.x, self.y + h, self.width, self.height - h),
        )
    }

    /// Split into a left strip of `width` and the remainder.
    pub fn split_left(&self, width: f32) -> (Rect, Rect) {
        let w = width.clamp(0.0, self.width);
        (
            Rect::new(self.x, self.y, w, self.height),
            Rect::new(self.x + w, self.y, self.width - w, self.height),
        )
    }

    /// Rightmost `width` pixels.
    pub fn right_part(&self, width: f32) -> Rect {
        let w = width.clamp(0.0, self.width);
        Rect::new(self.right() - w, self.y, w, self.height)
    }
}

/// Per-frame immediate-mode context: this frame's input, the draw list
/// being built, and the theme.
pub struct Ui {
    pub input: FrameInput,
    pub draw: DrawList,
    pub theme: Theme,
}

impl Ui {
    pub fn new(input: FrameInput, theme: Theme) -> Self {
        Self {
            input,
            draw: DrawList::new(),
            theme,
        }
    }
}
