use smallvec::SmallVec;
use winit::keyboard::KeyCode;

use super::Rect;
use super::keybindings::ModifierFlags;

/// Mouse button identifier (decoupled from winit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Everything the window reads from the host input system in one frame.
///
/// Widgets consume the events they handle (`take_*`) so a click or wheel
/// notch is acted on by exactly one control.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Cursor position in screen coords.
    pub cursor: (f32, f32),
    /// Button that went down this frame.
    pub pressed: Option<MouseButton>,
    /// Button released this frame (a completed click).
    pub clicked: Option<MouseButton>,
    /// Left button currently held.
    pub left_down: bool,
    pub modifiers: ModifierFlags,
    /// Wheel delta in notches (positive = scroll down).
    pub scroll: f32,
    pub keys_pressed: SmallVec<[KeyCode; 4]>,
    pub keys_released: SmallVec<[KeyCode; 4]>,
    /// Text typed this frame.
    pub text: String,
}

impl FrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor at (x, y), nothing else happening.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            cursor: (x, y),
            ..Self::default()
        }
    }

    /// A completed left click at (x, y) with the given modifiers held.
    pub fn click_at(x: f32, y: f32, modifiers: ModifierFlags) -> Self {
        Self {
            cursor: (x, y),
            clicked: Some(MouseButton::Left),
            modifiers,
            ..Self::default()
        }
    }

    pub fn hovering(&self, rect: Rect) -> bool {
        rect.contains(self.cursor.0, self.cursor.1)
    }

    /// Consume a left click inside `rect`.
    pub fn take_click(&mut self, rect: Rect) -> bool {
        if self.clicked == Some(MouseButton::Left) && self.hovering(rect) {
            self.clicked = None;
            return true;
        }
        false
    }

    /// Consume a left press inside `rect`.
    pub fn take_press(&mut self, rect: Rect) -> bool {
        if self.pressed == Some(MouseButton::Left) && self.hovering(rect) {
            self.pressed = None;
            return true;
        }
        false
    }

    /// Consume the wheel delta if the cursor is over `rect`.
    pub fn take_scroll(&mut self, rect: Rect) -> Option<f32> {
        if self.scroll != 0.0 && self.hovering(rect) {
            let delta = self.scroll;
            self.scroll = 0.0;
            return Some(delta);
        }
        None
    }

    /// Consume every pending key press and return them.
    pub fn take_keys_pressed(&mut self) -> SmallVec<[KeyCode; 4]> {
        std::mem::take(&mut self.keys_pressed)
    }

    pub fn released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }
}
