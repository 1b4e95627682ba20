use serde::{Deserialize, Serialize};

/// Modifier that must be held when the window hotkey is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModifierKey {
    #[default]
    None,
    Alt,
    Command,
    Control,
    Shift,
}

/// User-facing window settings. Loaded from RON; every field has a
/// default so partial files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub modifier_key: ModifierKey,
    pub show_buildings: bool,
    pub show_items: bool,
    pub show_pawns: bool,
    pub group_by_category: bool,
    /// Factor applied to the market value of slave pawns.
    pub slave_multiplier: f32,
    /// Pixels scrolled per wheel notch.
    pub scroll_step: f32,
    /// Seed for per-node layout colors.
    pub color_seed: u64,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            modifier_key: ModifierKey::None,
            show_buildings: true,
            show_items: true,
            show_pawns: true,
            group_by_category: false,
            slave_multiplier: 0.75,
            scroll_step: 20.0,
            color_seed: 0x5EED,
        }
    }
}

impl WindowSettings {
    /// Parse settings from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}
