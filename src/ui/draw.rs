use crate::components::{CategoryId, KindId, TerrainId, ThingId};

/// Intermediate draw command for a filled and/or outlined box.
#[derive(Debug, Clone)]
pub struct PanelCommand {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub bg_color: [f32; 4],     // sRGB RGBA
    pub border_color: [f32; 4], // sRGB RGBA
    pub border_width: f32,
}

/// Where text sits inside its rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    UpperLeft,
    UpperRight,
    MiddleLeft,
    MiddleCenter,
    LowerLeft,
}

/// Intermediate draw command for a text run laid out inside a rect.
#[derive(Debug, Clone)]
pub struct TextCommand {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: [f32; 4], // sRGB RGBA
    pub font_size: f32,
    pub anchor: TextAnchor,
}

/// Which definition or instance icon the host should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconRef {
    Kind(KindId),
    Terrain(TerrainId),
    Category(CategoryId),
    Thing(ThingId),
}

#[derive(Debug, Clone)]
pub struct IconCommand {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub icon: IconRef,
}

/// Collects draw commands for one frame.
/// Decouples window logic from whatever renders it.
#[derive(Debug, Default)]
pub struct DrawList {
    pub panels: Vec<PanelCommand>,
    pub texts: Vec<TextCommand>,
    pub icons: Vec<IconCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.panels.clear();
        self.texts.clear();
        self.icons.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty() && self.texts.is_empty() && self.icons.is_empty()
    }

    /// Text runs containing `needle`, in draw order.
    pub fn texts_containing<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a TextCommand> {
        self.texts.iter().filter(move |t| t.text.contains(needle))
    }
}
