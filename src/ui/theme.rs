/// Centralized visual style constants for the wealth window.
///
/// Single theme, no runtime switching. Drawing code reads sizes and
/// colors from here instead of hardcoding them.
#[derive(Debug, Clone)]
pub struct Theme {
    // -- Color palette (sRGB RGBA) --
    pub window_bg: [f32; 4],
    pub window_border: [f32; 4],
    pub text: [f32; 4],
    pub text_dim: [f32; 4],
    /// Fill behind selected nodes.
    pub highlight: [f32; 4],
    /// Outline around every node.
    pub node_border: [f32; 4],
    pub button_bg: [f32; 4],
    pub button_border: [f32; 4],
    pub field_bg: [f32; 4],
    pub checkbox_on: [f32; 4],
    pub checkbox_off: [f32; 4],
    pub slider_track: [f32; 4],
    pub slider_fill: [f32; 4],
    pub scrollbar_color: [f32; 4],

    // -- Fonts --
    /// "Small" game font size in pixels.
    pub font_small: f32,
    /// "Tiny" game font size in pixels.
    pub font_tiny: f32,
    /// Rough glyph advance as a fraction of font size.
    pub glyph_width_ratio: f32,

    // -- Window layout --
    pub window_width: f32,
    pub window_height: f32,
    pub window_padding: f32,
    pub toolbar_height: f32,
    pub toolbar_row_height: f32,
    /// Horizontal gap after each toolbar control.
    pub toolbar_spacing: f32,
    /// Extra width added to a button's text.
    pub button_text_pad: f32,
    /// Extra width added to a checkbox label (box + gap).
    pub checkbox_text_pad: f32,
    pub search_button_width: f32,
    pub content_margin: f32,
    pub slider_height: f32,
    pub slider_handle_width: f32,
    /// Gap between the slider and the lists.
    pub list_gap: f32,

    // -- Node rows --
    pub node_padding: f32,
    pub node_width: f32,
    pub node_height: f32,
    pub node_bar_height: f32,
    pub node_bar_thickness: f32,

    // -- Target rows --
    pub target_row_height: f32,
    /// Target rows are this much narrower than their list.
    pub target_row_inset: f32,

    // -- Scrollbar --
    pub scrollbar_width: f32,
    pub min_thumb_height: f32,
}

/// Convert a hex color (#RRGGBB) to sRGB [f32; 4] with alpha 1.0.
const fn hex(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// Convert a hex color with custom alpha.
const fn hex_a(r: u8, g: u8, b: u8, a: f32) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a]
}

/// HSV (all components 0..1) to opaque RGBA.
pub fn hsv(h: f32, s: f32, v: f32) -> [f32; 4] {
    let h = (h.rem_euclid(1.0)) * 6.0;
    let c = v * s;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m, 1.0]
}

impl Theme {
    /// Approximate rendered width of `text` at `font_size`.
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * self.glyph_width_ratio
    }
}

impl Default for Theme {
    fn default() -> Self {
        let node_padding = 6.0;
        Self {
            window_bg: hex_a(0x15, 0x19, 0x1D, 0.97),
            window_border: hex(0x61, 0x61, 0x61),
            text: hex(0xFF, 0xFF, 0xFF),
            text_dim: hex(0x9E, 0x9E, 0x9E),
            highlight: [0.25, 0.25, 0.25, 1.0],
            node_border: [0.5, 0.5, 0.5, 1.0],
            button_bg: hex(0x3A, 0x3F, 0x46),
            button_border: hex(0x8A, 0x8A, 0x8A),
            field_bg: hex(0x0C, 0x0E, 0x10),
            checkbox_on: hex(0x6C, 0xB0, 0x4C),
            checkbox_off: hex(0x5A, 0x5A, 0x5A),
            slider_track: hex(0x40, 0x40, 0x40),
            slider_fill: hex_a(0xC8, 0xA8, 0x50, 0.8),
            scrollbar_color: hex_a(0xA0, 0xA0, 0xA0, 0.6),

            font_small: 14.0,
            font_tiny: 10.0,
            glyph_width_ratio: 0.55,

            window_width: 750.0,
            window_height: 800.0,
            window_padding: 18.0,
            toolbar_height: 96.0,
            toolbar_row_height: 32.0,
            toolbar_spacing: 16.0,
            button_text_pad: 32.0,
            checkbox_text_pad: 34.0,
            search_button_width: 80.0,
            content_margin: 8.0,
            slider_height: 24.0,
            slider_handle_width: 8.0,
            list_gap: 8.0,

            node_padding,
            node_width: 320.0 + node_padding,
            node_height: 64.0 + node_padding,
            node_bar_height: 16.0,
            node_bar_thickness: 8.0,

            target_row_height: 32.0,
            target_row_inset: 20.0,

            scrollbar_width: 16.0,
            min_thumb_height: 20.0,
        }
    }
}
