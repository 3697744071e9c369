//! FILENAME: model/src/style.rs
//! PURPOSE: Defines the style data structures shared by report elements.
//! CONTEXT: Elements carry their style inline (reports have tens of elements,
//! not millions of cells, so no registry indirection is needed). Writers map
//! these onto their backend: PDF font objects, CSS, XLSX formats.

use serde::{Deserialize, Serialize};

/// Horizontal alignment of text within an element's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// RGB color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8, // Alpha channel (255 = opaque)
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub const fn black() -> Self {
        Color::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Color::new(255, 255, 255)
    }

    /// Convert to CSS rgba() string.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.2})",
                self.r,
                self.g,
                self.b,
                self.a as f32 / 255.0
            )
        }
    }

    /// Parse from hex string (e.g., "#FF0000" or "FF0000").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::new(r, g, b))
        } else if hex.len() == 8 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(Color::with_alpha(r, g, b, a))
        } else {
            None
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}

/// The built-in PDF font families. Every PDF viewer ships these, so
/// documents need no embedded font data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    /// Average glyph width as a fraction of the font size, used to estimate
    /// text width for alignment. Courier is exact (monospace); the others
    /// are the conventional approximations for Latin text.
    pub fn average_char_width(&self) -> f64 {
        match self {
            FontFamily::Helvetica => 0.5,
            FontFamily::Times => 0.48,
            FontFamily::Courier => 0.6,
        }
    }
}

/// Font configuration for a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size: f32, // Font size in points
    pub bold: bool,
    pub italic: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        FontSpec {
            family: FontFamily::Helvetica,
            size: 10.0,
            bold: false,
            italic: false,
        }
    }
}

impl FontSpec {
    /// Estimated width in points of `text` set in this font.
    pub fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.size as f64 * self.family.average_char_width()
    }
}

/// Complete style for a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ElementStyle {
    pub font: FontSpec,
    pub color: Color,
    pub text_align: TextAlign,
}

impl ElementStyle {
    pub fn new() -> Self {
        ElementStyle::default()
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.font.italic = italic;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.font.size = size;
        self
    }

    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.font.family = family;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }
}

/// Dash pattern for lines and borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DashPattern {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Stroke style for graphic elements and band borders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub width: f32, // Stroke width in points
    pub color: Color,
    pub dash: DashPattern,
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle {
            width: 1.0,
            color: Color::black(),
            dash: DashPattern::Solid,
        }
    }
}

impl LineStyle {
    pub fn new(width: f32) -> Self {
        LineStyle {
            width,
            ..LineStyle::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_dash(mut self, dash: DashPattern) -> Self {
        self.dash = dash;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_roundtrip() {
        let color = Color::from_hex("#1A2B3C").unwrap();
        assert_eq!(color, Color::new(0x1A, 0x2B, 0x3C));
        assert_eq!(color.to_css(), "#1a2b3c");
        assert!(Color::from_hex("xyz").is_none());
    }

    #[test]
    fn test_style_builders() {
        let style = ElementStyle::new()
            .with_bold(true)
            .with_size(12.0)
            .with_align(TextAlign::Right);
        assert!(style.font.bold);
        assert_eq!(style.font.size, 12.0);
        assert_eq!(style.text_align, TextAlign::Right);
    }

    #[test]
    fn test_text_width_monospace() {
        let font = FontSpec {
            family: FontFamily::Courier,
            size: 10.0,
            ..FontSpec::default()
        };
        assert_eq!(font.text_width("abcd"), 4.0 * 10.0 * 0.6);
    }
}
