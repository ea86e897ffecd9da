//! Multi-line text blocks.

use super::SerializableColor;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;

/// Average glyph advance as a multiple of the font size, used when no font
/// metrics are available.
pub const AVERAGE_ADVANCE_FACTOR: f64 = 0.6;

/// Font family options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
    Hand,
}

impl FontFamily {
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Sans => "sans",
            FontFamily::Serif => "serif",
            FontFamily::Mono => "mono",
            FontFamily::Hand => "hand",
        }
    }

    pub fn all() -> &'static [FontFamily] {
        &[FontFamily::Sans, FontFamily::Serif, FontFamily::Mono, FontFamily::Hand]
    }
}

/// A block of text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Top-left corner of the first line.
    pub position: Point,
    pub lines: Vec<String>,
    pub font_size: f64,
    pub color: SerializableColor,
    #[serde(default)]
    pub font_family: FontFamily,
}

impl TextBlock {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    pub fn new(position: Point, text: &str) -> Self {
        Self {
            position,
            lines: text.split('\n').map(str::to_owned).collect(),
            font_size: Self::DEFAULT_FONT_SIZE,
            color: SerializableColor::black(),
            font_family: FontFamily::default(),
        }
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT_FACTOR
    }

    /// Estimated advance width of one line, at 0.6 em per character.
    ///
    /// Bounds, hit testing and handles all use this estimate. Rendered glyphs
    /// can be narrower or wider, so the box is only approximate for
    /// proportional fonts.
    pub fn line_width(&self, line: &str) -> f64 {
        line.chars().count() as f64 * self.font_size * AVERAGE_ADVANCE_FACTOR
    }

    /// Widest line.
    pub fn width(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| self.line_width(l))
            .fold(0.0, f64::max)
    }

    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.line_height()
    }

    /// True when every line is empty.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split() {
        let text = TextBlock::new(Point::ZERO, "one\ntwo\n");
        assert_eq!(text.lines, vec!["one", "two", ""]);
        assert_eq!(text.text(), "one\ntwo\n");
    }

    #[test]
    fn test_measurements() {
        let text = TextBlock::new(Point::ZERO, "abcd\nab").with_font_size(10.0);
        assert!((text.width() - 24.0).abs() < 1e-9);
        assert!((text.height() - 28.0).abs() < 1e-9);
    }

    #[test]
    fn test_blank() {
        assert!(TextBlock::new(Point::ZERO, " \n").is_blank());
        assert!(!TextBlock::new(Point::ZERO, "x").is_blank());
    }
}
