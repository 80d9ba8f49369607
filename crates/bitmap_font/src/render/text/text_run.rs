//! Text runs: the immutable inputs of one layout pass

use serde::{Deserialize, Serialize};

use crate::foundation::math::{colors, Color};

/// Horizontal alignment of each line inside its text box
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextAlignment {
    /// Lines start at the box's left edge
    #[default]
    Left,
    /// Lines are centered on the box's horizontal midpoint
    Center,
    /// Lines end at the box's right edge
    Right,
}

/// Screen-space rectangle text is laid out into
///
/// `y` grows downward. A box may have unbounded height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width lines wrap at
    pub width: f32,
    /// Height text is truncated at (`f32::INFINITY` for none)
    #[serde(default = "unbounded")]
    pub height: f32,
}

const fn unbounded() -> f32 {
    f32::INFINITY
}

impl TextBox {
    /// Create a bounded text box
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a text box that never truncates vertically
    #[must_use]
    pub const fn unbounded_height(x: f32, y: f32, width: f32) -> Self {
        Self::new(x, y, width, f32::INFINITY)
    }

    /// Right edge
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Horizontal midpoint
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Pen x at which a fresh line starts for the given alignment
    #[must_use]
    pub fn line_anchor(&self, alignment: TextAlignment) -> f32 {
        match alignment {
            TextAlignment::Left => self.x,
            TextAlignment::Center => self.center_x(),
            TextAlignment::Right => self.right(),
        }
    }
}

/// Snapshot of everything a layout pass needs besides the atlas metrics
///
/// Runs are built with the `with_*` methods and never change once handed to
/// a font; re-layout means replacing the run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    text: String,
    bounds: TextBox,
    alignment: TextAlignment,
    point_size: f32,
    color: Color,
    kerning: bool,
}

impl TextRun {
    /// Create a left-aligned, white, kerned run at the given point size
    pub fn new(text: impl Into<String>, bounds: TextBox, point_size: f32) -> Self {
        Self {
            text: text.into(),
            bounds,
            alignment: TextAlignment::Left,
            point_size,
            color: colors::white(),
            kerning: true,
        }
    }

    /// Set the alignment
    #[must_use]
    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the color
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the point size
    #[must_use]
    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }

    /// Enable or disable kerning
    #[must_use]
    pub fn with_kerning(mut self, kerning: bool) -> Self {
        self.kerning = kerning;
        self
    }

    /// Text content
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Layout rectangle
    #[must_use]
    pub const fn bounds(&self) -> &TextBox {
        &self.bounds
    }

    /// Line alignment
    #[must_use]
    pub const fn alignment(&self) -> TextAlignment {
        self.alignment
    }

    /// Requested point size
    #[must_use]
    pub const fn point_size(&self) -> f32 {
        self.point_size
    }

    /// Text color
    #[must_use]
    pub const fn color(&self) -> &Color {
        &self.color
    }

    /// Whether kerning pairs are applied
    #[must_use]
    pub const fn kerning(&self) -> bool {
        self.kerning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_edges() {
        let bounds = TextBox::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(bounds.right(), 110.0);
        assert_eq!(bounds.bottom(), 70.0);
        assert_eq!(bounds.line_anchor(TextAlignment::Left), 10.0);
        assert_eq!(bounds.line_anchor(TextAlignment::Center), 60.0);
        assert_eq!(bounds.line_anchor(TextAlignment::Right), 110.0);
    }

    #[test]
    fn test_unbounded_height() {
        let bounds = TextBox::unbounded_height(0.0, 0.0, 10.0);
        assert!(bounds.bottom().is_infinite());
    }

    #[test]
    fn test_box_from_toml_defaults_to_unbounded() {
        let bounds: TextBox = toml::from_str("x = 1.0\ny = 2.0\nwidth = 30.0\n").unwrap();
        assert_eq!(bounds.width, 30.0);
        assert!(bounds.height.is_infinite());
    }

    #[test]
    fn test_run_builder() {
        let run = TextRun::new("hi", TextBox::new(0.0, 0.0, 10.0, 10.0), 16.0)
            .with_alignment(TextAlignment::Right)
            .with_kerning(false)
            .with_point_size(24.0)
            .with_color(colors::black());
        assert_eq!(run.text(), "hi");
        assert_eq!(run.alignment(), TextAlignment::Right);
        assert!(!run.kerning());
        assert_eq!(run.point_size(), 24.0);
        assert_eq!(run.color(), &colors::black());
    }
}
