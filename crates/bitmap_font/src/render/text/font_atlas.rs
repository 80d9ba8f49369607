//! Glyph atlas metrics for bitmap fonts
//!
//! A bitmap font is a pre-rasterized atlas texture plus a metrics file
//! describing where every glyph lives in it. This module holds the metrics
//! side: per-glyph geometry, kerning pairs and the atlas-wide constants every
//! layout pass scales from.

use std::path::Path;

/// Number of glyph slots in an atlas (one per 8-bit character code)
pub const GLYPH_COUNT: usize = 256;

/// Result type for font operations
pub type FontResult<T> = Result<T, FontError>;

/// Errors that can occur during font operations
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    /// Metrics file or atlas page could not be read
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// File that failed to load
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A metrics token carried a value that is not an integer
    #[error("Line {line}: invalid value '{value}' for '{key}'")]
    Parse {
        /// 1-based line number in the metrics file
        line: usize,
        /// Token key
        key: String,
        /// Offending value
        value: String,
    },

    /// An atlas-wide metric every layout needs is missing or zero
    #[error("Font metrics are missing '{0}'")]
    MissingField(&'static str),

    /// Atlas page image could not be decoded
    #[error("Failed to decode atlas image: {0}")]
    Image(String),

    /// Character code outside the 256-entry glyph table
    #[error("Unsupported character U+{0:04X}: outside the glyph table")]
    UnsupportedCharacter(u32),

    /// Text run handle does not name a registered run
    #[error("Text run {0:?} is not registered")]
    InvalidRun(super::TextRunHandle),

    /// Quad batch would exceed its vertex capacity
    #[error("Quad batch capacity exceeded: {required} vertices > {capacity}")]
    BatchFull {
        /// Vertices the batch would need
        required: usize,
        /// Vertices the batch can hold
        capacity: usize,
    },

    /// Rendering was requested while GPU resources are released
    #[error("GPU resources are not available")]
    ResourcesUnavailable,

    /// Font configuration could not be used
    #[error("Font configuration: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Rendering collaborator failure
    #[error(transparent)]
    Backend(#[from] crate::render::BackendError),
}

/// Geometry of a single glyph in atlas pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Left edge of the glyph rectangle in the atlas
    pub x: i32,
    /// Top edge of the glyph rectangle in the atlas
    pub y: i32,
    /// Width of the glyph rectangle
    pub width: i32,
    /// Height of the glyph rectangle
    pub height: i32,
    /// Horizontal offset from the pen position to the glyph's left edge
    pub x_offset: i32,
    /// Vertical offset from the line top to the glyph's top edge
    pub y_offset: i32,
    /// Horizontal pen advance after drawing the glyph
    pub x_advance: i32,
}

/// Advance adjustment applied when `second` follows the owning glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KerningPair {
    /// Character code of the following glyph
    pub second: u8,
    /// Adjustment in atlas pixels
    pub amount: i32,
}

/// A glyph slot: geometry plus its kerning list
///
/// Kerning pairs are kept in declaration order; lookups take the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glyph {
    /// Atlas geometry
    pub metrics: GlyphMetrics,
    /// Pairs whose first character is this glyph
    pub kerning: Vec<KerningPair>,
}

impl Glyph {
    /// Kerning amount against `second`, if a pair was declared
    #[must_use]
    pub fn kerning_with(&self, second: u8) -> Option<i32> {
        self.kerning
            .iter()
            .find(|pair| pair.second == second)
            .map(|pair| pair.amount)
    }
}

/// Metrics of a complete glyph atlas
///
/// Every character code 0-255 has a slot; codes absent from the metrics file
/// keep zero-sized defaults so lookup never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphAtlasMetrics {
    /// Point size the atlas was rasterized at
    pub rendered_size: u32,
    /// Distance between consecutive lines in atlas pixels
    pub line_height: i32,
    /// Distance from the line top to the baseline in atlas pixels
    pub baseline: i32,
    /// Atlas texture width in pixels
    pub atlas_width: u32,
    /// Atlas texture height in pixels
    pub atlas_height: u32,
    /// Atlas page image files, in page id order
    pub pages: Vec<String>,
    glyphs: Box<[Glyph; GLYPH_COUNT]>,
}

impl Default for GlyphAtlasMetrics {
    fn default() -> Self {
        Self {
            rendered_size: 0,
            line_height: 0,
            baseline: 0,
            atlas_width: 0,
            atlas_height: 0,
            pages: Vec::new(),
            glyphs: Box::new(std::array::from_fn(|_| Glyph::default())),
        }
    }
}

impl GlyphAtlasMetrics {
    /// Create metrics with the given atlas-wide constants and empty glyph slots
    #[must_use]
    pub fn new(rendered_size: u32, line_height: i32, baseline: i32, atlas_width: u32, atlas_height: u32) -> Self {
        Self {
            rendered_size,
            line_height,
            baseline,
            atlas_width,
            atlas_height,
            ..Self::default()
        }
    }

    /// Parse metrics from the text of a metrics file
    pub fn parse(contents: &str) -> FontResult<Self> {
        super::font_loader::FontLoader::parse(contents)
    }

    /// Load metrics from a metrics file on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> FontResult<Self> {
        let path_ref = path.as_ref();
        let contents = std::fs::read_to_string(path_ref).map_err(|source| FontError::Io {
            path: path_ref.display().to_string(),
            source,
        })?;
        let metrics = Self::parse(&contents)?;
        log::info!(
            "Loaded font metrics from {:?}: {}pt, {} glyphs, {} kerning pairs",
            path_ref,
            metrics.rendered_size,
            metrics.glyph_count(),
            metrics.kerning_pair_count()
        );
        Ok(metrics)
    }

    /// Glyph slot for a character code
    #[must_use]
    pub fn glyph(&self, code: u8) -> &Glyph {
        &self.glyphs[usize::from(code)]
    }

    /// Mutable glyph slot for a character code
    pub fn glyph_mut(&mut self, code: u8) -> &mut Glyph {
        &mut self.glyphs[usize::from(code)]
    }

    /// Set a glyph's geometry, keeping its kerning list
    pub fn set_glyph(&mut self, code: u8, metrics: GlyphMetrics) {
        self.glyph_mut(code).metrics = metrics;
    }

    /// Append a kerning pair to `first`'s list
    pub fn add_kerning(&mut self, first: u8, second: u8, amount: i32) {
        self.glyph_mut(first).kerning.push(KerningPair { second, amount });
    }

    /// Kerning adjustment in atlas pixels between two adjacent characters
    #[must_use]
    pub fn kerning(&self, first: u8, second: u8) -> Option<i32> {
        self.glyph(first).kerning_with(second)
    }

    /// Number of slots holding a non-empty glyph
    #[must_use]
    pub fn glyph_count(&self) -> usize {
        self.glyphs
            .iter()
            .filter(|glyph| glyph.metrics != GlyphMetrics::default())
            .count()
    }

    /// Total number of kerning pairs across all glyphs
    #[must_use]
    pub fn kerning_pair_count(&self) -> usize {
        self.glyphs.iter().map(|glyph| glyph.kerning.len()).sum()
    }

    /// Check the atlas-wide constants every layout pass depends on
    pub fn validate(&self) -> FontResult<()> {
        if self.rendered_size == 0 {
            return Err(FontError::MissingField("info size"));
        }
        if self.line_height <= 0 {
            return Err(FontError::MissingField("common lineHeight"));
        }
        if self.atlas_width == 0 {
            return Err(FontError::MissingField("common scaleW"));
        }
        if self.atlas_height == 0 {
            return Err(FontError::MissingField("common scaleH"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_slot_defaults_to_empty() {
        let metrics = GlyphAtlasMetrics::new(32, 36, 28, 256, 256);
        assert_eq!(metrics.glyph(0).metrics, GlyphMetrics::default());
        assert_eq!(metrics.glyph(255).metrics, GlyphMetrics::default());
        assert_eq!(metrics.glyph_count(), 0);
    }

    #[test]
    fn test_kerning_first_declared_wins() {
        let mut metrics = GlyphAtlasMetrics::new(32, 36, 28, 256, 256);
        metrics.add_kerning(b'A', b'V', -5);
        metrics.add_kerning(b'A', b'V', -9);
        metrics.add_kerning(b'A', b'W', -3);

        assert_eq!(metrics.kerning(b'A', b'V'), Some(-5));
        assert_eq!(metrics.kerning(b'A', b'W'), Some(-3));
        assert_eq!(metrics.kerning(b'V', b'A'), None);
        assert_eq!(metrics.kerning_pair_count(), 3);
    }

    #[test]
    fn test_set_glyph_keeps_kerning() {
        let mut metrics = GlyphAtlasMetrics::new(32, 36, 28, 256, 256);
        metrics.add_kerning(b'T', b'o', -2);
        metrics.set_glyph(b'T', GlyphMetrics { width: 10, x_advance: 12, ..GlyphMetrics::default() });

        assert_eq!(metrics.glyph(b'T').metrics.x_advance, 12);
        assert_eq!(metrics.kerning(b'T', b'o'), Some(-2));
        assert_eq!(metrics.glyph_count(), 1);
    }

    #[test]
    fn test_validate_requires_atlas_constants() {
        assert!(GlyphAtlasMetrics::new(32, 36, 28, 256, 256).validate().is_ok());
        assert!(matches!(
            GlyphAtlasMetrics::new(0, 36, 28, 256, 256).validate(),
            Err(FontError::MissingField("info size"))
        ));
        assert!(matches!(
            GlyphAtlasMetrics::new(32, 36, 28, 0, 256).validate(),
            Err(FontError::MissingField("common scaleW"))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GlyphAtlasMetrics::from_file("no/such/font.fnt").unwrap_err();
        assert!(matches!(err, FontError::Io { .. }));
    }
}
