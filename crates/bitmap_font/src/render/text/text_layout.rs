//! Text layout engine
//!
//! Converts text runs into positioned glyph quads. Lines break at explicit
//! newlines or when the next glyph would reach the box's right edge. A word
//! that crosses the edge is carried down to the next line whole, and centered
//! or right-aligned lines are re-justified every time a glyph is appended, so
//! the quads are always final once a character has been processed.
//!
//! # Layout Coordinate System
//!
//! - Origin is the top-left of the screen, +Y points down
//! - A line's glyphs hang from the line top by their `yoffset`
//! - Every atlas metric is scaled by `point_size / rendered_size`

use std::sync::Arc;

use super::font_atlas::{FontError, FontResult, GlyphAtlasMetrics, GlyphMetrics};
use super::text_quad::{TextQuad, UvRect};
use super::text_run::{TextAlignment, TextBox, TextRun};
use crate::foundation::math::pack_argb;

/// Text layout engine that converts text runs to glyph quads
///
/// Layout is a pure function of the run and the shared metrics: all cursor
/// state lives in the pass, so one engine can lay out any number of runs,
/// from any number of threads.
#[derive(Debug, Clone)]
pub struct TextLayout {
    metrics: Arc<GlyphAtlasMetrics>,
}

/// Bounding box of laid-out text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBounds {
    /// Minimum X coordinate
    pub min_x: f32,
    /// Minimum Y coordinate
    pub min_y: f32,
    /// Maximum X coordinate
    pub max_x: f32,
    /// Maximum Y coordinate
    pub max_y: f32,
}

impl TextBounds {
    /// Smallest box enclosing every quad, `None` for no quads
    #[must_use]
    pub fn from_quads(quads: &[TextQuad]) -> Option<Self> {
        let first = quads.first()?;
        let initial = Self {
            min_x: first.left(),
            min_y: first.top(),
            max_x: first.right(),
            max_y: first.bottom(),
        };
        Some(quads.iter().skip(1).fold(initial, |bounds, quad| Self {
            min_x: bounds.min_x.min(quad.left()),
            min_y: bounds.min_y.min(quad.top()),
            max_x: bounds.max_x.max(quad.right()),
            max_y: bounds.max_y.max(quad.bottom()),
        }))
    }

    /// Calculate width of bounding box
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Calculate height of bounding box
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Number of lines spanned by laid-out quads
#[must_use]
pub fn line_count(quads: &[TextQuad]) -> u32 {
    quads.last().map_or(0, |quad| quad.line_number)
}

impl TextLayout {
    /// Create a new text layout engine
    #[must_use]
    pub const fn new(metrics: Arc<GlyphAtlasMetrics>) -> Self {
        Self { metrics }
    }

    /// Get the atlas metrics used by this layout engine
    #[must_use]
    pub fn metrics(&self) -> &GlyphAtlasMetrics {
        &self.metrics
    }

    /// Lay out a text run into quads in character order
    ///
    /// Fails with [`FontError::UnsupportedCharacter`] before producing any
    /// quad if the text holds a character the 256-slot table cannot address.
    /// Text that runs past the bottom of the box is dropped from the first
    /// glyph that does not fit.
    pub fn layout(&self, run: &TextRun) -> FontResult<Vec<TextQuad>> {
        let codes = glyph_codes(run.text())?;

        let mut pass = LayoutPass::new(&self.metrics, run);
        let mut consumed = 0;
        for &code in &codes {
            if !pass.push(code) {
                break;
            }
            consumed += 1;
        }

        if consumed < codes.len() {
            log::debug!(
                "Truncated run at character {} of {}: box bottom {} reached",
                consumed,
                codes.len(),
                run.bounds().bottom()
            );
        }

        let quads = pass.quads;
        log::debug!(
            "Laid out {} quads on {} lines ({:?}, {}pt)",
            quads.len(),
            line_count(&quads),
            run.alignment(),
            run.point_size()
        );
        Ok(quads)
    }

    /// Bounding box a run would occupy, `None` if it emits no quads
    pub fn measure(&self, run: &TextRun) -> FontResult<Option<TextBounds>> {
        Ok(TextBounds::from_quads(&self.layout(run)?))
    }
}

/// Map text onto glyph table slots, rejecting anything past U+00FF
fn glyph_codes(text: &str) -> FontResult<Vec<u8>> {
    text.chars()
        .map(|ch| u8::try_from(ch).map_err(|_| FontError::UnsupportedCharacter(u32::from(ch))))
        .collect()
}

/// Glyph metrics scaled to a run's point size
#[derive(Debug, Clone, Copy)]
struct ScaledGlyph {
    x_offset: f32,
    y_offset: f32,
    width: f32,
    height: f32,
    x_advance: f32,
}

impl ScaledGlyph {
    fn new(glyph: &GlyphMetrics, scale: f32) -> Self {
        Self {
            x_offset: glyph.x_offset as f32 * scale,
            y_offset: glyph.y_offset as f32 * scale,
            width: glyph.width as f32 * scale,
            height: glyph.height as f32 * scale,
            x_advance: glyph.x_advance as f32 * scale,
        }
    }

    /// Bottom edge when the glyph hangs from `line_top`
    fn bottom(&self, line_top: f32) -> f32 {
        line_top + self.y_offset + self.height
    }
}

/// Cursor state of one layout pass
#[derive(Debug)]
struct Cursor {
    x: f32,
    y: f32,
    line_width: f32,
    word_width: f32,
    line_number: u32,
    word_number: u32,
    first_char_of_line: bool,
    last_char: Option<u8>,
}

/// A single run being laid out
struct LayoutPass<'a> {
    metrics: &'a GlyphAtlasMetrics,
    bounds: TextBox,
    alignment: TextAlignment,
    kerning_enabled: bool,
    scale: f32,
    line_height: f32,
    color: u32,
    cursor: Cursor,
    quads: Vec<TextQuad>,
}

impl<'a> LayoutPass<'a> {
    fn new(metrics: &'a GlyphAtlasMetrics, run: &TextRun) -> Self {
        let bounds = *run.bounds();
        let scale = run.point_size() / metrics.rendered_size as f32;

        Self {
            metrics,
            bounds,
            alignment: run.alignment(),
            kerning_enabled: run.kerning(),
            scale,
            line_height: metrics.line_height as f32 * scale,
            color: pack_argb(run.color()),
            cursor: Cursor {
                x: bounds.x,
                y: bounds.y,
                line_width: 0.0,
                word_width: 0.0,
                line_number: 1,
                word_number: 1,
                first_char_of_line: true,
                last_char: None,
            },
            quads: Vec::with_capacity(run.text().len()),
        }
    }

    /// Process one character; `false` once the box is full
    fn push(&mut self, code: u8) -> bool {
        let glyph = self.metrics.glyph(code).metrics;
        let scaled = ScaledGlyph::new(&glyph, self.scale);

        let newline = matches!(code, b'\n' | b'\r');
        let overflow = self.cursor.line_width + scaled.x_advance >= self.bounds.width;
        let breaks = newline || overflow;
        let carry = overflow && !newline && self.cursor.word_number != 1;

        // Vertical bound is checked on the line the glyph will land on.
        let line_top = if breaks { self.cursor.y + self.line_height } else { self.cursor.y };
        if scaled.bottom(line_top) > self.bounds.bottom() || (carry && !self.carried_word_fits(line_top)) {
            return false;
        }

        if breaks {
            self.break_line(carry);
        }

        if matches!(code, b'\n' | b'\r' | b'\t') {
            return true;
        }

        if self.cursor.first_char_of_line {
            self.cursor.x = self.bounds.line_anchor(self.alignment);
        }

        let kerning = if self.cursor.first_char_of_line {
            0.0
        } else {
            self.cursor.last_char.map_or(0.0, |previous| self.kerning_between(previous, code))
        };
        self.cursor.x += kerning;
        self.cursor.line_width += kerning;
        self.cursor.word_width += kerning;
        self.cursor.first_char_of_line = false;

        // Right alignment groups a space with the word after it, the others with the word before.
        let is_space = code == b' ';
        let space_leads_word = self.alignment == TextAlignment::Right;
        if is_space && space_leads_word {
            self.start_word();
        }

        let uv = UvRect::from_glyph(&glyph, self.metrics.atlas_width, self.metrics.atlas_height);
        let mut quad = TextQuad::new(
            self.cursor.x + scaled.x_offset,
            self.cursor.y + scaled.y_offset,
            scaled.width,
            scaled.height,
            uv,
            self.color,
            glyph,
            code,
        );
        quad.line_number = self.cursor.line_number;
        quad.word_number = self.cursor.word_number;
        quad.kerning = kerning;

        self.cursor.x += scaled.x_advance;
        self.cursor.line_width += scaled.x_advance;
        self.cursor.word_width += scaled.x_advance;
        quad.word_width = self.cursor.word_width;
        self.cursor.last_char = Some(code);
        self.quads.push(quad);

        if is_space && !space_leads_word {
            self.start_word();
        }

        let appended = scaled.x_advance + kerning;
        match self.alignment {
            TextAlignment::Left => {},
            TextAlignment::Center => self.shift_current_line(-appended / 2.0),
            TextAlignment::Right => self.shift_current_line(-appended),
        }

        true
    }

    fn start_word(&mut self) {
        self.cursor.word_number += 1;
        self.cursor.word_width = 0.0;
    }

    /// Scaled kerning between two adjacent characters, zero when disabled
    fn kerning_between(&self, previous: u8, next: u8) -> f32 {
        if !self.kerning_enabled {
            return 0.0;
        }
        self.metrics
            .kerning(previous, next)
            .map_or(0.0, |amount| amount as f32 * self.scale)
    }

    /// Index of the first quad of the word currently being built
    fn current_word_start(&self) -> usize {
        let line = self.cursor.line_number;
        let word = self.cursor.word_number;
        let in_word = self
            .quads
            .iter()
            .rev()
            .take_while(|quad| quad.line_number == line && quad.word_number == word)
            .count();
        self.quads.len() - in_word
    }

    fn carried_word_fits(&self, line_top: f32) -> bool {
        self.quads[self.current_word_start()..]
            .iter()
            .all(|quad| ScaledGlyph::new(&quad.glyph, self.scale).bottom(line_top) <= self.bounds.bottom())
    }

    fn break_line(&mut self, carry: bool) {
        self.cursor.x = self.bounds.line_anchor(self.alignment);
        self.cursor.y += self.line_height;

        let word_start = self.current_word_start();
        if carry && word_start < self.quads.len() {
            log::trace!(
                "Carrying {} glyphs of word {} down from line {}",
                self.quads.len() - word_start,
                self.cursor.word_number,
                self.cursor.line_number
            );
            self.carry_word_down(word_start);
        } else {
            self.cursor.first_char_of_line = true;
            self.cursor.line_width = 0.0;
        }

        self.cursor.word_number = 1;
        self.cursor.line_number += 1;
    }

    /// Move the in-progress word, starting at `word_start`, onto the next line
    ///
    /// The pen has already been placed at the new line's anchor. Kerning is
    /// recomputed against the word's own characters; the first carried glyph
    /// starts the line and gets none.
    fn carry_word_down(&mut self, word_start: usize) {
        let old_line = self.cursor.line_number;
        let mut removed_width = 0.0;
        let mut placed_width = 0.0;
        let mut previous: Option<u8> = None;

        for index in word_start..self.quads.len() {
            let character = self.quads[index].character;
            let kerning = previous.map_or(0.0, |prev| self.kerning_between(prev, character));

            let quad = &mut self.quads[index];
            let scaled = ScaledGlyph::new(&quad.glyph, self.scale);
            removed_width += scaled.x_advance + quad.kerning;

            self.cursor.x += kerning;
            quad.line_number = old_line + 1;
            quad.word_number = 1;
            quad.kerning = kerning;
            quad.move_to(self.cursor.x + scaled.x_offset, self.cursor.y + scaled.y_offset);
            self.cursor.x += scaled.x_advance;

            placed_width += scaled.x_advance + kerning;
            quad.word_width = placed_width;
            previous = Some(character);
        }

        self.cursor.line_width = placed_width;
        self.cursor.word_width = placed_width;

        let (new_line_shift, old_line_shift) = match self.alignment {
            TextAlignment::Left => return,
            TextAlignment::Center => (placed_width / 2.0, removed_width / 2.0),
            TextAlignment::Right => (placed_width, removed_width),
        };

        for quad in &mut self.quads[word_start..] {
            quad.translate(-new_line_shift, 0.0);
        }
        self.cursor.x -= new_line_shift;

        // The line the word left is now narrower; re-justify it.
        for quad in self.quads[..word_start]
            .iter_mut()
            .rev()
            .take_while(|quad| quad.line_number == old_line)
        {
            quad.translate(old_line_shift, 0.0);
        }
    }

    /// Shift every quad on the current line, and the pen, horizontally
    fn shift_current_line(&mut self, dx: f32) {
        let line = self.cursor.line_number;
        for quad in self.quads.iter_mut().rev().take_while(|quad| quad.line_number == line) {
            quad.translate(dx, 0.0);
        }
        self.cursor.x += dx;
    }
}
