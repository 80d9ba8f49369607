//! Glyph quads and their vertex format

use bytemuck::{Pod, Zeroable};

use super::font_atlas::GlyphMetrics;

/// Vertices emitted per glyph (two triangles, no index buffer)
pub const VERTICES_PER_QUAD: usize = 6;

/// Pre-transformed, colored, textured vertex for text rendering
///
/// Positions are in screen pixels with `w = 1`; color is packed `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct TextVertex {
    /// Screen position (x, y, z = 0, w = 1)
    pub position: [f32; 4],
    /// Packed ARGB color
    pub color: u32,
    /// Normalized atlas texture coordinates
    pub uv: [f32; 2],
}

impl TextVertex {
    const fn new(x: f32, y: f32, color: u32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y, 0.0, 1.0],
            color,
            uv: [u, v],
        }
    }
}

/// Normalized atlas rectangle of a glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    /// Left texture coordinate
    pub u0: f32,
    /// Top texture coordinate
    pub v0: f32,
    /// Right texture coordinate
    pub u1: f32,
    /// Bottom texture coordinate
    pub v1: f32,
}

impl UvRect {
    /// Normalize a glyph's atlas rectangle against the atlas size
    #[must_use]
    pub fn from_glyph(glyph: &GlyphMetrics, atlas_width: u32, atlas_height: u32) -> Self {
        let w = atlas_width as f32;
        let h = atlas_height as f32;
        Self {
            u0: glyph.x as f32 / w,
            v0: glyph.y as f32 / h,
            u1: (glyph.x + glyph.width) as f32 / w,
            v1: (glyph.y + glyph.height) as f32 / h,
        }
    }
}

/// One glyph's on-screen rectangle
///
/// Besides the six vertices, a quad carries the bookkeeping the layout engine
/// needs to re-flow words: a copy of the glyph's metrics (so later atlas
/// changes cannot reach an emitted quad), its source character, 1-based line
/// and word numbers, and widths accumulated while it was placed.
#[derive(Debug, Clone, PartialEq)]
pub struct TextQuad {
    vertices: [TextVertex; VERTICES_PER_QUAD],
    /// Metrics of the glyph this quad draws
    pub glyph: GlyphMetrics,
    /// Source character code
    pub character: u8,
    /// 1-based line the quad sits on
    pub line_number: u32,
    /// 1-based word within the line
    pub word_number: u32,
    /// Running width of the word up to and including this glyph
    pub word_width: f32,
    /// Scaled kerning applied to the pen just before this glyph
    pub kerning: f32,
}

impl TextQuad {
    /// Build a quad from its top-left corner and size
    ///
    /// Triangles share the top-left/bottom-right diagonal, wound
    /// top-left, bottom-right, bottom-left, then top-left, top-right,
    /// bottom-right.
    #[must_use]
    pub fn new(left: f32, top: f32, width: f32, height: f32, uv: UvRect, color: u32, glyph: GlyphMetrics, character: u8) -> Self {
        let right = left + width;
        let bottom = top + height;

        let top_left = TextVertex::new(left, top, color, uv.u0, uv.v0);
        let top_right = TextVertex::new(right, top, color, uv.u1, uv.v0);
        let bottom_left = TextVertex::new(left, bottom, color, uv.u0, uv.v1);
        let bottom_right = TextVertex::new(right, bottom, color, uv.u1, uv.v1);

        Self {
            vertices: [top_left, bottom_right, bottom_left, top_left, top_right, bottom_right],
            glyph,
            character,
            line_number: 1,
            word_number: 1,
            word_width: 0.0,
            kerning: 0.0,
        }
    }

    /// The six vertices in draw order
    #[must_use]
    pub const fn vertices(&self) -> &[TextVertex; VERTICES_PER_QUAD] {
        &self.vertices
    }

    /// Left edge
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.vertices[0].position[0]
    }

    /// Top edge
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.vertices[0].position[1]
    }

    /// Right edge
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.vertices[1].position[0]
    }

    /// Bottom edge
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.vertices[1].position[1]
    }

    /// On-screen width
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right() - self.left()
    }

    /// Packed color shared by all vertices
    #[must_use]
    pub const fn color(&self) -> u32 {
        self.vertices[0].color
    }

    /// Shift every vertex by the given offset
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for vertex in &mut self.vertices {
            vertex.position[0] += dx;
            vertex.position[1] += dy;
        }
    }

    /// Move the quad so its top-left corner lands at `(left, top)`
    pub fn move_to(&mut self, left: f32, top: f32) {
        let dx = left - self.left();
        let dy = top - self.top();
        self.translate(dx, dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> TextQuad {
        let uv = UvRect { u0: 0.0, v0: 0.25, u1: 0.5, v1: 0.75 };
        TextQuad::new(10.0, 20.0, 8.0, 12.0, uv, 0xFF00_FF00, GlyphMetrics::default(), b'x')
    }

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<TextVertex>(), 28);
        let q = quad();
        let bytes: &[u8] = bytemuck::cast_slice(q.vertices());
        assert_eq!(bytes.len(), 28 * VERTICES_PER_QUAD);
    }

    #[test]
    fn test_winding_order() {
        let q = quad();
        let positions: Vec<[f32; 2]> = q.vertices().iter().map(|v| [v.position[0], v.position[1]]).collect();
        assert_eq!(
            positions,
            vec![[10.0, 20.0], [18.0, 32.0], [10.0, 32.0], [10.0, 20.0], [18.0, 20.0], [18.0, 32.0]]
        );
        assert!(q.vertices().iter().all(|v| v.position[2] == 0.0 && v.position[3] == 1.0));
    }

    #[test]
    fn test_texture_coordinates_follow_corners() {
        let q = quad();
        let v = q.vertices();
        assert_eq!(v[0].uv, [0.0, 0.25]);
        assert_eq!(v[1].uv, [0.5, 0.75]);
        assert_eq!(v[2].uv, [0.0, 0.75]);
        assert_eq!(v[4].uv, [0.5, 0.25]);
    }

    #[test]
    fn test_move_keeps_size() {
        let mut q = quad();
        q.move_to(0.0, 0.0);
        assert_eq!((q.left(), q.top(), q.right(), q.bottom()), (0.0, 0.0, 8.0, 12.0));
        q.translate(5.0, -1.0);
        assert_eq!((q.left(), q.top()), (5.0, -1.0));
        assert_eq!(q.width(), 8.0);
    }

    #[test]
    fn test_uv_from_glyph() {
        let glyph = GlyphMetrics { x: 64, y: 32, width: 32, height: 64, ..GlyphMetrics::default() };
        let uv = UvRect::from_glyph(&glyph, 128, 128);
        assert_eq!(uv, UvRect { u0: 0.5, v0: 0.25, u1: 0.75, v1: 0.75 });
    }
}
