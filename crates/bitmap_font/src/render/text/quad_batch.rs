//! Quad batch
//!
//! Collects the quads of every live text run so a frame can be drawn with a
//! single vertex upload. The batch is bounded by the vertex capacity of that
//! upload; going over it is reported, never silently clipped.

use std::ops::Range;

use super::font_atlas::{FontError, FontResult};
use super::text_quad::{TextQuad, TextVertex, VERTICES_PER_QUAD};

/// Ordered quads of all live text runs
#[derive(Debug, Clone)]
pub struct QuadBatch {
    quads: Vec<TextQuad>,
    max_vertices: usize,
}

impl QuadBatch {
    /// Create an empty batch holding at most `max_vertices` vertices
    #[must_use]
    pub const fn new(max_vertices: usize) -> Self {
        Self {
            quads: Vec::new(),
            max_vertices,
        }
    }

    /// Append quads, returning the index range they occupy
    ///
    /// Fails without modifying the batch if the quads do not fit.
    pub fn append(&mut self, quads: Vec<TextQuad>) -> FontResult<Range<usize>> {
        let required = (self.quads.len() + quads.len()) * VERTICES_PER_QUAD;
        if required > self.max_vertices {
            return Err(FontError::BatchFull {
                required,
                capacity: self.max_vertices,
            });
        }

        let start = self.quads.len();
        self.quads.extend(quads);
        Ok(start..self.quads.len())
    }

    /// Remove the quads of one run
    ///
    /// Quads after the range move down by its length.
    pub fn remove_run(&mut self, range: Range<usize>) {
        self.quads.drain(range);
    }

    /// Replace the quads in `range` with a new set
    ///
    /// Fails without modifying the batch if the result would not fit.
    pub fn replace_run(&mut self, range: Range<usize>, quads: Vec<TextQuad>) -> FontResult<Range<usize>> {
        let required = (self.quads.len() - range.len() + quads.len()) * VERTICES_PER_QUAD;
        if required > self.max_vertices {
            return Err(FontError::BatchFull {
                required,
                capacity: self.max_vertices,
            });
        }

        let start = range.start;
        let count = quads.len();
        self.quads.splice(range, quads);
        Ok(start..start + count)
    }

    /// Remove every quad
    pub fn clear(&mut self) {
        self.quads.clear();
    }

    /// All quads in draw order
    #[must_use]
    pub fn quads(&self) -> &[TextQuad] {
        &self.quads
    }

    /// Number of quads
    #[must_use]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Whether the batch holds no quads
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Number of vertices the batch uploads
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.quads.len() * VERTICES_PER_QUAD
    }

    /// Triangles drawn for the batch (two per quad)
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.quads.len() * 2
    }

    /// Vertex capacity
    #[must_use]
    pub const fn max_vertices(&self) -> usize {
        self.max_vertices
    }

    /// Flatten the quads into upload order
    #[must_use]
    pub fn vertices(&self) -> Vec<TextVertex> {
        self.quads
            .iter()
            .flat_map(|quad| quad.vertices().iter().copied())
            .collect()
    }
}
