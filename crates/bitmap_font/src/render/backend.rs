//! Rendering backend abstraction for text
//!
//! Bitmap fonts need very little from a graphics API: one texture for the
//! atlas page, one dynamic vertex buffer for the quad batch and a
//! non-indexed, alpha-blended triangle list draw. This module defines that
//! surface as a trait so the font code never touches a device directly.

use std::collections::HashMap;

use crate::assets::AtlasImage;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a texture resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Handle to a vertex buffer resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferId(pub u64);

/// Errors reported by a rendering backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// A GPU resource could not be created
    #[error("Failed to create {resource}: {reason}")]
    ResourceCreation {
        /// Kind of resource
        resource: &'static str,
        /// Backend-specific reason
        reason: String,
    },

    /// A handle does not name a live resource
    #[error("Unknown {0}")]
    InvalidHandle(String),

    /// Upload larger than the destination buffer
    #[error("Vertex upload of {size} bytes exceeds buffer of {capacity} bytes")]
    BufferOverflow {
        /// Bytes uploaded
        size: usize,
        /// Bytes the buffer holds
        capacity: usize,
    },
}

/// Primitive topology of a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Every three vertices form an independent triangle
    TriangleList,
}

/// Blend factor applied to source or destination color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    /// Source alpha
    SrcAlpha,
    /// One minus source alpha
    OneMinusSrcAlpha,
}

/// Color blending state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    /// Factor applied to the incoming fragment
    pub src: BlendFactor,
    /// Factor applied to the framebuffer
    pub dst: BlendFactor,
}

impl BlendState {
    /// Standard alpha blending
    pub const ALPHA: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };
}

/// One non-indexed draw of pre-transformed text vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    /// Atlas texture sampled by the draw
    pub texture: TextureId,
    /// Vertex buffer the batch was uploaded into
    pub vertex_buffer: VertexBufferId,
    /// Primitive topology
    pub topology: PrimitiveTopology,
    /// Number of primitives (triangles)
    pub primitive_count: u32,
    /// Blending state
    pub blend: BlendState,
    /// Depth test enabled
    pub depth_test: bool,
    /// Depth writes enabled
    pub depth_write: bool,
}

impl DrawCall {
    /// Overlay draw for text: alpha blended, no depth test or writes
    #[must_use]
    pub const fn text_overlay(texture: TextureId, vertex_buffer: VertexBufferId, primitive_count: u32) -> Self {
        Self {
            texture,
            vertex_buffer,
            topology: PrimitiveTopology::TriangleList,
            primitive_count,
            blend: BlendState::ALPHA,
            depth_test: false,
            depth_write: false,
        }
    }
}

/// Graphics device operations needed to draw bitmap text
pub trait TextBackend {
    /// Upload an atlas page as a sampled texture
    fn create_texture(&mut self, image: &AtlasImage) -> BackendResult<TextureId>;

    /// Create a dynamic vertex buffer of `size_bytes`
    fn create_vertex_buffer(&mut self, size_bytes: usize) -> BackendResult<VertexBufferId>;

    /// Replace the start of a vertex buffer's contents
    fn upload_vertices(&mut self, buffer: VertexBufferId, data: &[u8]) -> BackendResult<()>;

    /// Record a draw
    fn draw(&mut self, call: &DrawCall) -> BackendResult<()>;

    /// Release a texture
    fn destroy_texture(&mut self, texture: TextureId);

    /// Release a vertex buffer
    fn destroy_vertex_buffer(&mut self, buffer: VertexBufferId);
}

/// Headless backend that records everything it is asked to do
///
/// Used by tests and tools that need the draw stream without a device.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    textures: HashMap<TextureId, (u32, u32)>,
    vertex_buffers: HashMap<VertexBufferId, usize>,
    uploads: Vec<(VertexBufferId, Vec<u8>)>,
    draws: Vec<DrawCall>,
    next_id: u64,
}

impl RecordingBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Draws recorded so far
    #[must_use]
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Vertex uploads recorded so far
    #[must_use]
    pub fn uploads(&self) -> &[(VertexBufferId, Vec<u8>)] {
        &self.uploads
    }

    /// Number of live textures
    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Number of live vertex buffers
    #[must_use]
    pub fn live_vertex_buffers(&self) -> usize {
        self.vertex_buffers.len()
    }

    /// Size of a live vertex buffer
    #[must_use]
    pub fn vertex_buffer_size(&self, buffer: VertexBufferId) -> Option<usize> {
        self.vertex_buffers.get(&buffer).copied()
    }
}

impl TextBackend for RecordingBackend {
    fn create_texture(&mut self, image: &AtlasImage) -> BackendResult<TextureId> {
        if image.width == 0 || image.height == 0 {
            return Err(BackendError::ResourceCreation {
                resource: "texture",
                reason: format!("empty image {}x{}", image.width, image.height),
            });
        }
        let id = TextureId(self.allocate_id());
        self.textures.insert(id, (image.width, image.height));
        Ok(id)
    }

    fn create_vertex_buffer(&mut self, size_bytes: usize) -> BackendResult<VertexBufferId> {
        if size_bytes == 0 {
            return Err(BackendError::ResourceCreation {
                resource: "vertex buffer",
                reason: "zero size".to_string(),
            });
        }
        let id = VertexBufferId(self.allocate_id());
        self.vertex_buffers.insert(id, size_bytes);
        Ok(id)
    }

    fn upload_vertices(&mut self, buffer: VertexBufferId, data: &[u8]) -> BackendResult<()> {
        let capacity = *self
            .vertex_buffers
            .get(&buffer)
            .ok_or_else(|| BackendError::InvalidHandle(format!("{buffer:?}")))?;
        if data.len() > capacity {
            return Err(BackendError::BufferOverflow { size: data.len(), capacity });
        }
        self.uploads.push((buffer, data.to_vec()));
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall) -> BackendResult<()> {
        if !self.textures.contains_key(&call.texture) {
            return Err(BackendError::InvalidHandle(format!("{:?}", call.texture)));
        }
        if !self.vertex_buffers.contains_key(&call.vertex_buffer) {
            return Err(BackendError::InvalidHandle(format!("{:?}", call.vertex_buffer)));
        }
        self.draws.push(*call);
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn destroy_vertex_buffer(&mut self, buffer: VertexBufferId) {
        self.vertex_buffers.remove(&buffer);
    }
}
