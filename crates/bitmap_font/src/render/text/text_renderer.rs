//! Bitmap font text rendering
//!
//! [`BitmapFont`] owns everything one font needs: the shared atlas metrics,
//! the layout engine, the registry of live text runs, the quad batch they
//! feed and the GPU resources the batch is drawn with. Runs are laid out once
//! when added; rendering only uploads and draws.

use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use slotmap::SlotMap;

use super::font_atlas::{FontError, FontResult, GlyphAtlasMetrics};
use super::quad_batch::QuadBatch;
use super::text_layout::{TextBounds, TextLayout};
use super::text_quad::{TextQuad, TextVertex};
use super::text_run::{TextBox, TextRun};
use crate::assets::AtlasImage;
use crate::config::FontConfig;
use crate::render::backend::{DrawCall, TextBackend, TextureId, VertexBufferId};

slotmap::new_key_type! {
    /// Handle to a text run registered with a [`BitmapFont`]
    pub struct TextRunHandle;
}

/// A live run and the batch slots its quads occupy
#[derive(Debug)]
struct RegisteredRun {
    run: TextRun,
    range: Range<usize>,
}

/// GPU-side state, present only between acquire and lost/release
#[derive(Debug, Default)]
struct GpuResources {
    texture: Option<TextureId>,
    vertex_buffer: Option<VertexBufferId>,
}

/// A bitmap font with its live text runs
///
/// # Example
///
/// ```no_run
/// use bitmap_font::prelude::*;
///
/// # fn demo(backend: &mut dyn TextBackend) -> FontResult<()> {
/// let mut font = BitmapFont::from_config(&FontConfig::new("fonts/arial.fnt"))?;
/// font.on_resources_acquired(backend)?;
///
/// let run = font.text_run("Hello world", TextBox::unbounded_height(10.0, 10.0, 200.0));
/// let handle = font.add(run.with_alignment(TextAlignment::Center))?;
///
/// font.render(backend)?;
/// font.clear(handle)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BitmapFont {
    layout: TextLayout,
    atlas: AtlasImage,
    runs: SlotMap<TextRunHandle, RegisteredRun>,
    order: Vec<TextRunHandle>,
    batch: QuadBatch,
    gpu: GpuResources,
    default_point_size: f32,
    kerning: bool,
}

impl BitmapFont {
    /// Create a font from loaded metrics and atlas pixels
    pub fn new(metrics: GlyphAtlasMetrics, atlas: AtlasImage, config: &FontConfig) -> FontResult<Self> {
        config.validate()?;
        metrics.validate()?;

        if atlas.width != metrics.atlas_width || atlas.height != metrics.atlas_height {
            log::warn!(
                "Atlas image is {}x{} but metrics describe {}x{}",
                atlas.width,
                atlas.height,
                metrics.atlas_width,
                metrics.atlas_height
            );
        }

        Ok(Self {
            layout: TextLayout::new(Arc::new(metrics)),
            atlas,
            runs: SlotMap::with_key(),
            order: Vec::new(),
            batch: QuadBatch::new(config.max_vertices()),
            gpu: GpuResources::default(),
            default_point_size: config.default_point_size,
            kerning: config.kerning,
        })
    }

    /// Load the metrics file named by the configuration and its first atlas page
    ///
    /// Page files are resolved relative to the metrics file's directory.
    pub fn from_config(config: &FontConfig) -> FontResult<Self> {
        config.validate()?;

        let metrics_path = Path::new(&config.metrics_path);
        let metrics = GlyphAtlasMetrics::from_file(metrics_path)?;
        let page = metrics.pages.first().ok_or(FontError::MissingField("page file"))?;
        let page_path = metrics_path.parent().unwrap_or_else(|| Path::new("")).join(page);
        let atlas = AtlasImage::from_file(&page_path)?;

        Self::new(metrics, atlas, config)
    }

    /// Start a run at this font's default point size and kerning setting
    #[must_use]
    pub fn text_run(&self, text: impl Into<String>, bounds: TextBox) -> TextRun {
        TextRun::new(text, bounds, self.default_point_size).with_kerning(self.kerning)
    }

    /// Lay out a run and add its quads to the batch
    ///
    /// Nothing is registered if layout fails or the batch is full.
    pub fn add(&mut self, run: TextRun) -> FontResult<TextRunHandle> {
        let quads = self.layout.layout(&run)?;
        let quad_count = quads.len();
        let range = self.batch.append(quads)?;
        let handle = self.runs.insert(RegisteredRun { run, range });
        self.order.push(handle);

        log::debug!("Added text run {:?} ({} quads)", handle, quad_count);
        Ok(handle)
    }

    /// Remove a run and its quads
    pub fn clear(&mut self, handle: TextRunHandle) -> FontResult<()> {
        let entry = self.runs.remove(handle).ok_or(FontError::InvalidRun(handle))?;
        let position = self.position_of(handle)?;
        self.order.remove(position);
        self.batch.remove_run(entry.range);
        self.reindex_from(position);

        log::debug!("Cleared text run {:?}", handle);
        Ok(())
    }

    /// Remove every run
    pub fn clear_all(&mut self) {
        let count = self.runs.len();
        self.runs.clear();
        self.order.clear();
        self.batch.clear();
        log::debug!("Cleared {} text runs", count);
    }

    /// Swap a run for a new one, keeping its handle and draw position
    ///
    /// On failure the old run and its quads stay in place.
    pub fn replace(&mut self, handle: TextRunHandle, run: TextRun) -> FontResult<()> {
        let position = self.position_of(handle)?;
        let quads = self.layout.layout(&run)?;
        self.install(handle, position, run, quads)
    }

    /// Lay out an existing run again and refresh its quads
    pub fn layout_run(&mut self, handle: TextRunHandle) -> FontResult<()> {
        let position = self.position_of(handle)?;
        let run = self.run(handle)?.clone();
        let quads = self.layout.layout(&run)?;
        self.install(handle, position, run, quads)
    }

    fn install(&mut self, handle: TextRunHandle, position: usize, run: TextRun, quads: Vec<TextQuad>) -> FontResult<()> {
        let entry = self.runs.get_mut(handle).ok_or(FontError::InvalidRun(handle))?;
        entry.range = self.batch.replace_run(entry.range.clone(), quads)?;
        entry.run = run;
        self.reindex_from(position + 1);
        Ok(())
    }

    fn position_of(&self, handle: TextRunHandle) -> FontResult<usize> {
        self.order
            .iter()
            .position(|&h| h == handle)
            .ok_or(FontError::InvalidRun(handle))
    }

    /// Recompute batch ranges of the runs from `position` on
    ///
    /// Runs occupy consecutive, gap-free ranges in registration order.
    fn reindex_from(&mut self, position: usize) {
        let mut start = position
            .checked_sub(1)
            .and_then(|previous| self.order.get(previous))
            .and_then(|&handle| self.runs.get(handle))
            .map_or(0, |entry| entry.range.end);

        for &handle in self.order.iter().skip(position) {
            if let Some(entry) = self.runs.get_mut(handle) {
                let len = entry.range.len();
                entry.range = start..start + len;
                start += len;
            }
        }
    }

    /// A registered run
    pub fn run(&self, handle: TextRunHandle) -> FontResult<&TextRun> {
        self.runs
            .get(handle)
            .map(|entry| &entry.run)
            .ok_or(FontError::InvalidRun(handle))
    }

    /// Quads of a registered run
    pub fn run_quads(&self, handle: TextRunHandle) -> FontResult<&[TextQuad]> {
        let entry = self.runs.get(handle).ok_or(FontError::InvalidRun(handle))?;
        Ok(&self.batch.quads()[entry.range.clone()])
    }

    /// Bounding box of a registered run's quads, `None` if it has none
    pub fn run_bounds(&self, handle: TextRunHandle) -> FontResult<Option<TextBounds>> {
        Ok(TextBounds::from_quads(self.run_quads(handle)?))
    }

    /// Number of live runs
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Number of quads across all runs
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.batch.len()
    }

    /// The quad batch, read-only
    #[must_use]
    pub const fn batch(&self) -> &QuadBatch {
        &self.batch
    }

    /// The layout engine
    #[must_use]
    pub const fn layout(&self) -> &TextLayout {
        &self.layout
    }

    /// Atlas metrics shared by every run
    #[must_use]
    pub fn metrics(&self) -> &GlyphAtlasMetrics {
        self.layout.metrics()
    }

    /// Whether GPU resources are currently held
    #[must_use]
    pub const fn has_resources(&self) -> bool {
        self.gpu.texture.is_some() && self.gpu.vertex_buffer.is_some()
    }

    /// Draw the whole batch with one upload and one draw call
    ///
    /// Does nothing when the batch is empty.
    pub fn render(&self, backend: &mut dyn TextBackend) -> FontResult<()> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let (Some(texture), Some(vertex_buffer)) = (self.gpu.texture, self.gpu.vertex_buffer) else {
            log::warn!("Skipping text render: GPU resources are not acquired");
            return Err(FontError::ResourcesUnavailable);
        };

        let vertices = self.batch.vertices();
        backend.upload_vertices(vertex_buffer, bytemuck::cast_slice(&vertices))?;

        let triangles = u32::try_from(self.batch.triangle_count()).unwrap_or(u32::MAX);
        backend.draw(&DrawCall::text_overlay(texture, vertex_buffer, triangles))?;

        log::trace!("Rendered {} text quads", self.batch.len());
        Ok(())
    }

    /// Create the atlas texture (if absent) and the vertex buffer
    pub fn on_resources_acquired(&mut self, backend: &mut dyn TextBackend) -> FontResult<()> {
        if self.gpu.texture.is_none() {
            self.gpu.texture = Some(backend.create_texture(&self.atlas)?);
        }
        if self.gpu.vertex_buffer.is_none() {
            let size_bytes = self.batch.max_vertices() * std::mem::size_of::<TextVertex>();
            self.gpu.vertex_buffer = Some(backend.create_vertex_buffer(size_bytes)?);
        }

        log::info!(
            "Text GPU resources acquired: {}x{} atlas, {} vertex capacity",
            self.atlas.width,
            self.atlas.height,
            self.batch.max_vertices()
        );
        Ok(())
    }

    /// Release the vertex buffer after device loss; the texture survives
    pub fn on_resources_lost(&mut self, backend: &mut dyn TextBackend) {
        if let Some(buffer) = self.gpu.vertex_buffer.take() {
            backend.destroy_vertex_buffer(buffer);
            log::info!("Text vertex buffer released after device loss");
        }
    }

    /// Release every GPU resource
    pub fn on_resources_released(&mut self, backend: &mut dyn TextBackend) {
        if let Some(buffer) = self.gpu.vertex_buffer.take() {
            backend.destroy_vertex_buffer(buffer);
        }
        if let Some(texture) = self.gpu.texture.take() {
            backend.destroy_texture(texture);
        }
        log::info!("Text GPU resources released");
    }
}
