//! Atlas page image loading
//!
//! Loads the rasterized glyph atlas named by a metrics file's `page` line and
//! converts it to RGBA8 for GPU upload.

use std::path::Path;

use crate::render::text::{FontError, FontResult};

/// Glyph atlas pixels ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasImage {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl AtlasImage {
    /// Load an atlas page from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> FontResult<Self> {
        let path_ref = path.as_ref();

        log::debug!("Loading atlas page from: {:?}", path_ref);

        let img = image::open(path_ref).map_err(|e| match e {
            image::ImageError::IoError(source) => FontError::Io {
                path: path_ref.display().to_string(),
                source,
            },
            other => FontError::Image(format!("{}: {}", path_ref.display(), other)),
        })?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::info!("Loaded atlas page {}x{} from {:?}", width, height, path_ref);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }

    /// Load an atlas page from memory (useful for embedded fonts)
    pub fn from_bytes(bytes: &[u8]) -> FontResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| FontError::Image(format!("atlas page from memory: {e}")))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::debug!("Loaded atlas page {}x{} from memory", width, height);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }

    /// Create a fully transparent atlas of the given size
    ///
    /// Stands in for a page image when only layout is needed.
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            data: vec![0; pixel_count * 4],
            width,
            height,
        }
    }

    /// Size of the pixel data in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}
