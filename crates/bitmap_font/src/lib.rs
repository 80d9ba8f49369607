//! # Bitmap Font
//!
//! Text rendering from pre-rasterized glyph atlases.
//!
//! ## Features
//!
//! - **Metrics loading**: BMFont-style text metrics with kerning pairs
//! - **Word wrap**: words crossing the box edge are carried down whole
//! - **Alignment**: left, centered and right-aligned lines
//! - **Batching**: every live run drawn with a single upload and draw call
//! - **Backend agnostic**: GPU work goes through the [`render::TextBackend`] trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bitmap_font::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FontConfig::load_from_file("font.toml")?;
//!     let mut font = BitmapFont::from_config(&config)?;
//!     let mut backend = RecordingBackend::new();
//!     font.on_resources_acquired(&mut backend)?;
//!
//!     let bounds = TextBox::unbounded_height(16.0, 16.0, 320.0);
//!     font.add(font.text_run("Hello, world", bounds).with_alignment(TextAlignment::Center))?;
//!     font.render(&mut backend)?;
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod config;
pub mod foundation;
pub mod render;

#[cfg(test)]
mod tests;

/// Common imports for font users
pub mod prelude {
    pub use crate::{
        assets::AtlasImage,
        config::{Config, ConfigError, FontConfig},
        foundation::math::{colors, Color},
        render::{
            BitmapFont, FontError, FontResult, GlyphAtlasMetrics, RecordingBackend, TextAlignment, TextBackend,
            TextBox, TextBounds, TextLayout, TextQuad, TextRun, TextRunHandle,
        },
    };
}
