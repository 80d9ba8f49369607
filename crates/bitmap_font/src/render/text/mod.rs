//! Bitmap font text system
//!
//! Atlas metrics and their loader, the layout engine, the quad batch and the
//! font that ties them to a rendering backend.

pub mod font_atlas;
pub mod font_loader;
pub mod quad_batch;
pub mod text_layout;
pub mod text_quad;
pub mod text_renderer;
pub mod text_run;

pub use font_atlas::*;
pub use font_loader::FontLoader;
pub use quad_batch::QuadBatch;
pub use text_layout::*;
pub use text_quad::*;
pub use text_renderer::*;
pub use text_run::*;
