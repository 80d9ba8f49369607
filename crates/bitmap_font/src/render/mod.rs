//! Text rendering
//!
//! The `text` module turns text into quads; `backend` is the boundary the
//! quads cross to reach a graphics device.

pub mod backend;
pub mod text;

pub use backend::{
    BackendError, BackendResult, BlendFactor, BlendState, DrawCall, PrimitiveTopology, RecordingBackend,
    TextBackend, TextureId, VertexBufferId,
};
pub use text::*;
