//! Math utilities and types
//!
//! Vector aliases plus the color packing used by text vertices.

pub use nalgebra::Vector4;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// RGBA color with components in `0.0..=1.0`
pub type Color = Vec4;

/// Named colors
pub mod colors {
    use super::Color;

    /// Opaque white
    #[must_use]
    pub fn white() -> Color {
        Color::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Opaque black
    #[must_use]
    pub fn black() -> Color {
        Color::new(0.0, 0.0, 0.0, 1.0)
    }
}

/// Pack an RGBA color into a `0xAARRGGBB` word
///
/// Components are clamped to `0.0..=1.0` and rounded to the nearest 8-bit value.
#[must_use]
pub fn pack_argb(color: &Color) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(color.w) << 24) | (channel(color.x) << 16) | (channel(color.y) << 8) | channel(color.z)
}
