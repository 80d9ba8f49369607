//! Asset loading for font resources

pub mod image_loader;

pub use image_loader::AtlasImage;
