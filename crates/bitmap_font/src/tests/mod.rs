//! Shared fixtures and cross-module scenarios

use std::sync::Arc;

use crate::assets::AtlasImage;
use crate::config::FontConfig;
use crate::render::backend::RecordingBackend;
use crate::render::text::{
    BitmapFont, FontError, GlyphAtlasMetrics, GlyphMetrics, TextAlignment, TextBox, TextLayout, TextRun,
};

/// Point size the fixture atlas was "rasterized" at (scale 1.0 when used as point size)
pub const RENDERED_SIZE: u32 = 32;
/// Fixture line height
pub const LINE_HEIGHT: i32 = 40;
/// Advance of every printable fixture glyph, space included
pub const GLYPH_ADVANCE: i32 = 10;
/// Distance from line top to the top of every visible fixture glyph
pub const GLYPH_Y_OFFSET: i32 = 5;

const DEMO_METRICS: &str = include_str!("../../../../resources/fonts/demo.fnt");

/// Fixed-advance metrics: printable ASCII is 10 wide, 30 tall, 5 below the line top
pub fn monospace_metrics() -> GlyphAtlasMetrics {
    let mut metrics = GlyphAtlasMetrics::new(RENDERED_SIZE, LINE_HEIGHT, 30, 256, 256);
    for code in 33u8..=126 {
        metrics.set_glyph(
            code,
            GlyphMetrics {
                x: i32::from(code % 16) * 16,
                y: i32::from(code / 16) * 16,
                width: GLYPH_ADVANCE,
                height: 30,
                x_offset: 0,
                y_offset: GLYPH_Y_OFFSET,
                x_advance: GLYPH_ADVANCE,
            },
        );
    }
    metrics.set_glyph(b' ', GlyphMetrics { x_advance: GLYPH_ADVANCE, ..GlyphMetrics::default() });
    metrics
}

#[test]
fn test_demo_metrics_parse() {
    let metrics = GlyphAtlasMetrics::parse(DEMO_METRICS).unwrap();
    assert_eq!(metrics.rendered_size, 16);
    assert_eq!(metrics.line_height, 20);
    assert_eq!((metrics.atlas_width, metrics.atlas_height), (256, 128));
    assert_eq!(metrics.pages, vec!["demo_0.png".to_string()]);
    assert_eq!(metrics.glyph_count(), 95);
    assert_eq!(metrics.kerning(b'A', b'V'), Some(-1));
    assert_eq!(metrics.kerning(b'T', b'o'), Some(-2));
}

#[test]
fn test_parsed_metrics_drive_layout() {
    let layout = TextLayout::new(Arc::new(GlyphAtlasMetrics::parse(DEMO_METRICS).unwrap()));

    // Double the rendered size: every metric scales by two.
    let run = TextRun::new("To", TextBox::unbounded_height(0.0, 0.0, 500.0), 32.0);
    let quads = layout.layout(&run).unwrap();
    assert_eq!(quads.len(), 2);
    assert_eq!(quads[1].left() - quads[0].left(), (12.0 - 2.0) * 2.0);
    assert_eq!(quads[1].kerning, -4.0);
    assert_eq!(quads[1].top(), 7.0 * 2.0);
}

#[test]
fn test_paragraph_stays_inside_box() {
    let text = "The quick brown fox jumps over the lazy dog. Pack my box with five dozen liquor jugs.";
    let layout = TextLayout::new(Arc::new(GlyphAtlasMetrics::parse(DEMO_METRICS).unwrap()));

    for alignment in [TextAlignment::Left, TextAlignment::Center, TextAlignment::Right] {
        let bounds = TextBox::new(20.0, 10.0, 160.0, 70.0);
        let run = TextRun::new(text, bounds, 16.0).with_alignment(alignment);
        let quads = layout.layout(&run).unwrap();

        assert!(!quads.is_empty());
        assert!(quads.iter().all(|q| q.bottom() <= bounds.bottom()), "{alignment:?} overflowed the bottom");
        for q in quads.iter().filter(|q| q.width() > 0.0) {
            assert!(q.left() >= bounds.x - 1e-3, "{alignment:?} glyph left of box");
            assert!(q.right() <= bounds.right() + 1e-3, "{alignment:?} glyph right of box");
        }

        // Line numbers never decrease.
        assert!(quads.windows(2).all(|w| w[0].line_number <= w[1].line_number));
        assert!(quads.iter().any(|q| q.line_number > 1));
    }
}

#[test]
fn test_font_from_config_files() {
    let dir = std::env::temp_dir().join(format!("bitmap_font_scenario_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("demo.fnt"), DEMO_METRICS).unwrap();
    image::RgbaImage::new(256, 128).save(dir.join("demo_0.png")).unwrap();

    let config = FontConfig::new(dir.join("demo.fnt").to_string_lossy()).with_max_quads(32);
    let mut font = BitmapFont::from_config(&config).unwrap();
    let mut backend = RecordingBackend::new();
    font.on_resources_acquired(&mut backend).unwrap();

    let handle = font.add(font.text_run("Hello", TextBox::unbounded_height(0.0, 0.0, 200.0))).unwrap();
    font.render(&mut backend).unwrap();
    assert_eq!(backend.draws()[0].primitive_count, 10);
    assert_eq!(font.run(handle).unwrap().point_size(), 32.0);

    font.clear_all();
    font.render(&mut backend).unwrap();
    assert_eq!(backend.draws().len(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_metrics_file_is_a_load_error() {
    let config = FontConfig::new("does/not/exist.fnt");
    let err = BitmapFont::from_config(&config).unwrap_err();
    assert!(matches!(err, FontError::Io { .. }));
}

#[test]
fn test_atlas_pixels_reach_the_backend() {
    let mut font = BitmapFont::new(monospace_metrics(), AtlasImage::blank(256, 256), &FontConfig::default()).unwrap();
    let mut backend = RecordingBackend::new();
    font.on_resources_acquired(&mut backend).unwrap();
    assert_eq!(backend.live_textures(), 1);
    assert!(font.has_resources());
}
