//! Bitmap font demo application
//!
//! Loads the demo font, lays out the text runs described in `demo.toml` and
//! drives them through a full device lifecycle on the headless recording
//! backend, logging what reaches the GPU boundary each frame.

use bitmap_font::config::{Config, ConfigError, FontConfig};
use bitmap_font::foundation::logging;
use bitmap_font::foundation::math::{colors, Color};
use bitmap_font::render::{
    BitmapFont, FontError, RecordingBackend, TextAlignment, TextBox, TextRunHandle,
};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "font_demo/demo.toml";

/// Errors that end the demo
#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Font error: {0}")]
    Font(#[from] FontError),
}

/// One text run to display
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DemoRun {
    text: String,
    bounds: TextBox,
    #[serde(default)]
    alignment: TextAlignment,
    point_size: Option<f32>,
    color: Option<[f32; 4]>,
}

impl DemoRun {
    fn color(&self) -> Color {
        self.color.map_or_else(colors::white, |[r, g, b, a]| Color::new(r, g, b, a))
    }
}

/// Demo configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    font: FontConfig,
    frames: u32,
    runs: Vec<DemoRun>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            font: FontConfig::default(),
            frames: 1,
            runs: vec![DemoRun {
                text: "Hello, bitmap fonts".to_string(),
                bounds: TextBox::unbounded_height(16.0, 16.0, 320.0),
                alignment: TextAlignment::Left,
                point_size: None,
                color: None,
            }],
        }
    }
}

impl Config for DemoConfig {}

struct DemoApp {
    font: BitmapFont,
    backend: RecordingBackend,
    handles: Vec<TextRunHandle>,
}

impl DemoApp {
    fn new(config: &DemoConfig) -> Result<Self, DemoError> {
        log::info!("Loading font from {}", config.font.metrics_path);
        let font = BitmapFont::from_config(&config.font)?;
        Ok(Self {
            font,
            backend: RecordingBackend::new(),
            handles: Vec::new(),
        })
    }

    fn add_runs(&mut self, runs: &[DemoRun]) -> Result<(), DemoError> {
        for demo_run in runs {
            let mut run = self
                .font
                .text_run(demo_run.text.as_str(), demo_run.bounds)
                .with_alignment(demo_run.alignment)
                .with_color(demo_run.color());
            if let Some(point_size) = demo_run.point_size {
                run = run.with_point_size(point_size);
            }

            let handle = self.font.add(run)?;
            let quads = self.font.run_quads(handle)?;
            let lines = bitmap_font::render::line_count(quads);
            match self.font.run_bounds(handle)? {
                Some(bounds) => log::info!(
                    "Run {:?}: {} quads on {} lines, {:.1}x{:.1} at ({:.1}, {:.1})",
                    handle,
                    quads.len(),
                    lines,
                    bounds.width(),
                    bounds.height(),
                    bounds.min_x,
                    bounds.min_y
                ),
                None => log::info!("Run {:?}: nothing visible", handle),
            }
            self.handles.push(handle);
        }
        Ok(())
    }

    fn frame(&mut self, index: u32) -> Result<(), DemoError> {
        self.font.render(&mut self.backend)?;
        log::info!(
            "Frame {}: {} quads, {} draw calls recorded",
            index,
            self.font.quad_count(),
            self.backend.draws().len()
        );
        Ok(())
    }

    fn run(&mut self, config: &DemoConfig) -> Result<(), DemoError> {
        self.font.on_resources_acquired(&mut self.backend)?;
        self.add_runs(&config.runs)?;

        for index in 0..config.frames {
            self.frame(index)?;
        }

        // Device loss drops the vertex buffer; text survives untouched.
        log::info!("Simulating device loss");
        self.font.on_resources_lost(&mut self.backend);
        self.font.on_resources_acquired(&mut self.backend)?;

        if let Some(&first) = self.handles.first() {
            let replacement = self
                .font
                .run(first)?
                .clone()
                .with_alignment(TextAlignment::Right);
            self.font.replace(first, replacement)?;
        }
        self.frame(config.frames)?;

        self.font.clear_all();
        self.frame(config.frames + 1)?;

        self.font.on_resources_released(&mut self.backend);
        log::info!(
            "Shut down with {} textures and {} vertex buffers alive",
            self.backend.live_textures(),
            self.backend.live_vertex_buffers()
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = match DemoConfig::load_from_file(&path) {
        Ok(config) => config,
        Err(ConfigError::Io { source, .. }) => {
            log::warn!("Could not read {}: {}; using defaults", path, source);
            DemoConfig::default()
        },
        Err(e) => return Err(DemoError::from(e).into()),
    };

    log::info!("Starting bitmap font demo with {} runs", config.runs.len());
    let mut app = DemoApp::new(&config)?;
    app.run(&config)?;
    log::info!("Demo finished");
    Ok(())
}
