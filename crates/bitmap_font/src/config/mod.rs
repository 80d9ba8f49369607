//! Configuration system
//!
//! Configuration files are TOML or RON, picked by file extension.

use std::path::{Path, PathBuf};

pub use serde::{Serialize, Deserialize};

/// On-disk configuration formats, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format of a configuration file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(self, contents: &str) -> Result<T, String> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
            Self::Ron => ron::from_str(contents).map_err(|e| e.to_string()),
        }
    }

    fn render<T: Serialize>(self, value: &T) -> Result<String, String> {
        match self {
            Self::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default()).map_err(|e| e.to_string()),
        }
    }
}

/// Configuration that can be read from and written to TOML or RON files
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = format.parse(&contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        log::debug!("Loaded {:?} configuration from {:?}", format, path);
        Ok(config)
    }

    /// Save configuration to file
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = ConfigFormat::from_path(path)?
            .render(self)
            .map_err(ConfigError::Serialize)?;

        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read or written
    #[error("Failed to access {path:?}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// File contents do not describe this configuration
    #[error("Failed to parse {path:?}: {message}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Extension is neither `.toml` nor `.ron`
    #[error("Unsupported configuration format: {0:?}")]
    UnsupportedFormat(PathBuf),

    /// Values that parsed but cannot be used
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Quads per vertex buffer upload when nothing else is configured
pub const DEFAULT_MAX_QUADS: usize = 4096;

/// # Font Configuration
///
/// Where a bitmap font's metrics live and how large its vertex buffer is.
/// The atlas page image named by the metrics file is resolved relative to
/// the metrics file's directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Path to the glyph atlas metrics file
    pub metrics_path: String,
    /// Maximum quads the batch (and its GPU vertex buffer) can hold
    pub max_quads: usize,
    /// Point size used by runs that do not pick one
    pub default_point_size: f32,
    /// Whether kerning is applied by default
    pub kerning: bool,
}

impl FontConfig {
    /// Create a configuration for the given metrics file
    pub fn new(metrics_path: impl Into<String>) -> Self {
        Self {
            metrics_path: metrics_path.into(),
            ..Self::default()
        }
    }

    /// Set the batch capacity in quads
    #[must_use]
    pub fn with_max_quads(mut self, max_quads: usize) -> Self {
        self.max_quads = max_quads;
        self
    }

    /// Set the default point size
    #[must_use]
    pub fn with_default_point_size(mut self, size: f32) -> Self {
        self.default_point_size = size;
        self
    }

    /// Capacity of the vertex buffer in vertices (six per quad)
    #[must_use]
    pub const fn max_vertices(&self) -> usize {
        self.max_quads * crate::render::text::VERTICES_PER_QUAD
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics_path.is_empty() {
            return Err(ConfigError::Invalid("metrics path cannot be empty".to_string()));
        }
        if self.max_quads == 0 {
            return Err(ConfigError::Invalid("max quads must be at least 1".to_string()));
        }
        if self.default_point_size <= 0.0 || !self.default_point_size.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "default point size must be positive, got {}",
                self.default_point_size
            )));
        }
        Ok(())
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            metrics_path: "resources/fonts/demo.fnt".to_string(),
            max_quads: DEFAULT_MAX_QUADS,
            default_point_size: 32.0,
            kerning: true,
        }
    }
}

impl Config for FontConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FontConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_vertices(), DEFAULT_MAX_QUADS * 6);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = FontConfig::new("font.fnt").with_max_quads(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_point_size() {
        let config = FontConfig::new("font.fnt").with_default_point_size(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FontConfig = toml::from_str("metrics_path = \"fonts/arial.fnt\"\nmax_quads = 16\n").unwrap();
        assert_eq!(config.metrics_path, "fonts/arial.fnt");
        assert_eq!(config.max_quads, 16);
        assert!(config.kerning);
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("bitmap_font_config_{}.ron", std::process::id()));
        let config = FontConfig::new("a.fnt").with_max_quads(12);
        config.save_to_file(&path).unwrap();
        let loaded = FontConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = FontConfig::default().save_to_file("config.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/font.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("font.ron")).unwrap(), ConfigFormat::Ron);
        assert!(ConfigFormat::from_path(Path::new("toml")).is_err());
    }

    #[test]
    fn test_missing_file_names_path() {
        match FontConfig::load_from_file("no/such/font.toml") {
            Err(ConfigError::Io { path, .. }) => assert_eq!(path, Path::new("no/such/font.toml")),
            other => panic!("expected IO error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("bitmap_font_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "max_quads = \"many\"\n").unwrap();
        let err = FontConfig::load_from_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
