use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// File name of the generated sheet image, written at each directory root.
/// The classifier never ingests a file with this exact name.
pub const SHEET_FILE_NAME: &str = "sprite.png";
/// File name of the generated stylesheet.
pub const STYLESHEET_FILE_NAME: &str = "sprite.css";
/// File name of the optional JSON metadata.
pub const METADATA_FILE_NAME: &str = "sprite.json";

/// Weight of width over height when ordering images for shelf packing.
/// Must stay strictly larger than any expected image height.
pub const WIDTH_WEIGHT: u64 = 10_000;

/// Which per-directory metadata files to emit next to the sheet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetadataFormat {
    Css,
    Json,
    Both,
}

impl MetadataFormat {
    pub fn wants_css(self) -> bool {
        matches!(self, Self::Css | Self::Both)
    }
    pub fn wants_json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

impl FromStr for MetadataFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "css" => Ok(Self::Css),
            "json" => Ok(Self::Json),
            "both" => Ok(Self::Both),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteConfig {
    /// Root directory to scan.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Pixels between images.
    #[serde(default = "default_padding")]
    pub padding: u32,
    /// Emit per-image diagnostics.
    #[serde(default)]
    pub verbose: bool,
    /// Scale applied when rasterizing vector images.
    #[serde(default = "default_vector_scale")]
    pub vector_scale: f32,
    /// Sort weight of width over height (see [`WIDTH_WEIGHT`]).
    #[serde(default = "default_width_weight")]
    pub width_weight: u64,
    /// External program used to rasterize SVG files.
    #[serde(default = "default_svg_command")]
    pub svg_command: String,
    #[serde(default = "default_metadata")]
    pub metadata: MetadataFormat,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            directory: None,
            padding: default_padding(),
            verbose: false,
            vector_scale: default_vector_scale(),
            width_weight: default_width_weight(),
            svg_command: default_svg_command(),
            metadata: default_metadata(),
        }
    }
}

impl SpriteConfig {
    /// Validates the configuration before any filesystem work starts.
    ///
    /// A missing root directory is reported as [`SpriteError::MissingDirectory`];
    /// other violated constraints as [`SpriteError::InvalidConfig`].
    ///
    /// [`SpriteError::MissingDirectory`]: crate::error::SpriteError::MissingDirectory
    /// [`SpriteError::InvalidConfig`]: crate::error::SpriteError::InvalidConfig
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SpriteError;

        match &self.directory {
            None => return Err(SpriteError::MissingDirectory),
            Some(dir) if dir.as_os_str().is_empty() => return Err(SpriteError::MissingDirectory),
            Some(_) => {}
        }

        if !self.vector_scale.is_finite() || self.vector_scale <= 0.0 {
            return Err(SpriteError::InvalidConfig(format!(
                "vector_scale must be a positive number, got {}",
                self.vector_scale
            )));
        }

        if self.width_weight == 0 {
            return Err(SpriteError::InvalidConfig(
                "width_weight must be greater than zero".into(),
            ));
        }

        if self.svg_command.trim().is_empty() {
            return Err(SpriteError::InvalidConfig(
                "svg_command must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Create a fluent builder for `SpriteConfig`.
    pub fn builder() -> SpriteConfigBuilder {
        SpriteConfigBuilder::new()
    }
}

fn default_padding() -> u32 {
    2
}
fn default_vector_scale() -> f32 {
    1.0
}
fn default_width_weight() -> u64 {
    WIDTH_WEIGHT
}
fn default_svg_command() -> String {
    "rsvg-convert".into()
}
fn default_metadata() -> MetadataFormat {
    MetadataFormat::Css
}

/// Builder for `SpriteConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct SpriteConfigBuilder {
    cfg: SpriteConfig,
}

impl SpriteConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: SpriteConfig::default(),
        }
    }
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cfg.directory = Some(dir.into());
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn verbose(mut self, v: bool) -> Self {
        self.cfg.verbose = v;
        self
    }
    pub fn vector_scale(mut self, v: f32) -> Self {
        self.cfg.vector_scale = v;
        self
    }
    pub fn width_weight(mut self, v: u64) -> Self {
        self.cfg.width_weight = v;
        self
    }
    pub fn svg_command(mut self, v: impl Into<String>) -> Self {
        self.cfg.svg_command = v.into();
        self
    }
    pub fn metadata(mut self, v: MetadataFormat) -> Self {
        self.cfg.metadata = v;
        self
    }
    pub fn build(self) -> SpriteConfig {
        self.cfg
    }
}
