use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    effects::{EffectConfig, EffectRegistry, Preset, UpscaleMode},
    error::{ConfigError, Result},
};

/// Main configuration for plate-synth
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base plate layout
    pub plate: PlateConfig,

    /// Diagonal watermark overlay
    pub watermark: WatermarkConfig,

    /// Effect stages and degradation levels
    pub degradation: DegradationConfig,

    /// Where and how results are written
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.plate.validate()?;
        self.watermark.validate()?;
        self.degradation.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Base plate layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateConfig {
    /// Plate width in pixels
    pub width: u32,

    /// Plate height in pixels
    pub height: u32,

    /// Background RGBA
    pub background: [u8; 4],

    /// Glyph RGBA
    pub text_color: [u8; 4],

    /// TrueType/OpenType font used for both glyphs and watermark
    pub font_path: PathBuf,

    /// Glyph size in pixels
    pub font_size: f32,

    /// Extra pixels between glyphs
    pub text_spacing: u32,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            width: 520,
            height: 130,
            background: [200, 200, 200, 255],
            text_color: [0, 0, 0, 255],
            font_path: PathBuf::from("fonts/FE-Schrift.ttf"),
            font_size: 100.0,
            text_spacing: 10,
        }
    }
}

impl PlateConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid(
                "plate.size",
                format!("{}x{}", self.width, self.height),
            )
            .into());
        }

        if !(self.font_size > 0.0) {
            return Err(invalid("plate.font_size", self.font_size).into());
        }

        Ok(())
    }
}

/// Repeating rotated text composited over the plate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub enabled: bool,

    pub text: String,

    pub font_size: f32,

    /// RGBA, alpha controls how faint the watermark is
    pub color: [u8; 4],

    /// Horizontal gap between repetitions
    pub gap_x: u32,

    /// Vertical gap between rows
    pub gap_y: u32,

    /// Counter-clockwise rotation in degrees
    pub rotation: f32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            text: "MERCOSUL BRASIL".to_string(),
            font_size: 15.0,
            color: [180, 180, 180, 50],
            gap_x: 15,
            gap_y: 15,
            rotation: 45.0,
        }
    }
}

impl WatermarkConfig {
    fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if !(self.font_size > 0.0) {
            return Err(invalid("watermark.font_size", self.font_size).into());
        }

        if self.text.trim().is_empty() {
            return Err(invalid("watermark.text", "\"\"").into());
        }

        Ok(())
    }
}

/// Effect stages and degradation levels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DegradationConfig {
    /// One degraded image is written per level; 0 means compression off
    pub levels: Vec<u32>,

    /// How macroblocked rasters are stretched back
    pub upscale: UpscaleMode,

    /// Stages run before the per-level compression stage
    pub stages: Vec<EffectConfig>,
}

impl Default for DegradationConfig {
    fn default() -> Self {
        Self {
            levels: vec![0, 10, 30, 50, 80, 120, 200],
            upscale: UpscaleMode::Blocky,
            stages: Preset::Cctv.stages(),
        }
    }
}

impl DegradationConfig {
    fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(invalid("degradation.levels", "[]").into());
        }

        // Building each stage checks both the name and its parameters
        let registry = EffectRegistry::new();
        for stage in &self.stages {
            registry.create(stage)?;
        }

        Ok(())
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,

    /// Quality of the saved JPEG files (1-100)
    pub jpeg_quality: u8,

    /// Also write the undegraded plate
    pub save_clean: bool,

    /// Final Lanczos resize applied to every written image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize: Option<[u32; 2]>,

    /// Number of parallel workers
    pub processing_threads: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("generated-images"),
            jpeg_quality: 95,
            save_clean: true,
            resize: None,
            processing_threads: num_cpus::get(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(invalid("output.jpeg_quality", self.jpeg_quality).into());
        }

        if let Some([width, height]) = self.resize {
            if width == 0 || height == 0 {
                return Err(invalid("output.resize", format!("{}x{}", width, height)).into());
            }
        }

        if self.processing_threads == 0 {
            return Err(invalid("output.processing_threads", self.processing_threads).into());
        }

        Ok(())
    }
}
