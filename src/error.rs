use thiserror::Error;

/// Main error type for the plate-synth library
#[derive(Error, Debug)]
pub enum SynthError {
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),

    #[error("Degradation failed: {0}")]
    Degradation(#[from] DegradationError),

    #[error("Plate rendering error: {0}")]
    Plate(#[from] PlateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Raster construction and validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RasterError {
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferMismatch { expected: usize, actual: usize },

    #[error("Raster size mismatch: {left:?} vs {right:?}")]
    SizeMismatch { left: (u32, u32), right: (u32, u32) },
}

/// Effect lookup and parameter errors
#[derive(Error, Debug)]
pub enum EffectError {
    #[error("Effect not found: {name}")]
    NotFound { name: String },

    #[error("Missing parameter for {effect}: {key}")]
    MissingParameter { effect: String, key: String },

    #[error("Invalid parameter for {effect}: {key} = {value}")]
    InvalidParameter {
        effect: String,
        key: String,
        value: String,
    },
}

/// Failures of the lossy encode/decode round trip
///
/// These never fall back to returning the input untouched.
#[derive(Error, Debug)]
pub enum DegradationError {
    #[error("{codec} encode failed: {reason}")]
    EncodeFailed { codec: String, reason: String },

    #[error("{codec} decode failed: {reason}")]
    DecodeFailed { codec: String, reason: String },

    #[error("{codec} round trip changed size from {expected:?} to {actual:?}")]
    DimensionMismatch {
        codec: String,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Base plate rendering errors
#[derive(Error, Debug)]
pub enum PlateError {
    #[error("Failed to load font: {path} - {reason}")]
    FontLoadFailed { path: String, reason: String },

    #[error("Plate text is empty")]
    EmptyText,
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path} - {reason}")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using SynthError
pub type Result<T> = std::result::Result<T, SynthError>;

impl SynthError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Plate(PlateError::FontLoadFailed { path, .. }) => {
                format!(
                    "Could not load font '{}'. Set plate.font_path to a TrueType font.",
                    path
                )
            }
            Self::Effect(EffectError::NotFound { name }) => {
                format!(
                    "Effect '{}' not found. Available effects: motion_blur, sharpen, noise, h264, resize",
                    name
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
