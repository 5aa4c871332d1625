//! # Plate-Synth
//!
//! Synthesize degraded license plate images that look like frames from a
//! cheap CCTV camera, for training and testing plate recognition.
//!
//! A clean plate is rendered from text, then pushed through a chain of
//! pixel-space effects: motion blur, aggressive sharpening, sensor noise and
//! an H.264-style lossy recompression whose strength is set by a single
//! integer degradation level.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plate_synth::{batch::BatchGenerator, config::Config};
//!
//! # fn main() -> plate_synth::Result<()> {
//! let config = Config::default();
//! let generator = BatchGenerator::new(config)?;
//!
//! let report = generator.run(&["ABC1D23".to_string()])?;
//! println!("wrote {} images", report.images_written);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`raster`] - Owned pixel buffers and similarity metrics
//! - [`effects`] - The degradation stages, registry and pipeline
//! - [`plate`] - Base plate and watermark rendering
//! - [`batch`] - Parallel generation across plates and levels
//! - [`config`] - Configuration management
//!
//! ## Degrading Existing Images
//!
//! The effects do not need a font or a rendered plate:
//!
//! ```rust,no_run
//! use plate_synth::effects::{degrade, motion_blur, sharpen, add_noise, UpscaleMode};
//! use plate_synth::raster::Raster;
//!
//! # fn main() -> plate_synth::Result<()> {
//! let clean = Raster::open("plate.png")?;
//!
//! let blurred = motion_blur(&clean, 0.0, 3);
//! let sharpened = sharpen(&blurred, 200.0, 2.0, 3);
//! let noisy = add_noise(&sharpened, 0.08);
//! let degraded = degrade(&noisy, 120, UpscaleMode::Blocky)?;
//!
//! degraded.save_jpeg("plate_L120.jpg", 95)?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod effects;
pub mod error;
pub mod plate;
pub mod raster;

// Re-export commonly used types
pub use batch::{BatchGenerator, BatchReport};
pub use config::Config;
pub use effects::{Effect, EffectConfig, EffectRegistry, Pipeline, Preset, UpscaleMode};
pub use error::{Result, SynthError};
pub use plate::PlateRenderer;
pub use raster::{ColorMode, Raster};
