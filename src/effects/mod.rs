//! # Degradation Effects
//!
//! Independent pixel-space transforms that turn a clean plate into something a
//! cheap surveillance camera might have recorded. Every effect takes a
//! [`Raster`](crate::raster::Raster) by reference and returns a new one with
//! the same dimensions (except [`resize`](resize::resize)).
//!
//! ## Built-in Effects
//!
//! - **motion_blur**: directional smear from averaging shifted copies
//! - **sharpen**: unsharp mask with edge halos
//! - **noise**: uniform RGB grain
//! - **h264**: lossy recompression with macroblocking at high levels
//! - **resize**: clean Lanczos scaling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use plate_synth::effects::{EffectRegistry, Pipeline, Preset, Compression, UpscaleMode};
//! use plate_synth::raster::Raster;
//!
//! # fn main() -> plate_synth::Result<()> {
//! let registry = EffectRegistry::new();
//! let pipeline = Pipeline::from_configs(&registry, &Preset::Cctv.stages())?
//!     .then(Box::new(Compression::new(80, UpscaleMode::Blocky)));
//!
//! let clean = Raster::open("plate.png")?;
//! let degraded = pipeline.apply(&clean)?;
//! degraded.save_jpeg("plate_L080.jpg", 95)?;
//! # Ok(())
//! # }
//! ```

pub mod compression;
pub mod motion_blur;
pub mod noise;
pub mod pipeline;
pub mod registry;
pub mod resize;
pub mod sharpen;
pub mod traits;

pub use compression::{degrade, degrade_with, Compression, JpegCodec, LossyCodec, UpscaleMode};
pub use motion_blur::{motion_blur, MotionBlur, MotionBlurParams};
pub use noise::{add_noise, add_noise_with_rng, Noise, NoiseParams};
pub use pipeline::{Pipeline, Preset};
pub use registry::EffectRegistry;
pub use resize::{resize, Resize, ResizeParams};
pub use sharpen::{sharpen, Sharpen, SharpenParams};
pub use traits::{ConfigValue, Effect, EffectConfig, EffectMetadata};
