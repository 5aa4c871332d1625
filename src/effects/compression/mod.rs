//! # H.264-Style Compression Degradation
//!
//! Two artifact regimes driven by one integer level:
//!
//! - **Levels 1-50**: quality loss only. The raster goes through a lossy
//!   codec at `95 − level` quality (floored at 1), giving ringing and 8x8
//!   block seams.
//! - **Levels above 50**: additionally shrunk to `50 / level` of its size
//!   (floored at 1%) before encoding and stretched back afterwards, which
//!   produces macroblocking.
//!
//! The codec sits behind [`LossyCodec`] so other DCT backends can be swapped
//! in without touching the level math.

mod codec;
mod degrade;

pub use codec::{subsample_chroma_420, JpegCodec, LossyCodec};
pub use degrade::{
    degrade, degrade_with, quality_for_level, scale_factor_for_level, scaled_dimensions,
    UpscaleMode, FULL_RESOLUTION_LEVEL, MAX_QUALITY, MIN_QUALITY, MIN_SCALE_FACTOR,
};

use crate::{
    effects::traits::{Effect, EffectConfig, EffectMetadata},
    error::Result,
    raster::Raster,
};

pub const LEVEL: &str = "level";
pub const UPSCALE: &str = "upscale";
pub const CHROMA_SUBSAMPLING: &str = "chroma_subsampling";

/// Pipeline stage wrapping [`degrade_with`]
pub struct Compression {
    level: u32,
    upscale: UpscaleMode,
    codec: Box<dyn LossyCodec>,
}

impl Compression {
    /// Compression through the default JPEG backend
    pub fn new(level: u32, upscale: UpscaleMode) -> Self {
        Self {
            level,
            upscale,
            codec: Box::new(JpegCodec::default()),
        }
    }

    /// Swap in another lossy backend
    pub fn with_codec(mut self, codec: Box<dyn LossyCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Build from `{ effect = "h264", level = N, upscale = "blocky" }`
    ///
    /// `level` and `upscale` are both required; the upscale policy is never
    /// picked implicitly.
    pub fn from_config(config: &EffectConfig) -> Result<Self> {
        let level = config.require_u32(LEVEL)?;
        let upscale: UpscaleMode = config.require_str(UPSCALE)?.parse()?;
        let chroma_subsampling = config.bool_or(CHROMA_SUBSAMPLING, true)?;

        Ok(Self::new(level, upscale).with_codec(Box::new(
            JpegCodec::new().with_chroma_subsampling(chroma_subsampling),
        )))
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn upscale(&self) -> UpscaleMode {
        self.upscale
    }
}

impl Effect for Compression {
    fn name(&self) -> &str {
        "h264"
    }

    fn description(&self) -> &str {
        "Lossy intra-frame recompression with macroblocking at high levels"
    }

    fn apply(&self, raster: &Raster) -> Result<Raster> {
        degrade_with(raster, self.level, self.upscale, self.codec.as_ref())
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            deterministic: true,
            preserves_dimensions: true,
            performance_impact: 0.5,
            parameters: vec![
                (LEVEL.to_string(), "Degradation level (0 disables, >50 adds macroblocking)".to_string()),
                (UPSCALE.to_string(), "Macroblock upscale: blocky or smooth".to_string()),
                (CHROMA_SUBSAMPLING.to_string(), "Apply 4:2:0 chroma subsampling (default true)".to_string()),
            ],
        }
    }
}
