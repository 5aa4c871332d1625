use std::fmt;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    effects::compression::codec::{JpegCodec, LossyCodec},
    error::{ConfigError, Result},
    raster::Raster,
};

/// Best simulated encoder quality, used at level 1
pub const MAX_QUALITY: u8 = 95;
/// Quality floor for high levels
pub const MIN_QUALITY: u8 = 1;
/// Highest level that keeps full resolution
pub const FULL_RESOLUTION_LEVEL: u32 = 50;
/// Scale floor for extreme levels
pub const MIN_SCALE_FACTOR: f64 = 0.01;

/// How a macroblocked raster is stretched back to its original size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpscaleMode {
    /// Nearest neighbor: hard, visible macroblock edges
    Blocky,
    /// Bilinear: organic smear instead of visible blocks
    Smooth,
}

impl UpscaleMode {
    pub fn filter(self) -> FilterType {
        match self {
            UpscaleMode::Blocky => FilterType::Nearest,
            UpscaleMode::Smooth => FilterType::Triangle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UpscaleMode::Blocky => "blocky",
            UpscaleMode::Smooth => "smooth",
        }
    }
}

impl fmt::Display for UpscaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpscaleMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blocky" | "nearest" => Ok(UpscaleMode::Blocky),
            "smooth" | "bilinear" => Ok(UpscaleMode::Smooth),
            _ => Err(ConfigError::InvalidValue {
                key: "upscale".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Simulated encoder quality: `clamp(95 − level, 1, 95)`
pub fn quality_for_level(level: u32) -> u8 {
    (MAX_QUALITY as i64 - level as i64).clamp(MIN_QUALITY as i64, MAX_QUALITY as i64) as u8
}

/// Internal resolution scale: 1.0 up to level 50, then `max(0.01, 50 / level)`
pub fn scale_factor_for_level(level: u32) -> f64 {
    if level <= FULL_RESOLUTION_LEVEL {
        return 1.0;
    }
    (FULL_RESOLUTION_LEVEL as f64 / level as f64).max(MIN_SCALE_FACTOR)
}

/// Size of the macroblocked intermediate, never below 1x1
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scale_side = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (scale_side(width), scale_side(height))
}

/// H.264-style degradation through the default JPEG backend
///
/// See [`degrade_with`].
pub fn degrade(raster: &Raster, level: u32, upscale: UpscaleMode) -> Result<Raster> {
    degrade_with(raster, level, upscale, &JpegCodec::default())
}

/// Simulate a cheap intra-frame encode at the given degradation level
///
/// Level 0 returns an unchanged copy. Otherwise the raster is pushed through
/// `codec` at [`quality_for_level`]. Above level 50 it is first shrunk with
/// nearest-neighbor sampling by [`scale_factor_for_level`] and stretched back
/// with `upscale` afterwards, producing macroblocks. The result always has
/// the input's dimensions and is RGB.
///
/// Codec failures surface as [`crate::error::DegradationError`]; the input is
/// never passed through in their place.
pub fn degrade_with(
    raster: &Raster,
    level: u32,
    upscale: UpscaleMode,
    codec: &dyn LossyCodec,
) -> Result<Raster> {
    if level == 0 {
        return Ok(raster.clone());
    }

    let quality = quality_for_level(level);
    let scale = scale_factor_for_level(level);
    let (width, height) = raster.dimensions();

    let mut working = raster.to_rgb_image();
    let downscaled = scale < 1.0;
    if downscaled {
        let (small_w, small_h) = scaled_dimensions(width, height, scale);
        working = imageops::resize(&working, small_w, small_h, FilterType::Nearest);
    }

    debug!(
        "Degrading {}x{} at level {} (quality {}, scale {:.3}, {} via {})",
        width,
        height,
        level,
        quality,
        scale,
        working.width(),
        codec.name()
    );

    let mut decoded = codec.recompress(&working, quality)?;

    if downscaled {
        decoded = imageops::resize(&decoded, width, height, upscale.filter());
    }

    Raster::from_rgb(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DegradationError, SynthError};
    use image::{ImageBuffer, Rgb, RgbImage};

    fn checker(width: u32, height: u32) -> Raster {
        let buffer = ImageBuffer::from_fn(width, height, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgb([240, 30, 30])
            } else {
                Rgb([20, 60, 220])
            }
        });
        Raster::from_rgb(buffer).unwrap()
    }

    struct FailingCodec;

    impl LossyCodec for FailingCodec {
        fn name(&self) -> &str {
            "failing"
        }

        fn recompress(&self, _image: &RgbImage, _quality: u8) -> std::result::Result<RgbImage, DegradationError> {
            Err(DegradationError::EncodeFailed {
                codec: "failing".to_string(),
                reason: "unsupported".to_string(),
            })
        }
    }

    /// Records the size and quality the codec saw, passing pixels through.
    struct RecordingCodec(std::sync::Mutex<Option<(u32, u32, u8)>>);

    impl RecordingCodec {
        fn new() -> Self {
            Self(std::sync::Mutex::new(None))
        }
    }

    impl LossyCodec for RecordingCodec {
        fn name(&self) -> &str {
            "recording"
        }

        fn recompress(&self, image: &RgbImage, quality: u8) -> std::result::Result<RgbImage, DegradationError> {
            *self.0.lock().unwrap() = Some((image.width(), image.height(), quality));
            Ok(image.clone())
        }
    }

    #[test]
    fn test_quality_mapping() {
        assert_eq!(quality_for_level(1), 94);
        assert_eq!(quality_for_level(10), 85);
        assert_eq!(quality_for_level(94), 1);
        assert_eq!(quality_for_level(95), 1);
        assert_eq!(quality_for_level(150), 1);
        assert_eq!(quality_for_level(u32::MAX), 1);
    }

    #[test]
    fn test_scale_factor_mapping() {
        assert_eq!(scale_factor_for_level(1), 1.0);
        assert_eq!(scale_factor_for_level(50), 1.0);
        assert_eq!(scale_factor_for_level(100), 0.5);
        assert_eq!(scale_factor_for_level(200), 0.25);
        assert_eq!(scale_factor_for_level(5000), 0.01);
        assert_eq!(scale_factor_for_level(u32::MAX), 0.01);
    }

    #[test]
    fn test_scaled_dimensions_floor_at_one() {
        assert_eq!(scaled_dimensions(520, 130, 0.5), (260, 65));
        assert_eq!(scaled_dimensions(3, 3, 0.01), (1, 1));
        // Rounds instead of truncating.
        assert_eq!(scaled_dimensions(520, 130, 50.0 / 60.0), (433, 108));
    }

    #[test]
    fn test_level_zero_is_identity() {
        let raster = checker(16, 16);
        assert_eq!(degrade(&raster, 0, UpscaleMode::Blocky).unwrap(), raster);
    }

    #[test]
    fn test_codec_sees_downscaled_image() {
        let recorder = RecordingCodec::new();
        let raster = checker(40, 20);

        degrade_with(&raster, 100, UpscaleMode::Blocky, &recorder).unwrap();
        assert_eq!(*recorder.0.lock().unwrap(), Some((20, 10, 1)));

        degrade_with(&raster, 50, UpscaleMode::Blocky, &recorder).unwrap();
        assert_eq!(*recorder.0.lock().unwrap(), Some((40, 20, 45)));
    }

    #[test]
    fn test_codec_failure_is_reported() {
        let raster = checker(8, 8);
        let err = degrade_with(&raster, 30, UpscaleMode::Smooth, &FailingCodec).unwrap_err();

        assert!(matches!(err, SynthError::Degradation(_)));
    }

    #[test]
    fn test_blocky_upscale_makes_blocks() {
        let raster = checker(64, 32);
        let degraded = degrade_with(
            &raster,
            200,
            UpscaleMode::Blocky,
            &RecordingCodec::new(),
        )
        .unwrap();

        // Scale 0.25 with nearest up and down: every 4x4 cell is one color.
        for by in 0..8 {
            for bx in 0..16 {
                let first = degraded.pixel(bx * 4, by * 4);
                for y in 0..4 {
                    for x in 0..4 {
                        assert_eq!(degraded.pixel(bx * 4 + x, by * 4 + y), first);
                    }
                }
            }
        }
    }

    #[test]
    fn test_smooth_upscale_blends_blocks() {
        let raster = checker(64, 32);
        let smooth =
            degrade_with(&raster, 200, UpscaleMode::Smooth, &RecordingCodec::new()).unwrap();
        let blocky =
            degrade_with(&raster, 200, UpscaleMode::Blocky, &RecordingCodec::new()).unwrap();

        assert_ne!(smooth, blocky);
        assert_eq!(smooth.dimensions(), (64, 32));

        // Bilinear stretch produces reds strictly between the two checker colors
        let blended = smooth
            .as_rgba()
            .pixels()
            .filter(|p| p[0] > 20 && p[0] < 240)
            .count();
        assert!(blended > 0);

        // and at least one 4x4 cell is no longer a single color
        let mixed_cell = (0..8).any(|by| {
            (0..16).any(|bx| {
                let first = smooth.pixel(bx * 4, by * 4);
                (0..4).any(|y| (0..4).any(|x| smooth.pixel(bx * 4 + x, by * 4 + y) != first))
            })
        });
        assert!(mixed_cell);
    }

    #[test]
    fn test_upscale_filters_differ() {
        assert_eq!(UpscaleMode::Blocky.filter(), FilterType::Nearest);
        assert_eq!(UpscaleMode::Smooth.filter(), FilterType::Triangle);
    }

    #[test]
    fn test_rgba_input_returns_rgb() {
        let buffer = image::RgbaImage::from_pixel(10, 10, image::Rgba([90, 90, 90, 40]));
        let raster = Raster::from_rgba(buffer).unwrap();
        let degraded = degrade(&raster, 20, UpscaleMode::Smooth).unwrap();

        assert_eq!(degraded.mode(), crate::raster::ColorMode::Rgb);
        assert_eq!(degraded.dimensions(), (10, 10));
    }

    #[test]
    fn test_upscale_mode_parsing() {
        assert_eq!("blocky".parse::<UpscaleMode>().unwrap(), UpscaleMode::Blocky);
        assert_eq!("Smooth".parse::<UpscaleMode>().unwrap(), UpscaleMode::Smooth);
        assert!("lanczos".parse::<UpscaleMode>().is_err());
    }
}
