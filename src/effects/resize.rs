use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::{
    effects::traits::{Effect, EffectConfig, EffectMetadata},
    error::{RasterError, Result},
    raster::Raster,
};

pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";

/// Target size for [`resize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
}

/// Quality-preserving scale to an exact target size using Lanczos3
///
/// Unlike the nearest-neighbor resampling inside the compression stage, this
/// is meant to look clean. Resizing to the current size returns a copy.
pub fn resize(raster: &Raster, target_width: u32, target_height: u32) -> Result<Raster> {
    if target_width == 0 || target_height == 0 {
        return Err(RasterError::InvalidDimensions {
            width: target_width,
            height: target_height,
        }
        .into());
    }

    if raster.dimensions() == (target_width, target_height) {
        return Ok(raster.clone());
    }

    let resized = imageops::resize(
        raster.as_rgba(),
        target_width,
        target_height,
        FilterType::Lanczos3,
    );

    Raster::from_parts(resized, raster.mode())
}

/// Pipeline stage wrapping [`resize`]
pub struct Resize {
    params: ResizeParams,
}

impl Resize {
    pub fn new(params: ResizeParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &EffectConfig) -> Result<Self> {
        Ok(Self::new(ResizeParams {
            width: config.require_u32(WIDTH)?,
            height: config.require_u32(HEIGHT)?,
        }))
    }
}

impl Effect for Resize {
    fn name(&self) -> &str {
        "resize"
    }

    fn description(&self) -> &str {
        "Lanczos resize to a fixed output size"
    }

    fn apply(&self, raster: &Raster) -> Result<Raster> {
        resize(raster, self.params.width, self.params.height)
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            deterministic: true,
            preserves_dimensions: false,
            performance_impact: 0.2,
            parameters: vec![
                (WIDTH.to_string(), "Target width in pixels".to_string()),
                (HEIGHT.to_string(), "Target height in pixels".to_string()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SynthError;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn test_resize_changes_dimensions() {
        let raster = Raster::new_filled(52, 13, [200, 200, 200]).unwrap();
        let resized = resize(&raster, 104, 26).unwrap();

        assert_eq!(resized.dimensions(), (104, 26));
        assert_eq!(resized.mode(), raster.mode());
    }

    #[test]
    fn test_same_size_is_pixel_equivalent() {
        let buffer = ImageBuffer::from_fn(20, 10, |x, y| Rgb([(x * 12) as u8, (y * 25) as u8, 90]));
        let raster = Raster::from_rgb(buffer).unwrap();

        assert_eq!(resize(&raster, 20, 10).unwrap(), raster);
    }

    #[test]
    fn test_flat_color_survives_lanczos() {
        let raster = Raster::new_filled(30, 30, [120, 60, 200]).unwrap();
        let resized = resize(&raster, 17, 45).unwrap();

        for pixel in resized.as_rgba().pixels() {
            for c in 0..3 {
                assert!((pixel[c] as i16 - raster.pixel(0, 0)[c] as i16).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_zero_target_rejected() {
        let raster = Raster::new_filled(4, 4, [0, 0, 0]).unwrap();

        assert!(matches!(
            resize(&raster, 0, 4).unwrap_err(),
            SynthError::Raster(RasterError::InvalidDimensions { .. })
        ));
    }
}
