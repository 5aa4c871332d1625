use image::imageops;
use serde::{Deserialize, Serialize};

use crate::{
    effects::traits::{Effect, EffectConfig, EffectMetadata},
    error::{EffectError, Result},
    raster::Raster,
};

pub const PERCENT: &str = "percent";
pub const RADIUS: &str = "radius";
pub const THRESHOLD: &str = "threshold";

/// Parameters for [`sharpen`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharpenParams {
    /// Strength of the added detail; 200 matches aggressive camera ISP sharpening
    pub percent: f32,
    /// Gaussian blur radius of the mask
    pub radius: f32,
    /// Minimum absolute detail before a channel is touched
    pub threshold: u8,
}

impl Default for SharpenParams {
    fn default() -> Self {
        Self {
            percent: 200.0,
            radius: 2.0,
            threshold: 3,
        }
    }
}

/// Unsharp mask: add `percent/100 × (original − blurred)` where the detail exceeds `threshold`
///
/// Channels whose local detail is at or below the threshold are left as they
/// are, which keeps flat regions free of amplified noise. `percent` is not
/// capped. Alpha passes through. A radius that is not a positive normal
/// float (zero, negative, NaN, infinite, subnormal) leaves the raster as is.
pub fn sharpen(raster: &Raster, percent: f32, radius: f32, threshold: u8) -> Raster {
    if !radius.is_normal() || radius < 0.0 || percent == 0.0 {
        return raster.clone();
    }

    let blurred = imageops::blur(raster.as_rgba(), radius);
    let amount = percent / 100.0;
    let threshold = threshold as f32;

    let mut output = raster.as_rgba().clone();
    for (pixel, mask) in output.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let original = pixel[c] as f32;
            let detail = original - mask[c] as f32;
            if detail.abs() > threshold {
                pixel[c] = (original + detail * amount).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    raster.derive(output)
}

/// Pipeline stage wrapping [`sharpen`]
pub struct Sharpen {
    params: SharpenParams,
}

impl Sharpen {
    pub fn new(params: SharpenParams) -> Self {
        Self { params }
    }

    /// Radius must be finite and non-negative, percent finite
    pub fn from_config(config: &EffectConfig) -> Result<Self> {
        let defaults = SharpenParams::default();
        let params = SharpenParams {
            percent: config.f32_or(PERCENT, defaults.percent)?,
            radius: config.f32_or(RADIUS, defaults.radius)?,
            threshold: config.u8_or(THRESHOLD, defaults.threshold)?,
        };

        let invalid = |key: &str, value: f32| EffectError::InvalidParameter {
            effect: config.effect.clone(),
            key: key.to_string(),
            value: value.to_string(),
        };
        if !params.percent.is_finite() {
            return Err(invalid(PERCENT, params.percent).into());
        }
        if !params.radius.is_finite() || params.radius < 0.0 {
            return Err(invalid(RADIUS, params.radius).into());
        }

        Ok(Self::new(params))
    }
}

impl Effect for Sharpen {
    fn name(&self) -> &str {
        "sharpen"
    }

    fn description(&self) -> &str {
        "Unsharp-mask edge halos like an over-eager camera ISP"
    }

    fn apply(&self, raster: &Raster) -> Result<Raster> {
        Ok(sharpen(
            raster,
            self.params.percent,
            self.params.radius,
            self.params.threshold,
        ))
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            deterministic: true,
            preserves_dimensions: true,
            performance_impact: 0.3,
            parameters: vec![
                (PERCENT.to_string(), "Sharpening strength in percent".to_string()),
                (RADIUS.to_string(), "Blur radius of the mask".to_string()),
                (THRESHOLD.to_string(), "Minimum detail to sharpen (0-255)".to_string()),
            ],
        }
    }
}
