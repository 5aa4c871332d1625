//! Directional motion smear built from shifted copies of the frame.

use image::{ImageBuffer, Rgba};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    effects::traits::{Effect, EffectConfig, EffectMetadata},
    error::Result,
    raster::Raster,
};

pub const ANGLE: &str = "angle";
pub const INTENSITY: &str = "intensity";

/// Parameters for [`motion_blur`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionBlurParams {
    /// Direction of travel in degrees, image space (y grows downward)
    pub angle: f32,
    /// Number of shifted frames averaged together
    pub intensity: u32,
}

impl Default for MotionBlurParams {
    fn default() -> Self {
        Self {
            angle: 0.0,
            intensity: 3,
        }
    }
}

/// Smear the raster along `angle_degrees` by averaging `intensity` shifted copies
///
/// Copy `i` is translated by `(round(i·cos θ), round(i·sin θ))` onto a fully
/// transparent canvas, so pixels pushed past the border are lost and the
/// uncovered edge fades toward transparent black. Copies are folded into a
/// running mean (copy `i` weighted `1/(i+1)`), all four channels independently.
/// An RGB input comes back as RGB with the dimmed colors kept.
///
/// `intensity <= 1` returns an unchanged copy.
pub fn motion_blur(raster: &Raster, angle_degrees: f32, intensity: u32) -> Raster {
    if intensity <= 1 {
        return raster.clone();
    }

    let (width, height) = raster.dimensions();
    let radians = angle_degrees.to_radians();
    let (dx, dy) = (radians.cos(), radians.sin());
    let source = raster.as_rgba();

    let mut accumulator = vec![0.0f32; width as usize * height as usize * 4];

    for i in 0..intensity {
        let shift_x = (i as f32 * dx).round() as i64;
        let shift_y = (i as f32 * dy).round() as i64;
        let weight = 1.0 / (i + 1) as f32;

        for y in 0..height {
            let src_y = y as i64 - shift_y;
            for x in 0..width {
                let src_x = x as i64 - shift_x;
                let sample = if src_x >= 0
                    && src_y >= 0
                    && src_x < width as i64
                    && src_y < height as i64
                {
                    source.get_pixel(src_x as u32, src_y as u32).0
                } else {
                    [0; 4]
                };

                let idx = (y as usize * width as usize + x as usize) * 4;
                for (acc, &value) in accumulator[idx..idx + 4].iter_mut().zip(sample.iter()) {
                    *acc += (value as f32 - *acc) * weight;
                }
            }
        }
    }

    let buffer = ImageBuffer::from_fn(width, height, |x, y| {
        let idx = (y as usize * width as usize + x as usize) * 4;
        let mut pixel = [0u8; 4];
        for (out, acc) in pixel.iter_mut().zip(&accumulator[idx..idx + 4]) {
            *out = acc.round().clamp(0.0, 255.0) as u8;
        }
        Rgba(pixel)
    });

    debug!(
        "Motion blur: {} frames at {:.1}° (step {:.2}, {:.2})",
        intensity, angle_degrees, dx, dy
    );

    raster.derive(buffer)
}

/// Pipeline stage wrapping [`motion_blur`]
pub struct MotionBlur {
    params: MotionBlurParams,
}

impl MotionBlur {
    pub fn new(params: MotionBlurParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &EffectConfig) -> Result<Self> {
        let defaults = MotionBlurParams::default();
        Ok(Self::new(MotionBlurParams {
            angle: config.f32_or(ANGLE, defaults.angle)?,
            intensity: config.u32_or(INTENSITY, defaults.intensity)?,
        }))
    }

    pub fn params(&self) -> MotionBlurParams {
        self.params
    }
}

impl Effect for MotionBlur {
    fn name(&self) -> &str {
        "motion_blur"
    }

    fn description(&self) -> &str {
        "Directional smear from averaging shifted copies of the frame"
    }

    fn apply(&self, raster: &Raster) -> Result<Raster> {
        Ok(motion_blur(raster, self.params.angle, self.params.intensity))
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            deterministic: true,
            preserves_dimensions: true,
            performance_impact: 0.4,
            parameters: vec![
                (ANGLE.to_string(), "Direction of motion in degrees".to_string()),
                (INTENSITY.to_string(), "Number of averaged frames (<= 1 disables)".to_string()),
            ],
        }
    }
}
