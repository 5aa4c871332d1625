use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    effects::traits::{Effect, EffectConfig, EffectMetadata},
    error::Result,
    raster::Raster,
};

pub const INTENSITY: &str = "intensity";

/// Parameters for [`add_noise`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Blend weight of the noise image, clamped to [0, 1]
    pub intensity: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self { intensity: 0.08 }
    }
}

/// Clamp a requested noise weight into [0, 1]; NaN counts as no noise
pub fn clamp_intensity(intensity: f32) -> f32 {
    if intensity.is_nan() {
        return 0.0;
    }
    intensity.clamp(0.0, 1.0)
}

/// Blend uniform RGB grain into the raster using the thread-local CSPRNG
///
/// Every call draws fresh noise, so two calls on the same input differ.
pub fn add_noise(raster: &Raster, intensity: f32) -> Raster {
    add_noise_with_rng(raster, intensity, &mut rand::thread_rng())
}

/// Blend uniform RGB grain drawn from `rng`
///
/// `output = original × (1 − t) + noise × t` per color channel, where every
/// channel of every pixel is an independent uniform byte. `t` is clamped to
/// [0, 1], so anything above 1 yields pure noise. `t <= 0` returns an
/// unchanged copy. Alpha passes through.
pub fn add_noise_with_rng<R: RngCore + ?Sized>(raster: &Raster, intensity: f32, rng: &mut R) -> Raster {
    let intensity = clamp_intensity(intensity);
    if intensity <= 0.0 {
        return raster.clone();
    }

    let mut noise = vec![0u8; raster.width() as usize * raster.height() as usize * 3];
    rng.fill_bytes(&mut noise);

    let keep = 1.0 - intensity;
    let mut output = raster.as_rgba().clone();
    for (pixel, grain) in output.pixels_mut().zip(noise.chunks_exact(3)) {
        for c in 0..3 {
            let blended = pixel[c] as f32 * keep + grain[c] as f32 * intensity;
            pixel[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
    }

    debug!("Added grain at intensity {:.3}", intensity);
    raster.derive(output)
}

/// Pipeline stage wrapping [`add_noise`]
pub struct Noise {
    params: NoiseParams,
}

impl Noise {
    pub fn new(params: NoiseParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &EffectConfig) -> Result<Self> {
        Ok(Self::new(NoiseParams {
            intensity: config.f32_or(INTENSITY, NoiseParams::default().intensity)?,
        }))
    }
}

impl Effect for Noise {
    fn name(&self) -> &str {
        "noise"
    }

    fn description(&self) -> &str {
        "Uncorrelated uniform RGB sensor grain"
    }

    fn apply(&self, raster: &Raster) -> Result<Raster> {
        Ok(add_noise(raster, self.params.intensity))
    }

    fn metadata(&self) -> EffectMetadata {
        EffectMetadata {
            deterministic: false,
            preserves_dimensions: true,
            performance_impact: 0.1,
            parameters: vec![(
                INTENSITY.to_string(),
                "Blend weight of the grain (0.0-1.0)".to_string(),
            )],
        }
    }
}
