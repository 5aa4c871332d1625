use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    effects::{motion_blur, noise, sharpen, Effect, EffectConfig, EffectRegistry},
    error::{ConfigError, Result},
    raster::Raster,
};

/// Ordered list of effects, each consuming the previous stage's output
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Effect>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Build every stage through the registry, failing on the first bad config
    pub fn from_configs(registry: &EffectRegistry, configs: &[EffectConfig]) -> Result<Self> {
        let stages = configs
            .iter()
            .map(|config| registry.create(config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { stages })
    }

    /// Append a stage
    pub fn then(mut self, effect: Box<dyn Effect>) -> Self {
        self.stages.push(effect);
        self
    }

    pub fn push(&mut self, effect: Box<dyn Effect>) {
        self.stages.push(effect);
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run all stages in order; an empty pipeline returns a copy
    pub fn apply(&self, raster: &Raster) -> Result<Raster> {
        let mut stages = self.stages.iter();
        let Some(first) = stages.next() else {
            return Ok(raster.clone());
        };

        debug!("Stage {}: {}", 0, first.name());
        let mut current = first.apply(raster)?;
        for (i, stage) in stages.enumerate() {
            debug!("Stage {}: {}", i + 1, stage.name());
            current = stage.apply(&current)?;
        }
        Ok(current)
    }
}

/// Established stage lists, excluding the per-level compression stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Motion smear, aggressive sharpening, then grain
    Cctv,
    /// Nothing before compression
    Clean,
}

impl Preset {
    pub fn stages(self) -> Vec<EffectConfig> {
        match self {
            Preset::Cctv => vec![
                EffectConfig::new("motion_blur")
                    .set(motion_blur::ANGLE, 0.0f32)
                    .set(motion_blur::INTENSITY, 3u32),
                EffectConfig::new("sharpen")
                    .set(sharpen::PERCENT, 200.0f32)
                    .set(sharpen::RADIUS, 2.0f32)
                    .set(sharpen::THRESHOLD, 3u32),
                EffectConfig::new("noise").set(noise::INTENSITY, 0.08f32),
            ],
            Preset::Clean => Vec::new(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Cctv => f.write_str("cctv"),
            Preset::Clean => f.write_str("clean"),
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cctv" => Ok(Preset::Cctv),
            "clean" => Ok(Preset::Clean),
            _ => Err(ConfigError::InvalidValue {
                key: "preset".to_string(),
                value: s.to_string(),
            }),
        }
    }
}
