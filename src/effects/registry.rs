use std::collections::HashMap;

use crate::{
    effects::{Compression, Effect, EffectConfig, MotionBlur, Noise, Resize, Sharpen},
    error::{EffectError, Result},
};

type EffectFactory = Box<dyn Fn(&EffectConfig) -> Result<Box<dyn Effect>> + Send + Sync>;

/// Registry for building effects from their configuration
///
/// Effects are registered by name; [`EffectRegistry::create`] looks up the
/// factory for `config.effect` and hands it the parameters.
pub struct EffectRegistry {
    factories: HashMap<String, EffectFactory>,
}

impl EffectRegistry {
    /// Create a new registry with all built-in effects
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };

        registry.register_builtin_effects();
        registry
    }

    fn register_builtin_effects(&mut self) {
        self.register("motion_blur", |config| {
            Ok(Box::new(MotionBlur::from_config(config)?))
        });
        self.register("sharpen", |config| Ok(Box::new(Sharpen::from_config(config)?)));
        self.register("noise", |config| Ok(Box::new(Noise::from_config(config)?)));
        self.register("h264", |config| {
            Ok(Box::new(Compression::from_config(config)?))
        });
        self.register("resize", |config| Ok(Box::new(Resize::from_config(config)?)));
    }

    /// Register a custom effect, replacing any effect with the same name
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&EffectConfig) -> Result<Box<dyn Effect>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Build the effect described by `config`
    pub fn create(&self, config: &EffectConfig) -> Result<Box<dyn Effect>> {
        let factory = self
            .factories
            .get(&config.effect)
            .ok_or_else(|| EffectError::NotFound {
                name: config.effect.clone(),
            })?;
        factory(config)
    }

    /// Get all available effect names, sorted
    pub fn available_effects(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}
