use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{EffectError, Result},
    raster::Raster,
};

/// Core trait that all degradation effects implement
pub trait Effect: Send + Sync {
    /// Returns the unique name of this effect
    fn name(&self) -> &str;

    /// Returns a human-readable description of this effect
    fn description(&self) -> &str;

    /// Apply the effect, producing a new raster
    ///
    /// The input is left untouched so callers can keep the pre-degradation
    /// original. Effects that are a no-op for their parameters may return a
    /// plain copy.
    fn apply(&self, raster: &Raster) -> Result<Raster>;

    /// Get effect-specific metadata
    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::default()
    }
}

/// Configuration for one pipeline stage
///
/// Serialized as a flat TOML table, e.g.
/// `{ effect = "sharpen", percent = 200.0, radius = 2.0 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Registered effect name
    pub effect: String,

    /// Effect-specific parameters
    #[serde(flatten)]
    pub parameters: BTreeMap<String, ConfigValue>,
}

impl EffectConfig {
    /// Create a config for the named effect with no parameters
    pub fn new<S: Into<String>>(effect: S) -> Self {
        Self {
            effect: effect.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Set a parameter value
    pub fn set<K: Into<String>, V: Into<ConfigValue>>(mut self, key: K, value: V) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    fn invalid(&self, key: &str, value: &ConfigValue) -> EffectError {
        EffectError::InvalidParameter {
            effect: self.effect.clone(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    fn missing(&self, key: &str) -> EffectError {
        EffectError::MissingParameter {
            effect: self.effect.clone(),
            key: key.to_string(),
        }
    }

    /// Get a float parameter, falling back to `default` when absent
    pub fn f32_or(&self, key: &str, default: f32) -> Result<f32> {
        match self.parameters.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_f64()
                .map(|v| v as f32)
                .ok_or_else(|| self.invalid(key, value).into()),
        }
    }

    /// Get a non-negative integer parameter, falling back to `default` when absent
    pub fn u32_or(&self, key: &str, default: u32) -> Result<u32> {
        match self.parameters.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_i64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| self.invalid(key, value).into()),
        }
    }

    /// Get a required non-negative integer parameter
    pub fn require_u32(&self, key: &str) -> Result<u32> {
        if !self.parameters.contains_key(key) {
            return Err(self.missing(key).into());
        }
        self.u32_or(key, 0)
    }

    /// Get a byte-sized integer parameter, falling back to `default` when absent
    pub fn u8_or(&self, key: &str, default: u8) -> Result<u8> {
        match self.parameters.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_i64()
                .and_then(|v| u8::try_from(v).ok())
                .ok_or_else(|| self.invalid(key, value).into()),
        }
    }

    /// Get a boolean parameter, falling back to `default` when absent
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.parameters.get(key) {
            None => Ok(default),
            Some(value) => value.as_bool().ok_or_else(|| self.invalid(key, value).into()),
        }
    }

    /// Get a required string parameter
    pub fn require_str(&self, key: &str) -> Result<&str> {
        match self.parameters.get(key) {
            None => Err(self.missing(key).into()),
            Some(value) => value.as_str().ok_or_else(|| self.invalid(key, value).into()),
        }
    }
}

/// Flexible configuration value that can hold different types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integers, or floats with no fractional part
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            ConfigValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Integer(i) => write!(f, "{}", i),
            ConfigValue::Float(v) => write!(f, "{}", v),
            ConfigValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<f32> for ConfigValue {
    fn from(value: f32) -> Self {
        ConfigValue::Float(value as f64)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<u32> for ConfigValue {
    fn from(value: u32) -> Self {
        ConfigValue::Integer(value as i64)
    }
}

/// Metadata about an effect's behavior
#[derive(Debug, Clone, Default)]
pub struct EffectMetadata {
    /// Whether the same input and parameters always give the same output
    pub deterministic: bool,

    /// Whether the output always has the input's width and height
    pub preserves_dimensions: bool,

    /// Estimated performance impact (0.0 = minimal, 1.0 = heavy)
    pub performance_impact: f32,

    /// Parameters with descriptions
    pub parameters: Vec<(String, String)>,
}
