//! # Raster Module
//!
//! The in-memory pixel grid every effect consumes and produces, plus
//! similarity metrics used to measure how far a degradation has drifted.

pub mod metrics;
pub mod types;

pub use metrics::{mean_absolute_error, psnr};
pub use types::{ColorMode, Raster};
