//! Similarity metrics between rasters of equal size.
//!
//! Only the color channels are compared; alpha is ignored.

use crate::error::{RasterError, Result};
use crate::raster::Raster;

fn check_same_size(a: &Raster, b: &Raster) -> Result<()> {
    if a.dimensions() != b.dimensions() {
        return Err(RasterError::SizeMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        }
        .into());
    }
    Ok(())
}

fn sum_of_errors(a: &Raster, b: &Raster, f: impl Fn(f64) -> f64) -> f64 {
    a.as_rgba()
        .pixels()
        .zip(b.as_rgba().pixels())
        .map(|(pa, pb)| {
            (0..3)
                .map(|c| f(pa[c] as f64 - pb[c] as f64))
                .sum::<f64>()
        })
        .sum()
}

/// Mean absolute per-channel difference, in 0..=255
pub fn mean_absolute_error(a: &Raster, b: &Raster) -> Result<f64> {
    check_same_size(a, b)?;
    let samples = a.width() as f64 * a.height() as f64 * 3.0;
    Ok(sum_of_errors(a, b, f64::abs) / samples)
}

/// Peak signal-to-noise ratio in dB; infinite for identical rasters
pub fn psnr(a: &Raster, b: &Raster) -> Result<f64> {
    check_same_size(a, b)?;
    let samples = a.width() as f64 * a.height() as f64 * 3.0;
    let mse = sum_of_errors(a, b, |d| d * d) / samples;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (255.0 * 255.0 / mse).log10())
}
