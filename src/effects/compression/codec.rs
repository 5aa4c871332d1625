//! Lossy encode/decode round trips standing in for an intra-frame codec pass.

use std::borrow::Cow;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use tracing::debug;

use crate::error::DegradationError;

/// A DCT-style codec that can squeeze an RGB image through a lossy round trip
///
/// Implementations encode at `quality` (1-100, higher is better) and decode
/// straight back. The intermediate compressed buffer must not outlive the call.
pub trait LossyCodec: Send + Sync {
    /// Short codec name used in errors and logs
    fn name(&self) -> &str;

    /// Encode then decode `image`, returning a raster of identical size
    fn recompress(&self, image: &RgbImage, quality: u8) -> Result<RgbImage, DegradationError>;
}

/// Baseline JPEG round trip through the `image` crate
///
/// The encoder writes 4:4:4 JPEGs, so 4:2:0 chroma subsampling is applied
/// beforehand in YCbCr space when enabled.
#[derive(Debug, Clone, Copy)]
pub struct JpegCodec {
    chroma_subsampling: bool,
}

impl JpegCodec {
    pub fn new() -> Self {
        Self {
            chroma_subsampling: true,
        }
    }

    /// Enables or disables 4:2:0 chroma subsampling
    pub fn with_chroma_subsampling(mut self, enabled: bool) -> Self {
        self.chroma_subsampling = enabled;
        self
    }
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LossyCodec for JpegCodec {
    fn name(&self) -> &str {
        "jpeg"
    }

    fn recompress(&self, image: &RgbImage, quality: u8) -> Result<RgbImage, DegradationError> {
        let quality = quality.clamp(1, 100);
        let source: Cow<'_, RgbImage> = if self.chroma_subsampling {
            Cow::Owned(subsample_chroma_420(image))
        } else {
            Cow::Borrowed(image)
        };

        let mut encoded = Vec::with_capacity(image.as_raw().len() / 4);
        JpegEncoder::new_with_quality(&mut encoded, quality)
            .encode_image(&*source)
            .map_err(|e| DegradationError::EncodeFailed {
                codec: self.name().to_string(),
                reason: e.to_string(),
            })?;

        debug!(
            "JPEG q{} round trip: {}x{} -> {} bytes",
            quality,
            image.width(),
            image.height(),
            encoded.len()
        );

        let decoded = image::load_from_memory_with_format(&encoded, ImageFormat::Jpeg)
            .map_err(|e| DegradationError::DecodeFailed {
                codec: self.name().to_string(),
                reason: e.to_string(),
            })?
            .into_rgb8();

        if decoded.dimensions() != image.dimensions() {
            return Err(DegradationError::DimensionMismatch {
                codec: self.name().to_string(),
                expected: image.dimensions(),
                actual: decoded.dimensions(),
            });
        }

        Ok(decoded)
    }
}

fn rgb_to_ycbcr([r, g, b]: [u8; 3]) -> [f32; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    [
        0.299 * r + 0.587 * g + 0.114 * b,
        128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b,
        128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b,
    ]
}

fn ycbcr_to_rgb([y, cb, cr]: [f32; 3]) -> [u8; 3] {
    let (cb, cr) = (cb - 128.0, cr - 128.0);
    let to_byte = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    [
        to_byte(y + 1.402 * cr),
        to_byte(y - 0.344_136 * cb - 0.714_136 * cr),
        to_byte(y + 1.772 * cb),
    ]
}

/// Average chroma over 2x2 blocks while keeping per-pixel luma (JFIF YCbCr)
pub fn subsample_chroma_420(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let ycbcr: Vec<[f32; 3]> = image.pixels().map(|p| rgb_to_ycbcr(p.0)).collect();
    let at = |x: u32, y: u32| (y as usize) * width as usize + x as usize;

    let block_cols = width.div_ceil(2);
    let block_rows = height.div_ceil(2);
    let mut chroma = vec![[0.0f32; 2]; (block_cols * block_rows) as usize];

    for by in 0..block_rows {
        for bx in 0..block_cols {
            let mut sum = [0.0f32; 2];
            let mut count = 0.0f32;
            for y in (by * 2)..(by * 2 + 2).min(height) {
                for x in (bx * 2)..(bx * 2 + 2).min(width) {
                    let [_, cb, cr] = ycbcr[at(x, y)];
                    sum[0] += cb;
                    sum[1] += cr;
                    count += 1.0;
                }
            }
            chroma[(by * block_cols + bx) as usize] = [sum[0] / count, sum[1] / count];
        }
    }

    ImageBuffer::from_fn(width, height, |x, y| {
        let [cb, cr] = chroma[((y / 2) * block_cols + x / 2) as usize];
        Rgb(ycbcr_to_rgb([ycbcr[at(x, y)][0], cb, cr]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colorful(width: u32, height: u32) -> RgbImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 37 + y * 11) % 256) as u8,
                ((x * 5 + y * 53) % 256) as u8,
                if (x / 3 + y / 3) % 2 == 0 { 230 } else { 20 },
            ])
        })
    }

    #[test]
    fn test_round_trip_keeps_dimensions() {
        let codec = JpegCodec::new();
        for (w, h) in [(1, 1), (3, 5), (17, 9), (64, 32)] {
            let decoded = codec.recompress(&colorful(w, h), 50).unwrap();
            assert_eq!(decoded.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_low_quality_is_lossy() {
        let image = colorful(32, 32);
        let decoded = JpegCodec::new().recompress(&image, 5).unwrap();

        assert_ne!(decoded, image);
    }

    #[test]
    fn test_quality_zero_is_floored() {
        let image = colorful(16, 16);
        assert!(JpegCodec::new().recompress(&image, 0).is_ok());
    }

    #[test]
    fn test_subsampling_keeps_gray() {
        let gray = ImageBuffer::from_fn(6, 5, |x, y| {
            let v = ((x * 40 + y * 7) % 256) as u8;
            Rgb([v, v, v])
        });
        let subsampled = subsample_chroma_420(&gray);

        for (a, b) in gray.pixels().zip(subsampled.pixels()) {
            for c in 0..3 {
                assert!((a[c] as i16 - b[c] as i16).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_subsampling_shares_chroma_in_blocks() {
        // Pure red next to pure blue inside one 2x2 block gets mixed.
        let image = ImageBuffer::from_fn(2, 2, |x, _| {
            if x == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let subsampled = subsample_chroma_420(&image);

        assert!(subsampled.get_pixel(0, 0)[2] > 0);
        assert!(subsampled.get_pixel(1, 0)[0] > 0);
    }
}
