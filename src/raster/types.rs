use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageBuffer, Rgba, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{RasterError, Result};

/// Color mode a raster presents to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Rgb,
    Rgba,
}

/// An owned 2D pixel grid with fixed dimensions and color mode
///
/// Pixels are always stored as RGBA8. In [`ColorMode::Rgb`] the alpha channel
/// is held at 255, so effects can treat both modes uniformly and the mode only
/// decides whether alpha survives a stage boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    buffer: RgbaImage,
    mode: ColorMode,
}

fn check_dimensions(width: u32, height: u32) -> std::result::Result<(), RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidDimensions { width, height });
    }
    Ok(())
}

impl Raster {
    /// Create an RGBA raster, keeping its alpha channel
    pub fn from_rgba(buffer: RgbaImage) -> Result<Self> {
        check_dimensions(buffer.width(), buffer.height())?;
        Ok(Self {
            buffer,
            mode: ColorMode::Rgba,
        })
    }

    /// Create an RGB raster
    pub fn from_rgb(buffer: RgbImage) -> Result<Self> {
        check_dimensions(buffer.width(), buffer.height())?;
        let buffer = ImageBuffer::from_fn(buffer.width(), buffer.height(), |x, y| {
            let [r, g, b] = buffer.get_pixel(x, y).0;
            Rgba([r, g, b, 255])
        });
        Ok(Self {
            buffer,
            mode: ColorMode::Rgb,
        })
    }

    /// Create a raster from any decoded image, picking the mode from its alpha channel
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        if image.color().has_alpha() {
            Self::from_rgba(image.into_rgba8())
        } else {
            Self::from_rgb(image.into_rgb8())
        }
    }

    /// Create an RGB raster filled with a single color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Result<Self> {
        check_dimensions(width, height)?;
        let [r, g, b] = color;
        Ok(Self {
            buffer: ImageBuffer::from_pixel(width, height, Rgba([r, g, b, 255])),
            mode: ColorMode::Rgb,
        })
    }

    /// Create an RGB raster from tightly packed RGB bytes
    pub fn from_raw_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * 3;
        let actual = data.len();
        let buffer: RgbImage = ImageBuffer::from_raw(width, height, data)
            .ok_or(RasterError::BufferMismatch { expected, actual })?;
        Self::from_rgb(buffer)
    }

    /// Load a raster from an image file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let image = image::open(path)?;
        Self::from_dynamic(image)
    }

    /// Rebuild a raster around a processed buffer, re-applying the mode
    ///
    /// In RGB mode alpha is dropped again: color values are kept as they are
    /// and alpha is reset to opaque.
    pub(crate) fn from_parts(mut buffer: RgbaImage, mode: ColorMode) -> Result<Self> {
        check_dimensions(buffer.width(), buffer.height())?;
        if mode == ColorMode::Rgb {
            for pixel in buffer.pixels_mut() {
                pixel[3] = 255;
            }
        }
        Ok(Self { buffer, mode })
    }

    /// Wrap a processed buffer of the same size, keeping this raster's mode
    pub(crate) fn derive(&self, buffer: RgbaImage) -> Self {
        debug_assert_eq!(buffer.dimensions(), self.dimensions());
        let mut derived = Self {
            buffer,
            mode: self.mode,
        };
        if derived.mode == ColorMode::Rgb {
            for pixel in derived.buffer.pixels_mut() {
                pixel[3] = 255;
            }
        }
        derived
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Get a pixel at the given coordinates as RGBA
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get the underlying RGBA buffer
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Copy the color channels into an RGB buffer
    pub fn to_rgb_image(&self) -> RgbImage {
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            let [r, g, b, _] = self.buffer.get_pixel(x, y).0;
            image::Rgb([r, g, b])
        })
    }

    /// Flatten to RGB mode, discarding alpha without compositing
    pub fn into_rgb(mut self) -> Self {
        if self.mode == ColorMode::Rgba {
            for pixel in self.buffer.pixels_mut() {
                pixel[3] = 255;
            }
            self.mode = ColorMode::Rgb;
        }
        self
    }

    /// Save the raster as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        match self.mode {
            ColorMode::Rgb => self.to_rgb_image().save(path)?,
            ColorMode::Rgba => self.buffer.save(path)?,
        }
        Ok(())
    }

    /// Save the raster as a baseline JPEG at the given quality (1-100)
    pub fn save_jpeg<P: AsRef<Path>>(&self, path: P, quality: u8) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
        encoder.encode_image(&self.to_rgb_image())?;
        writer.flush()?;
        Ok(())
    }
}
