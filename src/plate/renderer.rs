use ab_glyph::{FontVec, PxScale};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tracing::{debug, warn};

use crate::{
    config::{PlateConfig, WatermarkConfig},
    error::{PlateError, Result},
    plate::{
        font::{load_font, measure, TextBounds},
        watermark::WatermarkRenderer,
    },
    raster::Raster,
};

/// Renders clean base plates: background, centred glyphs, watermark
///
/// The watermark only depends on the plate size, so it is rendered once here
/// and composited onto every plate.
pub struct PlateRenderer {
    font: FontVec,
    config: PlateConfig,
    watermark: Option<RgbaImage>,
}

impl PlateRenderer {
    pub fn new(plate: &PlateConfig, watermark: &WatermarkConfig) -> Result<Self> {
        let font = load_font(&plate.font_path)?;

        let overlay = if watermark.enabled {
            Some(WatermarkRenderer::new(&font, watermark).overlay(plate.width, plate.height))
        } else {
            None
        };

        Ok(Self {
            font,
            config: plate.clone(),
            watermark: overlay,
        })
    }

    /// Draw `text` onto a fresh plate, returned in RGB mode
    pub fn render(&self, text: &str) -> Result<Raster> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PlateError::EmptyText.into());
        }

        let (width, height) = (self.config.width, self.config.height);
        let scale = PxScale::from(self.config.font_size);
        let spacing = self.config.text_spacing as f32;

        let glyphs: Vec<(String, TextBounds)> = text
            .chars()
            .map(|c| {
                let glyph = c.to_string();
                let bounds = measure(&self.font, scale, &glyph);
                (glyph, bounds)
            })
            .collect();

        let total_width = glyphs.iter().map(|(_, b)| b.ink_width()).sum::<f32>()
            + spacing * (glyphs.len() - 1) as f32;
        if total_width > width as f32 {
            warn!(
                "Plate text {} is {:.0}px wide, plate is only {}px",
                text, total_width, width
            );
        }

        // Every glyph shares the baseline that vertically centres a capital
        let reference = measure(&self.font, scale, "A");
        let origin_y = (height as f32 - reference.ink_height()) / 2.0 - reference.top;

        let mut canvas = RgbaImage::from_pixel(width, height, Rgba(self.config.background));
        let color = Rgba(self.config.text_color);

        let mut x = (width as f32 - total_width) / 2.0;
        for (glyph, bounds) in &glyphs {
            draw_text_mut(
                &mut canvas,
                color,
                (x - bounds.left).round() as i32,
                origin_y.round() as i32,
                scale,
                &self.font,
                glyph,
            );
            x += bounds.ink_width() + spacing;
        }

        if let Some(overlay) = &self.watermark {
            imageops::overlay(&mut canvas, overlay, 0, 0);
        }

        debug!("Rendered plate {} ({}x{})", text, width, height);
        Ok(Raster::from_rgba(canvas)?.into_rgb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{plate::font::tests::system_font, raster::ColorMode};

    fn plate_config() -> Option<PlateConfig> {
        Some(PlateConfig {
            font_path: system_font()?,
            ..PlateConfig::default()
        })
    }

    #[test]
    fn test_missing_font_fails() {
        let config = PlateConfig {
            font_path: "fonts/nope.ttf".into(),
            ..PlateConfig::default()
        };

        assert!(PlateRenderer::new(&config, &WatermarkConfig::default()).is_err());
    }

    #[test]
    fn test_render_plate() {
        let Some(config) = plate_config() else {
            return;
        };
        let renderer = PlateRenderer::new(&config, &WatermarkConfig::default()).unwrap();

        let plate = renderer.render("ABC1D23").unwrap();

        assert_eq!(plate.dimensions(), (520, 130));
        assert_eq!(plate.mode(), ColorMode::Rgb);

        // Corners keep the background, the middle carries dark glyph ink
        let corner = plate.pixel(0, 0);
        assert!(corner[0] >= 190 && corner[0] <= 215);
        let darkest = plate.as_rgba().pixels().map(|p| p[0]).min().unwrap();
        assert!(darkest < 50);
    }

    #[test]
    fn test_text_is_centred() {
        let Some(config) = plate_config() else {
            return;
        };
        let watermark = WatermarkConfig {
            enabled: false,
            ..WatermarkConfig::default()
        };
        let renderer = PlateRenderer::new(&config, &watermark).unwrap();
        let plate = renderer.render("ABC1D23").unwrap();

        let ink: Vec<(u32, u32)> = plate
            .as_rgba()
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] < 100)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!ink.is_empty());

        let min_x = ink.iter().map(|p| p.0).min().unwrap();
        let max_x = ink.iter().map(|p| p.0).max().unwrap();
        let min_y = ink.iter().map(|p| p.1).min().unwrap();
        let max_y = ink.iter().map(|p| p.1).max().unwrap();

        let left = min_x as i64;
        let right = (plate.width() - 1 - max_x) as i64;
        let top = min_y as i64;
        let bottom = (plate.height() - 1 - max_y) as i64;
        assert!((left - right).abs() <= 4, "left {left} right {right}");
        assert!((top - bottom).abs() <= 4, "top {top} bottom {bottom}");
    }

    #[test]
    fn test_without_watermark_background_is_flat() {
        let Some(config) = plate_config() else {
            return;
        };
        let watermark = WatermarkConfig {
            enabled: false,
            ..WatermarkConfig::default()
        };
        let renderer = PlateRenderer::new(&config, &watermark).unwrap();
        let plate = renderer.render("ABC1D23").unwrap();

        assert_eq!(plate.pixel(2, 2), [200, 200, 200, 255]);
        assert_eq!(plate.pixel(517, 127), [200, 200, 200, 255]);
    }

    #[test]
    fn test_empty_text_rejected() {
        let Some(config) = plate_config() else {
            return;
        };
        let renderer = PlateRenderer::new(&config, &WatermarkConfig::default()).unwrap();

        assert!(matches!(
            renderer.render("   ").unwrap_err(),
            crate::error::SynthError::Plate(PlateError::EmptyText)
        ));
    }
}
