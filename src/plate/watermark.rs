use ab_glyph::{FontVec, PxScale};
use image::{imageops, Rgba, RgbaImage};
use imageproc::{
    drawing::draw_text_mut,
    geometric_transformations::{rotate_about_center, Interpolation},
};
use tracing::debug;

use crate::{config::WatermarkConfig, plate::font::measure};

/// Builds the tiled, rotated text layer laid over every plate
pub struct WatermarkRenderer<'a> {
    font: &'a FontVec,
    config: &'a WatermarkConfig,
}

impl<'a> WatermarkRenderer<'a> {
    pub fn new(font: &'a FontVec, config: &'a WatermarkConfig) -> Self {
        Self { font, config }
    }

    /// Transparent `width`x`height` layer covered with the rotated pattern
    ///
    /// The pattern is drawn on a square three times the target diagonal so
    /// that no empty corner shows after rotation, then the centre is cropped.
    pub fn overlay(&self, width: u32, height: u32) -> RgbaImage {
        let scale = PxScale::from(self.config.font_size);
        let bounds = measure(self.font, scale, &self.config.text);

        let diagonal = (width as f64).hypot(height as f64) as u32;
        let side = (diagonal * 3).max(width).max(height);

        let step_x = (bounds.ink_width() as u32 + self.config.gap_x).max(1) as usize;
        let step_y = (bounds.ink_height() as u32 + self.config.gap_y).max(1) as usize;

        debug!(
            "Watermark layer {}x{}, step {}x{}, rotation {}",
            side, side, step_x, step_y, self.config.rotation
        );

        let color = Rgba(self.config.color);
        let mut layer = RgbaImage::new(side, side);
        for x in (0..side).step_by(step_x) {
            for y in (0..side).step_by(step_y) {
                draw_text_mut(
                    &mut layer,
                    color,
                    x as i32,
                    y as i32,
                    scale,
                    self.font,
                    &self.config.text,
                );
            }
        }

        // imageproc rotates clockwise; the configured angle is counter-clockwise
        let rotated = rotate_about_center(
            &layer,
            -self.config.rotation.to_radians(),
            Interpolation::Bicubic,
            Rgba([0, 0, 0, 0]),
        );

        let left = (side - width) / 2;
        let top = (side - height) / 2;
        imageops::crop_imm(&rotated, left, top, width, height).to_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::font::{load_font, tests::system_font};

    fn config() -> WatermarkConfig {
        WatermarkConfig::default()
    }

    #[test]
    fn test_overlay_size_and_alpha() {
        let Some(path) = system_font() else {
            return;
        };
        let font = load_font(path).unwrap();
        let config = config();

        let overlay = WatermarkRenderer::new(&font, &config).overlay(104, 26);

        assert_eq!(overlay.dimensions(), (104, 26));
        assert!(overlay.pixels().any(|p| p[3] > 0));
        // Bicubic overshoot aside, the layer stays faint
        assert!(overlay.pixels().all(|p| p[3] < 128));
    }

    #[test]
    fn test_overlay_has_gaps() {
        let Some(path) = system_font() else {
            return;
        };
        let font = load_font(path).unwrap();
        let config = config();

        let overlay = WatermarkRenderer::new(&font, &config).overlay(200, 60);

        assert!(overlay.pixels().any(|p| p[3] == 0));
    }

    #[test]
    fn test_zero_rotation_keeps_rows() {
        let Some(path) = system_font() else {
            return;
        };
        let font = load_font(path).unwrap();
        let config = WatermarkConfig {
            rotation: 0.0,
            gap_y: 40,
            ..WatermarkConfig::default()
        };

        let overlay = WatermarkRenderer::new(&font, &config).overlay(300, 200);

        // With a tall gap, some full rows carry no ink at all
        let empty_rows = (0..overlay.height())
            .filter(|&y| (0..overlay.width()).all(|x| overlay.get_pixel(x, y)[3] == 0))
            .count();
        assert!(empty_rows > 0);
    }
}
