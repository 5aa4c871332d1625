use std::path::Path;

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};

use crate::error::{PlateError, Result};

/// Read a TrueType/OpenType font from disk
pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontVec> {
    let path = path.as_ref();
    let failed = |reason: String| PlateError::FontLoadFailed {
        path: path.display().to_string(),
        reason,
    };

    let data = std::fs::read(path).map_err(|e| failed(e.to_string()))?;
    let font = FontVec::try_from_vec(data).map_err(|e| failed(e.to_string()))?;
    Ok(font)
}

/// Ink box of a string, relative to the origin passed to `draw_text_mut`
///
/// Glyphs are placed on a baseline at `ascent`, the same layout imageproc
/// uses when drawing, so `top` is the offset from the draw origin to the
/// first row of ink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    /// Sum of horizontal advances
    pub advance: f32,
}

impl TextBounds {
    pub fn has_ink(&self) -> bool {
        self.right > self.left && self.bottom > self.top
    }

    /// Ink width, falling back to the advance for whitespace
    pub fn ink_width(&self) -> f32 {
        if self.has_ink() {
            self.right - self.left
        } else {
            self.advance
        }
    }

    pub fn ink_height(&self) -> f32 {
        if self.has_ink() {
            self.bottom - self.top
        } else {
            0.0
        }
    }
}

/// Measure `text` at `scale`
pub fn measure<F: Font>(font: &F, scale: PxScale, text: &str) -> TextBounds {
    let scaled = font.as_scaled(scale);

    let mut caret = 0.0f32;
    let mut previous: Option<GlyphId> = None;
    let mut bounds = TextBounds {
        left: f32::INFINITY,
        top: f32::INFINITY,
        right: f32::NEG_INFINITY,
        bottom: f32::NEG_INFINITY,
        advance: 0.0,
    };

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }

        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        previous = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let px = outlined.px_bounds();
            bounds.left = bounds.left.min(px.min.x);
            bounds.top = bounds.top.min(px.min.y);
            bounds.right = bounds.right.max(px.max.x);
            bounds.bottom = bounds.bottom.max(px.max.y);
        }
    }

    bounds.advance = caret;
    if !bounds.has_ink() {
        bounds.left = 0.0;
        bounds.top = 0.0;
        bounds.right = 0.0;
        bounds.bottom = 0.0;
    }
    bounds
}
