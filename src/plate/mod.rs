//! Clean base plate generation
//!
//! Glyphs are laid out one at a time so the gap between them is exactly
//! `text_spacing`, then a faint diagonal "MERCOSUL BRASIL" pattern is
//! composited on top. Output is always RGB.

pub mod font;
pub mod renderer;
pub mod text;
pub mod watermark;

pub use font::{load_font, measure, TextBounds};
pub use renderer::PlateRenderer;
pub use text::{is_mercosul, random_plate};
pub use watermark::WatermarkRenderer;
