//! Incremental line-breaking layout: body tokens in, display list out.
//!
//! The display list is the terminal artifact of the pipeline; an external
//! rendering sink applies scroll offset and viewport culling.

mod engine;
mod font;

pub use engine::{layout, DisplayItem, LayoutParams, Modifier};
pub use font::{FontCache, FontKey, FontMetrics, Slant, TextMeasurer, Weight};

/// Left/right page margin in px; also the wrap limit (`width - HSTEP`).
pub const HSTEP: f32 = 13.0;
/// One vertical step: the top margin and the extra paragraph gap.
pub const VSTEP: f32 = 18.0;
/// Line spacing factor applied to both ascent and descent.
pub const LEADING: f32 = 1.25;

pub const DEFAULT_WIDTH: f32 = 800.0;
pub const DEFAULT_FONT_SIZE: u32 = 16;
pub const MIN_FONT_SIZE: u32 = 9;
const ZOOM_STEP: f32 = 1.2;

pub const DEFAULT_FAMILY: &str = "Times";
pub const CODE_FAMILY: &str = "Monaco";

/// One zoom increment. Inverse of [`zoom_out`] up to rounding.
pub fn zoom_in(size: u32) -> u32 {
    ((size as f32 * ZOOM_STEP).round() as u32).max(MIN_FONT_SIZE)
}

/// One zoom decrement, floored at [`MIN_FONT_SIZE`].
pub fn zoom_out(size: u32) -> u32 {
    ((size as f32 / ZOOM_STEP).round() as u32).max(MIN_FONT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_scales_by_a_fifth() {
        assert_eq!(zoom_in(16), 19);
        assert_eq!(zoom_out(16), 13);
    }

    #[test]
    fn zoom_out_floors_at_the_minimum() {
        let mut size = 12;
        for _ in 0..10 {
            size = zoom_out(size);
        }
        assert_eq!(size, MIN_FONT_SIZE);
    }
}
