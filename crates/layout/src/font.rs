//! Font selection and measurement.
//!
//! There is no rasterizer here; the engine only needs vertical metrics and
//! advance widths. [`TextMeasurer`] is the seam a real font backend would
//! implement; [`FontCache`] is the built-in synthetic backend with a metrics
//! memo table. The cache is an explicit object owned by the caller — one per
//! document lifetime, not process-global — so repeated loads never see stale
//! state.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Weight {
    Normal,
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slant {
    Roman,
    Italic,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub family: String,
    /// Point size, whole points.
    pub size: u32,
    pub weight: Weight,
    pub slant: Slant,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl FontMetrics {
    pub fn linespace(self) -> f32 {
        self.ascent + self.descent
    }
}

pub trait TextMeasurer {
    fn metrics(&mut self, font: &FontKey) -> FontMetrics;
    /// Advance width of `text` in the given font.
    fn measure(&mut self, font: &FontKey, text: &str) -> f32;
}

/// Synthetic measurer: a typical 80/20 ascent/descent split and a two-class
/// advance model (narrow glyphs at half the regular advance). Deterministic,
/// good enough for wrapping and baseline math without a font file.
#[derive(Debug, Default)]
pub struct FontCache {
    metrics: HashMap<FontKey, FontMetrics>,
}

const ASCENT_RATIO: f32 = 0.8;
const ADVANCE_RATIO: f32 = 0.6;
const NARROW_RATIO: f32 = 0.3;

fn is_narrow(ch: char) -> bool {
    matches!(ch, 'f' | 'i' | 'j' | 'l' | 'r' | 't' | ' ') || ch.is_ascii_punctuation()
}

impl FontCache {
    pub fn new() -> FontCache {
        FontCache::default()
    }
}

impl TextMeasurer for FontCache {
    fn metrics(&mut self, font: &FontKey) -> FontMetrics {
        if let Some(&metrics) = self.metrics.get(font) {
            return metrics;
        }
        let size = font.size as f32;
        // Descent as the remainder keeps ascent + descent == size exactly.
        let ascent = size * ASCENT_RATIO;
        let metrics = FontMetrics {
            ascent,
            descent: size - ascent,
        };
        self.metrics.insert(font.clone(), metrics);
        metrics
    }

    fn measure(&mut self, font: &FontKey, text: &str) -> f32 {
        let size = font.size as f32;
        text.chars()
            .map(|ch| {
                if is_narrow(ch) {
                    size * NARROW_RATIO
                } else {
                    size * ADVANCE_RATIO
                }
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(size: u32) -> FontKey {
        FontKey {
            family: "Times".into(),
            size,
            weight: Weight::Normal,
            slant: Slant::Roman,
        }
    }

    #[test]
    fn metrics_scale_with_size_and_memoize() {
        let mut fonts = FontCache::new();
        let small = fonts.metrics(&key(10));
        let large = fonts.metrics(&key(20));
        assert_eq!(small.ascent, 8.0);
        assert_eq!(small.descent, 2.0);
        assert_eq!(large.linespace(), 2.0 * small.linespace());
        // The remainder rule keeps linespace exact even where the ascent
        // ratio rounds unevenly.
        assert_eq!(fonts.metrics(&key(13)).linespace(), 13.0);
        // Second lookup is served from the memo table.
        assert_eq!(fonts.metrics(&key(10)), small);
    }

    #[test]
    fn wider_text_measures_wider() {
        let mut fonts = FontCache::new();
        let narrow = fonts.measure(&key(16), "ill");
        let wide = fonts.measure(&key(16), "woo");
        assert!(narrow < wide);
        assert_eq!(fonts.measure(&key(16), ""), 0.0);
    }
}
