use std::path::Path;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{InvitraError, InvitraResult};

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Measured glyph box of a single line of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl TextMetrics {
    pub fn height(self) -> f32 {
        self.ascent + self.descent
    }
}

/// Measurement seam used by the text fitter.
///
/// The fitter must be deterministic for fixed inputs, so implementations may
/// not introduce randomness or vary across calls; tests substitute a fixed
/// arithmetic implementation.
pub trait TextMeasure {
    fn measure(&mut self, text: &str, family: &str, weight: u16, size: f32) -> TextMetrics;
}

/// Stateful helper for shaping and measuring single lines of text.
///
/// Fonts resolve by family name against fonts registered from a directory or
/// raw bytes, falling back to whatever the system collection offers.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Register a font face from raw bytes; returns the primary family name.
    pub fn register_font_bytes(&mut self, bytes: Vec<u8>) -> InvitraResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            InvitraError::validation("no font families registered from font bytes")
        })?;
        self.font_ctx
            .collection
            .family_name(family_id)
            .map(str::to_string)
            .ok_or_else(|| InvitraError::validation("registered font family has no name"))
    }

    /// Register every ttf/otf/ttc file found directly under `dir`.
    /// Unreadable files are skipped; returns how many faces registered.
    pub fn load_fonts_from_dir(&mut self, dir: &Path) -> usize {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return 0;
        };

        let mut n = 0;
        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            if !matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc") {
                continue;
            }
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            match self.register_font_bytes(bytes) {
                Ok(family) => {
                    tracing::debug!(path = %path.display(), %family, "registered font");
                    n += 1;
                }
                Err(err) => tracing::debug!(path = %path.display(), %err, "skipping font file"),
            }
        }
        n
    }

    /// Shape and lay out one line of styled text. The caller splits on
    /// explicit newlines before calling; line stacking is a draw-time
    /// concern.
    pub fn layout(
        &mut self,
        text: &str,
        family: &str,
        weight: u16,
        size: f32,
        brush: TextBrush,
    ) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family.to_string())),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::FontWeight::new(f32::from(weight)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl TextMeasure for TextShaper {
    fn measure(&mut self, text: &str, family: &str, weight: u16, size: f32) -> TextMetrics {
        let layout = self.layout(text, family, weight, size, TextBrush::default());
        layout_metrics(&layout, size)
    }
}

/// Measured glyph box of a built layout, with the 0.8/0.2 em fallback when
/// the font provides no usable vertical metrics (or no font resolved at all).
pub fn layout_metrics(layout: &parley::Layout<TextBrush>, size: f32) -> TextMetrics {
    let line_metrics = layout
        .lines()
        .next()
        .map(|line| {
            let m = line.metrics();
            (m.ascent, m.descent)
        })
        .filter(|&(ascent, descent)| ascent + descent > 0.0);

    let (ascent, descent) = line_metrics.unwrap_or((size * 0.8, size * 0.2));
    TextMetrics {
        width: layout.width(),
        ascent,
        descent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_from_color_carries_channels() {
        let b = TextBrush::from(Rgba8::new(1, 2, 3, 4));
        assert_eq!((b.r, b.g, b.b, b.a), (1, 2, 3, 4));
    }

    #[test]
    fn metrics_height_is_ascent_plus_descent() {
        let m = TextMetrics {
            width: 10.0,
            ascent: 8.0,
            descent: 2.0,
        };
        assert_eq!(m.height(), 10.0);
    }

    #[test]
    fn measure_is_deterministic_and_has_vertical_extent() {
        let mut shaper = TextShaper::new();
        let a = shaper.measure("הזמנה", "serif", 400, 32.0);
        let b = shaper.measure("הזמנה", "serif", 400, 32.0);
        assert_eq!(a, b);
        // Even with no resolvable font the 0.8/0.2 fallback applies.
        assert!(a.height() > 0.0);
    }

    #[test]
    fn empty_text_measures_to_zero_width() {
        let mut shaper = TextShaper::new();
        let m = shaper.measure("", "serif", 400, 32.0);
        assert_eq!(m.width, 0.0);
    }
}
