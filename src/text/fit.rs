//! Box-constrained font-size search for slots.

use crate::foundation::core::BoxRect;
use crate::text::shaper::TextMeasure;

/// Smallest font size the fitter will choose. If even this does not fit the
/// box, it is used anyway: availability over perfect containment.
pub const FIT_FLOOR: f64 = 8.0;

/// Fraction of the box each measured dimension must fit within.
pub const FIT_MARGIN: f64 = 0.9;

/// Find the largest font size, at most `max_size` and at least [`FIT_FLOOR`],
/// whose measured glyph box fits `bounds` with the safety margin.
///
/// Deterministic for fixed inputs: a plain decrement-by-one search over the
/// measurement seam, no caching across backends.
pub fn fit_text_to_box(
    measure: &mut dyn TextMeasure,
    text: &str,
    bounds: BoxRect,
    family: &str,
    weight: u16,
    max_size: f64,
) -> f64 {
    fit_text_to_box_with_floor(measure, text, bounds, family, weight, max_size, FIT_FLOOR)
}

pub fn fit_text_to_box_with_floor(
    measure: &mut dyn TextMeasure,
    text: &str,
    bounds: BoxRect,
    family: &str,
    weight: u16,
    max_size: f64,
    floor: f64,
) -> f64 {
    let mut size = max_size.max(floor);
    while size > floor {
        let m = measure.measure(text, family, weight, size as f32);
        let fits = f64::from(m.width) <= bounds.w * FIT_MARGIN
            && f64::from(m.height()) <= bounds.h * FIT_MARGIN;
        if fits {
            break;
        }
        size = (size - 1.0).max(floor);
    }
    size
}
