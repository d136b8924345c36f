//! Renders one face of an invitation onto a surface.

use std::collections::HashMap;

use crate::assets::loader::ImageLoader;
use crate::foundation::{
    core::{Align, Point, Side},
    error::InvitraResult,
};
use crate::render::{
    draw::{self, to_cpu_affine},
    gate::RenderTicket,
    surface::Surface,
};
use crate::template::{
    model::{Field, FieldKind, Slot, Template},
    values::ValueSnapshot,
};
use crate::text::{
    compose,
    fit,
    shaper::{TextBrush, TextShaper, layout_metrics},
};

/// Stacking distance between explicit `\n` lines, in multiples of the font
/// size.
const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Draws one side (front or back) of an invitation: custom background, then
/// the template background, then every field and slot in declaration order.
///
/// Layer order is strict: later draws occlude earlier ones. Load failures
/// propagate to the caller; everything drawn before the failing step stays on
/// the surface. Rendering the same `(template, values, side)` twice produces
/// byte-identical pixels.
pub struct SideRenderer<'a> {
    loader: &'a dyn ImageLoader,
    shaper: &'a mut TextShaper,
    font_cache: HashMap<u64, vello_cpu::peniko::FontData>,
}

impl<'a> SideRenderer<'a> {
    pub fn new(loader: &'a dyn ImageLoader, shaper: &'a mut TextShaper) -> Self {
        Self {
            loader,
            shaper,
            font_cache: HashMap::new(),
        }
    }

    #[tracing::instrument(skip_all, fields(template = %template.id, side = %side))]
    pub fn render(
        &mut self,
        surface: &mut Surface,
        template: &Template,
        values: &ValueSnapshot,
        side: Side,
        ticket: &RenderTicket,
    ) -> InvitraResult<()> {
        ticket.ensure_current()?;
        surface.reset(template.size.w, template.size.h)?;

        if template.allow_custom_background
            && let Some(reference) = values.custom_background(side)
        {
            ticket.ensure_current()?;
            tracing::debug!(%side, "drawing custom background");
            let img = self.loader.load(reference)?;
            draw::fill_stretched(surface, &img)?;
        }

        if let Some(reference) = template.background(side) {
            ticket.ensure_current()?;
            tracing::debug!(%side, reference, "drawing template background");
            let img = self.loader.load(reference)?;
            draw::fill_stretched(surface, &img)?;
        }

        let color_override = values.color_override();
        let fields = template.fields(side);

        ticket.ensure_current()?;
        for field in fields {
            // Input-only fields exist to feed combined fields.
            if field.is_input {
                continue;
            }
            let text = resolve_field_text(field, fields, values);
            if text.is_empty() && field.prefix.is_none() {
                continue;
            }
            let brush = TextBrush::from(color_override.unwrap_or(field.color));
            self.draw_field(surface, field, &text, brush)?;
        }

        ticket.ensure_current()?;
        for slot in template.slots(side) {
            let text = slot
                .static_text
                .as_deref()
                .filter(|t| !t.is_empty())
                .or_else(|| values.non_empty(&slot.key));
            let Some(text) = text else {
                continue;
            };
            let brush = TextBrush::from(color_override.unwrap_or(slot.color));
            self.draw_slot(surface, slot, text, brush)?;
        }

        Ok(())
    }

    fn draw_field(
        &mut self,
        surface: &mut Surface,
        field: &Field,
        text: &str,
        brush: TextBrush,
    ) -> InvitraResult<()> {
        for (index, line) in text.split('\n').enumerate() {
            if line.is_empty() {
                continue;
            }
            let layout = self.shaper.layout(
                line,
                &field.font_family,
                field.font_weight,
                field.font_size as f32,
                brush,
            );
            let metrics = layout_metrics(&layout, field.font_size as f32);

            let x = match field.align {
                Align::Left => field.x,
                Align::Center => field.x - f64::from(metrics.width) / 2.0,
                Align::Right => field.x - f64::from(metrics.width),
            };
            // Middle baseline: the glyph box's vertical center sits on the
            // anchor line.
            let line_y = field.y + index as f64 * field.font_size * LINE_HEIGHT_FACTOR;
            let top = line_y - f64::from(metrics.height()) / 2.0;

            self.draw_layout(surface, &layout, Point::new(x, top));
        }
        Ok(())
    }

    fn draw_slot(
        &mut self,
        surface: &mut Surface,
        slot: &Slot,
        text: &str,
        brush: TextBrush,
    ) -> InvitraResult<()> {
        let size = fit::fit_text_to_box(
            &mut *self.shaper,
            text,
            slot.bounds,
            &slot.family,
            slot.weight,
            slot.max_size,
        );
        let layout = self
            .shaper
            .layout(text, &slot.family, slot.weight, size as f32, brush);
        let metrics = layout_metrics(&layout, size as f32);

        let center = slot.bounds.center();
        let origin = Point::new(
            center.x - f64::from(metrics.width) / 2.0,
            center.y - f64::from(metrics.height()) / 2.0,
        );
        self.draw_layout(surface, &layout, origin);
        Ok(())
    }

    fn draw_layout(
        &mut self,
        surface: &mut Surface,
        layout: &parley::Layout<TextBrush>,
        origin: Point,
    ) {
        let mut ctx =
            vello_cpu::RenderContext::new(surface.width() as u16, surface.height() as u16);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(to_cpu_affine(kurbo::Affine::translate((
            origin.x, origin.y,
        ))));

        let mut drew = false;
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let font = run.run().font();
                let font_data = self
                    .font_cache
                    .entry(font.data.id())
                    .or_insert_with(|| {
                        vello_cpu::peniko::FontData::new(
                            vello_cpu::peniko::Blob::from(font.data.as_ref().to_vec()),
                            font.index,
                        )
                    })
                    .clone();

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
                drew = true;
            }
        }

        if drew {
            ctx.flush();
            ctx.render_to_pixmap(surface.pixmap_mut());
        }
    }
}

/// Resolve a field's display text per its kind: static text draws as-is,
/// simple values are decorated, combined values are composed from their parts
/// and then pass through the combined field's own decoration.
fn resolve_field_text(field: &Field, siblings: &[Field], values: &ValueSnapshot) -> String {
    match field.kind() {
        FieldKind::Static(text) => text.to_string(),
        FieldKind::Combined { .. } => {
            let joined = compose::compose(field, siblings, values);
            compose::decorate(&joined, field)
        }
        FieldKind::Simple(key) => compose::decorate(values.get(key).unwrap_or(""), field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::values::ValueStore;

    fn field(json: &str) -> Field {
        serde_json::from_str(json).unwrap()
    }

    fn snapshot(pairs: &[(&str, &str)]) -> ValueSnapshot {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<ValueStore>()
            .snapshot()
    }

    #[test]
    fn static_text_is_not_decorated() {
        let f = field(r#"{"key": "k", "staticText": "בע\"ה", "prefix": "-"}"#);
        assert_eq!(resolve_field_text(&f, &[], &snapshot(&[])), "בע\"ה");
    }

    #[test]
    fn simple_values_are_decorated() {
        let f = field(r#"{"key": "venue", "prefix": "באולם "}"#);
        let text = resolve_field_text(&f, &[], &snapshot(&[("venue", "הגן")]));
        assert_eq!(text, "באולם הגן");
    }

    #[test]
    fn combined_values_get_their_own_decoration_too() {
        let fields = vec![
            field(r#"{"key": "a", "isInput": true}"#),
            field(r#"{"key": "b", "isInput": true}"#),
            field(
                r#"{"key": "ab", "isCombined": true, "combineFields": ["a", "b"],
                    "combineSeparator": " & ", "wrapper": "quotes"}"#,
            ),
        ];
        let values = snapshot(&[("a", "דנה"), ("b", "יואב")]);
        assert_eq!(
            resolve_field_text(&fields[2], &fields, &values),
            "\"דנה & יואב\""
        );
    }

    #[test]
    fn empty_resolution_stays_empty() {
        let f = field(r#"{"key": "quote", "prefix": "~", "suffix": "~"}"#);
        // Decoration never attaches to an empty value, so even with literal
        // prefix/suffix the resolved text is empty and nothing is drawn.
        assert_eq!(resolve_field_text(&f, &[], &snapshot(&[])), "");
    }
}
