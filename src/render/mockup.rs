//! Composites rendered sides onto the mockup backdrop for final export.

use crate::assets::loader::ImageLoader;
use crate::foundation::{
    core::LayerPosition,
    error::{InvitraError, InvitraResult},
};
use crate::render::{
    composite::over_in_place,
    draw,
    shadow::{ShadowParams, drop_shadow},
    surface::Surface,
};
use crate::template::model::Template;

/// Takes the rendered side surfaces and produces the final presentation
/// composite.
///
/// Single-sided templates export the front surface verbatim, with no backdrop
/// and no transform. Double-sided templates draw the mockup backdrop at its natural
/// size, then the back layer, then the front layer strictly on top, each with
/// a soft drop shadow.
pub struct MockupCompositor<'a> {
    loader: &'a dyn ImageLoader,
    shadow: ShadowParams,
}

impl<'a> MockupCompositor<'a> {
    pub fn new(loader: &'a dyn ImageLoader) -> Self {
        Self {
            loader,
            shadow: ShadowParams::default(),
        }
    }

    #[tracing::instrument(skip_all, fields(template = %template.id))]
    pub fn compose(
        &self,
        front: &Surface,
        back: Option<&Surface>,
        template: &Template,
    ) -> InvitraResult<Surface> {
        if template.is_single_sided() {
            let mut out = Surface::new(front.width(), front.height())?;
            out.copy_from(front)?;
            return Ok(out);
        }

        let back = back.ok_or_else(|| {
            InvitraError::composite("double-sided mockup requires a rendered back surface")
        })?;
        let layout = template.mockup_layout.ok_or_else(|| {
            InvitraError::composite(format!(
                "template '{}' is double-sided but has no mockupLayout",
                template.id
            ))
        })?;
        let bg_ref = template.mockup_bg.as_deref().ok_or_else(|| {
            InvitraError::composite(format!(
                "template '{}' is double-sided but has no mockupBg",
                template.id
            ))
        })?;

        let bg = self.loader.load(bg_ref)?;
        let mut out = Surface::new(bg.width, bg.height)?;
        draw::draw_at_origin(&mut out, &bg)?;

        // Back first so the front wins wherever their footprints overlap.
        self.draw_layer(&mut out, back, layout.back_position)?;
        self.draw_layer(&mut out, front, layout.front_position)?;
        Ok(out)
    }

    fn draw_layer(
        &self,
        out: &mut Surface,
        layer: &Surface,
        position: LayerPosition,
    ) -> InvitraResult<()> {
        // Transform into device space on a scratch surface, then shadow the
        // transformed silhouette; canvas shadows apply after the transform.
        let mut scratch = Surface::new(out.width(), out.height())?;
        draw::draw_surface_transformed(&mut scratch, layer, position.to_affine())?;

        let shadow = drop_shadow(scratch.data(), out.width(), out.height(), self.shadow)?;
        over_in_place(out.data_mut(), &shadow)?;
        over_in_place(out.data_mut(), scratch.data())?;
        Ok(())
    }
}
