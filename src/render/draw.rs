//! Low-level drawing helpers shared by the side renderer and the mockup
//! compositor. Each helper runs one short `vello_cpu` pass that composites
//! over the surface's existing pixels, so a failure in a later step leaves
//! every earlier completed draw intact.

use kurbo::Affine;

use crate::assets::loader::LoadedImage;
use crate::foundation::error::InvitraResult;
use crate::render::surface::{self, Surface};

pub(crate) fn to_cpu_affine(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn render_pass(
    surface: &mut Surface,
    paint: vello_cpu::Image,
    transform: Affine,
    rect_w: f64,
    rect_h: f64,
) {
    let mut ctx = vello_cpu::RenderContext::new(surface.width() as u16, surface.height() as u16);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(to_cpu_affine(transform));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, rect_w, rect_h));
    ctx.flush();
    ctx.render_to_pixmap(surface.pixmap_mut());
}

/// Draw `img` stretched to cover the full surface.
pub(crate) fn fill_stretched(surface: &mut Surface, img: &LoadedImage) -> InvitraResult<()> {
    let paint = surface::image_to_paint(img)?;
    let sx = f64::from(surface.width()) / f64::from(img.width);
    let sy = f64::from(surface.height()) / f64::from(img.height);
    render_pass(
        surface,
        paint,
        Affine::scale_non_uniform(sx, sy),
        f64::from(img.width),
        f64::from(img.height),
    );
    Ok(())
}

/// Draw `img` at its natural size, top-left anchored.
pub(crate) fn draw_at_origin(surface: &mut Surface, img: &LoadedImage) -> InvitraResult<()> {
    let paint = surface::image_to_paint(img)?;
    render_pass(
        surface,
        paint,
        Affine::IDENTITY,
        f64::from(img.width),
        f64::from(img.height),
    );
    Ok(())
}

/// Draw another surface through an arbitrary affine transform.
pub(crate) fn draw_surface_transformed(
    surface: &mut Surface,
    src: &Surface,
    transform: Affine,
) -> InvitraResult<()> {
    let paint = src.to_image_paint()?;
    render_pass(
        surface,
        paint,
        transform,
        f64::from(src.width()),
        f64::from(src.height()),
    );
    Ok(())
}
