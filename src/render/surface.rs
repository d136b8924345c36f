use std::sync::Arc;

use crate::assets::loader::LoadedImage;
use crate::foundation::{
    core::CanvasSize,
    error::{InvitraError, InvitraResult},
};

/// An in-memory raster target: premultiplied RGBA8, width/height, draw-image
/// and draw-text operations (via [`vello_cpu`]).
///
/// Surfaces are ephemeral: every render clears and repaints from scratch, so
/// identical inputs yield byte-identical pixels.
#[derive(Debug)]
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> InvitraResult<Self> {
        let (w, h) = checked_dims(width, height)?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub fn from_size(size: CanvasSize) -> InvitraResult<Self> {
        Self::new(size.w, size.h)
    }

    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Resize to the given dimensions and clear to transparent. Prior content
    /// is always discarded; re-render is not additive.
    pub fn reset(&mut self, width: u32, height: u32) -> InvitraResult<()> {
        let (w, h) = checked_dims(width, height)?;
        if self.pixmap.width() != w || self.pixmap.height() != h {
            self.pixmap = vello_cpu::Pixmap::new(w, h);
        } else {
            self.pixmap.data_as_u8_slice_mut().fill(0);
        }
        Ok(())
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }

    /// Replace this surface's content and dimensions with a verbatim copy.
    pub fn copy_from(&mut self, other: &Surface) -> InvitraResult<()> {
        self.reset(other.width(), other.height())?;
        self.data_mut().copy_from_slice(other.data());
        Ok(())
    }

    /// Wrap the current pixels as an image paint for drawing onto another
    /// surface.
    pub(crate) fn to_image_paint(&self) -> InvitraResult<vello_cpu::Image> {
        premul_bytes_to_paint(self.data(), self.width(), self.height())
    }

    /// Straight-alpha RGBA8 copy: the raster buffer handed to the external
    /// export sink.
    pub fn to_unpremultiplied_rgba8(&self) -> Vec<u8> {
        let mut out = self.data().to_vec();
        for px in out.chunks_exact_mut(4) {
            let a = px[3] as u16;
            if a == 0 || a == 255 {
                continue;
            }
            for c in px.iter_mut().take(3) {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

fn checked_dims(width: u32, height: u32) -> InvitraResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(InvitraError::validation("surface dimensions must be > 0"));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| InvitraError::validation("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| InvitraError::validation("surface height exceeds u16"))?;
    Ok((w, h))
}

/// Build a `vello_cpu` image paint from premultiplied RGBA8 bytes.
pub(crate) fn premul_bytes_to_paint(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> InvitraResult<vello_cpu::Image> {
    let (w, h) = checked_dims(width, height)?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(InvitraError::validation("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

pub(crate) fn image_to_paint(img: &LoadedImage) -> InvitraResult<vello_cpu::Image> {
    premul_bytes_to_paint(img.rgba8_premul.as_slice(), img.width, img.height)
}
