//! Drop shadows for mockup layers: the layer's alpha plane, blurred, shifted,
//! and tinted translucent black.

use crate::foundation::error::{InvitraError, InvitraResult};

/// Canvas-style shadow parameters. `blur_px` matches `shadowBlur` semantics:
/// the Gaussian sigma is half the blur value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowParams {
    pub blur_px: u32,
    pub offset: (i32, i32),
    pub alpha: f32,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            blur_px: 20,
            offset: (0, 10),
            alpha: 0.3,
        }
    }
}

/// Build a premultiplied RGBA8 shadow buffer for `src` (same dimensions).
///
/// Pixels outside the buffer count as fully transparent, so shadows fade at
/// the edges instead of smearing.
pub fn drop_shadow(
    src: &[u8],
    width: u32,
    height: u32,
    params: ShadowParams,
) -> InvitraResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| InvitraError::composite("shadow buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(InvitraError::composite(
            "drop_shadow expects src matching width*height*4",
        ));
    }
    let alpha = params.alpha.clamp(0.0, 1.0);

    // Alpha plane scaled by the shadow opacity.
    let mut plane: Vec<u8> = src
        .chunks_exact(4)
        .map(|px| ((f32::from(px[3]) * alpha).round() as u16).min(255) as u8)
        .collect();

    if params.blur_px > 0 {
        let kernel = gaussian_kernel_q16(params.blur_px, params.blur_px as f32 * 0.5)?;
        let mut tmp = vec![0u8; plane.len()];
        horizontal_pass(&plane, &mut tmp, width, height, &kernel);
        let mut blurred = vec![0u8; plane.len()];
        vertical_pass(&tmp, &mut blurred, width, height, &kernel);
        plane = blurred;
    }

    let (dx, dy) = params.offset;
    let mut out = vec![0u8; expected_len];
    let (w, h) = (width as i64, height as i64);
    for y in 0..h {
        for x in 0..w {
            let sx = x - i64::from(dx);
            let sy = y - i64::from(dy);
            if sx < 0 || sy < 0 || sx >= w || sy >= h {
                continue;
            }
            let a = plane[(sy * w + sx) as usize];
            if a != 0 {
                // Premultiplied black: color channels stay zero.
                out[((y * w + x) as usize) * 4 + 3] = a;
            }
        }
    }
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> InvitraResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(InvitraError::composite("shadow sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(InvitraError::composite("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = (((wf / sum) * 65536.0).round() as i64).clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Force the fixed-point weights to sum to exactly 1.0 so a constant
    // plane stays constant.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sx = x + ki as i32 - radius;
                if sx < 0 || sx >= w {
                    continue; // transparent outside
                }
                acc += u64::from(kw) * u64::from(src[(y * w + sx) as usize]);
            }
            dst[(y * w + x) as usize] = q16_to_u8(acc);
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y + ki as i32 - radius;
                if sy < 0 || sy >= h {
                    continue;
                }
                acc += u64::from(kw) * u64::from(src[(sy * w + x) as usize]);
            }
            dst[(y * w + x) as usize] = q16_to_u8(acc);
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    (((acc + 32768) >> 16).min(255)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque_dot(w: u32, h: u32, x: u32, y: u32) -> Vec<u8> {
        let mut src = vec![0u8; (w * h * 4) as usize];
        let i = ((y * w + x) * 4) as usize;
        src[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
        src
    }

    #[test]
    fn shadow_is_translucent_black() {
        let src = opaque_dot(3, 3, 1, 1);
        let out = drop_shadow(
            &src,
            3,
            3,
            ShadowParams {
                blur_px: 0,
                offset: (0, 0),
                alpha: 0.3,
            },
        )
        .unwrap();
        let px = &out[(1 * 3 + 1) * 4..(1 * 3 + 1) * 4 + 4];
        assert_eq!(&px[0..3], &[0, 0, 0]);
        assert_eq!(px[3], 77); // 255 * 0.3
    }

    #[test]
    fn offset_shifts_the_shadow() {
        let src = opaque_dot(5, 5, 2, 1);
        let out = drop_shadow(
            &src,
            5,
            5,
            ShadowParams {
                blur_px: 0,
                offset: (0, 2),
                alpha: 1.0,
            },
        )
        .unwrap();
        assert_eq!(out[((3 * 5 + 2) * 4 + 3) as usize], 255);
        assert_eq!(out[((1 * 5 + 2) * 4 + 3) as usize], 0);
    }

    #[test]
    fn blur_spreads_alpha_beyond_the_dot() {
        let (w, h) = (21u32, 21u32);
        let src = opaque_dot(w, h, 10, 10);
        let out = drop_shadow(
            &src,
            w,
            h,
            ShadowParams {
                blur_px: 4,
                offset: (0, 0),
                alpha: 1.0,
            },
        )
        .unwrap();
        let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
        assert!(nonzero > 1);
        // Energy is conserved away from the edges.
        let sum: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
        assert!((sum as i32 - 255).abs() <= 4);
    }

    #[test]
    fn constant_plane_survives_blur() {
        let (w, h) = (8u32, 8u32);
        let src: Vec<u8> = [0u8, 0, 0, 200].repeat((w * h) as usize);
        let out = drop_shadow(
            &src,
            w,
            h,
            ShadowParams {
                blur_px: 3,
                offset: (0, 0),
                alpha: 1.0,
            },
        )
        .unwrap();
        // Center pixel is far enough from the zero-padded edges.
        let center = ((4 * w + 4) * 4 + 3) as usize;
        assert_eq!(out[center], 200);
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        assert!(drop_shadow(&[0u8; 4], 2, 2, ShadowParams::default()).is_err());
    }
}
