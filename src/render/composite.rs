//! Premultiplied source-over compositing on raw RGBA8 buffers.

use crate::foundation::error::{InvitraError, InvitraResult};

pub type PremulRgba8 = [u8; 4];

pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> InvitraResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(InvitraError::composite(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [255, 255, 255, 0];
        assert_eq!(over(dst, src), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn over_dst_transparent_returns_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn over_blends_partial_alpha() {
        // 50% black over opaque white.
        let out = over([255, 255, 255, 255], [0, 0, 0, 128]);
        assert_eq!(out[3], 255);
        assert!((out[0] as i16 - 127).abs() <= 1);
    }

    #[test]
    fn over_in_place_rejects_mismatched_buffers() {
        let mut dst = [0u8; 8];
        assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
        let mut odd = [0u8; 6];
        assert!(over_in_place(&mut odd, &[0u8; 6]).is_err());
    }
}
