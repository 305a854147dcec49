//! Alpha blending math for watermark compositing.
//!
//! Glyphs are painted into the transparent overlay by moving each channel,
//! alpha included, toward the ink by the glyph's coverage:
//!
//! `out = dst + (ink - dst) * coverage`
//!
//! The finished overlay is then composited onto the image with the
//! Porter-Duff "over" operator on straight (non-premultiplied) RGBA:
//!
//! `out_a = src_a + dst_a * (1 - src_a)`
//! `out_c = (src_c * src_a + dst_c * dst_a * (1 - src_a)) / out_a`
//!
//! Channels are rounded to the nearest integer, so results do not depend on
//! float truncation quirks.

use image::{Rgba, RgbaImage};

/// Blend `src` over `dst` in place.
///
/// A fully transparent `src` leaves `dst` untouched; a fully opaque one
/// replaces it.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    match src[3] {
        0 => return,
        255 => {
            *dst = src;
            return;
        }
        _ => {}
    }

    let src_a = f32::from(src[3]) / 255.0;
    let dst_a = f32::from(dst[3]) / 255.0;
    let dst_weight = dst_a * (1.0 - src_a);
    let out_a = src_a + dst_weight;

    let mix = |s: u8, d: u8| {
        let value = (f32::from(s) * src_a + f32::from(d) * dst_weight) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };

    *dst = Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]);
}

/// Move `dst` toward `ink` by `coverage` on every channel.
///
/// Full coverage leaves exactly `ink`, whatever was there before; zero
/// coverage leaves `dst` untouched.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn paint(dst: &mut Rgba<u8>, ink: Rgba<u8>, coverage: f32) {
    let coverage = coverage.clamp(0.0, 1.0);
    let mix = |i: u8, d: u8| {
        let (i, d) = (f32::from(i), f32::from(d));
        (d + (i - d) * coverage).round().clamp(0.0, 255.0) as u8
    };

    *dst = Rgba([
        mix(ink[0], dst[0]),
        mix(ink[1], dst[1]),
        mix(ink[2], dst[2]),
        mix(ink[3], dst[3]),
    ]);
}

/// Composite `overlay` over `base` in place.
///
/// Both images must have the same dimensions; any excess in `overlay` is
/// ignored. Overlay pixels with alpha 0 leave `base` untouched.
pub fn alpha_composite(base: &mut RgbaImage, overlay: &RgbaImage) {
    let width = base.width().min(overlay.width());
    let height = base.height().min(overlay.height());

    for y in 0..height {
        for x in 0..width {
            let src = *overlay.get_pixel(x, y);
            if src[3] == 0 {
                continue;
            }
            blend_over(base.get_pixel_mut(x, y), src);
        }
    }
}
