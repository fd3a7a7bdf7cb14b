//! Clipped copy and alpha blending onto opaque canvases.
//!
//! Every paint operation in the pipeline goes through these two
//! functions. They intersect the placed source with the canvas and a
//! clip rectangle; when the intersection is empty nothing is drawn and
//! `false` is returned. Off-canvas or degenerate placements are never
//! errors.

use image::imageops;

use crate::types::{Dimensions, PixelRect, RgbImage, RgbaImage};

/// The part of `clip` that a source of `source` size placed at `origin`
/// actually covers on a `canvas`-sized raster.
fn visible_region(
    canvas: Dimensions,
    source: Dimensions,
    origin: (i64, i64),
    clip: PixelRect,
) -> Option<PixelRect> {
    let placed = PixelRect::new(origin.0, origin.1, source.width, source.height);
    PixelRect::covering(canvas)
        .intersect(clip)?
        .intersect(placed)
}

/// Copy `source` onto `canvas` with its top-left at `origin`, writing
/// only inside `clip`.
///
/// Returns `true` if any pixel was written.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn copy_clipped(
    canvas: &mut RgbImage,
    source: &RgbImage,
    origin: (i64, i64),
    clip: PixelRect,
) -> bool {
    let Some(region) = visible_region(
        Dimensions::of(canvas),
        Dimensions::of(source),
        origin,
        clip,
    ) else {
        return false;
    };
    // `region` lies inside the placed source, so both offsets are in
    // `0..source.{width,height}`.
    let src_x = (region.x - origin.0) as u32;
    let src_y = (region.y - origin.1) as u32;
    let crop = imageops::crop_imm(source, src_x, src_y, region.width, region.height).to_image();
    imageops::replace(canvas, &crop, region.x, region.y);
    true
}

/// Alpha-blend `overlay` onto `canvas` with its top-left at `origin`,
/// writing only inside `clip`.
///
/// Each channel becomes `(1 - a) * canvas + a * overlay` with `a` the
/// overlay alpha in `0..=1`, rounded to the nearest integer. Fully
/// transparent pixels leave the canvas untouched; fully opaque pixels
/// replace it.
///
/// Returns `true` if the overlay covered any part of the clip.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend_clipped(
    canvas: &mut RgbImage,
    overlay: &RgbaImage,
    origin: (i64, i64),
    clip: PixelRect,
) -> bool {
    let Some(region) = visible_region(
        Dimensions::of(canvas),
        Dimensions::of(overlay),
        origin,
        clip,
    ) else {
        return false;
    };
    for y in 0..region.height {
        for x in 0..region.width {
            let cx = region.x as u32 + x;
            let cy = region.y as u32 + y;
            let ox = (region.x - origin.0) as u32 + x;
            let oy = (region.y - origin.1) as u32 + y;
            let src = overlay.get_pixel(ox, oy).0;
            if src[3] == 0 {
                continue;
            }
            let dst = canvas.get_pixel_mut(cx, cy);
            for (d, s) in dst.0.iter_mut().zip(&src[..3]) {
                *d = blend_channel(*d, *s, src[3]);
            }
        }
    }
    true
}

/// Blend one channel: `(1 - a) * under + a * over`, rounded.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend_channel(under: u8, over: u8, alpha: u8) -> u8 {
    let a = f64::from(alpha) / 255.0;
    let value = f64::from(under).mul_add(1.0 - a, f64::from(over) * a);
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use image::{Rgb, Rgba};

    use super::*;
    use crate::canvas::make_canvas;

    fn solid(w: u32, h: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb(color))
    }

    #[test]
    fn copy_respects_the_clip() {
        let mut canvas = make_canvas(10, 10);
        let src = solid(10, 10, [0, 0, 255]);
        let drawn = copy_clipped(&mut canvas, &src, (0, 0), PixelRect::new(2, 3, 4, 5));
        assert!(drawn);
        for (x, y, p) in canvas.enumerate_pixels() {
            let inside = (2..6).contains(&x) && (3..8).contains(&y);
            let expected = if inside { [0, 0, 255] } else { [255, 255, 255] };
            assert_eq!(p.0, expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn copy_reads_the_source_at_the_right_offset() {
        let mut canvas = make_canvas(4, 4);
        let mut src = solid(4, 4, [0, 0, 0]);
        src.put_pixel(3, 3, Rgb([9, 9, 9]));
        // Source shifted up-left by 2: its (3,3) lands on canvas (1,1).
        let drawn = copy_clipped(&mut canvas, &src, (-2, -2), PixelRect::new(0, 0, 4, 4));
        assert!(drawn);
        assert_eq!(canvas.get_pixel(1, 1).0, [9, 9, 9]);
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(canvas.get_pixel(2, 2).0, [255, 255, 255]);
    }

    #[test]
    fn disjoint_placement_draws_nothing() {
        let mut canvas = make_canvas(8, 8);
        let src = solid(4, 4, [1, 2, 3]);
        let clip = PixelRect::covering(Dimensions::new(8, 8));
        assert!(!copy_clipped(&mut canvas, &src, (100, 0), clip));
        assert!(!copy_clipped(&mut canvas, &src, (-4, 0), clip));
        assert!(!copy_clipped(&mut canvas, &src, (i64::MIN / 2, i64::MAX / 2), clip));
        assert!(canvas.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn clip_outside_canvas_draws_nothing() {
        let mut canvas = make_canvas(8, 8);
        let src = solid(4, 4, [1, 2, 3]);
        assert!(!copy_clipped(&mut canvas, &src, (0, 0), PixelRect::new(20, 20, 5, 5)));
    }

    #[test]
    fn blend_extremes() {
        let mut canvas = solid(3, 1, [10, 20, 30]);
        let mut overlay = RgbaImage::new(3, 1);
        overlay.put_pixel(0, 0, Rgba([200, 100, 50, 0]));
        overlay.put_pixel(1, 0, Rgba([200, 100, 50, 255]));
        overlay.put_pixel(2, 0, Rgba([210, 220, 230, 128]));
        let clip = PixelRect::covering(Dimensions::new(3, 1));
        assert!(blend_clipped(&mut canvas, &overlay, (0, 0), clip));
        assert_eq!(canvas.get_pixel(0, 0).0, [10, 20, 30]);
        assert_eq!(canvas.get_pixel(1, 0).0, [200, 100, 50]);
        // 10 + (210 - 10) * 128/255 = 110.39 -> 110
        assert_eq!(canvas.get_pixel(2, 0).0, [110, 120, 130]);
    }

    #[test]
    fn blend_channel_rounds() {
        assert_eq!(blend_channel(0, 255, 128), 128);
        assert_eq!(blend_channel(255, 0, 255), 0);
        assert_eq!(blend_channel(77, 3, 0), 77);
    }
}
