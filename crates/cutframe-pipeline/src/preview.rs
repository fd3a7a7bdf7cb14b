//! Per-slot preview rendering.
//!
//! A slot preview is a canvas the size of the slot's label, with the
//! slot image resampled by its scale and placed at its translation (or
//! top-left when it has never been dragged), followed by red centre
//! guide lines.

use image::Rgb;
use image::imageops::{self, FilterType};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::geometric_transformations::{Interpolation, warp_into_with};

use crate::canvas::make_canvas_with;
use crate::composite::copy_clipped;
use crate::config::CollageConfig;
use crate::store::Slot;
use crate::types::{Dimensions, PixelRect, RgbImage};

/// Lanczos3 kernel radius in source pixels at unit scale.
const LANCZOS_RADIUS: f64 = 3.0;

/// Floor of the resampling budget, in pixels.
const MIN_RESAMPLE_BUDGET: u64 = 1 << 20;

/// Size of `image` after scaling by per-axis ratios, truncated.
///
/// Returns `None` when either dimension would collapse to zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scaled_size(image: Dimensions, ratio_x: f64, ratio_y: f64) -> Option<Dimensions> {
    let width = (f64::from(image.width) * ratio_x).trunc();
    let height = (f64::from(image.height) * ratio_y).trunc();
    if !(width >= 1.0 && height >= 1.0) {
        return None;
    }
    Some(Dimensions::new(
        width.min(f64::from(u32::MAX)) as u32,
        height.min(f64::from(u32::MAX)) as u32,
    ))
}

/// Draw `image` scaled by `(ratio_x, ratio_y)` onto `canvas` with its
/// top-left at `origin`, writing only inside `clip`.
///
/// Only the window of the scaled image that lands on the canvas is
/// resampled, so the work is bounded by the clip and never by the
/// scale. The window is Lanczos-resampled from its source footprint;
/// when the footprint would blow up (extreme zoom) it is sampled
/// bilinearly straight from the source instead.
///
/// Returns `true` if any pixel was written.
pub fn draw_scaled(
    canvas: &mut RgbImage,
    image: &RgbImage,
    (ratio_x, ratio_y): (f64, f64),
    origin: (i64, i64),
    clip: PixelRect,
) -> bool {
    let Some(size) = scaled_size(Dimensions::of(image), ratio_x, ratio_y) else {
        return false;
    };
    let placed = PixelRect::new(origin.0, origin.1, size.width, size.height);
    let Some(window) = PixelRect::covering(Dimensions::of(canvas))
        .intersect(clip)
        .and_then(|visible| visible.intersect(placed))
    else {
        return false;
    };
    let local = PixelRect::new(
        window.x - origin.0,
        window.y - origin.1,
        window.width,
        window.height,
    );
    let patch = resample_window(image, size, local);
    copy_clipped(canvas, &patch, (window.x, window.y), window)
}

/// Source span and scaled span covering one axis of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Footprint {
    src_start: u32,
    src_len: u32,
    dst_start: u64,
    dst_len: u64,
}

/// Source pixels feeding the scaled span `start..start + len` of an
/// axis of `src_len` pixels scaled to `scaled_len`, padded by the
/// Lanczos radius, and the scaled span they resample to.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn footprint(src_len: u32, scaled_len: u32, start: i64, len: u32) -> Footprint {
    let scale = f64::from(scaled_len) / f64::from(src_len);
    let pad = (LANCZOS_RADIUS / scale.min(1.0)).ceil();
    let start = start as f64;
    let end = start + f64::from(len);
    let src_start = ((start / scale).floor() - pad).clamp(0.0, f64::from(src_len - 1));
    let src_end = ((end / scale).ceil() + pad).clamp(src_start + 1.0, f64::from(src_len));
    let dst_start = (src_start * scale).floor().min(start);
    let dst_end = (src_end * scale)
        .ceil()
        .min(f64::from(scaled_len))
        .max(end);
    Footprint {
        src_start: src_start as u32,
        src_len: (src_end - src_start) as u32,
        dst_start: dst_start as u64,
        dst_len: (dst_end - dst_start) as u64,
    }
}

/// The `local` window of `image` scaled to `size`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn resample_window(image: &RgbImage, size: Dimensions, local: PixelRect) -> RgbImage {
    let (x, y) = (local.x as u32, local.y as u32);
    if size == Dimensions::of(image) {
        return imageops::crop_imm(image, x, y, local.width, local.height).to_image();
    }
    let fx = footprint(image.width(), size.width, local.x, local.width);
    let fy = footprint(image.height(), size.height, local.y, local.height);
    let window_area = u64::from(local.width) * u64::from(local.height);
    let budget = window_area.saturating_mul(2).max(MIN_RESAMPLE_BUDGET);
    if fx.dst_len.saturating_mul(fy.dst_len) > budget {
        return sample_window(image, size, local);
    }
    // Within budget both spans fit in u32.
    let source = imageops::crop_imm(image, fx.src_start, fy.src_start, fx.src_len, fy.src_len);
    let scaled = imageops::resize(
        &*source,
        fx.dst_len as u32,
        fy.dst_len as u32,
        FilterType::Lanczos3,
    );
    imageops::crop_imm(
        &scaled,
        (local.x as u64 - fx.dst_start) as u32,
        (local.y as u64 - fy.dst_start) as u32,
        local.width,
        local.height,
    )
    .to_image()
}

/// Sample the `local` window of `image` scaled to `size` directly,
/// clamping at the source edges.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn sample_window(image: &RgbImage, size: Dimensions, local: PixelRect) -> RgbImage {
    let (w, h) = image.dimensions();
    let scale_x = f64::from(size.width) / f64::from(w);
    let scale_y = f64::from(size.height) / f64::from(h);
    // Bilinear reads the pixel right of / below the sample point.
    let limit = |n: u32| {
        if n < 2 {
            0.0
        } else {
            ((n - 1) as f32).next_down()
        }
    };
    let (max_x, max_y) = (limit(w), limit(h));
    let interpolation = if w < 2 || h < 2 {
        Interpolation::Nearest
    } else {
        Interpolation::Bilinear
    };
    let (left, top) = (local.x as f64, local.y as f64);
    let mut out = RgbImage::new(local.width, local.height);
    warp_into_with(
        image,
        move |x, y| {
            let sx = (left + f64::from(x) + 0.5) / scale_x - 0.5;
            let sy = (top + f64::from(y) + 0.5) / scale_y - 0.5;
            (
                (sx as f32).clamp(0.0, max_x),
                (sy as f32).clamp(0.0, max_y),
            )
        },
        interpolation,
        Rgb([0, 0, 0]),
        &mut out,
    );
    out
}

/// Render the preview of one slot into a `target`-sized canvas.
///
/// Returns `None` when the slot is empty, the target is empty, or the
/// scaled image would collapse to zero pixels.
#[must_use]
pub fn render_preview(slot: &Slot, target: Dimensions, config: &CollageConfig) -> Option<RgbImage> {
    let image = slot.image()?;
    if target.is_empty() {
        return None;
    }
    let ratio = slot.scale().ratio();
    scaled_size(Dimensions::of(image), ratio, ratio)?;
    let mut canvas = make_canvas_with(target.width, target.height, config.background);
    let origin = slot
        .translation()
        .map_or((0, 0), |t| (i64::from(t.dx), i64::from(t.dy)));
    draw_scaled(
        &mut canvas,
        image,
        (ratio, ratio),
        origin,
        PixelRect::covering(target),
    );
    draw_guides(&mut canvas, config.guide_color);
    Some(canvas)
}

/// Draw a horizontal line through `height / 2` and a vertical line
/// through `width / 2`.
#[allow(clippy::cast_precision_loss)]
pub fn draw_guides(canvas: &mut RgbImage, color: [u8; 3]) {
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let color = Rgb(color);
    let mid_y = (h / 2) as f32;
    let mid_x = (w / 2) as f32;
    draw_line_segment_mut(canvas, (0.0, mid_y), ((w - 1) as f32, mid_y), color);
    draw_line_segment_mut(canvas, (mid_x, 0.0), (mid_x, (h - 1) as f32), color);
}
