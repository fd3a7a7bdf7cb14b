//! Blank canvas allocation.
//!
//! Preview and export compositing both start from an opaque 3-channel
//! canvas, so their clipping and copy arithmetic is uniform.

use image::Rgb;

use crate::types::RgbImage;

/// Default canvas fill.
pub const WHITE: [u8; 3] = [255, 255, 255];

/// Allocate an opaque white canvas.
#[must_use = "returns the new canvas"]
pub fn make_canvas(width: u32, height: u32) -> RgbImage {
    make_canvas_with(width, height, WHITE)
}

/// Allocate an opaque canvas filled with `background`.
#[must_use = "returns the new canvas"]
pub fn make_canvas_with(width: u32, height: u32, background: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(background))
}
