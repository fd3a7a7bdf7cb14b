//! Frame overlay compositing.
//!
//! A frame is stretched over the whole canvas. Frames with an alpha
//! channel are blended over the slot images; frames without one replace
//! the canvas outright.

use image::DynamicImage;
use image::imageops::FilterType;

use crate::composite::blend_clipped;
use crate::types::{Dimensions, PixelRect, RgbImage, RgbaImage};

/// What happened when a frame was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No frame is bound to the layout.
    Absent,
    /// The frame file could not be read or decoded; the canvas is
    /// unchanged.
    Unreadable,
    /// An opaque frame replaced the canvas.
    Replaced,
    /// A frame with alpha was blended over the canvas.
    Blended,
}

impl FrameOutcome {
    /// Returns `true` if the frame was drawn.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Replaced | Self::Blended)
    }
}

/// Resize `frame` to the canvas and composite it.
pub fn apply_frame(canvas: &mut RgbImage, frame: &DynamicImage) -> FrameOutcome {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return FrameOutcome::Unreadable;
    }
    let resized = frame.resize_exact(width, height, FilterType::Lanczos3);
    if frame.color().has_alpha() {
        blend_clipped(
            canvas,
            &resized.to_rgba8(),
            (0, 0),
            PixelRect::covering(Dimensions::new(width, height)),
        );
        FrameOutcome::Blended
    } else {
        *canvas = resized.to_rgb8();
        FrameOutcome::Replaced
    }
}

/// The frame resized to the preview frame widget, alpha preserved, for
/// drawing over slot previews.
#[must_use]
pub fn frame_preview(frame: &DynamicImage, size: Dimensions) -> RgbaImage {
    frame
        .resize_exact(size.width, size.height, FilterType::Lanczos3)
        .to_rgba8()
}

#[cfg(test)]
mod tests {
    use image::{Rgb, Rgba};

    use super::*;

    #[test]
    fn transparent_frame_keeps_the_canvas() {
        let mut canvas = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let frame = RgbaImage::from_pixel(8, 4, Rgba([200, 100, 50, 0]));
        let outcome = apply_frame(&mut canvas, &DynamicImage::ImageRgba8(frame));
        assert_eq!(outcome, FrameOutcome::Blended);
        assert!(canvas.pixels().all(|p| p.0 == [10, 20, 30]));
    }

    #[test]
    fn fully_opaque_alpha_frame_wins() {
        let mut canvas = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let frame = RgbaImage::from_pixel(8, 4, Rgba([200, 100, 50, 255]));
        let outcome = apply_frame(&mut canvas, &DynamicImage::ImageRgba8(frame));
        assert_eq!(outcome, FrameOutcome::Blended);
        assert!(canvas.pixels().all(|p| p.0 == [200, 100, 50]));
    }

    #[test]
    fn opaque_frame_replaces_the_canvas() {
        let mut canvas = RgbImage::from_pixel(6, 6, Rgb([0, 0, 0]));
        let frame = RgbImage::from_pixel(3, 3, Rgb([7, 8, 9]));
        let outcome = apply_frame(&mut canvas, &DynamicImage::ImageRgb8(frame));
        assert_eq!(outcome, FrameOutcome::Replaced);
        assert_eq!(canvas.dimensions(), (6, 6));
        assert!(canvas.pixels().all(|p| p.0 == [7, 8, 9]));
    }

    #[test]
    fn preview_overlay_keeps_alpha() {
        let frame = RgbaImage::from_pixel(20, 10, Rgba([1, 2, 3, 0]));
        let overlay = frame_preview(&DynamicImage::ImageRgba8(frame), Dimensions::new(7, 5));
        assert_eq!(overlay.dimensions(), (7, 5));
        assert!(overlay.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn outcome_flags() {
        assert!(FrameOutcome::Blended.is_applied());
        assert!(FrameOutcome::Replaced.is_applied());
        assert!(!FrameOutcome::Absent.is_applied());
        assert!(!FrameOutcome::Unreadable.is_applied());
    }
}
