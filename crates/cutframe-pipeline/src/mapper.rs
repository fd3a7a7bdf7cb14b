//! Projection of preview-space geometry onto the export raster.

use crate::config::CollageConfig;
use crate::layout::Orientation;
use crate::types::{Dimensions, Offset, PixelRect};

/// Maps rectangles and translations from the preview frame to the
/// export canvas by per-axis scale factors.
///
/// Coordinates are truncated toward zero after scaling, so a rectangle
/// touching the preview's right edge maps onto (or just inside) the
/// export canvas's right edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    preview: Dimensions,
    export: Dimensions,
    scale_x: f64,
    scale_y: f64,
}

impl CoordinateMapper {
    /// Mapper from a `preview` frame to an `export` canvas.
    ///
    /// An empty preview maps everything to the origin.
    #[must_use]
    pub fn new(preview: Dimensions, export: Dimensions) -> Self {
        let ratio = |to: u32, from: u32| {
            if from == 0 {
                0.0
            } else {
                f64::from(to) / f64::from(from)
            }
        };
        Self {
            preview,
            export,
            scale_x: ratio(export.width, preview.width),
            scale_y: ratio(export.height, preview.height),
        }
    }

    /// Mapper for the frame of an orientation at the configured DPI.
    #[must_use]
    pub fn for_orientation(orientation: Orientation, config: &CollageConfig) -> Self {
        Self::new(orientation.preview_size(), orientation.export_size(config))
    }

    /// Horizontal scale factor (export width / preview width).
    #[must_use]
    pub const fn scale_x(&self) -> f64 {
        self.scale_x
    }

    /// Vertical scale factor (export height / preview height).
    #[must_use]
    pub const fn scale_y(&self) -> f64 {
        self.scale_y
    }

    /// Preview frame size.
    #[must_use]
    pub const fn preview(&self) -> Dimensions {
        self.preview
    }

    /// Export canvas size.
    #[must_use]
    pub const fn export(&self) -> Dimensions {
        self.export
    }

    /// Project a preview rectangle: every component is scaled and
    /// truncated.
    #[must_use]
    pub fn map_rect(&self, rect: PixelRect) -> PixelRect {
        PixelRect::new(
            scale_coord(rect.x, self.scale_x),
            scale_coord(rect.y, self.scale_y),
            scale_len(rect.width, self.scale_x),
            scale_len(rect.height, self.scale_y),
        )
    }

    /// Project a slot translation into export pixels.
    #[must_use]
    pub fn map_offset(&self, offset: Offset) -> (i64, i64) {
        (
            scale_coord(i64::from(offset.dx), self.scale_x),
            scale_coord(i64::from(offset.dy), self.scale_y),
        )
    }

    /// Project a horizontal length.
    #[must_use]
    pub fn map_width(&self, width: u32) -> u32 {
        scale_len(width, self.scale_x)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn scale_coord(value: i64, scale: f64) -> i64 {
    // `as` saturates on overflow and maps NaN to 0.
    (value as f64 * scale).trunc() as i64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_len(value: u32, scale: f64) -> u32 {
    (f64::from(value) * scale).trunc() as u32
}
