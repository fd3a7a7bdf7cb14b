//! Shared types for the cutframe compositing pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::Layout;

/// Re-export `RgbImage` so downstream crates can hold canvases and slot
/// sources without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `RgbaImage` for frame overlays and glyph rasters.
pub use image::RgbaImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of an existing raster.
    #[must_use]
    pub fn of<P: image::Pixel>(image: &image::ImageBuffer<P, Vec<P::Subpixel>>) -> Self {
        Self::new(image.width(), image.height())
    }

    /// Returns `true` if either axis is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An axis-aligned pixel rectangle.
///
/// Used in both coordinate spaces: widget rectangles in preview space
/// (relative to the frame widget's top-left corner) and their projections
/// in export space. The origin may be negative or lie outside any canvas;
/// clipping happens at copy time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge (inclusive).
    pub x: i64,
    /// Top edge (inclusive).
    pub y: i64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle covering a whole raster of the given size.
    #[must_use]
    pub const fn covering(dimensions: Dimensions) -> Self {
        Self::new(0, 0, dimensions.width, dimensions.height)
    }

    /// Right edge (exclusive).
    #[must_use]
    pub fn right(self) -> i64 {
        self.x + i64::from(self.width)
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub fn bottom(self) -> i64 {
        self.y + i64::from(self.height)
    }

    /// Size of the rectangle.
    #[must_use]
    pub const fn size(self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with another rectangle.
    ///
    /// Returns `None` when the rectangles are disjoint or either is empty.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn intersect(self, other: Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        // Both spans are bounded by one of the inputs' u32 extents.
        Some(Self::new(
            left,
            top,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

/// A slot translation in preview-space pixels, relative to the default
/// top-left placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal displacement (positive = right).
    pub dx: i32,
    /// Vertical displacement (positive = down).
    pub dy: i32,
}

impl Offset {
    /// Create a new offset.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Component-wise sum, saturating at the `i32` range.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self::new(
            self.dx.saturating_add(other.dx),
            self.dy.saturating_add(other.dy),
        )
    }
}

/// Slot zoom as a percentage of the source image size.
///
/// Always finite and strictly positive; the only ways to build one are
/// the validating constructors, so a stored scale can never be zero or
/// negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ScalePercent(f64);

impl ScalePercent {
    /// Scale of a freshly reset slot.
    pub const DEFAULT: Self = Self(100.0);

    /// Lowest value reachable by stepping down with the wheel.
    pub const STEP_FLOOR: Self = Self(1.0);

    /// Validate a numeric scale.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::InvalidScale`] if `value` is not finite or
    /// not strictly positive.
    pub fn new(value: f64) -> Result<Self, CollageError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(CollageError::InvalidScale {
                input: value.to_string(),
            })
        }
    }

    /// Parse free-text input from the scale field.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::InvalidScale`] for non-numeric input or a
    /// value that is not strictly positive.
    pub fn parse(input: &str) -> Result<Self, CollageError> {
        let invalid = || CollageError::InvalidScale {
            input: input.to_owned(),
        };
        let value: f64 = input.trim().parse().map_err(|_| invalid())?;
        Self::new(value).map_err(|_| invalid())
    }

    /// The largest scale not above 100% at which an image of `image` size
    /// fits inside `target` on both axes, rounded up to a whole percent.
    ///
    /// `min(ceil(100 * Tw / Iw), ceil(100 * Th / Ih))`, capped at 100 and
    /// never below 1.
    #[must_use]
    pub fn auto_fit(image: Dimensions, target: Dimensions) -> Self {
        if image.is_empty() {
            return Self::DEFAULT;
        }
        let width_pct = (100.0 * f64::from(target.width) / f64::from(image.width)).ceil();
        let height_pct = (100.0 * f64::from(target.height) / f64::from(image.height)).ceil();
        Self(width_pct.min(height_pct).clamp(1.0, 100.0))
    }

    /// Step by one percent: up for a positive direction, down for a
    /// negative one, unchanged for zero. Never drops below
    /// [`STEP_FLOOR`](Self::STEP_FLOOR).
    #[must_use]
    pub fn stepped(self, direction: i32) -> Self {
        match direction.signum() {
            1 => Self(self.0 + 1.0),
            -1 => Self((self.0 - 1.0).max(Self::STEP_FLOOR.0)),
            _ => self,
        }
    }

    /// The raw percentage.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// The scale as a resize ratio (`percent / 100`).
    #[must_use]
    pub fn ratio(self) -> f64 {
        self.0 * 0.01
    }
}

impl Default for ScalePercent {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ScalePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for ScalePercent {
    type Error = CollageError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScalePercent> for f64 {
    fn from(scale: ScalePercent) -> Self {
        scale.0
    }
}

/// Caption font size in points, as set on the caption labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FontSize(u32);

impl FontSize {
    /// Point size of freshly reset captions.
    pub const DEFAULT: Self = Self(12);

    /// Largest accepted point size.
    pub const MAX: Self = Self(1000);

    /// Validate a point size.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::InvalidFontSize`] for zero or anything
    /// above [`MAX`](Self::MAX).
    pub fn new(points: u32) -> Result<Self, CollageError> {
        if points == 0 || points > Self::MAX.0 {
            return Err(CollageError::InvalidFontSize {
                input: points.to_string(),
            });
        }
        Ok(Self(points))
    }

    /// Parse free-text input from the font size field.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::InvalidFontSize`] unless the input is an
    /// integer from 1 to [`MAX`](Self::MAX).
    pub fn parse(input: &str) -> Result<Self, CollageError> {
        let invalid = || CollageError::InvalidFontSize {
            input: input.to_owned(),
        };
        let value: i64 = input.trim().parse().map_err(|_| invalid())?;
        let points = u32::try_from(value).map_err(|_| invalid())?;
        Self::new(points).map_err(|_| invalid())
    }

    /// Point size to set on the labels so text looks `self` points tall
    /// on a screen running at `display_dpi`.
    ///
    /// `max(1, trunc(points / (display_dpi / 96)))`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn for_display(self, display_dpi: f64) -> Self {
        let dpi_scale = display_dpi / crate::config::REFERENCE_DPI;
        if !(dpi_scale.is_finite() && dpi_scale > 0.0) {
            return self;
        }
        let points = (f64::from(self.0) / dpi_scale).trunc();
        Self((points as u32).max(1))
    }

    /// Pixel size of the rendered glyphs in the export raster.
    ///
    /// The label point size is first converted to what the user actually
    /// saw (`* display_dpi / 96`), then up to the export resolution
    /// (`* target_dpi / 96`), truncating after each step.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn export_px(self, display_dpi: f64, target_dpi: f64) -> u32 {
        let visible = (f64::from(self.0) * display_dpi / crate::config::REFERENCE_DPI).trunc();
        let export = (visible * target_dpi / crate::config::REFERENCE_DPI).trunc();
        if export.is_finite() && export >= 1.0 {
            export as u32
        } else {
            0
        }
    }

    /// The raw point size.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for FontSize {
    type Error = CollageError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FontSize> for u32 {
    fn from(size: FontSize) -> Self {
        size.0
    }
}

/// Errors that can occur while editing or compositing a collage.
///
/// Every variant is a recoverable user-input or decode failure. Geometry
/// problems during compositing (disjoint or degenerate copy regions) are
/// never errors; they simply draw nothing.
#[derive(Debug, thiserror::Error)]
pub enum CollageError {
    /// Failed to decode an image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A frame file name matched none of the layout tokens.
    #[error("frame file name {file_name:?} does not follow the naming convention")]
    Naming {
        /// The offending file name.
        file_name: String,
    },

    /// Scale input was non-numeric or not strictly positive.
    #[error("scale must be a positive number, got {input:?}")]
    InvalidScale {
        /// The rejected input.
        input: String,
    },

    /// Font size input was not an integer in the accepted range.
    #[error("font size must be a whole number from 1 to 1000, got {input:?}")]
    InvalidFontSize {
        /// The rejected input.
        input: String,
    },

    /// The layout has no slot at this index.
    #[error("layout {layout} has no slot {index}")]
    SlotOutOfRange {
        /// The layout that was addressed.
        layout: Layout,
        /// The requested slot index.
        index: usize,
    },

    /// The layout has no caption at this index.
    #[error("layout {layout} has no caption {index}")]
    CaptionOutOfRange {
        /// The layout that was addressed.
        layout: Layout,
        /// The requested caption index.
        index: usize,
    },

    /// Caption font data could not be parsed.
    #[error("invalid caption font: {0}")]
    InvalidFont(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- PixelRect ---

    #[test]
    fn intersect_overlapping() {
        let a = PixelRect::new(0, 0, 10, 10);
        let b = PixelRect::new(5, 3, 10, 10);
        assert_eq!(a.intersect(b), Some(PixelRect::new(5, 3, 5, 7)));
    }

    #[test]
    fn intersect_contained() {
        let outer = PixelRect::new(-5, -5, 100, 100);
        let inner = PixelRect::new(10, 20, 3, 4);
        assert_eq!(outer.intersect(inner), Some(inner));
        assert_eq!(inner.intersect(outer), Some(inner));
    }

    #[test]
    fn intersect_touching_edges_is_empty() {
        let a = PixelRect::new(0, 0, 10, 10);
        let b = PixelRect::new(10, 0, 10, 10);
        assert_eq!(a.intersect(b), None);
    }

    #[test]
    fn intersect_disjoint_and_empty() {
        let a = PixelRect::new(0, 0, 10, 10);
        assert_eq!(a.intersect(PixelRect::new(50, 50, 5, 5)), None);
        assert_eq!(a.intersect(PixelRect::new(2, 2, 0, 5)), None);
    }

    // --- ScalePercent ---

    #[test]
    fn scale_parse_accepts_positive_numbers() {
        assert_eq!(ScalePercent::parse("35").unwrap().get(), 35.0);
        assert_eq!(ScalePercent::parse(" 12.5 ").unwrap().get(), 12.5);
    }

    #[test]
    fn scale_parse_rejects_non_positive_and_garbage() {
        for input in ["-5", "0", "abc", "", "NaN", "inf"] {
            let err = ScalePercent::parse(input).unwrap_err();
            assert!(
                matches!(err, CollageError::InvalidScale { input: ref got } if got == input),
                "unexpected error for {input:?}: {err:?}",
            );
        }
    }

    #[test]
    fn auto_fit_takes_the_tighter_axis() {
        let scale =
            ScalePercent::auto_fit(Dimensions::new(2000, 1000), Dimensions::new(400, 300));
        assert_eq!(scale.get(), 20.0);
    }

    #[test]
    fn auto_fit_rounds_up() {
        // 100 * 300 / 900 = 33.33.. -> 34
        let scale = ScalePercent::auto_fit(Dimensions::new(900, 900), Dimensions::new(300, 400));
        assert_eq!(scale.get(), 34.0);
    }

    #[test]
    fn auto_fit_caps_at_100() {
        let scale = ScalePercent::auto_fit(Dimensions::new(50, 40), Dimensions::new(400, 300));
        assert_eq!(scale.get(), 100.0);
    }

    #[test]
    fn stepping_is_floor_clamped() {
        let one = ScalePercent::new(1.0).unwrap();
        assert_eq!(one.stepped(-1).get(), 1.0);
        assert_eq!(one.stepped(1).get(), 2.0);
        assert_eq!(one.stepped(0).get(), 1.0);
        assert_eq!(ScalePercent::DEFAULT.stepped(-120).get(), 99.0);
    }

    #[test]
    fn scale_display_is_plain_number() {
        assert_eq!(ScalePercent::DEFAULT.to_string(), "100");
        assert_eq!(ScalePercent::new(12.5).unwrap().to_string(), "12.5");
    }

    #[test]
    fn scale_serde_rejects_zero() {
        assert!(serde_json::from_str::<ScalePercent>("0.0").is_err());
        let ok: ScalePercent = serde_json::from_str("42.0").unwrap();
        assert_eq!(ok.get(), 42.0);
    }

    // --- FontSize ---

    #[test]
    fn font_size_parse() {
        assert_eq!(FontSize::parse("14").unwrap().get(), 14);
        assert!(FontSize::parse("0").is_err());
        assert!(FontSize::parse("-3").is_err());
        assert!(FontSize::parse("1.5").is_err());
        assert!(FontSize::parse("big").is_err());
    }

    #[test]
    fn font_size_is_capped() {
        assert_eq!(FontSize::parse("1000").unwrap(), FontSize::MAX);
        for input in ["1001", "200000", "4294967296"] {
            let err = FontSize::parse(input).unwrap_err();
            assert!(matches!(err, CollageError::InvalidFontSize { .. }), "{input}");
        }
        assert!(serde_json::from_str::<FontSize>("5000").is_err());
    }

    #[test]
    fn font_size_display_compensation() {
        let size = FontSize::new(12).unwrap();
        assert_eq!(size.for_display(96.0).get(), 12);
        assert_eq!(size.for_display(144.0).get(), 8);
        // Never collapses to zero.
        assert_eq!(FontSize::new(1).unwrap().for_display(192.0).get(), 1);
    }

    #[test]
    fn font_size_export_px() {
        let size = FontSize::new(12).unwrap();
        // 12pt at 96 dpi -> 12 * 1200/96 = 150 px.
        assert_eq!(size.export_px(96.0, 1200.0), 150);
        // 8pt on a 144 dpi screen looks like 12pt.
        assert_eq!(FontSize::new(8).unwrap().export_px(144.0, 1200.0), 150);
    }
}
