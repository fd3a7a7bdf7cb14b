//! Italic caption rendering for the export canvas.
//!
//! Text is rasterized with `ab_glyph` into single-channel coverage
//! masks, sheared with an affine warp to fake an italic, then tinted
//! and alpha-blended onto the canvas, clipped to the caption's mapped
//! rectangle.
//!
//! Two families of caption exist, chosen by page orientation:
//!
//! - **Column captions** (landscape pages, up to three): every character
//!   gets its own row, so the text reads top to bottom. The block of rows
//!   is centered vertically. Column 0 is right-aligned, column 1
//!   centered and column 2 left-aligned.
//! - **Line captions** (portrait pages, one): conventional lines split
//!   on `'\n'`, each horizontally centered by the extent of its *sheared*
//!   ink, so the lean of the italic does not push the line off-centre.
//!
//! Shearing is top-anchored: the first row of a mask stays in place and
//! lower rows lean left by `shear * y`. The sheared mask is wider than
//! its source by `ceil(shear * height)` pixels of slack on the left,
//! which is subtracted again when the mask is placed.

use std::fmt;

use ab_glyph::{Font, FontArc, OutlinedGlyph, ScaleFont, point};
use image::{GrayImage, Luma, Rgba, imageops};
use imageproc::geometric_transformations::{Interpolation, Projection, warp};

use crate::composite::blend_clipped;
use crate::config::CollageConfig;
use crate::layout::Orientation;
use crate::types::{CollageError, FontSize, PixelRect, RgbImage, RgbaImage};

/// Largest coverage mask, after shearing, a caption may allocate.
const MAX_MASK_PIXELS: u64 = 1 << 24;

/// A parsed caption typeface.
#[derive(Clone)]
pub struct CaptionFont {
    font: FontArc,
}

impl CaptionFont {
    /// Parse a TrueType / OpenType font.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::InvalidFont`] if the data is not a font.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, CollageError> {
        let font = FontArc::try_from_vec(data)
            .map_err(|err| CollageError::InvalidFont(err.to_string()))?;
        Ok(Self { font })
    }

    /// Outlines of the inked glyphs of `text`, laid out along one line
    /// whose box starts at `origin`.
    fn outlines(&self, px: f32, text: &str, origin: (f32, f32)) -> Vec<OutlinedGlyph> {
        let scaled = self.font.as_scaled(px);
        let baseline = origin.1 + scaled.ascent();
        let mut caret = origin.0;
        let mut prev = None;
        let mut glyphs = Vec::new();
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(px, point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);
            glyphs.extend(self.font.outline_glyph(glyph));
        }
        glyphs
    }

    /// Left and right pixel edges of the ink of `text` at `px` pixels,
    /// relative to the caret start. `None` if nothing is inked.
    #[must_use]
    pub fn ink_span(&self, px: f32, text: &str) -> Option<(f32, f32)> {
        self.outlines(px, text, (0.0, 0.0))
            .iter()
            .map(OutlinedGlyph::px_bounds)
            .fold(None, |span, bounds| match span {
                None => Some((bounds.min.x, bounds.max.x)),
                Some((left, right)) => Some((bounds.min.x.min(left), bounds.max.x.max(right))),
            })
    }

    /// Rasterize `text` into a `width` x `height` coverage mask with the
    /// top of its line box at `origin`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn render_mask(
        &self,
        px: f32,
        text: &str,
        width: u32,
        height: u32,
        origin: (f32, f32),
    ) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        for outlined in self.outlines(px, text, origin) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i64 + i64::from(gx);
                let y = bounds.min.y as i64 + i64::from(gy);
                if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                    return;
                }
                let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                let pixel = mask.get_pixel_mut(x as u32, y as u32);
                pixel.0[0] = pixel.0[0].max(value);
            });
        }
        mask
    }
}

impl fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptionFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

/// Horizontal alignment of a column caption inside its rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Flush with the right edge.
    Right,
    /// Centered.
    Center,
    /// Flush with the left edge.
    Left,
}

impl Alignment {
    /// Alignment of landscape caption column `index`: right, center,
    /// left, then left for anything beyond.
    #[must_use]
    pub const fn for_column(index: usize) -> Self {
        match index {
            0 => Self::Right,
            1 => Self::Center,
            _ => Self::Left,
        }
    }

    /// Left edge for content `width` pixels wide inside `rect`.
    #[must_use]
    pub fn x_in(self, rect: PixelRect, width: u32) -> i64 {
        let free = i64::from(rect.width) - i64::from(width);
        match self {
            Self::Right => rect.x + free,
            Self::Center => rect.x + free / 2,
            Self::Left => rect.x,
        }
    }
}

/// Size, spacing, lean and color of export captions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionStyle {
    /// Glyph size in export pixels.
    pub px: u32,
    /// Extra spacing between caption lines: the label point size.
    pub gap: u32,
    /// Horizontal shear factor.
    pub shear: f32,
    /// Text color.
    pub color: [u8; 3],
}

impl CaptionStyle {
    /// Style for captions set at `size` points on the labels.
    #[must_use]
    pub fn for_export(size: FontSize, config: &CollageConfig) -> Self {
        Self {
            px: size.export_px(config.display_dpi, config.target_dpi),
            gap: size.get(),
            shear: config.shear,
            color: config.text_color,
        }
    }

    /// Row pitch of column captions: `trunc(px * 1.2)`.
    #[must_use]
    pub const fn row_step(&self) -> u32 {
        self.px.saturating_add(self.px / 5)
    }
}

/// Shear a coverage mask horizontally, top-anchored.
///
/// Returns the sheared mask and the number of pixels the top row moved
/// right, which the caller subtracts from the paste position.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn shear(mask: &GrayImage, factor: f32) -> (GrayImage, u32) {
    let (w, h) = mask.dimensions();
    let slack = (factor.abs() * h as f32).ceil();
    if w == 0 || h == 0 || !slack.is_finite() || slack < 1.0 {
        return (mask.clone(), 0);
    }
    let slack = slack as u32;
    let shift = if factor > 0.0 { slack } else { 0 };

    let mut padded = GrayImage::new(w + slack, h);
    imageops::replace(&mut padded, mask, 0, 0);
    // x' = x - factor * y + shift
    let matrix = [1.0, -factor, shift as f32, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
    let Some(projection) = Projection::from_matrix(matrix) else {
        return (mask.clone(), 0);
    };
    let sheared = warp(&padded, &projection, Interpolation::Bilinear, Luma([0]));
    (sheared, shift)
}

/// First and one-past-last column containing any ink.
#[must_use]
pub fn opaque_columns(mask: &GrayImage) -> Option<(u32, u32)> {
    let inked = |x: u32| (0..mask.height()).any(|y| mask.get_pixel(x, y).0[0] > 0);
    let first = (0..mask.width()).find(|&x| inked(x))?;
    let last = (first..mask.width()).rev().find(|&x| inked(x))?;
    Some((first, last + 1))
}

/// Top edge of each row of a vertically centered block of `rows` rows,
/// `step` pixels apart.
#[must_use]
pub fn column_rows(rows: usize, step: u32, rect: PixelRect) -> Vec<i64> {
    let Ok(n) = i64::try_from(rows) else {
        return Vec::new();
    };
    let pitch = i64::from(step);
    let top = rect.y + (i64::from(rect.height) - n.saturating_mul(pitch)) / 2;
    (0..n).map(|k| top + k * pitch).collect()
}

/// Mask dimensions if a `width` x `height` mask, widened by the shear
/// slack, stays within [`MAX_MASK_PIXELS`].
#[allow(clippy::cast_precision_loss)]
fn mask_size(width: u64, height: u64, shear: f32) -> Option<(u32, u32)> {
    let slack = (f64::from(shear.abs()) * height as f64).ceil();
    let sheared = width as f64 + if slack.is_finite() { slack } else { 0.0 };
    if sheared * height as f64 > MAX_MASK_PIXELS as f64 {
        return None;
    }
    Some((u32::try_from(width).ok()?, u32::try_from(height).ok()?))
}

/// Whether rows `top..top + height` reach into `rect`.
fn overlaps_rows(rect: PixelRect, top: i64, height: u64) -> bool {
    let height = i64::try_from(height).unwrap_or(i64::MAX);
    top < rect.bottom() && top.saturating_add(height) > rect.y
}

/// Colorize a coverage mask.
fn tint(mask: &GrayImage, color: [u8; 3]) -> RgbaImage {
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let [r, g, b] = color;
        Rgba([r, g, b, mask.get_pixel(x, y).0[0]])
    })
}

/// Draw a landscape column caption: one character per row.
///
/// Returns `true` if any glyph landed inside `rect`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]
pub fn draw_column_caption(
    canvas: &mut RgbImage,
    font: &CaptionFont,
    text: &str,
    rect: PixelRect,
    alignment: Alignment,
    style: &CaptionStyle,
) -> bool {
    let chars: Vec<char> = text.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    if chars.is_empty() || style.px == 0 {
        return false;
    }
    let px = style.px as f32;
    let pad = u64::from(style.px) * 3 / 10;
    let mask_height = u64::from(style.px) * 3 / 2 + pad;
    let rows = column_rows(chars.len(), style.row_step(), rect);

    let mut drawn = false;
    let mut buf = [0_u8; 4];
    for (ch, top) in chars.iter().zip(rows) {
        if !overlaps_rows(rect, top, mask_height) {
            continue;
        }
        let glyph = ch.encode_utf8(&mut buf);
        let Some((left, right)) = font.ink_span(px, glyph) else {
            continue;
        };
        let ink_w = (right - left).ceil().max(0.0) as u64;
        let Some((width, height)) = mask_size(ink_w + 2 * pad, mask_height, style.shear) else {
            tracing::debug!(px = style.px, %ch, "caption glyph too large to rasterize");
            continue;
        };
        let mask = font.render_mask(
            px,
            glyph,
            width,
            height,
            (pad as f32 - left, (pad / 2) as f32),
        );
        let (sheared, shift) = shear(&mask, style.shear);
        let ink_w = u32::try_from(ink_w).unwrap_or(u32::MAX);
        let x = alignment.x_in(rect, ink_w) - pad as i64 - i64::from(shift);
        drawn |= blend_clipped(canvas, &tint(&sheared, style.color), (x, top), rect);
    }
    drawn
}

/// Draw a portrait line caption: lines split on `'\n'`, each centered
/// by its sheared ink extent.
///
/// Returns `true` if any line landed inside `rect`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]
pub fn draw_line_caption(
    canvas: &mut RgbImage,
    font: &CaptionFont,
    text: &str,
    rect: PixelRect,
    style: &CaptionStyle,
) -> bool {
    if text.is_empty() || style.px == 0 {
        return false;
    }
    let px = style.px as f32;
    let pad = u64::from(style.px) / 2;
    let mask_height = 2 * u64::from(style.px);
    let line_height = i64::from(style.px) + i64::from(style.gap);
    let start = rect.y + i64::from(style.px / 5);

    let mut drawn = false;
    let mut top = start;
    for line in text.split('\n') {
        let line = line.trim_end_matches('\r');
        let y = top - (pad / 2) as i64;
        top = top.saturating_add(line_height);
        if line.trim().is_empty() || !overlaps_rows(rect, y, mask_height) {
            continue;
        }
        let Some((left, right)) = font.ink_span(px, line) else {
            continue;
        };
        let ink_w = (right - left).ceil().max(0.0) as u64;
        let Some((width, height)) = mask_size(ink_w + 2 * pad, mask_height, style.shear) else {
            tracing::debug!(px = style.px, line, "caption line too large to rasterize");
            continue;
        };
        let mask = font.render_mask(
            px,
            line,
            width,
            height,
            (pad as f32 - left, (pad / 2) as f32),
        );
        let (sheared, _) = shear(&mask, style.shear);
        if let Some((first, last)) = opaque_columns(&sheared) {
            let x = Alignment::Center.x_in(rect, last - first) - i64::from(first);
            drawn |= blend_clipped(canvas, &tint(&sheared, style.color), (x, y), rect);
        }
    }
    drawn
}

/// Draw caption `index` of a page with the given orientation.
pub fn draw_caption(
    canvas: &mut RgbImage,
    font: &CaptionFont,
    orientation: Orientation,
    index: usize,
    text: &str,
    rect: PixelRect,
    style: &CaptionStyle,
) -> bool {
    match orientation {
        Orientation::Horizontal => draw_column_caption(
            canvas,
            font,
            text,
            rect,
            Alignment::for_column(index),
            style,
        ),
        Orientation::Vertical => draw_line_caption(canvas, font, text, rect, style),
    }
}
