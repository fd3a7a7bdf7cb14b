//! Image decoding.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces either an
//! opaque RGB raster for photo slots or a [`DynamicImage`] that keeps
//! the alpha channel for frame overlays.

use image::DynamicImage;

use crate::types::{CollageError, RgbImage};

/// Decode raw image bytes, keeping the source color type.
///
/// # Errors
///
/// Returns [`CollageError::EmptyInput`] if `bytes` is empty.
/// Returns [`CollageError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CollageError> {
    if bytes.is_empty() {
        return Err(CollageError::EmptyInput);
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Decode raw image bytes into an opaque RGB raster, dropping any alpha
/// channel.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, CollageError> {
    decode(bytes).map(|image| image.to_rgb8())
}
