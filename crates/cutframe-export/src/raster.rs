//! PNG / JPEG encoding.

use std::fmt;
use std::path::Path;

use cutframe_pipeline::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};

/// Errors from choosing a format or encoding.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The destination extension names no supported format.
    #[error("unsupported export format {extension:?} (expected png, jpg or jpeg)")]
    UnsupportedExtension {
        /// The rejected extension.
        extension: String,
    },

    /// The destination has no extension to pick a format from.
    #[error("export path {path:?} has no file extension")]
    MissingExtension {
        /// The offending path.
        path: String,
    },

    /// The encoder itself failed.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    /// Lossless PNG.
    Png,
    /// Baseline JPEG.
    Jpeg,
}

impl RasterFormat {
    /// Format for a file extension, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnsupportedExtension`] for anything other
    /// than `png`, `jpg` or `jpeg`.
    pub fn from_extension(extension: &str) -> Result<Self, EncodeError> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(EncodeError::UnsupportedExtension {
                extension: extension.to_owned(),
            }),
        }
    }

    /// Format for a destination path.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::MissingExtension`] if the path has no
    /// extension, otherwise as [`from_extension`](Self::from_extension).
    pub fn from_path(path: &Path) -> Result<Self, EncodeError> {
        let extension = path
            .extension()
            .ok_or_else(|| EncodeError::MissingExtension {
                path: path.display().to_string(),
            })?;
        Self::from_extension(&extension.to_string_lossy())
    }

    /// Canonical file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => f.write_str("PNG"),
            Self::Jpeg => f.write_str("JPEG"),
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// JPEG quality, 1-100. Values outside the range are clamped.
    pub jpeg_quality: u8,
}

impl EncodeOptions {
    /// Default JPEG quality.
    pub const DEFAULT_JPEG_QUALITY: u8 = 95;
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: Self::DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Encode a canvas in the given format.
///
/// # Errors
///
/// Returns [`EncodeError::Encode`] if the encoder fails.
pub fn encode(
    image: &RgbImage,
    format: RasterFormat,
    options: EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    let (width, height) = image.dimensions();
    match format {
        RasterFormat::Png => PngEncoder::new(&mut buf).write_image(
            image.as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        )?,
        RasterFormat::Jpeg => {
            let quality = options.jpeg_quality.clamp(1, 100);
            JpegEncoder::new_with_quality(&mut buf, quality).write_image(
                image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    Ok(buf)
}

/// Encode a canvas in the format named by `path`'s extension.
///
/// # Errors
///
/// Returns [`EncodeError::MissingExtension`] or
/// [`EncodeError::UnsupportedExtension`] for a bad destination, and
/// [`EncodeError::Encode`] if the encoder fails.
pub fn encode_for_path(
    image: &RgbImage,
    path: &Path,
    options: EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    encode(image, RasterFormat::from_path(path)?, options)
}
