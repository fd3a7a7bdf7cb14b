//! Integration test: encode a small canvas in every format and decode it back.

#![allow(clippy::unwrap_used, clippy::cast_possible_truncation)]

use std::path::Path;

use cutframe_export::{EncodeError, EncodeOptions, RasterFormat, encode, encode_for_path};
use cutframe_pipeline::RgbImage;
use image::Rgb;

fn checkerboard() -> RgbImage {
    RgbImage::from_fn(32, 24, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgb([250, 250, 250])
        } else {
            Rgb([10, 40, 200])
        }
    })
}

#[test]
fn png_is_lossless() {
    let canvas = checkerboard();
    let bytes = encode(&canvas, RasterFormat::Png, EncodeOptions::default()).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
    let back = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(back, canvas);
}

#[test]
fn jpeg_keeps_size_and_roughly_the_colors() {
    let canvas = checkerboard();
    let bytes = encode_for_path(&canvas, Path::new("out/collage.JPEG"), EncodeOptions::default())
        .unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
    let back = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(back.dimensions(), canvas.dimensions());
    let centre = back.get_pixel(4, 4).0;
    assert!(centre.iter().all(|&c| c > 200), "light square came back as {centre:?}");
}

#[test]
fn lower_quality_is_smaller() {
    let canvas = RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 128]));
    let high = encode(&canvas, RasterFormat::Jpeg, EncodeOptions { jpeg_quality: 100 }).unwrap();
    let low = encode(&canvas, RasterFormat::Jpeg, EncodeOptions { jpeg_quality: 10 }).unwrap();
    assert!(low.len() < high.len());
}

#[test]
fn bad_destination_is_reported() {
    let canvas = checkerboard();
    let err = encode_for_path(&canvas, Path::new("collage.tiff"), EncodeOptions::default())
        .unwrap_err();
    assert!(matches!(err, EncodeError::UnsupportedExtension { .. }));
    assert!(err.to_string().contains("tiff"));
}
