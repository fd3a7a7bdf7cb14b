//! cutframe-export: Raster encoders for finished collages (sans-IO).
//!
//! Turns a composited canvas into PNG or JPEG bytes. The format is picked
//! from the destination file name's extension; writing the bytes is the
//! caller's job.

pub mod raster;

pub use raster::{EncodeError, EncodeOptions, RasterFormat, encode, encode_for_path};
