//! cutframe-pipeline: Collage state and compositing (sans-IO).
//!
//! Tracks per-layout slot transforms (image, zoom, drag offset),
//! captions and frame bindings, and renders them two ways:
//!
//! - a low-resolution per-slot preview ([`preview::render_preview`]);
//! - a print-resolution export ([`compose::export`]) that re-projects
//!   every slot through a [`CoordinateMapper`], blends the frame overlay
//!   and draws italic captions.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and rasters. Reading frames, photos and fonts from disk
//! and writing exports lives in `cutframe-io`.

pub mod canvas;
pub mod composite;
pub mod compose;
pub mod config;
pub mod decode;
pub mod frame;
pub mod geometry;
pub mod layout;
pub mod mapper;
pub mod preview;
pub mod store;
pub mod text;
pub mod types;

pub use compose::{Composition, ExportAssets, ExportSummary, export};
pub use config::CollageConfig;
pub use frame::FrameOutcome;
pub use geometry::{GeometryKind, GeometryProvider, GeometryTable, GridGeometry, LayoutGeometry};
pub use layout::{Layout, Orientation};
pub use mapper::CoordinateMapper;
pub use store::{FrameBinding, Slot, SlotStore};
pub use text::CaptionFont;
pub use types::{
    CollageError, Dimensions, FontSize, Offset, PixelRect, RgbImage, RgbaImage, ScalePercent,
};
