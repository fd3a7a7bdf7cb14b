//! Print-resolution export compositing.
//!
//! The export canvas is built in three passes over a blank canvas sized
//! for the layout's orientation at the configured DPI:
//!
//! 1. every slot with an image is resampled by its zoom composed with
//!    the preview-to-export ratios, placed at its mapped rectangle plus
//!    its mapped translation, and clipped to the mapped rectangle;
//! 2. the bound frame is stretched over the canvas and blended (alpha)
//!    or pasted (opaque);
//! 3. captions are drawn on top, clipped to their mapped rectangles.
//!
//! Nothing here fails: empty intersections, missing geometry and an
//! undecodable frame are logged and reported in the [`ExportSummary`].

use crate::canvas::make_canvas_with;
use crate::config::CollageConfig;
use crate::decode::decode;
use crate::frame::{FrameOutcome, apply_frame};
use crate::geometry::GeometryProvider;
use crate::layout::Layout;
use crate::mapper::CoordinateMapper;
use crate::preview::draw_scaled;
use crate::store::{Slot, SlotStore};
use crate::text::{CaptionFont, CaptionStyle, draw_caption};
use crate::types::{Dimensions, RgbImage};

/// External inputs the store only references by path.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportAssets<'a> {
    /// Encoded bytes of the layout's bound frame, if they could be read.
    pub frame: Option<&'a [u8]>,
    /// Caption typeface. Without one, captions are skipped.
    pub font: Option<&'a CaptionFont>,
}

/// What the export compositor drew.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// The exported layout.
    pub layout: Layout,
    /// Export canvas size.
    pub size: Dimensions,
    /// Slots whose image landed on the canvas.
    pub drawn_slots: Vec<usize>,
    /// Slots with an image that drew nothing (no geometry, zero-size
    /// resample or no overlap with their rectangle).
    pub skipped_slots: Vec<usize>,
    /// How the frame was handled.
    pub frame: FrameOutcome,
    /// Captions that put ink on the canvas.
    pub captions_drawn: usize,
    /// Non-empty captions that drew nothing.
    pub captions_skipped: usize,
}

/// A finished export raster and its summary.
#[derive(Debug, Clone)]
pub struct Composition {
    /// The composited print-resolution canvas.
    pub image: RgbImage,
    /// What went into it.
    pub summary: ExportSummary,
}

/// Composite `layout` at print resolution.
#[must_use = "returns the composited canvas"]
#[tracing::instrument(skip_all, fields(%layout))]
pub fn export(
    store: &SlotStore,
    layout: Layout,
    geometry: &impl GeometryProvider,
    assets: ExportAssets<'_>,
    config: &CollageConfig,
) -> Composition {
    let orientation = layout.orientation();
    let mapper = CoordinateMapper::for_orientation(orientation, config);
    let size = mapper.export();
    tracing::info!(width = size.width, height = size.height, "exporting");

    let mut canvas = make_canvas_with(size.width, size.height, config.background);
    let mut summary = ExportSummary {
        layout,
        size,
        drawn_slots: Vec::new(),
        skipped_slots: Vec::new(),
        frame: FrameOutcome::Absent,
        captions_drawn: 0,
        captions_skipped: 0,
    };

    for (index, slot) in store.slots(layout).iter().enumerate() {
        if !slot.has_image() {
            continue;
        }
        if draw_slot(&mut canvas, slot, layout, index, geometry, &mapper) {
            summary.drawn_slots.push(index);
        } else {
            tracing::debug!(index, "slot drew nothing");
            summary.skipped_slots.push(index);
        }
    }

    summary.frame = match (store.frame(layout), assets.frame) {
        (None, _) => FrameOutcome::Absent,
        (Some(binding), None) => {
            tracing::warn!(path = %binding.path.display(), "frame missing; exporting without it");
            FrameOutcome::Unreadable
        }
        (Some(binding), Some(bytes)) => match decode(bytes) {
            Ok(frame) => apply_frame(&mut canvas, &frame),
            Err(err) => {
                tracing::warn!(path = %binding.path.display(), %err, "frame undecodable; exporting without it");
                FrameOutcome::Unreadable
            }
        },
    };

    let style = CaptionStyle::for_export(store.font_size(layout), config);
    for (index, text) in store.captions(layout).iter().enumerate() {
        if text.trim().is_empty() {
            continue;
        }
        let drawn = match (assets.font, geometry.caption_rect(layout, index)) {
            (Some(font), Some(rect)) => draw_caption(
                &mut canvas,
                font,
                orientation,
                index,
                text,
                mapper.map_rect(rect),
                &style,
            ),
            (None, _) => {
                tracing::warn!(index, "no caption font; caption skipped");
                false
            }
            (_, None) => {
                tracing::debug!(index, "caption has no geometry");
                false
            }
        };
        if drawn {
            summary.captions_drawn += 1;
        } else {
            summary.captions_skipped += 1;
        }
    }

    Composition {
        image: canvas,
        summary,
    }
}

fn draw_slot(
    canvas: &mut RgbImage,
    slot: &Slot,
    layout: Layout,
    index: usize,
    geometry: &impl GeometryProvider,
    mapper: &CoordinateMapper,
) -> bool {
    let (Some(image), Some(rect)) = (slot.image(), geometry.slot_rect(layout, index)) else {
        return false;
    };
    let ratio = slot.scale().ratio();
    let clip = mapper.map_rect(rect);
    let (dx, dy) = mapper.map_offset(slot.translation().unwrap_or_default());
    draw_scaled(
        canvas,
        image,
        (ratio * mapper.scale_x(), ratio * mapper.scale_y()),
        (clip.x.saturating_add(dx), clip.y.saturating_add(dy)),
        clip,
    )
}
