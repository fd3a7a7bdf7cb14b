//! Where each slot and caption sits inside the preview frame.
//!
//! The compositors never look widgets up themselves; they ask a
//! [`GeometryProvider`] for the preview-space rectangle of a slot or
//! caption. Rectangles are relative to the frame widget's top-left.
//!
//! # Strategy pattern
//!
//! [`GridGeometry`] computes a deterministic grid for every layout and
//! is what the CLI uses by default. [`GeometryTable`] carries explicit
//! rectangles (e.g. exported from a UI designer) and can be loaded from
//! JSON. [`GeometryKind`] selects between them at runtime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layout::{Layout, Orientation};
use crate::types::PixelRect;

/// Source of slot and caption rectangles in preview space.
pub trait GeometryProvider {
    /// Rectangle of slot `index` of `layout`, or `None` if the layout has
    /// no such slot.
    fn slot_rect(&self, layout: Layout, index: usize) -> Option<PixelRect>;

    /// Rectangle of caption `index` of `layout`, or `None` if the layout
    /// has no such caption.
    fn caption_rect(&self, layout: Layout, index: usize) -> Option<PixelRect>;
}

/// Uniform grid geometry.
///
/// Photo slots fill a grid inside the frame, leaving a caption band:
/// three narrow columns on the right of landscape pages, one strip along
/// the bottom of portrait pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridGeometry {
    /// Space between the frame edge and the content, in pixels.
    pub margin: u32,
    /// Space between neighbouring slots, in pixels.
    pub gap: u32,
    /// Width of each caption column on landscape pages.
    pub caption_column: u32,
    /// Height of the caption strip on portrait pages.
    pub caption_strip: u32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            margin: 16,
            gap: 8,
            caption_column: 40,
            caption_strip: 72,
        }
    }
}

impl GridGeometry {
    /// Grid shape `(columns, rows)` for a layout.
    #[must_use]
    pub const fn grid(layout: Layout) -> (u32, u32) {
        match layout {
            Layout::Blank => (0, 0),
            Layout::TwoHorizontal => (2, 1),
            Layout::TwoVertical => (1, 2),
            Layout::FourHorizontal | Layout::FourVertical => (2, 2),
            Layout::SixHorizontal => (3, 2),
            Layout::SixVertical => (2, 3),
            Layout::NineHorizontal | Layout::NineVertical => (3, 3),
        }
    }

    /// The area photo slots are laid out in.
    fn photo_area(&self, layout: Layout) -> PixelRect {
        let frame = layout.orientation().preview_size();
        let m = self.margin;
        match layout.orientation() {
            Orientation::Horizontal => PixelRect::new(
                i64::from(m),
                i64::from(m),
                frame
                    .width
                    .saturating_sub(3 * m + 3 * self.caption_column),
                frame.height.saturating_sub(2 * m),
            ),
            Orientation::Vertical => PixelRect::new(
                i64::from(m),
                i64::from(m),
                frame.width.saturating_sub(2 * m),
                frame.height.saturating_sub(3 * m + self.caption_strip),
            ),
        }
    }
}

impl GeometryProvider for GridGeometry {
    fn slot_rect(&self, layout: Layout, index: usize) -> Option<PixelRect> {
        if index >= layout.slot_count() {
            return None;
        }
        let (cols, rows) = Self::grid(layout);
        let index = u32::try_from(index).ok()?;
        let area = self.photo_area(layout);
        let cell_w = area.width.saturating_sub((cols - 1) * self.gap) / cols;
        let cell_h = area.height.saturating_sub((rows - 1) * self.gap) / rows;
        let (col, row) = (index % cols, index / cols);
        Some(PixelRect::new(
            area.x + i64::from(col * (cell_w + self.gap)),
            area.y + i64::from(row * (cell_h + self.gap)),
            cell_w,
            cell_h,
        ))
    }

    fn caption_rect(&self, layout: Layout, index: usize) -> Option<PixelRect> {
        if index >= layout.caption_count() {
            return None;
        }
        let frame = layout.orientation().preview_size();
        let m = self.margin;
        match layout.orientation() {
            Orientation::Horizontal => {
                let index = u32::try_from(index).ok()?;
                let band_x = frame.width.saturating_sub(m + 3 * self.caption_column);
                Some(PixelRect::new(
                    i64::from(band_x + index * self.caption_column),
                    i64::from(m),
                    self.caption_column,
                    frame.height.saturating_sub(2 * m),
                ))
            }
            Orientation::Vertical => Some(PixelRect::new(
                i64::from(m),
                i64::from(frame.height.saturating_sub(m + self.caption_strip)),
                frame.width.saturating_sub(2 * m),
                self.caption_strip,
            )),
        }
    }
}

/// Rectangles for one layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutGeometry {
    /// Slot rectangles, in slot order.
    #[serde(default)]
    pub slots: Vec<PixelRect>,
    /// Caption rectangles, in caption order.
    #[serde(default)]
    pub captions: Vec<PixelRect>,
}

/// Explicit per-layout rectangles.
///
/// Layouts (or indices) missing from the table have no geometry; the
/// compositors skip them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeometryTable {
    layouts: BTreeMap<Layout, LayoutGeometry>,
}

impl GeometryTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot every rectangle another provider yields.
    #[must_use]
    pub fn from_provider(provider: &impl GeometryProvider) -> Self {
        let layouts = Layout::ALL
            .into_iter()
            .filter(|layout| layout.slot_count() > 0)
            .map(|layout| {
                let geometry = LayoutGeometry {
                    slots: (0..layout.slot_count())
                        .filter_map(|i| provider.slot_rect(layout, i))
                        .collect(),
                    captions: (0..layout.caption_count())
                        .filter_map(|i| provider.caption_rect(layout, i))
                        .collect(),
                };
                (layout, geometry)
            })
            .collect();
        Self { layouts }
    }

    /// Set the rectangles of one layout.
    pub fn insert(&mut self, layout: Layout, geometry: LayoutGeometry) {
        self.layouts.insert(layout, geometry);
    }

    /// Rectangles of one layout, if present.
    #[must_use]
    pub fn get(&self, layout: Layout) -> Option<&LayoutGeometry> {
        self.layouts.get(&layout)
    }
}

impl GeometryProvider for GeometryTable {
    fn slot_rect(&self, layout: Layout, index: usize) -> Option<PixelRect> {
        if index >= layout.slot_count() {
            return None;
        }
        self.layouts.get(&layout)?.slots.get(index).copied()
    }

    fn caption_rect(&self, layout: Layout, index: usize) -> Option<PixelRect> {
        if index >= layout.caption_count() {
            return None;
        }
        self.layouts.get(&layout)?.captions.get(index).copied()
    }
}

/// Selects which geometry strategy to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryKind {
    /// Computed uniform grid.
    Grid(GridGeometry),
    /// Explicit rectangles.
    Table(GeometryTable),
}

impl Default for GeometryKind {
    fn default() -> Self {
        Self::Grid(GridGeometry::default())
    }
}

impl GeometryProvider for GeometryKind {
    fn slot_rect(&self, layout: Layout, index: usize) -> Option<PixelRect> {
        match self {
            Self::Grid(grid) => grid.slot_rect(layout, index),
            Self::Table(table) => table.slot_rect(layout, index),
        }
    }

    fn caption_rect(&self, layout: Layout, index: usize) -> Option<PixelRect> {
        match self {
            Self::Grid(grid) => grid.caption_rect(layout, index),
            Self::Table(table) => table.caption_rect(layout, index),
        }
    }
}
