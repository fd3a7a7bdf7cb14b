//! The editor session: the synchronous entry points a UI layer calls.
//!
//! A [`Session`] owns the [`SlotStore`], the geometry provider, the
//! caption font and the "selected slot" cursor. Every entry point runs
//! to completion before returning, so events never interleave.
//!
//! User-input failures (bad frame name, bad scale, unreadable photo) are
//! returned as [`SessionError`] *and* written to [`Session::status`], the
//! one-line message the UI shows; the store is never partially updated.

use std::path::{Path, PathBuf};

use cutframe_export::{EncodeError, EncodeOptions, RasterFormat, encode};
use cutframe_pipeline::decode::decode;
use cutframe_pipeline::frame::frame_preview;
use cutframe_pipeline::preview::render_preview;
use cutframe_pipeline::{
    CaptionFont, CollageConfig, CollageError, Dimensions, ExportAssets, ExportSummary, FontSize,
    GeometryKind, GeometryProvider, Layout, Offset, PixelRect, RgbImage, RgbaImage, ScalePercent,
    SlotStore, export,
};

use crate::fs;

/// Errors surfaced by session entry points.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Validation or decode failure in the core.
    #[error(transparent)]
    Collage(#[from] CollageError),

    /// The export destination or encoder failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// A file could not be read or written.
    #[error("{}: {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A project description could not be parsed.
    #[error("invalid project file {}: {source}", .path.display())]
    Project {
        /// The project file.
        path: PathBuf,
        /// The parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A command that acts on the selected slot ran with none selected.
    #[error("select a slot first")]
    NoSlotSelected,

    /// A command that needs a layout ran before any frame was imported.
    #[error("import a frame first")]
    NoActiveLayout,
}

/// Result of offering an image to a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assignment {
    /// The image was loaded at this auto-fit scale.
    Assigned(ScalePercent),
    /// The slot already holds an image and must be reset first.
    Occupied,
}

/// A freshly imported frame.
#[derive(Debug, Clone)]
pub struct FrameImport {
    /// The layout the frame's name selected.
    pub layout: Layout,
    /// The frame at preview size, alpha kept, to draw over the slots.
    pub overlay: RgbaImage,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    slot: usize,
    last: (i32, i32),
}

/// An editing session.
#[derive(Debug)]
pub struct Session<G = GeometryKind> {
    store: SlotStore,
    geometry: G,
    config: CollageConfig,
    encode_options: EncodeOptions,
    font: Option<CaptionFont>,
    selected: Option<usize>,
    drag: Option<Drag>,
    status: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CollageConfig::default(), GeometryKind::default())
    }
}

impl<G: GeometryProvider> Session<G> {
    /// Start an empty session.
    #[must_use]
    pub fn new(config: CollageConfig, geometry: G) -> Self {
        Self {
            store: SlotStore::with_default_font_size(config.default_font_size),
            geometry,
            config,
            encode_options: EncodeOptions::default(),
            font: None,
            selected: None,
            drag: None,
            status: String::new(),
        }
    }

    /// Use these encoder settings for exports.
    #[must_use]
    pub fn with_encode_options(mut self, options: EncodeOptions) -> Self {
        self.encode_options = options;
        self
    }

    /// The collage state.
    #[must_use]
    pub const fn store(&self) -> &SlotStore {
        &self.store
    }

    /// The pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &CollageConfig {
        &self.config
    }

    /// The last status message.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The slot scale and reset commands act on.
    #[must_use]
    pub const fn selected_slot(&self) -> Option<usize> {
        self.selected
    }

    /// The layout being edited.
    #[must_use]
    pub const fn active_layout(&self) -> Layout {
        self.store.active_layout()
    }

    /// Use `font` for captions.
    pub fn set_font(&mut self, font: CaptionFont) {
        self.font = Some(font);
    }

    /// Load the caption font from a file.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file cannot be read and
    /// [`CollageError::InvalidFont`] if it is not a font.
    pub fn load_font(&mut self, path: &Path) -> Result<(), SessionError> {
        let result = fs::read(path)
            .and_then(|bytes| CaptionFont::from_bytes(bytes).map_err(SessionError::from));
        let font = self.report(result)?;
        tracing::info!(path = %path.display(), "caption font loaded");
        self.font = Some(font);
        Ok(())
    }

    // --- frame ---

    /// Import a frame image: its file name picks and activates the
    /// layout, the frame is bound to it and that layout's captions and
    /// font size are reset.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::Naming`] for a file name that follows no
    /// layout token, [`SessionError::Io`] or a decode error if the file
    /// is unusable. Nothing changes on error.
    pub fn import_frame(&mut self, path: &Path) -> Result<FrameImport, SessionError> {
        let result = self.try_import_frame(path);
        self.report(result)
    }

    fn try_import_frame(&mut self, path: &Path) -> Result<FrameImport, SessionError> {
        let layout = Layout::from_frame_path(path)?;
        let frame = decode(&fs::read(path)?)?;
        let overlay = frame_preview(&frame, layout.orientation().preview_size());
        self.store.import_frame(path)?;
        self.selected = None;
        self.drag = None;
        self.status = format!("frame loaded: {layout}");
        Ok(FrameImport { layout, overlay })
    }

    /// The active layout's frame at preview size, if one is bound.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] or a decode error if the bound file
    /// has become unusable.
    pub fn frame_overlay(&self) -> Result<Option<RgbaImage>, SessionError> {
        let layout = self.active_layout();
        let Some(binding) = self.store.frame(layout) else {
            return Ok(None);
        };
        let frame = decode(&fs::read(&binding.path)?)?;
        Ok(Some(frame_preview(&frame, binding.preview_size)))
    }

    // --- slots ---

    /// Load an image file into a slot of the active layout.
    ///
    /// A slot that already holds an image is left alone and
    /// [`Assignment::Occupied`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveLayout`], a slot index error, or
    /// a read / decode error. The slot is unchanged on error.
    pub fn on_image_selected(
        &mut self,
        index: usize,
        path: &Path,
    ) -> Result<Assignment, SessionError> {
        let result = self.try_assign(index, path);
        self.report(result)
    }

    fn try_assign(&mut self, index: usize, path: &Path) -> Result<Assignment, SessionError> {
        let layout = self.active()?;
        let target = self.slot_target(layout, index)?;
        if self.store.slot(layout, index)?.has_image() {
            self.status = format!("slot {index} already has an image; reset it first");
            return Ok(Assignment::Occupied);
        }
        let bytes = fs::read(path)?;
        let scale =
            self.store
                .assign_image(layout, index, &bytes, Some(path.to_path_buf()), target)?;
        self.selected = Some(index);
        self.status = format!("{} loaded into slot {index} at {scale}%", path.display());
        Ok(Assignment::Assigned(scale))
    }

    /// Begin a drag on a slot at pointer position `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveLayout`] or a slot index error.
    pub fn on_drag_started(&mut self, index: usize, x: i32, y: i32) -> Result<(), SessionError> {
        let result = self.active().and_then(|layout| {
            self.store
                .slot(layout, index)
                .map(|_| ())
                .map_err(SessionError::from)
        });
        self.report(result)?;
        self.selected = Some(index);
        self.drag = Some(Drag {
            slot: index,
            last: (x, y),
        });
        Ok(())
    }

    /// Pointer moved to `(x, y)` during a drag: the movement since the
    /// previous position is added to the slot's translation.
    ///
    /// Returns the re-rendered preview, or `None` when no drag on this
    /// slot is in progress or the slot is empty.
    ///
    /// # Errors
    ///
    /// As [`on_drag_delta`](Self::on_drag_delta).
    pub fn on_drag_moved(
        &mut self,
        index: usize,
        x: i32,
        y: i32,
    ) -> Result<Option<RgbImage>, SessionError> {
        let Some(drag) = self.drag.as_mut().filter(|drag| drag.slot == index) else {
            return Ok(None);
        };
        let dx = x.saturating_sub(drag.last.0);
        let dy = y.saturating_sub(drag.last.1);
        drag.last = (x, y);
        self.on_drag_delta(index, dx, dy)
    }

    /// End the current drag.
    pub const fn on_drag_ended(&mut self) {
        self.drag = None;
    }

    /// Move a slot's image by `(dx, dy)` preview pixels.
    ///
    /// Returns the re-rendered preview, or `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveLayout`] or a slot index error.
    pub fn on_drag_delta(
        &mut self,
        index: usize,
        dx: i32,
        dy: i32,
    ) -> Result<Option<RgbImage>, SessionError> {
        let result = self.try_drag(index, Offset::new(dx, dy));
        self.report(result)
    }

    fn try_drag(&mut self, index: usize, delta: Offset) -> Result<Option<RgbImage>, SessionError> {
        let layout = self.active()?;
        if !self.store.slot(layout, index)?.has_image() {
            return Ok(None);
        }
        self.store.accumulate_translation(layout, index, delta)?;
        self.selected = Some(index);
        self.preview(index)
    }

    /// Wheel over a slot: zoom in one percent for a positive `delta`,
    /// out for a negative one.
    ///
    /// Returns the re-rendered preview, or `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveLayout`] or a slot index error.
    pub fn on_wheel(&mut self, index: usize, delta: i32) -> Result<Option<RgbImage>, SessionError> {
        let result = self.try_wheel(index, delta);
        self.report(result)
    }

    fn try_wheel(&mut self, index: usize, delta: i32) -> Result<Option<RgbImage>, SessionError> {
        let layout = self.active()?;
        if !self.store.slot(layout, index)?.has_image() {
            return Ok(None);
        }
        let scale = self.store.adjust_scale(layout, index, delta.signum())?;
        self.selected = Some(index);
        tracing::debug!(index, %scale, "wheel zoom");
        self.preview(index)
    }

    /// Commit the scale field for the selected slot.
    ///
    /// Returns the re-rendered preview.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSlotSelected`] with nothing selected and
    /// [`CollageError::InvalidScale`] for non-numeric or non-positive
    /// input; the previous scale is kept.
    pub fn on_scale_committed(&mut self, input: &str) -> Result<Option<RgbImage>, SessionError> {
        let result = self.try_scale(input);
        self.report(result)
    }

    fn try_scale(&mut self, input: &str) -> Result<Option<RgbImage>, SessionError> {
        let index = self.selected.ok_or(SessionError::NoSlotSelected)?;
        let layout = self.active()?;
        let scale = self.store.set_scale(layout, index, input)?;
        self.status = format!("slot {index} scale set to {scale}%");
        self.preview(index)
    }

    /// Clear the selected slot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSlotSelected`] with nothing selected.
    pub fn reset_selected_slot(&mut self) -> Result<(), SessionError> {
        let result = self.try_reset_selected();
        self.report(result)
    }

    fn try_reset_selected(&mut self) -> Result<(), SessionError> {
        let index = self.selected.ok_or(SessionError::NoSlotSelected)?;
        let layout = self.active()?;
        self.store.reset_slot(layout, index)?;
        self.selected = None;
        self.drag = None;
        self.status = format!("slot {index} reset");
        Ok(())
    }

    /// Clear every slot, caption and the frame of the active layout.
    pub fn reset_all(&mut self) {
        let layout = self.active_layout();
        self.store.reset_layout(layout);
        self.selected = None;
        self.drag = None;
        self.status = format!("{layout} reset");
    }

    /// Render a slot's preview at its widget size.
    ///
    /// Returns `None` for an empty slot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveLayout`] or a slot index error.
    pub fn preview(&self, index: usize) -> Result<Option<RgbImage>, SessionError> {
        let layout = self.active()?;
        let target = self.slot_target(layout, index)?;
        let slot = self.store.slot(layout, index)?;
        Ok(render_preview(slot, target, &self.config))
    }

    // --- captions ---

    /// Commit the font size field.
    ///
    /// Returns the point size set on the caption labels, compensated for
    /// the display DPI.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::InvalidFontSize`] unless the input is a
    /// whole number from 1 to [`FontSize::MAX`]; the previous size is
    /// kept.
    pub fn on_font_size_committed(&mut self, input: &str) -> Result<FontSize, SessionError> {
        let result = self.try_font_size(input);
        self.report(result)
    }

    fn try_font_size(&mut self, input: &str) -> Result<FontSize, SessionError> {
        let layout = self.active()?;
        let size = FontSize::parse(input)?;
        let label = size.for_display(self.config.display_dpi);
        self.store.set_font_size(layout, label);
        self.status = format!("font size set to {size}");
        Ok(label)
    }

    /// Commit the caption text field.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveLayout`] before a frame is imported.
    pub fn on_caption_text(&mut self, text: &str) -> Result<(), SessionError> {
        let result = self.active();
        let layout = self.report(result)?;
        self.store.apply_caption_text(layout, text);
        Ok(())
    }

    // --- export ---

    /// Composite the active layout at print resolution, encode it in the
    /// format named by `path`'s extension and write it there.
    ///
    /// A bound frame that can no longer be read is logged and left out.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveLayout`], an extension or encode
    /// error, or [`SessionError::Io`] if the file cannot be written.
    pub fn on_export_requested(&mut self, path: &Path) -> Result<ExportSummary, SessionError> {
        let result = self.try_export(path);
        self.report(result)
    }

    fn try_export(&mut self, path: &Path) -> Result<ExportSummary, SessionError> {
        let layout = self.active()?;
        let format = RasterFormat::from_path(path)?;

        let frame_bytes = self.store.frame(layout).and_then(|binding| {
            fs::read(&binding.path)
                .inspect_err(|err| tracing::warn!(%err, "frame unreadable"))
                .ok()
        });
        let assets = ExportAssets {
            frame: frame_bytes.as_deref(),
            font: self.font.as_ref(),
        };
        let composition = export(&self.store, layout, &self.geometry, assets, &self.config);
        let bytes = encode(&composition.image, format, self.encode_options)?;
        fs::write(path, &bytes)?;

        let Dimensions { width, height } = composition.summary.size;
        tracing::info!(
            path = %path.display(),
            %format,
            width,
            height,
            bytes = bytes.len(),
            "export written",
        );
        self.status = format!("saved {} ({width}x{height})", path.display());
        Ok(composition.summary)
    }

    // --- helpers ---

    fn active(&self) -> Result<Layout, SessionError> {
        match self.store.active_layout() {
            Layout::Blank => Err(SessionError::NoActiveLayout),
            layout => Ok(layout),
        }
    }

    fn slot_target(&self, layout: Layout, index: usize) -> Result<Dimensions, SessionError> {
        self.geometry
            .slot_rect(layout, index)
            .map(PixelRect::size)
            .ok_or(SessionError::Collage(CollageError::SlotOutOfRange {
                layout,
                index,
            }))
    }

    fn report<T>(&mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        if let Err(err) = &result {
            tracing::warn!(%err, "command rejected");
            self.status = err.to_string();
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn commands_need_a_frame_first() {
        let mut session = Session::default();
        assert!(matches!(
            session.on_caption_text("hi"),
            Err(SessionError::NoActiveLayout)
        ));
        assert_eq!(session.status(), "import a frame first");
        assert!(matches!(
            session.on_image_selected(0, Path::new("a.png")),
            Err(SessionError::NoActiveLayout)
        ));
    }

    #[test]
    fn bad_frame_name_is_reported() {
        let mut session = Session::default();
        let err = session.import_frame(Path::new("random.png")).unwrap_err();
        assert!(matches!(err, SessionError::Collage(CollageError::Naming { .. })));
        assert!(session.status().contains("naming convention"));
        assert_eq!(session.active_layout(), Layout::Blank);
    }

    #[test]
    fn scale_commit_without_selection_is_rejected() {
        let mut session = Session::default();
        assert!(matches!(
            session.on_scale_committed("50"),
            Err(SessionError::NoSlotSelected)
        ));
        assert!(matches!(
            session.reset_selected_slot(),
            Err(SessionError::NoSlotSelected)
        ));
        assert_eq!(session.status(), "select a slot first");
    }

    #[test]
    fn drag_moves_without_a_drag_do_nothing() {
        let mut session = Session::default();
        assert!(session.on_drag_moved(0, 10, 10).unwrap().is_none());
    }
}
