//! Per-layout slot, caption, font and frame state.
//!
//! [`SlotStore`] keeps an independent table for every [`Layout`], keyed
//! by `(layout, index)`, so switching the active layout never discards
//! another layout's work. Every mutating method validates its input
//! first and only then writes; an `Err` always means nothing changed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::decode::decode_rgb;
use crate::layout::Layout;
use crate::types::{CollageError, Dimensions, FontSize, Offset, RgbImage, ScalePercent};

/// One photo slot.
#[derive(Debug, Clone, Default)]
pub struct Slot {
    image: Option<RgbImage>,
    source_path: Option<PathBuf>,
    scale: ScalePercent,
    translation: Option<Offset>,
}

impl Slot {
    /// The decoded source image, if one has been assigned.
    #[must_use]
    pub const fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    /// Where the source image was loaded from, if known.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Current zoom.
    #[must_use]
    pub const fn scale(&self) -> ScalePercent {
        self.scale
    }

    /// Accumulated drag offset; `None` means default top-left placement.
    #[must_use]
    pub const fn translation(&self) -> Option<Offset> {
        self.translation
    }

    /// Returns `true` if the slot holds an image.
    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Replace the image wholesale and drop the translation.
    pub fn set_image(&mut self, image: RgbImage, source_path: Option<PathBuf>) {
        self.image = Some(image);
        self.source_path = source_path;
        self.translation = None;
    }

    /// Set the zoom and re-anchor at the top-left.
    pub fn set_scale(&mut self, scale: ScalePercent) {
        self.scale = scale;
        self.translation = None;
    }

    /// Add `delta` to the translation, starting from zero if absent.
    pub fn translate(&mut self, delta: Offset) -> Offset {
        let next = self.translation.unwrap_or_default().saturating_add(delta);
        self.translation = Some(next);
        next
    }

    /// Back to the empty state: no image, no path, no translation, 100%.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The frame bound to a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBinding {
    /// Frame image file.
    pub path: PathBuf,
    /// Preview size of the frame widget for the layout's orientation.
    pub preview_size: Dimensions,
}

/// All editable collage state.
#[derive(Debug, Clone)]
pub struct SlotStore {
    active: Layout,
    slots: BTreeMap<Layout, Vec<Slot>>,
    captions: BTreeMap<Layout, Vec<String>>,
    font_sizes: BTreeMap<Layout, FontSize>,
    frames: BTreeMap<Layout, FrameBinding>,
    default_font_size: FontSize,
}

impl Default for SlotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotStore {
    /// Empty store with [`Layout::Blank`] active.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_font_size(FontSize::DEFAULT)
    }

    /// Empty store whose captions reset to `default_font_size`.
    #[must_use]
    pub fn with_default_font_size(default_font_size: FontSize) -> Self {
        let slots = Layout::ALL
            .into_iter()
            .map(|layout| (layout, vec![Slot::default(); layout.slot_count()]))
            .collect();
        let captions = Layout::ALL
            .into_iter()
            .map(|layout| (layout, vec![String::new(); layout.caption_count()]))
            .collect();
        let font_sizes = Layout::ALL
            .into_iter()
            .map(|layout| (layout, default_font_size))
            .collect();
        Self {
            active: Layout::Blank,
            slots,
            captions,
            font_sizes,
            frames: BTreeMap::new(),
            default_font_size,
        }
    }

    // --- layouts and frames ---

    /// The layout currently being edited.
    #[must_use]
    pub const fn active_layout(&self) -> Layout {
        self.active
    }

    /// Make `layout` the active one. Other layouts keep their state.
    pub fn activate(&mut self, layout: Layout) {
        if self.active != layout {
            tracing::debug!(from = %self.active, to = %layout, "switching layout");
        }
        self.active = layout;
    }

    /// Pick the layout named by a frame file name and activate it.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::Naming`] if the name matches no layout
    /// token; the active layout is unchanged.
    pub fn select_layout(&mut self, file_name: &str) -> Result<Layout, CollageError> {
        let layout = Layout::from_frame_name(file_name)?;
        self.activate(layout);
        Ok(layout)
    }

    /// Import a frame: activate the layout its file name selects, bind
    /// the frame to it and reset that layout's captions and font size.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::Naming`] if the file name matches no
    /// layout token; nothing changes.
    pub fn import_frame(&mut self, path: &Path) -> Result<Layout, CollageError> {
        let layout = Layout::from_frame_path(path)?;
        self.activate(layout);
        self.bind_frame(layout, path.to_path_buf());
        self.reset_captions(layout);
        tracing::info!(%layout, path = %path.display(), "frame imported");
        Ok(layout)
    }

    /// Bind a frame file to a layout, replacing any previous binding.
    pub fn bind_frame(&mut self, layout: Layout, path: PathBuf) {
        let preview_size = layout.orientation().preview_size();
        self.frames
            .insert(layout, FrameBinding { path, preview_size });
    }

    /// The frame bound to a layout.
    #[must_use]
    pub fn frame(&self, layout: Layout) -> Option<&FrameBinding> {
        self.frames.get(&layout)
    }

    // --- slots ---

    /// All slots of a layout, in ordinal order.
    #[must_use]
    pub fn slots(&self, layout: Layout) -> &[Slot] {
        self.slots.get(&layout).map_or(&[], Vec::as_slice)
    }

    /// One slot.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::SlotOutOfRange`] if the layout has no slot
    /// `index`.
    pub fn slot(&self, layout: Layout, index: usize) -> Result<&Slot, CollageError> {
        self.slots
            .get(&layout)
            .and_then(|slots| slots.get(index))
            .ok_or(CollageError::SlotOutOfRange { layout, index })
    }

    fn slot_mut(&mut self, layout: Layout, index: usize) -> Result<&mut Slot, CollageError> {
        self.slots
            .get_mut(&layout)
            .and_then(|slots| slots.get_mut(index))
            .ok_or(CollageError::SlotOutOfRange { layout, index })
    }

    /// Decode `bytes` into a slot, auto-fitting it to `target`.
    ///
    /// Returns the auto-fit scale. The translation is reset.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::SlotOutOfRange`] for a bad index and
    /// [`CollageError::EmptyInput`] / [`CollageError::ImageDecode`] when
    /// the bytes are not a decodable image. The slot is untouched on
    /// error.
    pub fn assign_image(
        &mut self,
        layout: Layout,
        index: usize,
        bytes: &[u8],
        source_path: Option<PathBuf>,
        target: Dimensions,
    ) -> Result<ScalePercent, CollageError> {
        self.slot(layout, index)?;
        let image = decode_rgb(bytes)?;
        self.assign_decoded(layout, index, image, source_path, target)
    }

    /// Like [`assign_image`](Self::assign_image) for an already decoded
    /// image.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::SlotOutOfRange`] for a bad index.
    pub fn assign_decoded(
        &mut self,
        layout: Layout,
        index: usize,
        image: RgbImage,
        source_path: Option<PathBuf>,
        target: Dimensions,
    ) -> Result<ScalePercent, CollageError> {
        let slot = self.slot_mut(layout, index)?;
        let scale = ScalePercent::auto_fit(Dimensions::of(&image), target);
        tracing::debug!(
            %layout,
            index,
            width = image.width(),
            height = image.height(),
            %scale,
            "image assigned",
        );
        slot.set_image(image, source_path);
        slot.scale = scale;
        Ok(scale)
    }

    /// Set a slot's scale from free-text input. Re-anchors the image at
    /// the top-left.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::SlotOutOfRange`] for a bad index and
    /// [`CollageError::InvalidScale`] for non-numeric or non-positive
    /// input; the previous scale is kept.
    pub fn set_scale(
        &mut self,
        layout: Layout,
        index: usize,
        input: &str,
    ) -> Result<ScalePercent, CollageError> {
        self.slot(layout, index)?;
        let scale = ScalePercent::parse(input).inspect_err(|err| {
            tracing::debug!(%layout, index, %err, "scale rejected");
        })?;
        self.slot_mut(layout, index)?.set_scale(scale);
        Ok(scale)
    }

    /// Step a slot's scale by one percent in the sign of `direction`,
    /// never going below [`ScalePercent::STEP_FLOOR`]. The translation
    /// is kept.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::SlotOutOfRange`] for a bad index.
    pub fn adjust_scale(
        &mut self,
        layout: Layout,
        index: usize,
        direction: i32,
    ) -> Result<ScalePercent, CollageError> {
        let slot = self.slot_mut(layout, index)?;
        slot.scale = slot.scale.stepped(direction);
        Ok(slot.scale)
    }

    /// Add a drag delta to a slot's translation.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::SlotOutOfRange`] for a bad index.
    pub fn accumulate_translation(
        &mut self,
        layout: Layout,
        index: usize,
        delta: Offset,
    ) -> Result<Offset, CollageError> {
        Ok(self.slot_mut(layout, index)?.translate(delta))
    }

    /// Clear one slot.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::SlotOutOfRange`] for a bad index.
    pub fn reset_slot(&mut self, layout: Layout, index: usize) -> Result<(), CollageError> {
        self.slot_mut(layout, index)?.clear();
        tracing::debug!(%layout, index, "slot reset");
        Ok(())
    }

    /// Clear every slot and caption of a layout, restore its font size
    /// and unbind its frame.
    pub fn reset_layout(&mut self, layout: Layout) {
        if let Some(slots) = self.slots.get_mut(&layout) {
            slots.iter_mut().for_each(Slot::clear);
        }
        self.reset_captions(layout);
        self.frames.remove(&layout);
        tracing::debug!(%layout, "layout reset");
    }

    // --- captions and fonts ---

    /// All captions of a layout.
    #[must_use]
    pub fn captions(&self, layout: Layout) -> &[String] {
        self.captions.get(&layout).map_or(&[], Vec::as_slice)
    }

    /// One caption.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::CaptionOutOfRange`] if the layout has no
    /// caption `index`.
    pub fn caption(&self, layout: Layout, index: usize) -> Result<&str, CollageError> {
        self.captions
            .get(&layout)
            .and_then(|captions| captions.get(index))
            .map(String::as_str)
            .ok_or(CollageError::CaptionOutOfRange { layout, index })
    }

    /// Replace one caption's text.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::CaptionOutOfRange`] if the layout has no
    /// caption `index`.
    pub fn set_caption(
        &mut self,
        layout: Layout,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), CollageError> {
        let caption = self
            .captions
            .get_mut(&layout)
            .and_then(|captions| captions.get_mut(index))
            .ok_or(CollageError::CaptionOutOfRange { layout, index })?;
        *caption = text.into();
        Ok(())
    }

    /// Distribute the caption text field over a layout's captions.
    ///
    /// Landscape layouts take one line per caption column; columns
    /// without a line are cleared and extra lines are ignored. Portrait
    /// layouts put the whole text in their single caption.
    pub fn apply_caption_text(&mut self, layout: Layout, text: &str) {
        let Some(captions) = self.captions.get_mut(&layout) else {
            return;
        };
        match captions.as_mut_slice() {
            [] => {}
            [only] => text.clone_into(only),
            many => {
                let mut lines = text.split('\n');
                for caption in many {
                    lines.next().unwrap_or_default().clone_into(caption);
                }
            }
        }
    }

    /// Caption point size of a layout.
    #[must_use]
    pub fn font_size(&self, layout: Layout) -> FontSize {
        self.font_sizes
            .get(&layout)
            .copied()
            .unwrap_or(self.default_font_size)
    }

    /// Set a layout's caption point size.
    pub fn set_font_size(&mut self, layout: Layout, size: FontSize) {
        self.font_sizes.insert(layout, size);
    }

    fn reset_captions(&mut self, layout: Layout) {
        if let Some(captions) = self.captions.get_mut(&layout) {
            captions.iter_mut().for_each(String::clear);
        }
        self.font_sizes.insert(layout, self.default_font_size);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use image::{ImageEncoder, Rgb, codecs::png::PngEncoder};

    use super::*;

    const TARGET: Dimensions = Dimensions::new(400, 300);

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([40, 80, 120]));
        let mut buf = Vec::new();
        PngEncoder::new(Cursor::new(&mut buf))
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        buf
    }

    fn filled_store() -> SlotStore {
        let mut store = SlotStore::new();
        store.activate(Layout::FourHorizontal);
        store
            .assign_decoded(
                Layout::FourHorizontal,
                0,
                RgbImage::new(2000, 1000),
                None,
                TARGET,
            )
            .unwrap();
        store
    }

    #[test]
    fn assign_auto_fits_and_resets_translation() {
        let mut store = filled_store();
        assert_eq!(store.slot(Layout::FourHorizontal, 0).unwrap().scale().get(), 20.0);

        store
            .accumulate_translation(Layout::FourHorizontal, 0, Offset::new(5, 5))
            .unwrap();
        let scale = store
            .assign_image(
                Layout::FourHorizontal,
                0,
                &png_bytes(100, 50),
                Some(PathBuf::from("a.png")),
                TARGET,
            )
            .unwrap();
        assert_eq!(scale.get(), 100.0);
        let slot = store.slot(Layout::FourHorizontal, 0).unwrap();
        assert_eq!(slot.translation(), None);
        assert_eq!(slot.source_path(), Some(Path::new("a.png")));
        assert_eq!(slot.image().unwrap().dimensions(), (100, 50));
    }

    #[test]
    fn undecodable_bytes_leave_the_slot_alone() {
        let mut store = filled_store();
        let err = store
            .assign_image(Layout::FourHorizontal, 0, b"not an image", None, TARGET)
            .unwrap_err();
        assert!(matches!(err, CollageError::ImageDecode(_)));
        let err = store
            .assign_image(Layout::FourHorizontal, 0, &[], None, TARGET)
            .unwrap_err();
        assert!(matches!(err, CollageError::EmptyInput));
        let slot = store.slot(Layout::FourHorizontal, 0).unwrap();
        assert_eq!(slot.image().unwrap().dimensions(), (2000, 1000));
    }

    #[test]
    fn out_of_range_slot_is_rejected_before_decoding() {
        let mut store = SlotStore::new();
        let err = store
            .assign_image(Layout::TwoVertical, 2, b"garbage", None, TARGET)
            .unwrap_err();
        assert!(matches!(
            err,
            CollageError::SlotOutOfRange {
                layout: Layout::TwoVertical,
                index: 2
            }
        ));
    }

    #[test]
    fn invalid_scale_keeps_prior_value() {
        let mut store = filled_store();
        store
            .accumulate_translation(Layout::FourHorizontal, 0, Offset::new(3, 4))
            .unwrap();
        for input in ["-5", "abc", "0"] {
            assert!(store.set_scale(Layout::FourHorizontal, 0, input).is_err());
            let slot = store.slot(Layout::FourHorizontal, 0).unwrap();
            assert_eq!(slot.scale().get(), 20.0);
            assert_eq!(slot.translation(), Some(Offset::new(3, 4)));
        }
    }

    #[test]
    fn valid_scale_re_anchors() {
        let mut store = filled_store();
        store
            .accumulate_translation(Layout::FourHorizontal, 0, Offset::new(3, 4))
            .unwrap();
        let scale = store.set_scale(Layout::FourHorizontal, 0, "35").unwrap();
        assert_eq!(scale.get(), 35.0);
        assert_eq!(store.slot(Layout::FourHorizontal, 0).unwrap().translation(), None);
    }

    #[test]
    fn adjust_scale_floors_at_one() {
        let mut store = filled_store();
        store.set_scale(Layout::FourHorizontal, 0, "1").unwrap();
        let scale = store.adjust_scale(Layout::FourHorizontal, 0, -1).unwrap();
        assert_eq!(scale.get(), 1.0);
        let scale = store.adjust_scale(Layout::FourHorizontal, 0, 3).unwrap();
        assert_eq!(scale.get(), 2.0);
    }

    #[test]
    fn translation_accumulates() {
        let mut store = filled_store();
        store
            .accumulate_translation(Layout::FourHorizontal, 0, Offset::new(3, -2))
            .unwrap();
        let total = store
            .accumulate_translation(Layout::FourHorizontal, 0, Offset::new(-10, 7))
            .unwrap();
        assert_eq!(total, Offset::new(-7, 5));
    }

    #[test]
    fn reset_slot_restores_defaults() {
        let mut store = filled_store();
        store
            .accumulate_translation(Layout::FourHorizontal, 0, Offset::new(1, 1))
            .unwrap();
        store.reset_slot(Layout::FourHorizontal, 0).unwrap();
        let slot = store.slot(Layout::FourHorizontal, 0).unwrap();
        assert_eq!(slot.scale().to_string(), "100");
        assert_eq!(slot.translation(), None);
        assert!(!slot.has_image());
        assert_eq!(slot.source_path(), None);
    }

    #[test]
    fn layouts_keep_independent_state() {
        let mut store = filled_store();
        store
            .assign_decoded(Layout::TwoVertical, 1, RgbImage::new(10, 10), None, TARGET)
            .unwrap();
        store.activate(Layout::TwoVertical);
        store.reset_layout(Layout::TwoVertical);
        assert!(!store.slot(Layout::TwoVertical, 1).unwrap().has_image());
        assert!(store.slot(Layout::FourHorizontal, 0).unwrap().has_image());
    }

    #[test]
    fn reset_layout_clears_captions_font_and_frame() {
        let mut store = SlotStore::new();
        store
            .import_frame(Path::new("frames/x_6_vertical.png"))
            .unwrap();
        store.apply_caption_text(Layout::SixVertical, "hello");
        store.set_font_size(Layout::SixVertical, FontSize::new(30).unwrap());
        store.reset_layout(Layout::SixVertical);
        assert_eq!(store.captions(Layout::SixVertical), [String::new()]);
        assert_eq!(store.font_size(Layout::SixVertical), FontSize::DEFAULT);
        assert!(store.frame(Layout::SixVertical).is_none());
    }

    #[test]
    fn import_frame_binds_and_activates() {
        let mut store = SlotStore::new();
        store.set_font_size(Layout::NineHorizontal, FontSize::new(40).unwrap());
        store.apply_caption_text(Layout::NineHorizontal, "a\nb");
        let layout = store
            .import_frame(Path::new("/tmp/spring_9_가로.png"))
            .unwrap();
        assert_eq!(layout, Layout::NineHorizontal);
        assert_eq!(store.active_layout(), Layout::NineHorizontal);
        let frame = store.frame(layout).unwrap();
        assert_eq!(frame.preview_size, Dimensions::new(719, 483));
        assert_eq!(store.font_size(layout), FontSize::DEFAULT);
        assert!(store.captions(layout).iter().all(String::is_empty));
    }

    #[test]
    fn bad_frame_name_changes_nothing() {
        let mut store = SlotStore::new();
        store.activate(Layout::TwoHorizontal);
        assert!(store.import_frame(Path::new("random.png")).is_err());
        assert!(store.select_layout("random.png").is_err());
        assert_eq!(store.active_layout(), Layout::TwoHorizontal);
        assert!(store.frame(Layout::TwoHorizontal).is_none());
    }

    #[test]
    fn caption_text_splits_on_landscape_pages() {
        let mut store = SlotStore::new();
        store.apply_caption_text(Layout::FourHorizontal, "one\ntwo\nthree\nfour");
        assert_eq!(store.captions(Layout::FourHorizontal), ["one", "two", "three"]);
        store.apply_caption_text(Layout::FourHorizontal, "solo");
        assert_eq!(store.captions(Layout::FourHorizontal), ["solo", "", ""]);
    }

    #[test]
    fn caption_text_is_whole_on_portrait_pages() {
        let mut store = SlotStore::new();
        store.apply_caption_text(Layout::TwoVertical, "line 1\nline 2");
        assert_eq!(store.caption(Layout::TwoVertical, 0).unwrap(), "line 1\nline 2");
        assert!(store.caption(Layout::TwoVertical, 1).is_err());
    }

    #[test]
    fn blank_layout_has_nothing() {
        let mut store = SlotStore::new();
        assert!(store.slots(Layout::Blank).is_empty());
        store.apply_caption_text(Layout::Blank, "ignored");
        assert!(store.captions(Layout::Blank).is_empty());
    }
}
