//! The fixed frame templates and the file naming convention that selects
//! them.
//!
//! A frame image's file name must contain a token such as `4_horizontal`
//! (or its localized form `4_가로`). The first matching token, checked in
//! table order, decides the layout.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{CM_PER_INCH, CollageConfig};
use crate::types::{CollageError, Dimensions};

/// Preview length of the print's long side, in screen pixels.
pub const PREVIEW_LONG_PX: u32 = 719;

/// Preview length of the print's short side, in screen pixels.
pub const PREVIEW_SHORT_PX: u32 = 483;

/// Page orientation of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Landscape, 15:10.
    Horizontal,
    /// Portrait, 10:15.
    Vertical,
}

impl Orientation {
    /// Fixed size of the preview frame widget.
    #[must_use]
    pub const fn preview_size(self) -> Dimensions {
        match self {
            Self::Horizontal => Dimensions::new(PREVIEW_LONG_PX, PREVIEW_SHORT_PX),
            Self::Vertical => Dimensions::new(PREVIEW_SHORT_PX, PREVIEW_LONG_PX),
        }
    }

    /// Size of the export raster: the physical print size at
    /// `config.target_dpi`, `round(cm / 2.54 * dpi)` per axis.
    #[must_use]
    pub fn export_size(self, config: &CollageConfig) -> Dimensions {
        let long = cm_to_px(config.long_side_cm, config.target_dpi);
        let short = cm_to_px(config.short_side_cm, config.target_dpi);
        match self {
            Self::Horizontal => Dimensions::new(long, short),
            Self::Vertical => Dimensions::new(short, long),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cm_to_px(cm: f64, dpi: f64) -> u32 {
    let px = (cm / CM_PER_INCH * dpi).round();
    if px.is_finite() && px >= 1.0 {
        px.min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

/// One of the fixed frame templates.
///
/// [`Blank`](Self::Blank) is the "no frame imported yet" state: it has no
/// slots and no captions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// No frame selected.
    #[default]
    Blank,
    /// Two photos, landscape.
    TwoHorizontal,
    /// Two photos, portrait.
    TwoVertical,
    /// Four photos, landscape.
    FourHorizontal,
    /// Four photos, portrait.
    FourVertical,
    /// Six photos, landscape.
    SixHorizontal,
    /// Six photos, portrait.
    SixVertical,
    /// Nine photos, landscape.
    NineHorizontal,
    /// Nine photos, portrait.
    NineVertical,
}

impl Layout {
    /// Every layout, in index order.
    pub const ALL: [Self; 9] = [
        Self::Blank,
        Self::TwoHorizontal,
        Self::TwoVertical,
        Self::FourHorizontal,
        Self::FourVertical,
        Self::SixHorizontal,
        Self::SixVertical,
        Self::NineHorizontal,
        Self::NineVertical,
    ];

    /// Numeric index: 0 for [`Blank`](Self::Blank), 1..=8 for the templates.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`index`](Self::index).
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Number of photo slots.
    #[must_use]
    pub const fn slot_count(self) -> usize {
        match self {
            Self::Blank => 0,
            Self::TwoHorizontal | Self::TwoVertical => 2,
            Self::FourHorizontal | Self::FourVertical => 4,
            Self::SixHorizontal | Self::SixVertical => 6,
            Self::NineHorizontal | Self::NineVertical => 9,
        }
    }

    /// Page orientation. [`Blank`](Self::Blank) counts as horizontal.
    #[must_use]
    pub const fn orientation(self) -> Orientation {
        match self {
            Self::Blank
            | Self::TwoHorizontal
            | Self::FourHorizontal
            | Self::SixHorizontal
            | Self::NineHorizontal => Orientation::Horizontal,
            Self::TwoVertical | Self::FourVertical | Self::SixVertical | Self::NineVertical => {
                Orientation::Vertical
            }
        }
    }

    /// Number of captions: three stacked-glyph columns on landscape
    /// pages, one line-based caption on portrait pages.
    #[must_use]
    pub const fn caption_count(self) -> usize {
        match (self, self.orientation()) {
            (Self::Blank, _) => 0,
            (_, Orientation::Horizontal) => 3,
            (_, Orientation::Vertical) => 1,
        }
    }

    /// File name tokens that select this layout.
    #[must_use]
    pub const fn tokens(self) -> &'static [&'static str] {
        match self {
            Self::Blank => &[],
            Self::TwoHorizontal => &["2_horizontal", "2_가로"],
            Self::TwoVertical => &["2_vertical", "2_세로"],
            Self::FourHorizontal => &["4_horizontal", "4_가로"],
            Self::FourVertical => &["4_vertical", "4_세로"],
            Self::SixHorizontal => &["6_horizontal", "6_가로"],
            Self::SixVertical => &["6_vertical", "6_세로"],
            Self::NineHorizontal => &["9_horizontal", "9_가로"],
            Self::NineVertical => &["9_vertical", "9_세로"],
        }
    }

    /// Pick the layout whose token appears in a frame file name.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::Naming`] if no token matches.
    pub fn from_frame_name(file_name: &str) -> Result<Self, CollageError> {
        Self::ALL
            .into_iter()
            .find(|layout| layout.tokens().iter().any(|t| file_name.contains(t)))
            .ok_or_else(|| CollageError::Naming {
                file_name: file_name.to_owned(),
            })
    }

    /// Like [`from_frame_name`](Self::from_frame_name), looking only at
    /// the final path component so directory names never match.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::Naming`] if the path has no file name or
    /// the file name matches no token.
    pub fn from_frame_path(path: &Path) -> Result<Self, CollageError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_frame_name(&file_name)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tokens().first() {
            Some(token) => f.write_str(token),
            None => f.write_str("blank"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn naming_convention_selects_layouts() {
        let four = Layout::from_frame_name("event_4_horizontal.png").unwrap();
        assert_eq!(four, Layout::FourHorizontal);
        assert_eq!(four.index(), 3);

        let nine = Layout::from_frame_name("x_9_vertical.jpg").unwrap();
        assert_eq!(nine, Layout::NineVertical);
        assert_eq!(nine.index(), 8);
    }

    #[test]
    fn localized_tokens_match() {
        assert_eq!(
            Layout::from_frame_name("봄_6_가로.png").unwrap(),
            Layout::SixHorizontal
        );
        assert_eq!(
            Layout::from_frame_name("2_세로_frame.png").unwrap(),
            Layout::TwoVertical
        );
    }

    #[test]
    fn unmatched_name_is_a_naming_error() {
        let err = Layout::from_frame_name("random.png").unwrap_err();
        assert!(matches!(err, CollageError::Naming { ref file_name } if file_name == "random.png"));
    }

    #[test]
    fn directories_do_not_count() {
        let path = Path::new("/frames/4_horizontal/random.png");
        assert!(Layout::from_frame_path(path).is_err());
        let path = Path::new("/frames/misc/a_2_vertical.png");
        assert_eq!(Layout::from_frame_path(path).unwrap(), Layout::TwoVertical);
    }

    #[test]
    fn index_round_trips() {
        for layout in Layout::ALL {
            assert_eq!(Layout::from_index(layout.index()), Some(layout));
        }
        assert_eq!(Layout::from_index(9), None);
    }

    #[test]
    fn slot_and_caption_counts() {
        assert_eq!(Layout::Blank.slot_count(), 0);
        assert_eq!(Layout::Blank.caption_count(), 0);
        assert_eq!(Layout::SixVertical.slot_count(), 6);
        assert_eq!(Layout::SixVertical.caption_count(), 1);
        assert_eq!(Layout::NineHorizontal.caption_count(), 3);
    }

    #[test]
    fn preview_and_export_sizes() {
        let config = CollageConfig::default();
        assert_eq!(
            Orientation::Horizontal.preview_size(),
            Dimensions::new(719, 483)
        );
        assert_eq!(
            Orientation::Vertical.preview_size(),
            Dimensions::new(483, 719)
        );
        // 15cm @ 1200dpi = 7086.6 -> 7087; 10cm = 4724.4 -> 4724.
        assert_eq!(
            Orientation::Horizontal.export_size(&config),
            Dimensions::new(7087, 4724)
        );
        assert_eq!(
            Orientation::Vertical.export_size(&config),
            Dimensions::new(4724, 7087)
        );
    }

    #[test]
    fn display_uses_primary_token() {
        assert_eq!(Layout::FourVertical.to_string(), "4_vertical");
        assert_eq!(Layout::Blank.to_string(), "blank");
    }
}
