//! Tunable parameters shared by the preview and export compositors.

use serde::{Deserialize, Serialize};

use crate::types::FontSize;

/// Logical DPI that point sizes and screen ratios are expressed against.
pub const REFERENCE_DPI: f64 = 96.0;

/// Centimetres per inch, for physical print sizes.
pub const CM_PER_INCH: f64 = 2.54;

/// Configuration for the compositing pipeline.
///
/// Every field has a default, so a partial JSON document deserializes
/// into a complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollageConfig {
    /// Export resolution in dots per inch.
    pub target_dpi: f64,

    /// Logical DPI of the screen the preview is shown on. Used to make
    /// exported caption text match what the user saw.
    pub display_dpi: f64,

    /// Physical length of the print's short side in centimetres.
    pub short_side_cm: f64,

    /// Physical length of the print's long side in centimetres.
    pub long_side_cm: f64,

    /// Horizontal shear applied to caption glyphs to italicize them.
    pub shear: f32,

    /// Fill color of blank canvases.
    pub background: [u8; 3],

    /// Color of the centre guide lines drawn over slot previews.
    pub guide_color: [u8; 3],

    /// Caption text color.
    pub text_color: [u8; 3],

    /// Caption point size after a reset or a frame import.
    pub default_font_size: FontSize,
}

impl CollageConfig {
    /// Default export resolution.
    pub const DEFAULT_TARGET_DPI: f64 = 1200.0;

    /// Default screen DPI.
    pub const DEFAULT_DISPLAY_DPI: f64 = REFERENCE_DPI;

    /// Default italic shear factor.
    pub const DEFAULT_SHEAR: f32 = 0.3;

    /// White.
    pub const DEFAULT_BACKGROUND: [u8; 3] = [255, 255, 255];

    /// Red.
    pub const DEFAULT_GUIDE_COLOR: [u8; 3] = [255, 0, 0];

    /// Black.
    pub const DEFAULT_TEXT_COLOR: [u8; 3] = [0, 0, 0];
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            target_dpi: Self::DEFAULT_TARGET_DPI,
            display_dpi: Self::DEFAULT_DISPLAY_DPI,
            short_side_cm: 10.0,
            long_side_cm: 15.0,
            shear: Self::DEFAULT_SHEAR,
            background: Self::DEFAULT_BACKGROUND,
            guide_color: Self::DEFAULT_GUIDE_COLOR,
            text_color: Self::DEFAULT_TEXT_COLOR,
            default_font_size: FontSize::DEFAULT,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: CollageConfig = serde_json::from_str(r#"{"target_dpi": 300.0}"#).unwrap();
        assert_eq!(config.target_dpi, 300.0);
        assert_eq!(config.display_dpi, 96.0);
        assert_eq!(config.default_font_size, FontSize::DEFAULT);
        assert_eq!(config.background, [255, 255, 255]);
    }

    #[test]
    fn round_trips_through_json() {
        let config = CollageConfig {
            shear: 0.1,
            guide_color: [0, 128, 255],
            ..CollageConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: CollageConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn zero_font_size_is_rejected() {
        let result = serde_json::from_str::<CollageConfig>(r#"{"default_font_size": 0}"#);
        assert!(result.is_err());
    }
}
