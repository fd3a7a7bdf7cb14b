//! JSON project descriptions replayed through a [`Session`].
//!
//! A project names a frame, optionally a caption font, size and text,
//! and the photo for each slot with optional scale and drag offset. It
//! is applied exactly as a user would: import the frame, set the font,
//! type the captions, pick each photo, commit its scale, then drag it.

use std::path::{Path, PathBuf};

use cutframe_pipeline::{GeometryProvider, Layout};
use serde::{Deserialize, Serialize};

use crate::fs;
use crate::session::{Assignment, Session, SessionError};

/// One slot entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotSpec {
    /// Photo file.
    pub image: PathBuf,
    /// Scale field text, e.g. `"35"`. Auto-fit when absent.
    #[serde(default)]
    pub scale: Option<String>,
    /// Drag offset `[dx, dy]` in preview pixels.
    #[serde(default)]
    pub offset: Option<[i32; 2]>,
}

/// A collage description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Frame image; its file name selects the layout.
    pub frame: PathBuf,
    /// Caption font file.
    #[serde(default)]
    pub font: Option<PathBuf>,
    /// Font size field text, e.g. `"12"`.
    #[serde(default)]
    pub font_size: Option<String>,
    /// Caption text field.
    #[serde(default)]
    pub captions: Option<String>,
    /// Slots in ordinal order; `null` leaves a slot empty.
    #[serde(default)]
    pub slots: Vec<Option<SlotSpec>>,
}

impl Project {
    /// Parse a project from JSON text. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Project`] for malformed JSON.
    pub fn from_json(text: &str, path: &Path) -> Result<Self, SessionError> {
        serde_json::from_str(text).map_err(|source| SessionError::Project {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a project file.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file cannot be read and
    /// [`SessionError::Project`] for malformed JSON.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let bytes = fs::read(path)?;
        Self::from_json(&String::from_utf8_lossy(&bytes), path)
    }

    /// Apply the project to `session`. Relative paths resolve against
    /// `base`.
    ///
    /// # Errors
    ///
    /// Stops at the first failing step and returns its error.
    pub fn replay<G: GeometryProvider>(
        &self,
        session: &mut Session<G>,
        base: &Path,
    ) -> Result<Layout, SessionError> {
        let layout = session.import_frame(&fs::resolve(base, &self.frame))?.layout;
        if let Some(font) = &self.font {
            session.load_font(&fs::resolve(base, font))?;
        }
        if let Some(size) = &self.font_size {
            session.on_font_size_committed(size)?;
        }
        if let Some(text) = &self.captions {
            session.on_caption_text(text)?;
        }
        for (index, spec) in self.slots.iter().enumerate() {
            let Some(spec) = spec else { continue };
            let image = fs::resolve(base, &spec.image);
            if session.on_image_selected(index, &image)? == Assignment::Occupied {
                tracing::warn!(index, "slot already filled; project entry ignored");
                continue;
            }
            if let Some(scale) = &spec.scale {
                session.on_scale_committed(scale)?;
            }
            if let Some([dx, dy]) = spec.offset {
                session.on_drag_delta(index, dx, dy)?;
            }
        }
        tracing::info!(%layout, slots = self.slots.len(), "project applied");
        Ok(layout)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_and_full_projects() {
        let minimal = Project::from_json(r#"{"frame": "f_2_vertical.png"}"#, Path::new("p.json"))
            .unwrap();
        assert!(minimal.slots.is_empty());
        assert_eq!(minimal.font, None);

        let full = Project::from_json(
            r#"{
                "frame": "f_4_horizontal.png",
                "font": "fonts/a.ttf",
                "font_size": "14",
                "captions": "one\ntwo",
                "slots": [
                    {"image": "a.jpg", "scale": "35", "offset": [-4, 9]},
                    null,
                    {"image": "c.png"}
                ]
            }"#,
            Path::new("p.json"),
        )
        .unwrap();
        assert_eq!(full.slots.len(), 3);
        assert_eq!(full.slots[1], None);
        let first = full.slots[0].as_ref().unwrap();
        assert_eq!(first.scale.as_deref(), Some("35"));
        assert_eq!(first.offset, Some([-4, 9]));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let err = Project::from_json("{", Path::new("broken.json")).unwrap_err();
        assert!(matches!(err, SessionError::Project { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = Project::from_json(
            r#"{"frame": "f_2_vertical.png", "colour": "red"}"#,
            Path::new("p.json"),
        );
        assert!(result.is_err());
    }
}
