//! cutframe-io: Filesystem-backed editor session.
//!
//! Wraps the sans-IO `cutframe-pipeline` core in the synchronous event
//! entry points a UI calls (frame import, image selection, drag, wheel,
//! scale and font commits, caption text, export), reading frames,
//! photos and fonts from disk and writing encoded exports.

pub mod fs;
pub mod project;
pub mod session;

pub use project::{Project, SlotSpec};
pub use session::{Assignment, FrameImport, Session, SessionError};
