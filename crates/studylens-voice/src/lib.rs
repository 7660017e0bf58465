//! StudyLens Voice - speech in and sound out
//!
//! Speech recognition, speech synthesis and alert playback belong to the
//! host. This crate defines them as capabilities and adds the two pieces
//! of logic the monitor needs on top:
//!
//! - A session guard so that at most one recognizer handle is live
//! - Transcript assembly from recognizer results (final segments only)

pub mod capability;
pub mod session;
pub mod transcript;

pub use capability::*;
pub use session::*;
pub use transcript::*;
