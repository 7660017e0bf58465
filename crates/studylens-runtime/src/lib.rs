//! StudyLens Runtime - Monitor orchestration and event loop
//!
//! This crate wires the attention tracker and gesture switch to the host:
//! 1. Start the camera (status leaves Off)
//! 2. Ingest detection frames (face presence, hand gestures)
//! 3. Tick once per second (status, alert, focus accrual, XP)
//! 4. Enter/leave doubt mode (voice capture)
//! 5. Forward transcripts (assistant turn, video recommendations)
//! 6. Stop (voice and camera released, status Off)

pub mod collab;
pub mod config;
pub mod logging;
pub mod monitor;
pub mod service;
pub mod xp;

pub use collab::*;
pub use config::*;
pub use logging::*;
pub use monitor::*;
pub use service::*;
pub use xp::*;
