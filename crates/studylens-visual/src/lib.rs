//! StudyLens Visual - what the webcam says about the student
//!
//! This crate turns landmark frames from an external face/hand classifier
//! into two pieces of state:
//!
//! - Attention: Focused / Distracted / LookingAway / Off, evaluated on a
//!   fixed tick so that the status never flickers with the camera rate
//! - Doubt mode: toggled by raising a hand, edge-triggered
//!
//! Geometry is computed by the classifier; this crate only compares
//! normalized coordinates and elapsed times against thresholds.

pub mod attention;
pub mod camera;
pub mod gesture;

pub use attention::*;
pub use camera::*;
pub use gesture::*;
