//! StudyLens Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by every StudyLens crate:
//! - Time primitives (Timestamp)
//! - Landmark geometry and detection frames
//! - The error taxonomy

pub mod error;
pub mod landmark;
pub mod time;

pub use error::*;
pub use landmark::*;
pub use time::*;
