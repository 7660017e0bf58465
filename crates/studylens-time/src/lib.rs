//! StudyLens Time - Clocks and tick scheduling
//!
//! This crate implements the monitor's notion of time:
//! - A monotonic millisecond clock for live hosts
//! - A manual clock for deterministic tests and replays
//! - A tick gate that fires on a fixed cadence and never backfills

pub mod clock;
pub mod tick;

pub use clock::*;
pub use tick::*;
