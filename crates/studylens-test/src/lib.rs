//! StudyLens Test Harness - Simulated classifiers and hosts
//!
//! This crate provides:
//! - A scripted frame simulator with landmark jitter and face misses
//! - Recording fakes for every host capability and collaborator
//! - A deterministic harness driving the monitor on a manual clock
//! - End-to-end monitor scenarios

pub mod fakes;
pub mod harness;
pub mod scene;

#[cfg(test)]
mod scenarios;

pub use fakes::*;
pub use harness::*;
pub use scene::*;
