//! Petal Test Harness - synthetic input and whole-pipeline validation
//!
//! This crate provides:
//! - Seeded synthetic hand frames with jitter and detector dropouts
//! - A scripted scenario runner on a manual clock
//! - Invariant checks over recorded emission logs
//! - End-to-end scenarios for the interaction cycle

pub mod integration;
pub mod scenario;
pub mod synthetic;

pub use integration::*;
pub use scenario::*;
pub use synthetic::*;
