//! Petal Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every stage of the pipeline:
//! - Hand landmarks and frames (Landmark, Point3, HandFrame)
//! - Interaction state (Mode, InteractionState, Orientation)
//! - Monotonic time (MonoTime)
//! - Error types

pub mod error;
pub mod landmark;
pub mod state;
pub mod time;

pub use error::*;
pub use landmark::*;
pub use state::*;
pub use time::*;
