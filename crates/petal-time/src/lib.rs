//! Petal Time - clocks and deadlines
//!
//! This crate implements the timing primitives the reveal sequence runs on:
//! - [`Clock`]: a source of monotonic session time
//! - [`SystemClock`]: real time, anchored at construction
//! - [`ManualClock`]: time that only moves when told to (tests, simulation)
//! - [`Deadline`]: a single-owner, cancellable one-shot timer
//!
//! Deadlines never call back. Their owner polls them with the current time,
//! which keeps every mutation on the owner's execution context.

pub mod clock;
pub mod deadline;

pub use clock::*;
pub use deadline::*;
