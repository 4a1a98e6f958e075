//! Petal State - the two state machines between the classifier and the screen
//!
//! - [`InteractionMachine`]: gathered/dispersed mode plus the selection
//!   sub-state, with content drawn on the selection's rising edge
//! - [`RevealSequencer`]: idle → pending → shown → hidden, one reveal per
//!   dispersed excursion, every deadline owned and cancelled in one place

pub mod mode;
pub mod reveal;

pub use mode::*;
pub use reveal::*;
