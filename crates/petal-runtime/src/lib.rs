//! Petal Runtime - where frames, toggles and timers meet
//!
//! [`Controller`] serializes every mutation (detector frames, external
//! toggles, reveal deadlines) onto one owner. [`spawn_driver`] runs a
//! controller on a tokio task for applications that want channels instead of
//! direct calls.

pub mod config;
pub mod controller;
pub mod driver;
pub mod emission;
pub mod logging;
pub mod overlay;

pub use config::*;
pub use controller::*;
pub use driver::*;
pub use emission::*;
pub use logging::*;
pub use overlay::*;
