//! Input: raw devices mapped to a small set of player intents.
//!
//! # Invariants
//! - The simulation and camera consume `InputFrame`s, never raw device events.
//! - Press edges are consumed once per tick; held state persists until release.

pub mod action;
pub mod frame;

pub use action::Action;
pub use frame::{InputFrame, PlayerControls};
