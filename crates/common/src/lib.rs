//! Shared spatial types for the karting demo.

pub mod types;

pub use types::{KartRole, Transform};
