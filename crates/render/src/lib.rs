//! Rendering adapter: what a renderer sees of the race, and the camera that
//! chases the player.
//!
//! # Invariants
//! - Renderers consume a `SceneFrame` captured after the tick; they cannot
//!   reach race state.
//! - The camera reads the player kart and never writes back.
//! - Camera motion is not part of the simulation tick.

mod camera;
mod renderer;
mod scene;

pub use camera::{CameraMode, ChaseCamera};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use scene::{Drawable, HudState, LightSlot, SceneFrame, Shape};
