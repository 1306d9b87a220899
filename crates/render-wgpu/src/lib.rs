//! wgpu render backend for the race.
//!
//! Draws a captured `SceneFrame` with instanced built-in primitives: cubes
//! for karts and the start light, spheres for landmarks, quads for the ground
//! and finish line. The sky is the clear color.
//!
//! # Invariants
//! - The renderer only reads the scene and camera; it never touches the race.
//! - Opaque batches are drawn before translucent ones.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
