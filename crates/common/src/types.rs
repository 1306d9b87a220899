use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Identity tag for a kart taking part in the race.
///
/// The finish line uses this to tell the player apart from the ghosts; nothing
/// downcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KartRole {
    /// The human-driven kart. Latched separately at the finish line.
    Player,
    /// An autonomous kart. Deactivated when it crosses the finish line.
    Ghost,
}

/// Spatial transform: position, Euler rotation in degrees, scale.
///
/// Rotation is applied X, then Y, then Z and is never normalized; angles may
/// wind up arbitrarily.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Degrees about each axis.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Transform at `position` with identity rotation and unit scale.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Same transform with a uniform scale.
    pub fn with_uniform_scale(mut self, size: f32) -> Self {
        self.scale = Vec3::splat(size);
        self
    }

    /// Model matrix: translate, then scale, then rotate about X, Y and Z.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_scale(self.scale)
            * Mat4::from_rotation_x(self.rotation.x.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_z(self.rotation.z.to_radians())
    }

    /// Z coordinate of the leading face along +Z (position plus depth scale).
    pub fn leading_edge_z(&self) -> f32 {
        self.position.z + self.scale.z
    }
}
