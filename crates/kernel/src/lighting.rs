use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What kind of light a `Light` is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightRole {
    /// Radiates from `position`.
    Point,
    /// Parallel rays along `direction`.
    Directional { direction: Vec3 },
}

/// A light source as the renderer consumes it.
///
/// Colors are stored normalized, so only the hue survives `set_rgb`; brightness
/// lives entirely in `intensity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub role: LightRole,
    pub position: Vec3,
    color: Vec3,
    intensity: f32,
    pub ambient_strength: f32,
    ambient_color: Vec3,
    pub specular_strength: f32,
    pub specular_phong: f32,
}

impl Light {
    fn with_role(role: LightRole, position: Vec3, intensity: f32) -> Self {
        Self {
            role,
            position,
            color: Vec3::ONE,
            intensity,
            ambient_strength: 0.1,
            ambient_color: Vec3::ONE,
            specular_strength: 0.5,
            specular_phong: 15.0,
        }
    }

    /// White point light at the origin.
    pub fn point() -> Self {
        Self::with_role(LightRole::Point, Vec3::ZERO, 5.0)
    }

    pub fn directional(direction: Vec3) -> Self {
        Self::with_role(
            LightRole::Directional { direction },
            Vec3::new(0.0, 0.0, 1.0),
            15.0,
        )
    }

    /// Set diffuse and ambient color from any RGB triple (e.g. 0..255).
    pub fn set_rgb(&mut self, rgb: Vec3) {
        let hue = rgb.normalize_or_zero();
        self.color = hue;
        self.ambient_color = hue;
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn ambient_color(&self) -> Vec3 {
        self.ambient_color
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Direction for directional lights, `None` for point lights.
    pub fn direction(&self) -> Option<Vec3> {
        match self.role {
            LightRole::Point => None,
            LightRole::Directional { direction } => Some(direction),
        }
    }
}

/// Day/night state of the skybox and the sun.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sky {
    #[default]
    Day,
    Night,
}

impl Sky {
    /// Sun color as an RGB triple.
    pub fn sun_rgb(self) -> Vec3 {
        match self {
            Sky::Day => Vec3::new(242.0, 153.0, 205.0),
            Sky::Night => Vec3::new(9.0, 179.0, 130.0),
        }
    }

    pub fn sun_intensity(self) -> f32 {
        match self {
            Sky::Day => 3.0,
            Sky::Night => 1.25,
        }
    }

    /// Background color used where the skybox would be drawn.
    pub fn clear_color(self) -> [f64; 3] {
        match self {
            Sky::Day => [0.55, 0.62, 0.85],
            Sky::Night => [0.02, 0.03, 0.08],
        }
    }

    /// Repaint the sun for this sky.
    pub fn apply(self, sun: &mut Light) {
        sun.set_rgb(self.sun_rgb());
        sun.set_intensity(self.sun_intensity());
    }
}
