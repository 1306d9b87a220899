use glam::{Mat4, Vec3};
use karting_input::{Action, InputFrame};
use karting_kernel::Kart;

use crate::renderer::RenderView;

/// Height of the cockpit eye above the kart origin.
const COCKPIT_EYE_HEIGHT: f32 = 0.15;
/// Pitch limit in degrees, either side of level.
const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Third person, orbiting the kart on a sphere driven by the pointer.
    Orbit,
    /// First person, looking down the kart's heading.
    Cockpit,
}

/// Camera that follows the player kart.
///
/// Lives outside the kernel: it reads the kart after each tick and never
/// writes back. Angles are in degrees.
#[derive(Debug, Clone)]
pub struct ChaseCamera {
    pub mode: CameraMode,
    pub yaw: f32,
    pub pitch: f32,
    /// Orbit radius.
    pub distance: f32,
    pub min_distance: f32,
    /// Orbit radius change per scroll line.
    pub zoom_step: f32,
    /// Degrees per pointer unit.
    pub sensitivity: f32,
    /// Minimum seconds between mode toggles while the toggle key is held.
    pub toggle_cooldown: f64,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    position: Vec3,
    target: Vec3,
    last_toggle: f64,
}

impl Default for ChaseCamera {
    fn default() -> Self {
        Self {
            mode: CameraMode::Orbit,
            // Behind the kart, which faces +Z at the start.
            yaw: 180.0,
            pitch: 0.0,
            distance: 1.5,
            min_distance: 0.95,
            zoom_step: 0.5,
            sensitivity: 0.05,
            toggle_cooldown: 0.5,
            fov_degrees: 80.0,
            aspect: 1.0,
            near: 0.1,
            far: 10_000.0,
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            last_toggle: 0.0,
        }
    }
}

impl ChaseCamera {
    /// Camera whose toggle cooldown starts counting at `now`.
    pub fn new(now: f64) -> Self {
        Self {
            last_toggle: now,
            ..Self::default()
        }
    }

    /// Fold one frame of pointer, scroll and toggle input into the camera.
    pub fn handle_input(&mut self, input: &InputFrame, now: f64) {
        let delta = input.pointer_delta();
        self.yaw -= self.sensitivity * delta.x;
        self.pitch = (self.pitch - self.sensitivity * delta.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        if input.scroll() != 0.0 {
            let zoomed = self.distance - input.scroll() * self.zoom_step;
            self.distance = zoomed.max(self.min_distance);
        }

        if input.is_held(Action::ToggleCamera) && now - self.last_toggle >= self.toggle_cooldown {
            self.mode = match self.mode {
                CameraMode::Orbit => CameraMode::Cockpit,
                CameraMode::Cockpit => CameraMode::Orbit,
            };
            self.last_toggle = now;
            tracing::debug!(mode = ?self.mode, "camera mode toggled");
        }
    }

    /// Re-aim at `kart` for a `width` x `height` viewport.
    pub fn follow(&mut self, kart: &Kart, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
        match self.mode {
            CameraMode::Orbit => {
                self.target = kart.position();
                let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
                let ground = self.distance * pitch.cos();
                self.position = self.target
                    + Vec3::new(
                        ground * yaw.sin(),
                        -self.distance * pitch.sin(),
                        ground * yaw.cos(),
                    );
            }
            CameraMode::Cockpit => {
                self.position = kart.position() + Vec3::Y * COCKPIT_EYE_HEIGHT;
                self.target = self.position + kart.heading();
            }
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.position,
            target: self.target,
            fov_degrees: self.fov_degrees,
        }
    }
}
