use glam::Vec3;
use karting_common::{KartRole, Transform};
use karting_input::PlayerControls;

/// Bank angle limit in degrees.
pub const MAX_ROLL: f32 = 55.0;

/// Yaw step per tick of held steering, in degrees.
const GHOST_TURNING_SPEED: f32 = 0.075;
const PLAYER_TURNING_SPEED: f32 = 0.05;

/// Fraction of acceleration bled off per tick once a ghost is deactivated.
const GHOST_COAST_DRAG: f32 = 0.77;
/// Fraction of acceleration bled off per tick when the player is off throttle.
const PLAYER_COAST_DRAG: f32 = 0.8;

/// Which update rule a kart follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionProfile {
    /// Straight-line kart driven by an externally set acceleration.
    Ghost,
    /// Steerable kart driven by per-tick controls; may reverse.
    Player,
}

impl From<KartRole> for MotionProfile {
    fn from(role: KartRole) -> Self {
        match role {
            KartRole::Player => Self::Player,
            KartRole::Ghost => Self::Ghost,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Steering {
    #[default]
    Straight,
    Left,
    Right,
}

/// Player input latched between `apply_controls` and the next `update`.
#[derive(Debug, Clone, Copy, Default)]
struct PendingControls {
    steering: Steering,
    acce: f32,
    accelerating: bool,
    reverse: bool,
}

/// A kart and its motion state.
///
/// `update` is one fixed tick; there is no time delta. Speed is clamped to
/// `[min_speed, max_speed]` and roll to `±MAX_ROLL` at the end of every update.
#[derive(Debug, Clone)]
pub struct Kart {
    name: String,
    role: KartRole,
    profile: MotionProfile,
    transform: Transform,
    heading: Vec3,
    speed: f32,
    max_speed: f32,
    acceleration: f32,
    turning_speed: f32,
    roll: f32,
    activated: bool,
    start_time: Option<f64>,
    end_time: Option<f64>,
    pending: PendingControls,
}

impl Kart {
    /// Build a kart facing +Z, at rest and deactivated.
    pub fn new(
        name: impl Into<String>,
        role: KartRole,
        transform: Transform,
        max_speed: f32,
        acceleration: f32,
    ) -> Self {
        let profile = MotionProfile::from(role);
        let turning_speed = match profile {
            MotionProfile::Ghost => GHOST_TURNING_SPEED,
            MotionProfile::Player => PLAYER_TURNING_SPEED,
        };
        Self {
            name: name.into(),
            role,
            profile,
            transform,
            heading: Vec3::Z,
            speed: 0.0,
            max_speed,
            acceleration,
            turning_speed,
            roll: 0.0,
            activated: false,
            start_time: None,
            end_time: None,
            pending: PendingControls::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> KartRole {
        self.role
    }

    pub fn profile(&self) -> MotionProfile {
        self.profile
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Unit direction of travel in the XZ plane.
    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Lowest speed this kart can reach: zero, or half max speed backwards for the player.
    pub fn min_speed(&self) -> f32 {
        match self.profile {
            MotionProfile::Ghost => 0.0,
            MotionProfile::Player => -self.max_speed / 2.0,
        }
    }

    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    pub fn set_acceleration(&mut self, acceleration: f32) {
        self.acceleration = acceleration;
    }

    /// Bank angle in degrees, mirrored into `rotation.z`.
    pub fn roll(&self) -> f32 {
        self.roll
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn activate(&mut self) {
        self.activated = true;
    }

    pub fn deactivate(&mut self) {
        self.activated = false;
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<f64> {
        self.end_time
    }

    /// Stamp the start time. Later calls are ignored.
    pub fn mark_started(&mut self, now: f64) {
        self.start_time.get_or_insert(now);
    }

    /// Stamp the end time. Later calls are ignored.
    pub fn mark_finished(&mut self, now: f64) {
        self.end_time.get_or_insert(now);
    }

    /// Seconds between start and end; a kart that never started counts from zero.
    pub fn race_time(&self) -> Option<f64> {
        self.end_time.map(|end| end - self.start_time.unwrap_or(0.0))
    }

    /// Latch this tick's steering and throttle. Only the player profile reacts.
    ///
    /// Steering takes effect immediately: yaw, heading and roll bias change
    /// here, speed changes in the following `update`.
    pub fn apply_controls(&mut self, controls: PlayerControls) {
        if self.profile != MotionProfile::Player {
            return;
        }
        if controls.steer_left {
            self.turn(self.turning_speed, -self.turning_speed / 1.15, Steering::Left);
        }
        if controls.steer_right {
            self.turn(-self.turning_speed, self.turning_speed / 1.15, Steering::Right);
        }
        if controls.throttle {
            self.pending.acce = self.acceleration;
            self.pending.accelerating = true;
        }
        if controls.brake {
            self.pending.acce = -self.acceleration;
            self.pending.reverse = true;
        }
    }

    fn turn(&mut self, yaw_step: f32, roll_bias: f32, steering: Steering) {
        self.transform.rotation.y += yaw_step;
        self.roll += roll_bias;
        self.pending.steering = steering;
        let yaw = self.transform.rotation.y.to_radians();
        self.heading = Vec3::new(yaw.sin(), 0.0, yaw.cos());
    }

    /// Advance one fixed tick.
    pub fn update(&mut self) {
        match self.profile {
            MotionProfile::Ghost => self.update_ghost(),
            MotionProfile::Player => self.update_player(),
        }
    }

    fn update_ghost(&mut self) {
        let relax = self.turning_speed / 1.5;
        if self.roll > 0.0 {
            self.roll -= relax;
        }
        if self.roll < 0.0 {
            self.roll += relax;
        }
        self.settle_roll();

        if self.activated {
            self.speed += self.acceleration;
        }
        self.speed = self.speed.min(self.max_speed);

        // Not gated on activation: a deactivated ghost coasts to a stop.
        self.transform.position += self.heading * self.speed;

        if !self.activated {
            self.speed -= self.acceleration * GHOST_COAST_DRAG;
        }
        self.speed = self.speed.max(0.0);
    }

    fn update_player(&mut self) {
        let pending = std::mem::take(&mut self.pending);

        // Lean into the turn: a held turn pushes against the relaxation.
        let relax = self.turning_speed * 2.5;
        if self.roll > 0.0 || pending.steering == Steering::Left {
            self.roll -= relax;
        }
        if self.roll < 0.0 || pending.steering == Steering::Right {
            self.roll += relax;
        }
        self.settle_roll();

        self.speed += pending.acce;
        self.speed = self.speed.min(self.max_speed);
        if self.activated {
            self.transform.position += self.heading * self.speed;
        }

        if !pending.accelerating {
            self.speed -= self.acceleration * PLAYER_COAST_DRAG;
        }
        if self.speed <= 0.0 && !pending.reverse {
            self.speed = 0.0;
        }
        self.speed = self.speed.clamp(self.min_speed(), self.max_speed);
    }

    fn settle_roll(&mut self) {
        self.roll = self.roll.clamp(-MAX_ROLL, MAX_ROLL);
        self.transform.rotation.z = self.roll;
    }
}
