use glam::Vec3;
use karting_common::Transform;
use serde::{Deserialize, Serialize};

use crate::lighting::Light;

/// Midpoint of the oscillating 0..254 color channels.
const CHANNEL_HALF: f32 = 127.0;

/// Decorative spin rate before the sequence starts, degrees per tick.
const IDLE_ROTATE_SPEED: f32 = 0.15;
/// Spin rate once the sequence has ended.
const ENDED_ROTATE_SPEED: f32 = 0.01;

const IDLE_INTENSITY: f32 = 4000.0;
const RED_INTENSITY: f32 = 40_000.0;
const YELLOW_INTENSITY: f32 = 65_000.0;
const GREEN_INTENSITY: f32 = 75_000.0;

const RED_RAMP: f32 = 0.0001;
const YELLOW_RAMP: f32 = 0.00075;

/// A named interval of the light sequence. Ordered by sequence position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Idle,
    Red,
    Yellow,
    Green,
    Ended,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Red => "red",
            Phase::Yellow => "yellow",
            Phase::Green => "green",
            Phase::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Durations of the three lit phases, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    pub red: f64,
    pub yellow: f64,
    pub green: f64,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            red: 2.5,
            yellow: 4.0,
            green: 3.5,
        }
    }
}

impl PhaseTimings {
    /// Phase of a started sequence `elapsed` seconds after `start`.
    ///
    /// Intervals are half-open: red covers `[0, red)`, and so on. Negative
    /// elapsed time (a clock behind the start stamp) counts as red.
    pub fn phase_at(&self, elapsed: f64) -> Phase {
        let yellow_from = self.red;
        let green_from = yellow_from + self.yellow;
        let ended_from = green_from + self.green;
        if elapsed < yellow_from {
            Phase::Red
        } else if elapsed < green_from {
            Phase::Yellow
        } else if elapsed < ended_from {
            Phase::Green
        } else {
            Phase::Ended
        }
    }

    pub fn total(&self) -> f64 {
        self.red + self.yellow + self.green
    }
}

/// The start light: a spinning sculpture carrying a point light that steps
/// through red, yellow and green, then pulses in shifting colors.
///
/// The controller never reads a clock. `start` and `update` take the current
/// time from the caller.
#[derive(Debug, Clone)]
pub struct TrafficLight {
    transform: Transform,
    timings: PhaseTimings,
    started_at: Option<f64>,
    phase: Phase,
    rotate_speed: f32,
    glow: f32,
    green_light: bool,
    light: Light,
}

impl TrafficLight {
    pub fn new(transform: Transform, timings: PhaseTimings) -> Self {
        let mut light = Light::point();
        light.set_rgb(Vec3::splat(10.0));
        light.set_intensity(IDLE_INTENSITY);
        light.position = transform.position;
        Self {
            transform,
            timings,
            started_at: None,
            phase: Phase::Idle,
            rotate_speed: IDLE_ROTATE_SPEED,
            glow: 0.0,
            green_light: false,
            light,
        }
    }

    /// Begin the sequence at `now`. Calling again restarts the elapsed-time
    /// base; callers check `is_started` first.
    pub fn start(&mut self, now: f64) {
        self.started_at = Some(now);
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Latched once the green phase is reached.
    pub fn green_light(&self) -> bool {
        self.green_light
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// The child point light, positioned on the sculpture.
    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn glow(&self) -> f32 {
        self.glow
    }

    pub fn rotate_speed(&self) -> f32 {
        self.rotate_speed
    }

    /// Seconds since `start`, if started.
    pub fn elapsed(&self, now: f64) -> Option<f64> {
        self.started_at.map(|start| now - start)
    }

    /// Advance one tick at wall-clock time `now`. Returns the new phase when it
    /// changed this tick.
    pub fn update(&mut self, now: f64) -> Option<Phase> {
        self.light.position = self.transform.position;

        self.glow = (1.25 + (now * f64::from(self.rotate_speed)).cos()) as f32;
        let shifting = shifting_rgb(now);

        if !self.green_light {
            self.transform.scale = Vec3::new(
                (CHANNEL_HALF + shifting.z * 0.25) * 0.35,
                (CHANNEL_HALF + shifting.y * 0.085) * 0.35,
                (CHANNEL_HALF + shifting.x * 0.25) * 0.35,
            );
        }

        let spin = self.rotate_speed;
        self.transform.rotation += Vec3::new(spin * 0.25, spin, spin * 0.005);

        let elapsed = self.elapsed(now)?;
        let previous = self.phase;
        // Never regress, even if the time base was restarted.
        self.phase = self.phase.max(self.timings.phase_at(elapsed));

        match self.phase {
            Phase::Idle => {}
            Phase::Red => {
                self.rotate_speed += RED_RAMP;
                self.show(RED_INTENSITY, Vec3::new(255.0, 0.0, 0.0));
            }
            Phase::Yellow => {
                self.rotate_speed += YELLOW_RAMP;
                self.show(YELLOW_INTENSITY, Vec3::new(255.0, 200.0, 0.0));
            }
            Phase::Green => {
                self.rotate_speed = 0.0;
                self.transform.scale = Vec3::splat(self.transform.position.y * 0.3);
                self.transform.rotation = Vec3::ZERO;
                self.show(GREEN_INTENSITY, Vec3::new(0.0, 255.0, 0.0));
                self.green_light = true;
            }
            Phase::Ended => {
                self.rotate_speed = ENDED_ROTATE_SPEED;
                self.show(GREEN_INTENSITY, shifting);
                // A stalled clock can jump straight past green.
                self.green_light = true;
            }
        }

        (self.phase != previous).then_some(self.phase)
    }

    fn show(&mut self, base_intensity: f32, rgb: Vec3) {
        self.light.set_intensity(base_intensity * self.glow);
        self.light.set_rgb(rgb);
    }
}

/// Per-channel color oscillation in 0..254, independent of phase.
fn shifting_rgb(now: f64) -> Vec3 {
    let half = f64::from(CHANNEL_HALF);
    Vec3::new(
        (half + half * (now * 1.25).sin()) as f32,
        (half + half * (now * 1.35).cos()) as f32,
        (half + half * (now * 1.45).sin()) as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn light() -> TrafficLight {
        TrafficLight::new(
            Transform::at(Vec3::new(0.0, 200.0, 400.0)).with_uniform_scale(30.0),
            PhaseTimings::default(),
        )
    }

    #[test]
    fn phase_boundaries_are_half_open() {
        let t = PhaseTimings::default();
        assert_eq!(t.phase_at(0.0), Phase::Red);
        assert_eq!(t.phase_at(2.4999), Phase::Red);
        assert_eq!(t.phase_at(2.5), Phase::Yellow);
        assert_eq!(t.phase_at(6.5), Phase::Green);
        assert_eq!(t.phase_at(10.0), Phase::Ended);
        assert_eq!(t.total(), 10.0);
    }

    #[test]
    fn idle_until_started() {
        let mut tl = light();
        for i in 0..100 {
            assert_eq!(tl.update(i as f64 * 0.1), None);
        }
        assert_eq!(tl.phase(), Phase::Idle);
        assert!(!tl.is_started());
        assert_eq!(tl.light().intensity(), IDLE_INTENSITY);
        assert_relative_eq!(tl.rotate_speed(), IDLE_ROTATE_SPEED);
    }

    #[test]
    fn sequence_started_at_six_seconds() {
        let mut tl = light();
        tl.start(6.0);

        tl.update(8.0);
        assert_eq!(tl.phase(), Phase::Red);
        assert!(!tl.green_light());

        tl.update(11.0);
        assert_eq!(tl.phase(), Phase::Yellow);

        tl.update(14.5);
        assert_eq!(tl.phase(), Phase::Green);
        assert!(tl.green_light());

        tl.update(17.0);
        assert_eq!(tl.phase(), Phase::Ended);
        assert!(tl.green_light());
    }

    #[test]
    fn update_reports_phase_changes_once() {
        let mut tl = light();
        tl.start(0.0);
        assert_eq!(tl.update(0.1), Some(Phase::Red));
        assert_eq!(tl.update(0.2), None);
        assert_eq!(tl.update(3.0), Some(Phase::Yellow));
        assert_eq!(tl.update(7.0), Some(Phase::Green));
        assert_eq!(tl.update(11.0), Some(Phase::Ended));
        assert_eq!(tl.update(12.0), None);
    }

    #[test]
    fn phases_never_regress_and_green_latches() {
        let mut tl = light();
        tl.start(0.0);
        let mut last = Phase::Idle;
        let mut seen_green = false;
        for i in 0..1500 {
            let now = i as f64 / 100.0;
            tl.update(now);
            assert!(tl.phase() >= last);
            last = tl.phase();
            seen_green |= tl.phase() == Phase::Green;
            if seen_green {
                assert!(tl.green_light());
            }
        }
        assert_eq!(last, Phase::Ended);

        // Restarting the time base does not roll the phase back.
        tl.start(15.0);
        tl.update(15.1);
        assert_eq!(tl.phase(), Phase::Ended);
    }

    #[test]
    fn red_ramps_rotation_and_glows() {
        let mut tl = light();
        tl.start(0.0);
        tl.update(0.5);
        assert_relative_eq!(tl.rotate_speed(), IDLE_ROTATE_SPEED + RED_RAMP);
        tl.update(0.6);
        assert_relative_eq!(tl.rotate_speed(), IDLE_ROTATE_SPEED + 2.0 * RED_RAMP);

        assert_eq!(tl.light().color(), Vec3::X);
        assert_relative_eq!(tl.light().intensity(), RED_INTENSITY * tl.glow(), epsilon = 1e-2);
        assert!(tl.glow() >= 0.25 && tl.glow() <= 2.25);
    }

    #[test]
    fn yellow_uses_amber_profile() {
        let mut tl = light();
        tl.start(0.0);
        tl.update(3.0);
        let amber = Vec3::new(255.0, 200.0, 0.0).normalize();
        assert_relative_eq!(tl.light().color().x, amber.x, epsilon = 1e-6);
        assert_relative_eq!(tl.light().color().y, amber.y, epsilon = 1e-6);
        assert_relative_eq!(tl.light().intensity(), YELLOW_INTENSITY * tl.glow(), epsilon = 1e-1);
    }

    #[test]
    fn green_freezes_pose() {
        let mut tl = light();
        tl.start(0.0);
        tl.update(7.0);
        assert_eq!(tl.rotate_speed(), 0.0);
        assert_eq!(tl.transform().rotation, Vec3::ZERO);
        assert_relative_eq!(tl.transform().scale.x, 60.0, epsilon = 1e-3);
        assert_eq!(tl.light().color(), Vec3::Y);

        // Next tick the pose stays frozen and the scale is no longer driven by color.
        tl.update(7.5);
        assert_eq!(tl.transform().rotation, Vec3::ZERO);
        assert_relative_eq!(tl.transform().scale.y, 60.0, epsilon = 1e-3);
    }

    #[test]
    fn ended_slows_and_shifts_color() {
        let mut tl = light();
        tl.start(0.0);
        tl.update(11.0);
        assert_eq!(tl.phase(), Phase::Ended);
        assert_relative_eq!(tl.rotate_speed(), ENDED_ROTATE_SPEED);
        let expected = shifting_rgb(11.0).normalize();
        assert_relative_eq!(tl.light().color().x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(tl.light().color().z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn idle_scale_follows_shifting_color() {
        let mut tl = light();
        tl.update(1.0);
        let rgb = shifting_rgb(1.0);
        assert_relative_eq!(tl.transform().scale.x, (127.0 + rgb.z * 0.25) * 0.35, epsilon = 1e-4);
        assert_relative_eq!(tl.transform().scale.z, (127.0 + rgb.x * 0.25) * 0.35, epsilon = 1e-4);
    }

    #[test]
    fn child_light_tracks_position() {
        let mut tl = light();
        tl.update(0.0);
        assert_eq!(tl.light().position, Vec3::new(0.0, 200.0, 400.0));
    }
}
