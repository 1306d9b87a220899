use std::collections::BTreeSet;

use glam::Vec2;

use crate::action::Action;

/// Steering and throttle state for one tick of the player kart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerControls {
    pub steer_left: bool,
    pub steer_right: bool,
    pub throttle: bool,
    pub brake: bool,
}

/// Everything the input source reports between two ticks.
///
/// Held actions stay set until released. Press edges and pointer/scroll
/// deltas accumulate until they are consumed.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    held: BTreeSet<Action>,
    pressed: BTreeSet<Action>,
    pointer_delta: Vec2,
    scroll: f32,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Auto-repeat of an already held action is not a new edge.
    pub fn press(&mut self, action: Action) {
        if self.held.insert(action) {
            self.pressed.insert(action);
            tracing::trace!(?action, "pressed");
        }
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Whether `action` went down since the last `consume_edges`.
    pub fn was_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    pub fn add_pointer_delta(&mut self, dx: f32, dy: f32) {
        self.pointer_delta += Vec2::new(dx, dy);
    }

    pub fn add_scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Player kart controls from the held set.
    pub fn player_controls(&self) -> PlayerControls {
        PlayerControls {
            steer_left: self.is_held(Action::SteerLeft),
            steer_right: self.is_held(Action::SteerRight),
            throttle: self.is_held(Action::Throttle),
            brake: self.is_held(Action::Brake),
        }
    }

    /// Clear press edges after a tick has seen them.
    pub fn consume_edges(&mut self) {
        self.pressed.clear();
    }

    /// Clear pointer and scroll accumulation after the camera has read them.
    pub fn consume_motion(&mut self) {
        self.pointer_delta = Vec2::ZERO;
        self.scroll = 0.0;
    }

    /// Drop all held state, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }
}
