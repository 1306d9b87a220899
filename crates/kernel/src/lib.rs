//! Race kernel: kart kinematics, the start light, finish judging and the
//! end-of-race countdown, stepped one fixed tick at a time.
//!
//! # Invariants
//! - Nothing here reads a clock. Every time-dependent operation takes `now`
//!   in seconds from the caller.
//! - `RaceSim::tick` is the only mutator of race state, and every observable
//!   outcome is appended to its event log.
//! - A kart is ranked at most once; ranks are consecutive from 1.
//! - The light phase never moves backwards.

pub mod clock;
pub mod config;
pub mod countdown;
pub mod event;
pub mod finish_line;
pub mod kart;
pub mod landmark;
pub mod lighting;
pub mod race;
pub mod traffic_light;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, FinishLineConfig, KartConfig, LightsConfig, RaceConfig, WindowConfig};
pub use countdown::{Announcement, Countdown};
pub use event::RaceEvent;
pub use finish_line::{Crossing, FinishLine, FinishRecord};
pub use kart::{Kart, MAX_ROLL, MotionProfile};
pub use landmark::Landmark;
pub use lighting::{Light, LightRole, Sky};
pub use race::{Entrant, RaceContext, RaceSim, SimError};
pub use traffic_light::{Phase, PhaseTimings, TrafficLight};
