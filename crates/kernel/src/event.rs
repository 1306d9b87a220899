use crate::countdown::Announcement;
use crate::finish_line::FinishRecord;
use crate::lighting::Sky;
use crate::traffic_light::Phase;

/// A record of something the race did during a tick.
///
/// Hosts drain these after each frame. `Display` gives the human-readable
/// line; `is_console` marks the ones that belong on stdout rather than only in
/// the log.
#[derive(Debug, Clone, PartialEq)]
pub enum RaceEvent {
    /// The light sequence began at `at` seconds.
    LightsStarted { at: f64 },
    /// The light moved into a new phase.
    PhaseChanged(Phase),
    /// Green light: every kart was activated.
    RaceStarted { at: f64 },
    /// A kart crossed the line and was ranked.
    Finished(FinishRecord),
    /// Every kart is past the line; the countdown is running.
    RaceOver,
    /// One countdown announcement.
    Countdown(Announcement),
    /// Ghost motion paused or resumed.
    PauseToggled { paused: bool },
    /// Day/night switched.
    SkyChanged(Sky),
    /// The host was asked to close.
    QuitRequested,
}

impl RaceEvent {
    pub fn is_console(&self) -> bool {
        matches!(
            self,
            RaceEvent::Finished(_) | RaceEvent::RaceOver | RaceEvent::Countdown(_)
        )
    }
}

impl std::fmt::Display for RaceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RaceEvent::LightsStarted { at } => write!(f, "lights sequence started at {at:.2}s"),
            RaceEvent::PhaseChanged(phase) => write!(f, "light phase: {phase}"),
            RaceEvent::RaceStarted { at } => write!(f, "race started at {at:.2}s"),
            RaceEvent::Finished(record) => write!(f, "{record}"),
            RaceEvent::RaceOver => {
                write!(f, "\nThank You For Playing!\n\nGame Will Now Close in...")
            }
            RaceEvent::Countdown(announcement) => write!(f, "{announcement}"),
            RaceEvent::PauseToggled { paused: true } => f.write_str("ghosts paused"),
            RaceEvent::PauseToggled { paused: false } => f.write_str("ghosts resumed"),
            RaceEvent::SkyChanged(Sky::Day) => f.write_str("sky: day"),
            RaceEvent::SkyChanged(Sky::Night) => f.write_str("sky: night"),
            RaceEvent::QuitRequested => f.write_str("quit requested"),
        }
    }
}
