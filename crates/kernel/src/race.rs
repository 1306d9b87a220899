use glam::Vec3;
use karting_common::{KartRole, Transform};
use karting_input::{Action, InputFrame};

use crate::config::{KartConfig, RaceConfig};
use crate::countdown::{Announcement, Countdown};
use crate::event::RaceEvent;
use crate::finish_line::{Crossing, FinishLine, FinishRecord};
use crate::kart::Kart;
use crate::landmark::Landmark;
use crate::lighting::{Light, Sky};
use crate::traffic_light::TrafficLight;

/// Intensity of the point light that picks out the landmarks.
const LANDMARK_LIGHT_INTENSITY: f32 = 500.0;
/// Where the sun's directional light comes from.
const SUN_DIRECTION: Vec3 = Vec3::new(4.0, 5.0, 3.0);

/// Errors raised while stepping the race.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("kart {kart} left the finite range (speed {speed})")]
    NonFinite { kart: String, speed: f32 },
}

/// Process-wide race flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceContext {
    /// Set once, on the first green.
    pub race_started: bool,
    /// Ghosts hold still while set. Cleared by the green light.
    pub paused: bool,
    pub sky: Sky,
}

/// A kart on the grid plus the per-kart values the race loop keeps for it.
#[derive(Debug, Clone)]
pub struct Entrant {
    pub kart: Kart,
    /// Acceleration a ghost gets back whenever it is not paused.
    cruise_acceleration: f32,
    /// 1.0 is opaque.
    pub transparency: f32,
}

impl Entrant {
    fn from_config(config: &KartConfig, role: KartRole) -> Self {
        let transform = Transform::at(config.position).with_uniform_scale(config.scale);
        Self {
            kart: Kart::new(
                config.name.clone(),
                role,
                transform,
                config.max_speed,
                config.acceleration,
            ),
            cruise_acceleration: config.acceleration,
            transparency: config.transparency,
        }
    }
}

/// The whole race: karts, start light, finish line, scenery and lights.
///
/// `tick` is the only mutator. It never reads a clock; hosts pass `now` in
/// seconds since launch. Everything observable that happened during a tick is
/// appended to the event log.
///
/// The player is always `entrants[0]`; ghosts follow in config order, which is
/// also the order they are tested against the finish line.
#[derive(Debug, Clone)]
pub struct RaceSim {
    config: RaceConfig,
    entrants: Vec<Entrant>,
    traffic_light: TrafficLight,
    finish_line: FinishLine,
    landmarks: Vec<Landmark>,
    ground: Transform,
    sun: Light,
    landmark_light: Light,
    context: RaceContext,
    countdown: Countdown,
    results: Vec<FinishRecord>,
    tick: u64,
    exit_requested: bool,
    event_log: Vec<RaceEvent>,
}

impl RaceSim {
    /// Lay out the grid described by `config`. The config is assumed valid.
    pub fn new(config: RaceConfig) -> Self {
        let mut entrants = vec![Entrant::from_config(&config.player, KartRole::Player)];
        entrants.extend(
            config
                .ghosts
                .iter()
                .map(|ghost| Entrant::from_config(ghost, KartRole::Ghost)),
        );

        let traffic_light = TrafficLight::new(
            Transform::at(config.lights.position).with_uniform_scale(config.lights.size),
            config.lights.timings,
        );

        let finish = &config.finish_line;
        let finish_line = FinishLine::new(Transform {
            position: Vec3::new(0.0, finish.y, finish.z),
            scale: Vec3::new(finish.width, finish.thickness, 1.0),
            ..Transform::default()
        });

        let landmarks = vec![
            Landmark::new(
                "Earth",
                Transform::at(Vec3::new(-40.0, 0.0, 75.0)).with_uniform_scale(0.5),
            ),
            Landmark::new(
                "Meteorite",
                Transform::at(Vec3::new(120.0, 0.0, 300.0)).with_uniform_scale(1.0),
            ),
        ];

        let ground = Transform {
            position: Vec3::new(0.0, -0.25, 0.0),
            rotation: Vec3::new(90.0, 0.0, -90.0),
            scale: Vec3::splat(750.0),
        };

        let mut sun = Light::directional(SUN_DIRECTION);
        sun.position = Vec3::new(0.0, -5.0, 0.0);
        config.sky.apply(&mut sun);

        let mut landmark_light = Light::point();
        landmark_light.set_intensity(LANDMARK_LIGHT_INTENSITY);

        tracing::info!(karts = entrants.len(), finish_z = finish.z, "race laid out");

        Self {
            context: RaceContext {
                race_started: false,
                paused: true,
                sky: config.sky,
            },
            config,
            entrants,
            traffic_light,
            finish_line,
            landmarks,
            ground,
            sun,
            landmark_light,
            countdown: Countdown::new(),
            results: Vec::new(),
            tick: 0,
            exit_requested: false,
            event_log: Vec::new(),
        }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Ticks stepped so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn context(&self) -> RaceContext {
        self.context
    }

    pub fn entrants(&self) -> &[Entrant] {
        &self.entrants
    }

    pub fn player(&self) -> &Kart {
        &self.entrants[0].kart
    }

    pub fn ghosts(&self) -> impl Iterator<Item = &Kart> {
        self.entrants[1..].iter().map(|e| &e.kart)
    }

    pub fn traffic_light(&self) -> &TrafficLight {
        &self.traffic_light
    }

    pub fn finish_line(&self) -> &FinishLine {
        &self.finish_line
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn ground(&self) -> &Transform {
        &self.ground
    }

    pub fn sun(&self) -> &Light {
        &self.sun
    }

    pub fn landmark_light(&self) -> &Light {
        &self.landmark_light
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Finish records in crossing order.
    pub fn results(&self) -> &[FinishRecord] {
        &self.results
    }

    /// Latched once every kart has crossed and the countdown has begun; never
    /// clears afterwards.
    pub fn race_over(&self) -> bool {
        self.countdown.has_begun()
    }

    /// Set by the final countdown announcement or a quit request.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[RaceEvent] {
        &self.event_log
    }

    /// Step the race once at time `now`.
    ///
    /// Order within a tick: start the lights if due, apply input, move ghosts,
    /// move the player, advance the light, start the race on green, spin the
    /// landmarks, judge the finish line, repaint the sun, then run the
    /// countdown.
    pub fn tick(&mut self, now: f64, input: &InputFrame) -> Result<(), SimError> {
        self.tick += 1;

        if !self.traffic_light.is_started() && now > self.config.lights.start_delay {
            self.traffic_light.start(now);
            tracing::info!(at = now, "lights sequence started");
            self.event_log.push(RaceEvent::LightsStarted { at: now });
        }

        self.apply_input(input);

        let paused = self.context.paused;
        for ghost in &mut self.entrants[1..] {
            if paused {
                ghost.kart.set_acceleration(0.0);
                ghost.kart.set_speed(0.0);
            } else {
                ghost.kart.set_acceleration(ghost.cruise_acceleration);
            }
            ghost.kart.update();
        }
        self.entrants[0].kart.update();

        if let Some(phase) = self.traffic_light.update(now) {
            tracing::debug!(%phase, "light phase changed");
            self.event_log.push(RaceEvent::PhaseChanged(phase));
        }
        if self.traffic_light.green_light() && !self.context.race_started {
            self.start_race(now);
        }

        for landmark in &mut self.landmarks {
            landmark.update();
        }

        let mut all_crossed = true;
        for entrant in &mut self.entrants {
            let crossing = self.finish_line.check_crossing(&mut entrant.kart, now);
            all_crossed &= crossing.has_crossed();
            if let Crossing::Finished(record) = crossing {
                self.results.push(record.clone());
                self.event_log.push(RaceEvent::Finished(record));
            }
        }

        self.context.sky.apply(&mut self.sun);

        if all_crossed {
            self.run_countdown(now);
        }

        self.check_finite()
    }

    fn apply_input(&mut self, input: &InputFrame) {
        if input.was_pressed(Action::TogglePause) {
            self.context.paused = !self.context.paused;
            self.event_log.push(RaceEvent::PauseToggled {
                paused: self.context.paused,
            });
        }
        for (action, sky) in [(Action::DayMode, Sky::Day), (Action::NightMode, Sky::Night)] {
            if input.was_pressed(action) && self.context.sky != sky {
                self.context.sky = sky;
                self.event_log.push(RaceEvent::SkyChanged(sky));
            }
        }
        if input.was_pressed(Action::Quit) && !self.exit_requested {
            self.exit_requested = true;
            self.event_log.push(RaceEvent::QuitRequested);
        }
        self.entrants[0].kart.apply_controls(input.player_controls());
    }

    fn start_race(&mut self, now: f64) {
        self.context.race_started = true;
        self.context.paused = false;
        for entrant in &mut self.entrants {
            entrant.kart.activate();
            entrant.kart.mark_started(now);
        }
        tracing::info!(at = now, "green light, race started");
        self.event_log.push(RaceEvent::RaceStarted { at: now });
    }

    fn run_countdown(&mut self, now: f64) {
        if self.countdown.begin(now) {
            tracing::info!(at = now, "all karts finished");
            self.event_log.push(RaceEvent::RaceOver);
        }
        if let Some(announcement) = self.countdown.poll(now) {
            self.event_log.push(RaceEvent::Countdown(announcement));
            if announcement == Announcement::Zero {
                self.exit_requested = true;
            }
        }
    }

    fn check_finite(&self) -> Result<(), SimError> {
        match self
            .entrants
            .iter()
            .map(|e| &e.kart)
            .find(|k| !(k.speed().is_finite() && k.position().is_finite()))
        {
            Some(kart) => Err(SimError::NonFinite {
                kart: kart.name().to_owned(),
                speed: kart.speed(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic_light::Phase;

    const DT: f64 = 1.0 / 60.0;

    fn short_track() -> RaceConfig {
        let mut config = RaceConfig::default();
        config.finish_line.z = 20.0;
        config
    }

    fn idle() -> InputFrame {
        InputFrame::new()
    }

    fn pressed(action: Action) -> InputFrame {
        let mut frame = InputFrame::new();
        frame.press(action);
        frame
    }

    /// Run until `done` or `max_ticks`, holding throttle once the race is on.
    fn drive(sim: &mut RaceSim, now: &mut f64, max_ticks: u32, done: impl Fn(&RaceSim) -> bool) {
        let mut throttle = InputFrame::new();
        throttle.press(Action::Throttle);
        throttle.consume_edges();
        let coast = InputFrame::new();
        for _ in 0..max_ticks {
            if done(sim) {
                return;
            }
            *now += DT;
            let input = if sim.context().race_started {
                &throttle
            } else {
                &coast
            };
            sim.tick(*now, input).unwrap();
        }
    }

    #[test]
    fn new_sim_is_paused_and_idle() {
        let sim = RaceSim::new(RaceConfig::default());
        assert!(sim.context().paused);
        assert!(!sim.context().race_started);
        assert_eq!(sim.entrants().len(), 3);
        assert_eq!(sim.player().name(), "Player");
        let names: Vec<&str> = sim.ghosts().map(Kart::name).collect();
        assert_eq!(names, ["Turtle", "Hare"]);
        assert_eq!(sim.traffic_light().phase(), Phase::Idle);
        assert_eq!(sim.sun().intensity(), 3.0);
    }

    #[test]
    fn lights_start_after_delay() {
        let mut sim = RaceSim::new(RaceConfig::default());
        sim.tick(5.9, &idle()).unwrap();
        assert!(!sim.traffic_light().is_started());
        sim.tick(6.0, &idle()).unwrap();
        assert!(!sim.traffic_light().is_started());
        sim.tick(6.01, &idle()).unwrap();
        assert!(sim.traffic_light().is_started());
        assert_eq!(sim.traffic_light().phase(), Phase::Red);
        assert!(sim.events().contains(&RaceEvent::LightsStarted { at: 6.01 }));
    }

    #[test]
    fn ghosts_hold_until_green_then_all_activate() {
        let mut sim = RaceSim::new(RaceConfig::default());
        let start: Vec<Vec3> = sim.ghosts().map(Kart::position).collect();

        sim.tick(7.0, &idle()).unwrap();
        sim.tick(12.0, &idle()).unwrap();
        let held: Vec<Vec3> = sim.ghosts().map(Kart::position).collect();
        assert_eq!(start, held);
        assert!(!sim.context().race_started);

        // 6.5s into the sequence the light turns green.
        sim.tick(13.6, &idle()).unwrap();
        assert!(sim.context().race_started);
        assert!(!sim.context().paused);
        assert!(sim.entrants().iter().all(|e| e.kart.is_activated()));
        assert!(sim.entrants().iter().all(|e| e.kart.start_time() == Some(13.6)));
        assert!(sim.events().contains(&RaceEvent::RaceStarted { at: 13.6 }));

        sim.tick(13.7, &idle()).unwrap();
        assert!(sim.ghosts().all(|g| g.speed() > 0.0));
    }

    #[test]
    fn race_starts_only_once() {
        let mut sim = RaceSim::new(RaceConfig::default());
        sim.tick(7.0, &idle()).unwrap();
        sim.tick(14.0, &idle()).unwrap();
        sim.tick(20.0, &idle()).unwrap();
        let starts = sim
            .events()
            .iter()
            .filter(|e| matches!(e, RaceEvent::RaceStarted { .. }))
            .count();
        assert_eq!(starts, 1);
        assert_eq!(sim.traffic_light().phase(), Phase::Ended);
    }

    #[test]
    fn pause_zeroes_ghost_speed() {
        let mut sim = RaceSim::new(RaceConfig::default());
        let mut now = 0.0;
        drive(&mut sim, &mut now, 2000, |s| s.context().race_started);
        for _ in 0..60 {
            now += DT;
            sim.tick(now, &idle()).unwrap();
        }
        assert!(sim.ghosts().all(|g| g.speed() > 0.0));

        now += DT;
        sim.tick(now, &pressed(Action::TogglePause)).unwrap();
        assert!(sim.context().paused);
        assert!(sim.ghosts().all(|g| g.speed() == 0.0));
        let frozen: Vec<Vec3> = sim.ghosts().map(Kart::position).collect();
        for _ in 0..10 {
            now += DT;
            sim.tick(now, &idle()).unwrap();
        }
        let still: Vec<Vec3> = sim.ghosts().map(Kart::position).collect();
        assert_eq!(frozen, still);

        now += DT;
        sim.tick(now, &pressed(Action::TogglePause)).unwrap();
        assert!(!sim.context().paused);
        assert!(sim.ghosts().all(|g| g.speed() > 0.0));
    }

    #[test]
    fn sky_switch_repaints_sun() {
        let mut sim = RaceSim::new(RaceConfig::default());
        sim.tick(0.1, &pressed(Action::NightMode)).unwrap();
        assert_eq!(sim.context().sky, Sky::Night);
        assert_eq!(sim.sun().intensity(), 1.25);
        // Already night: no second event.
        sim.tick(0.2, &pressed(Action::NightMode)).unwrap();
        sim.tick(0.3, &pressed(Action::DayMode)).unwrap();
        assert_eq!(sim.sun().intensity(), 3.0);
        let changes: Vec<&RaceEvent> = sim
            .events()
            .iter()
            .filter(|e| matches!(e, RaceEvent::SkyChanged(_)))
            .collect();
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn quit_requests_exit() {
        let mut sim = RaceSim::new(RaceConfig::default());
        sim.tick(0.1, &idle()).unwrap();
        assert!(!sim.exit_requested());
        sim.tick(0.2, &pressed(Action::Quit)).unwrap();
        assert!(sim.exit_requested());
        assert_eq!(sim.drain_events(), vec![RaceEvent::QuitRequested]);
        assert!(sim.events().is_empty());
    }

    #[test]
    fn headless_race_ranks_everyone_and_counts_down() {
        let mut sim = RaceSim::new(short_track());
        let mut now = 0.0;
        drive(&mut sim, &mut now, 20_000, RaceSim::exit_requested);
        assert!(sim.exit_requested());

        let order: Vec<(u32, &str)> = sim
            .results()
            .iter()
            .map(|r| (r.rank, r.name.as_str()))
            .collect();
        assert_eq!(order, [(1, "Turtle"), (2, "Player"), (3, "Hare")]);
        assert!(sim.results().iter().all(|r| r.time > 0.0));

        assert!(sim.ghosts().all(|g| !g.is_activated()));
        assert!(sim.player().is_activated());
        assert!(sim.race_over());

        let console: Vec<String> = sim
            .events()
            .iter()
            .filter(|e| e.is_console())
            .map(ToString::to_string)
            .collect();
        assert_eq!(console.len(), 3 + 1 + 4);
        assert!(console[..3].iter().all(|line| line.starts_with("RANK: ")));
        assert_eq!(console[3], RaceEvent::RaceOver.to_string());
        assert_eq!(&console[4..], ["3...", "2...", "1...", "0"]);
    }

    #[test]
    fn player_standing_still_blocks_countdown() {
        let mut sim = RaceSim::new(short_track());
        let mut now = 0.0;
        for _ in 0..6000 {
            now += DT;
            sim.tick(now, &idle()).unwrap();
        }
        assert_eq!(sim.results().len(), 2);
        assert!(!sim.race_over());
        assert!(!sim.exit_requested());
    }

    #[test]
    fn runaway_kart_is_an_error() {
        let mut config = RaceConfig::default();
        config.lights.start_delay = 0.0;
        config.ghosts[0].max_speed = f32::MAX;
        config.ghosts[0].acceleration = f32::MAX;
        let mut sim = RaceSim::new(config);

        let mut now = 0.0;
        let mut outcome = Ok(());
        for _ in 0..2000 {
            now += DT;
            outcome = sim.tick(now, &idle());
            if outcome.is_err() {
                break;
            }
        }
        match outcome {
            Err(SimError::NonFinite { kart, .. }) => assert_eq!(kart, "Turtle"),
            Ok(()) => panic!("expected the runaway ghost to overflow"),
        }
    }
}
