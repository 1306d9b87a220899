use karting_common::{KartRole, Transform};
use serde::{Deserialize, Serialize};

use crate::kart::Kart;

/// A kart's placing, produced once per kart when it first crosses the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishRecord {
    pub rank: u32,
    pub name: String,
    /// Seconds from race start to crossing.
    pub time: f64,
}

impl std::fmt::Display for FinishRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RANK: {} KART: {} : Time :{}:",
            self.rank,
            self.name,
            significant(self.time, TIME_DIGITS)
        )
    }
}

/// Significant digits of a race time on the console.
const TIME_DIGITS: i32 = 6;

/// `value` rounded to `digits` significant digits, trailing zeros dropped.
fn significant(value: f64, digits: i32) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        text
    }
}

/// Result of testing one kart against the finish plane.
#[derive(Debug, Clone, PartialEq)]
pub enum Crossing {
    /// Leading edge is still short of the plane.
    Short,
    /// Past the plane, already ranked or not racing.
    Crossed,
    /// Past the plane for the first time while racing; ranked now.
    Finished(FinishRecord),
}

impl Crossing {
    pub fn has_crossed(&self) -> bool {
        !matches!(self, Crossing::Short)
    }
}

/// Finish plane at `transform.position.z` that ranks karts in crossing order.
///
/// # Invariants
/// - `rank` only grows, by one per distinct finishing kart.
/// - Ghosts are deactivated when they finish, so they cannot be ranked twice.
/// - The player keeps driving after finishing and is latched instead.
///
/// Re-activating a finished ghost would let it rank again.
#[derive(Debug, Clone)]
pub struct FinishLine {
    transform: Transform,
    rank: u32,
    player_finished: bool,
}

impl FinishLine {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            rank: 0,
            player_finished: false,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Z of the finish plane.
    pub fn plane_z(&self) -> f32 {
        self.transform.position.z
    }

    /// Number of karts ranked so far.
    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn player_finished(&self) -> bool {
        self.player_finished
    }

    /// Whether a body with this transform has reached the plane.
    pub fn reached(&self, body: &Transform) -> bool {
        body.leading_edge_z() >= self.plane_z()
    }

    /// Test `kart` against the plane at time `now`, ranking it on its first
    /// crossing while activated.
    pub fn check_crossing(&mut self, kart: &mut Kart, now: f64) -> Crossing {
        if !self.reached(kart.transform()) {
            return Crossing::Short;
        }
        if !kart.is_activated() {
            return Crossing::Crossed;
        }
        match kart.role() {
            KartRole::Ghost => {
                kart.deactivate();
            }
            KartRole::Player => {
                if self.player_finished {
                    return Crossing::Crossed;
                }
                self.player_finished = true;
            }
        }
        kart.mark_finished(now);
        self.rank += 1;
        let record = FinishRecord {
            rank: self.rank,
            name: kart.name().to_owned(),
            time: kart.race_time().unwrap_or_default(),
        };
        tracing::info!(
            rank = record.rank,
            kart = %record.name,
            time = record.time,
            "kart finished"
        );
        Crossing::Finished(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn line() -> FinishLine {
        FinishLine::new(Transform {
            position: Vec3::new(0.0, 1.85, 400.0),
            scale: Vec3::new(40.0, 0.1, 1.0),
            ..Transform::default()
        })
    }

    fn kart_at(name: &str, role: KartRole, z: f32, depth: f32) -> Kart {
        let mut k = Kart::new(
            name,
            role,
            Transform {
                position: Vec3::new(0.0, 2.0, z),
                scale: Vec3::new(0.25, 0.25, depth),
                ..Transform::default()
            },
            0.035,
            0.00005,
        );
        k.activate();
        k.mark_started(10.0);
        k
    }

    #[test]
    fn leading_edge_decides_crossing() {
        let fl = line();
        let crossing = Transform {
            position: Vec3::new(0.0, 0.0, 399.0),
            scale: Vec3::new(1.0, 1.0, 1.5),
            ..Transform::default()
        };
        let short = Transform {
            position: Vec3::new(0.0, 0.0, 390.0),
            scale: Vec3::new(1.0, 1.0, 2.0),
            ..Transform::default()
        };
        assert!(fl.reached(&crossing));
        assert!(!fl.reached(&short));
    }

    #[test]
    fn short_kart_is_untouched() {
        let mut fl = line();
        let mut k = kart_at("Hare", KartRole::Ghost, 390.0, 2.0);
        assert_eq!(fl.check_crossing(&mut k, 50.0), Crossing::Short);
        assert!(k.is_activated());
        assert_eq!(fl.rank(), 0);
    }

    #[test]
    fn ghost_is_ranked_and_deactivated_once() {
        let mut fl = line();
        let mut k = kart_at("Turtle", KartRole::Ghost, 399.0, 1.5);
        let first = fl.check_crossing(&mut k, 60.0);
        assert_eq!(
            first,
            Crossing::Finished(FinishRecord {
                rank: 1,
                name: "Turtle".into(),
                time: 50.0,
            })
        );
        assert!(!k.is_activated());
        assert_eq!(k.end_time(), Some(60.0));

        for t in 0..10 {
            let again = fl.check_crossing(&mut k, 61.0 + f64::from(t));
            assert_eq!(again, Crossing::Crossed);
            assert!(again.has_crossed());
        }
        assert_eq!(fl.rank(), 1);
        assert_eq!(k.end_time(), Some(60.0));
    }

    #[test]
    fn player_is_latched_but_stays_active() {
        let mut fl = line();
        let mut p = kart_at("Player", KartRole::Player, 400.0, 0.25);
        assert!(matches!(fl.check_crossing(&mut p, 70.0), Crossing::Finished(_)));
        assert!(p.is_activated());
        assert!(fl.player_finished());

        assert_eq!(fl.check_crossing(&mut p, 71.0), Crossing::Crossed);
        assert_eq!(fl.rank(), 1);
        assert_eq!(p.end_time(), Some(70.0));
    }

    #[test]
    fn ranks_follow_crossing_order() {
        let mut fl = line();
        let mut turtle = kart_at("Turtle", KartRole::Ghost, 401.0, 0.25);
        let mut player = kart_at("Player", KartRole::Player, 402.0, 0.25);
        let mut hare = kart_at("Hare", KartRole::Ghost, 403.0, 0.25);

        let mut ranks = Vec::new();
        for (kart, now) in [(&mut turtle, 1.0), (&mut player, 2.0), (&mut hare, 3.0)] {
            if let Crossing::Finished(record) = fl.check_crossing(kart, now) {
                ranks.push((record.rank, record.name));
            }
        }
        assert_eq!(
            ranks,
            vec![
                (1, "Turtle".to_string()),
                (2, "Player".to_string()),
                (3, "Hare".to_string()),
            ]
        );
    }

    #[test]
    fn inactive_kart_past_line_is_not_ranked() {
        let mut fl = line();
        let mut k = kart_at("Hare", KartRole::Ghost, 500.0, 0.25);
        k.deactivate();
        assert_eq!(fl.check_crossing(&mut k, 1.0), Crossing::Crossed);
        assert_eq!(fl.rank(), 0);
    }

    #[test]
    fn record_prints_console_line() {
        let r = FinishRecord {
            rank: 2,
            name: "Hare".into(),
            time: 191.5,
        };
        assert_eq!(r.to_string(), "RANK: 2 KART: Hare : Time :191.5:");
    }

    #[test]
    fn record_time_drops_float_noise() {
        let r = FinishRecord {
            rank: 1,
            name: "Player".into(),
            time: 10.849999999999753,
        };
        assert_eq!(r.to_string(), "RANK: 1 KART: Player : Time :10.85:");
        assert_eq!(significant(20.0, TIME_DIGITS), "20");
        assert_eq!(significant(185.5, TIME_DIGITS), "185.5");
        assert_eq!(significant(3.14159265, TIME_DIGITS), "3.14159");
        assert_eq!(significant(0.0, TIME_DIGITS), "0");
    }
}
