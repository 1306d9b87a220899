/// One of the four end-of-race announcements, in firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Announcement {
    Three,
    Two,
    One,
    Zero,
}

impl Announcement {
    const ALL: [Announcement; 4] = [Self::Three, Self::Two, Self::One, Self::Zero];

    /// Seconds after the race ended at which this announcement becomes due.
    pub fn threshold(self) -> f64 {
        match self {
            Self::Three => 1.0,
            Self::Two => 2.0,
            Self::One => 3.0,
            Self::Zero => 4.0,
        }
    }

    /// Window `[threshold, next threshold)` in which it fires; `Zero` is open-ended.
    fn window_contains(self, elapsed: f64) -> bool {
        let upper = match self {
            Self::Zero => f64::INFINITY,
            other => other.threshold() + 1.0,
        };
        elapsed >= self.threshold() && elapsed < upper
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Announcement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Three => "3...",
            Self::Two => "2...",
            Self::One => "1...",
            Self::Zero => "0",
        })
    }
}

/// Closes out the race once every kart has finished.
///
/// Each announcement fires at most once, and only if a poll lands inside its
/// one-second window. `Zero` fires on the first poll at or after four seconds
/// and marks the countdown complete.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    started_at: Option<f64>,
    fired: [bool; 4],
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the end of the race at `now`. Returns `true` only the first time.
    pub fn begin(&mut self, now: f64) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    pub fn has_begun(&self) -> bool {
        self.started_at.is_some()
    }

    /// The announcement due at `now`, if it has not fired yet.
    pub fn poll(&mut self, now: f64) -> Option<Announcement> {
        let elapsed = now - self.started_at?;
        let due = Announcement::ALL
            .into_iter()
            .find(|a| a.window_contains(elapsed))?;
        if self.fired[due.index()] {
            return None;
        }
        self.fired[due.index()] = true;
        Some(due)
    }

    /// Whether the final announcement has fired and the host should shut down.
    pub fn is_complete(&self) -> bool {
        self.fired[Announcement::Zero.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_before_begin() {
        let mut c = Countdown::new();
        assert_eq!(c.poll(500.0), None);
        assert!(!c.has_begun());
    }

    #[test]
    fn begin_latches_once() {
        let mut c = Countdown::new();
        assert!(c.begin(100.0));
        assert!(!c.begin(150.0));
        assert_eq!(c.poll(101.5), Some(Announcement::Three));
    }

    #[test]
    fn announcements_fire_once_in_their_windows() {
        let mut c = Countdown::new();
        c.begin(100.0);

        let mut fired = Vec::new();
        let mut t = 100.0;
        while t < 106.0 {
            if let Some(a) = c.poll(t) {
                fired.push((a, t));
            }
            t += 0.25;
        }

        let order: Vec<Announcement> = fired.iter().map(|(a, _)| *a).collect();
        assert_eq!(
            order,
            vec![
                Announcement::Three,
                Announcement::Two,
                Announcement::One,
                Announcement::Zero,
            ]
        );
        assert!(fired[0].1 >= 101.0 && fired[0].1 < 102.0);
        assert!(fired[3].1 >= 104.0);
        assert!(c.is_complete());
    }

    #[test]
    fn zero_signals_termination_exactly_once() {
        let mut c = Countdown::new();
        c.begin(100.0);
        assert_eq!(c.poll(104.0), Some(Announcement::Zero));
        assert_eq!(c.poll(104.5), None);
        assert_eq!(c.poll(200.0), None);
        assert!(c.is_complete());
    }

    #[test]
    fn skipped_window_is_not_replayed() {
        let mut c = Countdown::new();
        c.begin(0.0);
        assert_eq!(c.poll(1.2), Some(Announcement::Three));
        // A long stall jumps straight past "2..." and "1...".
        assert_eq!(c.poll(3.9), Some(Announcement::One));
        assert_eq!(c.poll(4.1), Some(Announcement::Zero));
    }

    #[test]
    fn display_matches_console_text() {
        assert_eq!(Announcement::Three.to_string(), "3...");
        assert_eq!(Announcement::Zero.to_string(), "0");
    }
}
