//! Race configuration, loaded from YAML.
//!
//! Every field has a default, so a file only needs the values it changes.
//! `RaceConfig::default()` is the stock demo: a player and two ghosts on a
//! 400-unit straight, lights starting six seconds after launch.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::lighting::Sky;
use crate::traffic_light::PhaseTimings;

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One kart's starting parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KartConfig {
    pub name: String,
    /// Units per tick.
    pub max_speed: f32,
    /// Units per tick, per tick.
    pub acceleration: f32,
    pub position: Vec3,
    /// Uniform scale.
    pub scale: f32,
    /// 1.0 is opaque.
    #[serde(default = "opaque")]
    pub transparency: f32,
}

fn opaque() -> f32 {
    1.0
}

impl KartConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |what: &str| ConfigError::Invalid(format!("kart {:?}: {what}", self.name));
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(invalid("max_speed must be positive"));
        }
        if !(self.acceleration.is_finite() && self.acceleration >= 0.0) {
            return Err(invalid("acceleration must be non-negative"));
        }
        if !(self.scale.is_finite() && self.scale >= 0.0) {
            return Err(invalid("scale must be non-negative"));
        }
        if !self.position.is_finite() {
            return Err(invalid("position must be finite"));
        }
        if !(0.0..=1.0).contains(&self.transparency) {
            return Err(invalid("transparency must be within 0..=1"));
        }
        Ok(())
    }
}

/// Start light placement and sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    /// Seconds after launch at which the sequence starts on its own.
    pub start_delay: f64,
    pub timings: PhaseTimings,
    pub position: Vec3,
    pub size: f32,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            start_delay: 6.0,
            timings: PhaseTimings::default(),
            position: Vec3::new(0.0, 200.0, 400.0),
            size: 30.0,
        }
    }
}

/// Finish slab across the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishLineConfig {
    pub z: f32,
    pub y: f32,
    pub width: f32,
    pub thickness: f32,
}

impl Default for FinishLineConfig {
    fn default() -> Self {
        Self {
            z: 400.0,
            y: 1.85,
            width: 40.0,
            thickness: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 700,
            height: 700,
        }
    }
}

/// Top-level race configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Fixed simulation ticks per second.
    pub tick_rate_hz: f64,
    pub lights: LightsConfig,
    pub finish_line: FinishLineConfig,
    pub player: KartConfig,
    pub ghosts: Vec<KartConfig>,
    pub sky: Sky,
    pub window: WindowConfig,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            lights: LightsConfig::default(),
            finish_line: FinishLineConfig::default(),
            player: KartConfig {
                name: "Player".into(),
                max_speed: 0.035,
                acceleration: 0.00005,
                position: Vec3::new(0.0, 2.0, -3.0),
                scale: 0.25,
                transparency: 1.0,
            },
            ghosts: vec![
                KartConfig {
                    name: "Turtle".into(),
                    max_speed: 0.04,
                    acceleration: 0.00006,
                    position: Vec3::new(2.25, 2.0, -2.8),
                    scale: 0.25,
                    transparency: 0.1,
                },
                KartConfig {
                    name: "Hare".into(),
                    max_speed: 0.033,
                    acceleration: 0.00004,
                    position: Vec3::new(-2.25, 2.0, -2.0),
                    scale: 0.25,
                    transparency: 0.1,
                },
            ],
            sky: Sky::Day,
            window: WindowConfig::default(),
        }
    }
}

impl RaceConfig {
    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!("loaded race config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Seconds per simulation tick.
    pub fn tick_seconds(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }

    /// Reject values the simulation cannot run with.
    ///
    /// The kinematic components themselves do not check their inputs, so this
    /// is the only gate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            return Err(ConfigError::Invalid("tick_rate_hz must be positive".into()));
        }
        let t = &self.lights.timings;
        for (name, secs) in [
            ("start_delay", self.lights.start_delay),
            ("red", t.red),
            ("yellow", t.yellow),
            ("green", t.green),
        ] {
            if !(secs.is_finite() && secs >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "lights.{name} must be a non-negative number of seconds"
                )));
            }
        }
        if !self.finish_line.z.is_finite() {
            return Err(ConfigError::Invalid("finish_line.z must be finite".into()));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        self.player.validate()?;
        for ghost in &self.ghosts {
            ghost.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        let c = RaceConfig::default();
        c.validate().unwrap();
        assert_eq!(c.ghosts.len(), 2);
        assert_eq!(c.lights.timings.total(), 10.0);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let c = RaceConfig::from_yaml("tick_rate_hz: 120\nlights:\n  start_delay: 1.0\n").unwrap();
        assert_eq!(c.tick_rate_hz, 120.0);
        assert_eq!(c.lights.start_delay, 1.0);
        assert_eq!(c.lights.timings, PhaseTimings::default());
        assert_eq!(c.player.name, "Player");
    }

    #[test]
    fn yaml_round_trip_preserves_config() {
        let c = RaceConfig::default();
        let text = c.to_yaml().unwrap();
        assert_eq!(RaceConfig::from_yaml(&text).unwrap(), c);
    }

    #[test]
    fn rejects_non_positive_max_speed() {
        let mut c = RaceConfig::default();
        c.ghosts[1].max_speed = 0.0;
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("Hare"));
    }

    #[test]
    fn rejects_negative_phase_duration() {
        let mut c = RaceConfig::default();
        c.lights.timings.yellow = -1.0;
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_tick_rate() {
        let c = RaceConfig {
            tick_rate_hz: 0.0,
            ..RaceConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sky: Night").unwrap();
        writeln!(file, "finish_line:\n  z: 50.0").unwrap();
        let c = RaceConfig::load(file.path()).unwrap();
        assert_eq!(c.sky, Sky::Night);
        assert_eq!(c.finish_line.z, 50.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RaceConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_yaml_is_yaml_error() {
        let err = RaceConfig::from_yaml("ghosts: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
