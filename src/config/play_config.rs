use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::play::JudgeWindow;

/// Gameplay tuning shared by every session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayConfig {
    /// Judge windows (ms).
    pub judge: JudgeWindow,
    /// Simulation ticks per second.
    pub tick_rate_hz: f64,
    /// Time a note spends travelling from spawn to the judge line (ms).
    pub approach_duration_ms: f64,
    /// Distance a note travels from spawn to the judge line (px).
    pub approach_distance: f64,
    /// Auto-play presses a note when within this distance of its target (ms).
    pub autoplay_hit_tolerance_ms: f64,
    /// Auto-play gives up on a note this late (ms).
    pub autoplay_catch_up_ms: f64,
    /// Track counts as ended this close to its duration (ms).
    pub end_epsilon_ms: f64,
    /// Lifetime of per-lane hit text (ms).
    pub feedback_duration_ms: f64,
    /// Upper bound of ticks run for a single frame.
    pub max_ticks_per_frame: u32,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            judge: JudgeWindow::normal(),
            tick_rate_hz: 60.0,
            approach_duration_ms: 1500.0,
            approach_distance: 600.0,
            autoplay_hit_tolerance_ms: 20.0,
            autoplay_catch_up_ms: 100.0,
            end_epsilon_ms: 50.0,
            feedback_duration_ms: 500.0,
            max_ticks_per_frame: 240,
        }
    }
}

impl PlayConfig {
    /// Fixed simulation step in milliseconds.
    pub fn tick_interval_ms(&self) -> f64 {
        1000.0 / self.tick_rate_hz
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.judge.validate()?;
        let positive = [
            ("tick_rate_hz", self.tick_rate_hz),
            ("approach_duration_ms", self.approach_duration_ms),
            ("approach_distance", self.approach_distance),
            ("autoplay_hit_tolerance_ms", self.autoplay_hit_tolerance_ms),
            ("autoplay_catch_up_ms", self.autoplay_catch_up_ms),
            ("feedback_duration_ms", self.feedback_duration_ms),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NonPositive { field });
            }
        }
        if self.end_epsilon_ms < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "end_epsilon_ms",
            });
        }
        if self.max_ticks_per_frame == 0 {
            return Err(ConfigError::NonPositive {
                field: "max_ticks_per_frame",
            });
        }
        Ok(())
    }

    /// Loads config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read play config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_values() {
        let config = PlayConfig::default();
        assert!((config.tick_interval_ms() - 1000.0 / 60.0).abs() < 1e-9);
        assert!((config.judge.perfect_ms - 60.0).abs() < f64::EPSILON);
        assert!((config.judge.bad_ms - 100.0).abs() < f64::EPSILON);
        assert!((config.autoplay_hit_tolerance_ms - 20.0).abs() < f64::EPSILON);
        assert!((config.autoplay_catch_up_ms - 100.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_tick_rate() {
        let config = PlayConfig {
            tick_rate_hz: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "tick_rate_hz"
            })
        );
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: PlayConfig = serde_json::from_str(r#"{"tick_rate_hz": 120.0}"#).unwrap();
        assert!((config.tick_rate_hz - 120.0).abs() < f64::EPSILON);
        assert_eq!(config.judge, JudgeWindow::normal());
    }

    #[test]
    fn test_file_io() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("play.json");

        let config = PlayConfig {
            approach_duration_ms: 900.0,
            ..Default::default()
        };
        config.save_to(&file_path).unwrap();

        let loaded = PlayConfig::load_from(&file_path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let dir = tempdir().unwrap();
        let loaded = PlayConfig::load_from(dir.path().join("missing.json")).unwrap();
        assert_eq!(loaded, PlayConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_windows() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("play.json");
        fs::write(
            &file_path,
            r#"{"judge": {"perfect_ms": 90.0, "good_ms": 80.0, "bad_ms": 100.0}}"#,
        )
        .unwrap();
        assert!(PlayConfig::load_from(&file_path).is_err());
    }
}
