use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Judgement tier of a single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Perfect,
    Good,
    Bad,
    Miss,
}

impl Tier {
    /// Score added for this tier.
    pub fn score(self) -> u64 {
        match self {
            Self::Perfect => 300,
            Self::Good => 150,
            Self::Bad => 50,
            Self::Miss => 0,
        }
    }

    /// Returns true if this tier resets the combo.
    pub fn breaks_combo(self) -> bool {
        matches!(self, Self::Miss)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Perfect => "PERFECT",
            Self::Good => "GOOD",
            Self::Bad => "BAD",
            Self::Miss => "MISS",
        }
    }
}

/// Timing direction for FAST/SLOW display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingDirection {
    Fast,
    Exact,
    Slow,
}

impl TimingDirection {
    const EXACT_THRESHOLD_MS: f64 = 1.0;

    /// `time_diff_ms` is press time minus target time (negative = early).
    pub fn from_timing_diff(time_diff_ms: f64) -> Self {
        if time_diff_ms < -Self::EXACT_THRESHOLD_MS {
            TimingDirection::Fast
        } else if time_diff_ms > Self::EXACT_THRESHOLD_MS {
            TimingDirection::Slow
        } else {
            TimingDirection::Exact
        }
    }
}

/// Cumulative FAST/SLOW statistics during gameplay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingStats {
    pub fast_count: u32,
    pub slow_count: u32,
}

impl TimingStats {
    pub fn record(&mut self, tier: Tier, time_diff_ms: f64) {
        // Perfect hits are not split into FAST/SLOW
        if matches!(tier, Tier::Perfect | Tier::Miss) {
            return;
        }

        match TimingDirection::from_timing_diff(time_diff_ms) {
            TimingDirection::Fast => self.fast_count += 1,
            TimingDirection::Slow => self.slow_count += 1,
            TimingDirection::Exact => {}
        }
    }
}

/// Judge timing windows in milliseconds. Each bound is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgeWindow {
    pub perfect_ms: f64,
    pub good_ms: f64,
    pub bad_ms: f64,
}

impl JudgeWindow {
    pub fn normal() -> Self {
        Self {
            perfect_ms: 60.0,
            good_ms: 80.0,
            bad_ms: 100.0,
        }
    }

    pub fn builder() -> JudgeWindowBuilder {
        JudgeWindowBuilder::default()
    }

    /// Check `0 < perfect < good < bad`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.perfect_ms > 0.0
            && self.perfect_ms < self.good_ms
            && self.good_ms < self.bad_ms
            && self.bad_ms.is_finite();
        if ordered {
            Ok(())
        } else {
            Err(ConfigError::WindowOrder {
                perfect: self.perfect_ms,
                good: self.good_ms,
                bad: self.bad_ms,
            })
        }
    }

    /// Classify a time difference. Total and symmetric in the sign of the
    /// difference; a value on a boundary belongs to the tighter tier.
    pub fn judge(&self, time_diff_ms: f64) -> Tier {
        let abs_diff = time_diff_ms.abs();

        if abs_diff <= self.perfect_ms {
            Tier::Perfect
        } else if abs_diff <= self.good_ms {
            Tier::Good
        } else if abs_diff <= self.bad_ms {
            Tier::Bad
        } else {
            Tier::Miss
        }
    }

    /// Returns true if the difference lies within the widest window.
    pub fn is_in_window(&self, time_diff_ms: f64) -> bool {
        time_diff_ms.abs() <= self.bad_ms
    }

    /// Returns true once a note has been passed by more than the bad window.
    /// `time_diff_ms` is now minus target time.
    pub fn is_missed(&self, time_diff_ms: f64) -> bool {
        time_diff_ms > self.bad_ms
    }
}

impl Default for JudgeWindow {
    fn default() -> Self {
        Self::normal()
    }
}

#[derive(Debug, Default)]
pub struct JudgeWindowBuilder {
    perfect_ms: Option<f64>,
    good_ms: Option<f64>,
    bad_ms: Option<f64>,
}

impl JudgeWindowBuilder {
    pub fn perfect_ms(mut self, ms: f64) -> Self {
        self.perfect_ms = Some(ms);
        self
    }

    pub fn good_ms(mut self, ms: f64) -> Self {
        self.good_ms = Some(ms);
        self
    }

    pub fn bad_ms(mut self, ms: f64) -> Self {
        self.bad_ms = Some(ms);
        self
    }

    pub fn build(self) -> Result<JudgeWindow, ConfigError> {
        let default = JudgeWindow::normal();
        let window = JudgeWindow {
            perfect_ms: self.perfect_ms.unwrap_or(default.perfect_ms),
            good_ms: self.good_ms.unwrap_or(default.good_ms),
            bad_ms: self.bad_ms.unwrap_or(default.bad_ms),
        };
        window.validate()?;
        Ok(window)
    }
}
