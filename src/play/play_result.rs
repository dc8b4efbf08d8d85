use serde::{Deserialize, Serialize};

use super::judge::TimingStats;
use super::score::SessionStats;

/// Letter grade derived from accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Calculate grade from accuracy (0.0 - 100.0).
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 95.0 {
            Self::S
        } else if accuracy >= 90.0 {
            Self::A
        } else if accuracy >= 80.0 {
            Self::B
        } else if accuracy >= 70.0 {
            Self::C
        } else {
            Self::D
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Finalized outcome of a session, handed to persistence once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayResult {
    stats: SessionStats,
    timing: TimingStats,
    /// Perfect hits over total notes, in percent.
    accuracy: f64,
    is_full_combo: bool,
    grade: Grade,
    /// Auto-play results never count as records.
    autoplay: bool,
}

impl PlayResult {
    pub fn finalize(stats: SessionStats, timing: TimingStats, autoplay: bool) -> Self {
        let total = stats.total_notes();
        // Only Perfect hits count toward accuracy; existing grade thresholds depend on it.
        let accuracy = if total == 0 {
            100.0
        } else {
            stats.perfect_count() as f64 / total as f64 * 100.0
        };
        let is_full_combo = stats.max_combo() == total;

        Self {
            stats,
            timing,
            accuracy,
            is_full_combo,
            grade: Grade::from_accuracy(accuracy),
            autoplay,
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn timing(&self) -> &TimingStats {
        &self.timing
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn is_full_combo(&self) -> bool {
        self.is_full_combo
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn is_autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn score(&self) -> u64 {
        self.stats.score()
    }

    /// Returns true if this result should replace `other` as best record.
    pub fn beats(&self, other: &PlayResult) -> bool {
        (self.score(), self.stats.max_combo()) > (other.score(), other.stats.max_combo())
    }
}
