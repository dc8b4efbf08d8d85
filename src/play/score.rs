use serde::{Deserialize, Serialize};

use super::judge::Tier;

/// Running score, combo and per-tier counters of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    score: u64,
    combo: u32,
    max_combo: u32,
    perfect_count: u32,
    good_count: u32,
    bad_count: u32,
    miss_count: u32,
    total_notes: u32,
}

impl SessionStats {
    pub fn new(total_notes: u32) -> Self {
        Self {
            total_notes,
            ..Default::default()
        }
    }

    /// Apply one judged event.
    pub fn record(&mut self, tier: Tier) {
        match tier {
            Tier::Perfect => self.perfect_count += 1,
            Tier::Good => self.good_count += 1,
            Tier::Bad => self.bad_count += 1,
            Tier::Miss => self.miss_count += 1,
        }

        if tier.breaks_combo() {
            self.combo = 0;
        } else {
            self.combo += 1;
        }
        self.max_combo = self.max_combo.max(self.combo);
        self.score += tier.score();
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn perfect_count(&self) -> u32 {
        self.perfect_count
    }

    pub fn good_count(&self) -> u32 {
        self.good_count
    }

    pub fn bad_count(&self) -> u32 {
        self.bad_count
    }

    pub fn miss_count(&self) -> u32 {
        self.miss_count
    }

    pub fn total_notes(&self) -> u32 {
        self.total_notes
    }

    /// Number of notes judged so far, misses included.
    pub fn judged_count(&self) -> u32 {
        self.perfect_count + self.good_count + self.bad_count + self.miss_count
    }

    /// Reset counters, keeping the note total.
    pub fn reset(&mut self) {
        *self = Self::new(self.total_notes);
    }
}
